// config.rs — 导演配置（视口、相机、投影、轨道、热点）
//
// 配置文件查找顺序：
// - CLI: --config <path>
// - Env: PANORAMA_DIRECTOR_CONFIG
// - <exe_dir>/assets/director.json
// - ./assets/director.json （开发目录）

use crate::camera::{Camera, DEFAULT_FOV};
use crate::error::{DirectorError, Result};
use crate::track::{SharedTrackRegistry, Track, TrackRegistry};
use crate::view::{Size, ViewManager, ViewType};
use glam::DVec3;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "PANORAMA_DIRECTOR_CONFIG";
const CONFIG_FILE: &str = "director.json";

/// Initial camera, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub fov: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            fov: DEFAULT_FOV,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewConfig {
    #[serde(rename = "type")]
    pub view_type: ViewType,
    pub repeat_x: bool,
    pub repeat_y: bool,
}

/// A point of interest on the sphere, degrees.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Hotspot {
    pub name: String,
    pub yaw: f64,
    pub pitch: f64,
    pub parallax: f64,
}

impl Hotspot {
    /// World direction; yaw 0 / pitch 0 is (0, 0, -1), positive yaw to the right.
    pub fn direction(&self) -> DVec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        DVec3::new(pitch.cos() * yaw.sin(), pitch.sin(), -pitch.cos() * yaw.cos())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectorConfig {
    pub viewport: Size,
    pub camera: CameraConfig,
    pub view: ViewConfig,
    pub media: Option<Size>,
    pub tracks: Vec<Track>,
    pub hotspots: Vec<Hotspot>,
    pub default_track: Option<String>,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(1280.0, 720.0),
            camera: CameraConfig::default(),
            view: ViewConfig::default(),
            media: None,
            tracks: Vec::new(),
            hotspots: Vec::new(),
            default_track: None,
        }
    }
}

impl DirectorConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!(
            "loaded {} ({} tracks, {} hotspots)",
            path.display(),
            config.tracks.len(),
            config.hotspots.len()
        );
        Ok(config)
    }

    /// Registry holding every configured track.
    pub fn registry(&self) -> SharedTrackRegistry {
        let registry = TrackRegistry::shared();
        {
            let mut tracks = registry.borrow_mut();
            for track in &self.tracks {
                tracks.register(track.clone());
            }
        }
        registry
    }

    pub fn camera(&self) -> Camera {
        let CameraConfig { yaw, pitch, roll, fov } = self.camera;
        Camera::from_degrees(yaw, pitch, roll, fov)
    }

    /// Manager with the configured viewport, media and view already active.
    pub fn view_manager(&self) -> ViewManager {
        let mut manager = ViewManager::new(self.viewport);
        manager.set_media(self.media);
        manager.set_repeat_x(self.view.repeat_x);
        manager.set_repeat_y(self.view.repeat_y);
        manager.set_view_type(self.view.view_type);
        manager
    }

    /// Track to play when none is requested: `defaultTrack`, else the first one.
    pub fn default_track_uid(&self) -> Option<&str> {
        self.default_track
            .as_deref()
            .or_else(|| self.tracks.first().map(Track::uid))
    }
}

/// Search <exe_dir>/assets/director.json, then ./assets/director.json.
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("assets").join(CONFIG_FILE);
            if p.exists() {
                return Some(p);
            }
        }
    }

    let p = PathBuf::from("assets").join(CONFIG_FILE);
    if p.exists() {
        return Some(p);
    }

    None
}

/// Explicit path first, then the env var, then the asset directories.
pub fn resolve_config_path(explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(PathBuf::from(path));
    }

    if let Ok(v) = std::env::var(CONFIG_ENV) {
        if !v.trim().is_empty() {
            return Ok(PathBuf::from(v));
        }
    }

    find_config_file().ok_or_else(|| DirectorError::ConfigNotFound(format!("assets/{}", CONFIG_FILE)))
}
