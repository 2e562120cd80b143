// view/mod.rs — 屏幕坐标与世界方向的互相映射
//
// 约定：屏幕像素 y 向下；片元坐标 x 乘以视口宽高比，中心为 (0, 0)；
// 世界空间正前方为 (0, 0, -1)，正 yaw 向右转，正 pitch 向上看。

mod flat;
mod gopro;
mod manager;
mod rectilinear;

pub use flat::FlatView;
pub use gopro::GoProView;
pub use manager::{ViewChange, ViewManager};
pub use rectilinear::RectilinearView;

use crate::camera::Camera;
use crate::error::DirectorError;
use crate::orientation;
use glam::{DMat4, DVec2, DVec3};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    #[default]
    Rectilinear,
    Flat,
    GoPro,
}

impl ViewType {
    pub fn name(self) -> &'static str {
        match self {
            ViewType::Rectilinear => "rectilinear",
            ViewType::Flat => "flat",
            ViewType::GoPro => "gopro",
        }
    }

    /// Projection code written into [`ViewUniforms::mode`].
    pub fn mode(self) -> u32 {
        match self {
            ViewType::Rectilinear => 0,
            ViewType::GoPro => 2,
            ViewType::Flat => 4,
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewType {
    type Err = DirectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rectilinear" => Ok(ViewType::Rectilinear),
            "flat" => Ok(ViewType::Flat),
            "gopro" => Ok(ViewType::GoPro),
            _ => Err(DirectorError::UnknownView(s.to_string())),
        }
    }
}

/// Angular limits of a view, all in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub yaw_min: f64,
    pub yaw_max: f64,
    pub pitch_min: f64,
    pub pitch_max: f64,
    pub roll_min: f64,
    pub roll_max: f64,
    pub fov_min: f64,
    pub fov_max: f64,
}

impl ViewBounds {
    pub fn unbounded() -> Self {
        Self {
            yaw_min: f64::NEG_INFINITY,
            yaw_max: f64::INFINITY,
            pitch_min: f64::NEG_INFINITY,
            pitch_max: f64::INFINITY,
            roll_min: f64::NEG_INFINITY,
            roll_max: f64::INFINITY,
            fov_min: 0.0,
            fov_max: f64::INFINITY,
        }
    }

    /// Free yaw, pitch within ±`pitch` and full roll. Arguments in degrees.
    pub fn spherical(pitch: f64, fov_min: f64, fov_max: f64) -> Self {
        Self {
            pitch_min: -pitch.to_radians(),
            pitch_max: pitch.to_radians(),
            roll_min: -std::f64::consts::PI,
            roll_max: std::f64::consts::PI,
            fov_min: fov_min.to_radians(),
            fov_max: fov_max.to_radians(),
            ..Self::unbounded()
        }
    }
}

/// Viewport or media size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// width / height, 1.0 for an empty size.
    pub fn aspect(&self) -> f64 {
        if self.is_empty() {
            1.0
        } else {
            self.width / self.height
        }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewOptions {
    pub repeat_x: bool,
    pub repeat_y: bool,
}

impl ViewOptions {
    fn bits(self) -> u32 {
        (self.repeat_x as u32) | ((self.repeat_y as u32) << 1)
    }
}

/// Per-frame projection parameters in GPU layout.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewUniforms {
    pub aspect: f32,
    pub projection_scale: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub fov_rad: f32,
    pub mode: u32, // 0=Rect, 2=GoPro, 4=Flat
    pub repeat: u32, // bit0=X, bit1=Y
}

/// Viewport bookkeeping shared by every view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBase {
    viewport: Size,
}

impl ViewBase {
    pub fn new(viewport: Size) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Pixel → fragment. x ∈ [-aspect, aspect], y ∈ [-1, 1], y down.
    pub fn screen_to_fragment(&self, point: DVec2) -> DVec2 {
        let Size { width, height } = self.viewport;
        DVec2::new(
            (2.0 * point.x / width - 1.0) * self.viewport.aspect(),
            2.0 * point.y / height - 1.0,
        )
    }

    pub fn fragment_to_screen(&self, fragment: DVec2) -> DVec2 {
        let Size { width, height } = self.viewport;
        DVec2::new(
            (fragment.x / self.viewport.aspect() + 1.0) * width / 2.0,
            (fragment.y + 1.0) * height / 2.0,
        )
    }

    /// Accepts points up to half a viewport outside each edge.
    pub fn within_margin(&self, point: DVec2) -> bool {
        let Size { width, height } = self.viewport;
        point.x >= -0.5 * width && point.x <= 1.5 * width && point.y >= -0.5 * height && point.y <= 1.5 * height
    }

    /// Fragment of a camera-space direction under a perspective divide, or
    /// `None` behind the camera.
    fn perspective_fragment(camera_space: DVec3, scale: f64) -> Option<DVec2> {
        let depth = -camera_space.z;
        if depth <= 0.0 {
            return None;
        }
        Some(DVec2::new(camera_space.x / depth, camera_space.y / depth) / scale)
    }
}

/// Horizontal parallax: layers with a larger factor move less.
fn apply_parallax(fragment: DVec2, parallax: f64) -> DVec2 {
    DVec2::new(fragment.x / (1.0 + parallax.clamp(0.0, 1.0)), fragment.y)
}

/// Camera rotation used by the projections. Yaw is negated so positive yaw
/// turns right.
pub fn camera_rotation(camera: &Camera) -> DMat4 {
    let euler = camera.euler();
    orientation::euler_to_rotation_matrix(-euler.yaw, euler.pitch, euler.roll, true)
}

/// Screen y grows downwards, world y upwards.
pub fn flip_y(v: DVec3) -> DVec3 {
    DVec3::new(v.x, -v.y, v.z)
}

/// World direction → camera space, `None` for degenerate input.
fn to_camera_space(camera: &Camera, direction: DVec3) -> Option<DVec3> {
    let direction = direction.try_normalize()?;
    Some(camera_rotation(camera).transpose().transform_vector3(flip_y(direction)))
}

/// Camera space → unit world direction.
fn to_world_space(camera: &Camera, camera_space: DVec3) -> Option<DVec3> {
    let world = camera_rotation(camera).transform_vector3(camera_space).try_normalize()?;
    Some(flip_y(world))
}

/// Active projection, one variant per view type.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Rectilinear(RectilinearView),
    Flat(FlatView),
    GoPro(GoProView),
}

impl View {
    pub fn new(view_type: ViewType, viewport: Size, options: ViewOptions, media: Option<Size>) -> Self {
        match view_type {
            ViewType::Rectilinear => View::Rectilinear(RectilinearView::new(viewport)),
            ViewType::Flat => View::Flat(FlatView::new(viewport, options, media)),
            ViewType::GoPro => View::GoPro(GoProView::new(viewport)),
        }
    }

    pub fn view_type(&self) -> ViewType {
        match self {
            View::Rectilinear(_) => ViewType::Rectilinear,
            View::Flat(_) => ViewType::Flat,
            View::GoPro(_) => ViewType::GoPro,
        }
    }

    pub fn base(&self) -> &ViewBase {
        match self {
            View::Rectilinear(v) => v.base(),
            View::Flat(v) => v.base(),
            View::GoPro(v) => v.base(),
        }
    }

    pub fn bounds(&self) -> ViewBounds {
        match self {
            View::Rectilinear(v) => v.bounds(),
            View::Flat(v) => v.bounds(),
            View::GoPro(v) => v.bounds(),
        }
    }

    /// Recomputed from the live fov on every call.
    pub fn projection_scale(&self, camera: &Camera) -> f64 {
        let fov = camera.fov_radians();
        match self {
            View::Rectilinear(v) => v.projection_scale(fov),
            View::Flat(v) => v.projection_scale(fov),
            View::GoPro(v) => v.projection_scale(fov),
        }
    }

    pub fn options(&self) -> ViewOptions {
        match self {
            View::Flat(v) => v.options(),
            _ => ViewOptions::default(),
        }
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        match self {
            View::Rectilinear(v) => v.set_viewport(viewport),
            View::Flat(v) => v.set_viewport(viewport),
            View::GoPro(v) => v.set_viewport(viewport),
        }
    }

    /// Feeds the live camera fov to views whose bounds depend on it.
    pub fn sync_fov(&mut self, fov_rad: f64) {
        if let View::Flat(v) = self {
            v.set_fov(fov_rad);
        }
    }

    /// Pixel position of a world direction, `None` when it cannot be seen.
    pub fn world_to_screen(&self, camera: &Camera, direction: DVec3, parallax: f64) -> Option<DVec2> {
        match self {
            View::Rectilinear(v) => v.world_to_screen(camera, direction, parallax),
            View::Flat(v) => v.world_to_screen(camera, direction, parallax),
            View::GoPro(v) => v.world_to_screen(camera, direction, parallax),
        }
    }

    /// Unit world direction under a pixel, `None` far outside the viewport.
    pub fn screen_to_world(&self, camera: &Camera, point: DVec2) -> Option<DVec3> {
        if !self.base().within_margin(point) {
            return None;
        }
        match self {
            View::Rectilinear(v) => v.screen_to_world(camera, point),
            View::Flat(v) => v.screen_to_world(camera, point),
            View::GoPro(v) => v.screen_to_world(camera, point),
        }
    }

    pub fn update_uniforms_data(&mut self, camera: &Camera) -> ViewUniforms {
        self.sync_fov(camera.fov_radians());
        let euler = camera.euler();
        ViewUniforms {
            aspect: self.base().viewport().aspect() as f32,
            projection_scale: self.projection_scale(camera) as f32,
            yaw: euler.yaw as f32,
            pitch: euler.pitch as f32,
            roll: euler.roll as f32,
            fov_rad: camera.fov_radians() as f32,
            mode: self.view_type().mode(),
            repeat: self.options().bits(),
        }
    }
}
