// track.rs — 导演轨道（创作期只读描述）与注册表

use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Angles and fov in degrees; any component may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RawKeyframeData {
    pub yaw: Option<f64>,
    pub pitch: Option<f64>,
    pub roll: Option<f64>,
    pub fov: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawKeyframe {
    pub time: f64,
    #[serde(default)]
    pub data: RawKeyframeData,
}

impl RawKeyframe {
    pub fn new(time: f64, data: RawKeyframeData) -> Self {
        Self { time, data }
    }
}

fn default_easing() -> String {
    "linear".to_string()
}

/// A camera path as authored in the director configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    uid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    keyframes: Vec<RawKeyframe>,
    #[serde(default = "default_easing")]
    easing: String,
    #[serde(default)]
    offset: f64,
    #[serde(default)]
    smooth: bool,
    #[serde(default)]
    cancel_roll: bool,
}

impl Track {
    pub fn new(uid: impl Into<String>, keyframes: Vec<RawKeyframe>) -> Self {
        Self {
            uid: uid.into(),
            name: String::new(),
            description: String::new(),
            keyframes,
            easing: default_easing(),
            offset: 0.0,
            smooth: false,
            cancel_roll: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = easing.into();
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    pub fn with_cancel_roll(mut self, cancel_roll: bool) -> Self {
        self.cancel_roll = cancel_roll;
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn keyframes(&self) -> &[RawKeyframe] {
        &self.keyframes
    }

    pub fn easing(&self) -> &str {
        &self.easing
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn smooth(&self) -> bool {
        self.smooth
    }

    pub fn cancel_roll(&self) -> bool {
        self.cancel_roll
    }

    /// Largest authored keyframe time (offset excluded).
    pub fn duration(&self) -> f64 {
        self.keyframes.iter().map(|k| k.time).fold(0.0, f64::max)
    }
}

/// A track given either directly or by uid.
#[derive(Debug, Clone, Copy)]
pub enum TrackRef<'a> {
    Uid(&'a str),
    Track(&'a Track),
}

impl<'a> From<&'a str> for TrackRef<'a> {
    fn from(uid: &'a str) -> Self {
        TrackRef::Uid(uid)
    }
}

impl<'a> From<&'a Track> for TrackRef<'a> {
    fn from(track: &'a Track) -> Self {
        TrackRef::Track(track)
    }
}

#[derive(Debug, Default)]
pub struct TrackRegistry {
    tracks: HashMap<String, Rc<Track>>,
}

pub type SharedTrackRegistry = Rc<RefCell<TrackRegistry>>;

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedTrackRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Registers a track under its uid, returning the one it replaces.
    pub fn register(&mut self, track: Track) -> Option<Rc<Track>> {
        let uid = track.uid().to_string();
        let replaced = self.tracks.insert(uid.clone(), Rc::new(track));
        if replaced.is_some() {
            log::warn!("track \"{}\" registered twice, replacing", uid);
        }
        replaced
    }

    pub fn unregister(&mut self, uid: &str) -> Option<Rc<Track>> {
        self.tracks.remove(uid)
    }

    pub fn get(&self, uid: &str) -> Option<Rc<Track>> {
        self.tracks.get(uid).cloned()
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.tracks.contains_key(uid)
    }

    pub fn uids(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
