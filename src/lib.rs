// lib.rs — 全景导演核心：相机朝向数学、关键帧动画、屏幕/世界投影

pub mod animation;
pub mod camera;
pub mod camera_animation;
pub mod config;
pub mod easing;
pub mod error;
pub mod keyframe;
pub mod meta_animation;
pub mod orientation;
pub mod timeline;
pub mod track;
pub mod view;

pub use camera::Camera;
pub use camera_animation::CameraAnimation;
pub use config::DirectorConfig;
pub use error::{DirectorError, Result};
pub use track::{Track, TrackRegistry};
pub use view::{View, ViewManager, ViewType};
