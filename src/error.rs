// error.rs — 库错误类型
//
// 只有配置加载和轨道查找会返回 Err；几何越界返回 None，
// 畸形关键帧被忽略或推断（见 timeline.rs / camera_animation.rs）。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("unknown track: {0}")]
    UnknownTrack(String),

    #[error("unknown view type: {0}")]
    UnknownView(String),
}

pub type Result<T> = std::result::Result<T, DirectorError>;
