// easing.rs — 命名缓动函数
//
// 轨道配置里以字符串给出（"linear"、"easeInOutQuad" ...），
// 未知名称退回 linear。

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
}

static EASING_NAMES: Lazy<HashMap<&'static str, Easing>> = Lazy::new(|| {
    HashMap::from([
        ("linear", Easing::Linear),
        ("easeInQuad", Easing::EaseInQuad),
        ("easeOutQuad", Easing::EaseOutQuad),
        ("easeInOutQuad", Easing::EaseInOutQuad),
        ("easeInCubic", Easing::EaseInCubic),
        ("easeOutCubic", Easing::EaseOutCubic),
        ("easeInOutCubic", Easing::EaseInOutCubic),
        ("easeInQuart", Easing::EaseInQuart),
        ("easeOutQuart", Easing::EaseOutQuart),
        ("easeInOutQuart", Easing::EaseInOutQuart),
        ("easeInSine", Easing::EaseInSine),
        ("easeOutSine", Easing::EaseOutSine),
        ("easeInOutSine", Easing::EaseInOutSine),
        ("easeInExpo", Easing::EaseInExpo),
        ("easeOutExpo", Easing::EaseOutExpo),
        ("easeInOutExpo", Easing::EaseInOutExpo),
    ])
});

impl Easing {
    /// Looks up an easing by its configuration name.
    pub fn from_name(name: &str) -> Option<Easing> {
        EASING_NAMES.get(name).copied()
    }

    /// Like [`Easing::from_name`], falling back to linear.
    pub fn from_name_or_linear(name: &str) -> Easing {
        Self::from_name(name).unwrap_or_else(|| {
            log::warn!("unknown easing \"{}\", using linear", name);
            Easing::Linear
        })
    }

    /// Maps linear progress in `0.0..=1.0` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,

            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }

            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }

            Easing::EaseInQuart => t.powi(4),
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }

            Easing::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::EaseOutSine => (t * PI / 2.0).sin(),
            Easing::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,

            // 端点精确返回 0 / 1
            Easing::EaseInExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * t - 10.0)
                }
            }
            Easing::EaseOutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Easing::EaseInOutExpo => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
        }
    }
}
