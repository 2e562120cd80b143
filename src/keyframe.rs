// keyframe.rs — 关键帧与属性值

use glam::DQuat;
use std::collections::HashMap;

/// A value a keyframe can hold for one property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyframeValue {
    Quaternion(DQuat),
    Scalar(f64),
}

impl KeyframeValue {
    pub fn as_quaternion(&self) -> Option<DQuat> {
        match self {
            KeyframeValue::Quaternion(q) => Some(*q),
            KeyframeValue::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            KeyframeValue::Scalar(v) => Some(*v),
            KeyframeValue::Quaternion(_) => None,
        }
    }
}

impl From<DQuat> for KeyframeValue {
    fn from(q: DQuat) -> Self {
        KeyframeValue::Quaternion(q)
    }
}

impl From<f64> for KeyframeValue {
    fn from(v: f64) -> Self {
        KeyframeValue::Scalar(v)
    }
}

/// A time plus named property values.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    time: f64,
    data: HashMap<String, KeyframeValue>,
}

impl Keyframe {
    pub fn new(time: f64, data: HashMap<String, KeyframeValue>) -> Self {
        Self { time, data }
    }

    /// Keyframe carrying a single property.
    pub fn with_value(time: f64, property: &str, value: impl Into<KeyframeValue>) -> Self {
        Self::new(time, HashMap::from([(property.to_string(), value.into())]))
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn data(&self) -> &HashMap<String, KeyframeValue> {
        &self.data
    }

    pub fn value(&self, property: &str) -> Option<&KeyframeValue> {
        self.data.get(property)
    }

    /// Negative or non-finite times cannot be placed on a timeline.
    pub fn is_valid(&self) -> bool {
        self.time.is_finite() && self.time >= 0.0
    }

    pub(crate) fn release(&mut self) {
        self.data.clear();
    }
}
