// animation.rs — 单属性动画
//
// 每帧由外部时钟推进 update(dt)，采样 Timeline 并写回目标对象的同名属性。
// 完成信号经 mpsc 通道只发送一次，由 MetaAnimation 汇总。

use crate::easing::Easing;
use crate::keyframe::KeyframeValue;
use crate::orientation;
use crate::timeline::Timeline;
use std::sync::mpsc::Sender;

/// Something whose named properties an animation can read and write.
pub trait AnimationTarget {
    fn property(&self, name: &str) -> Option<KeyframeValue>;
    fn set_property(&mut self, name: &str, value: KeyframeValue);
}

/// Post-processing applied to every sampled value before it is written.
pub type ValueFilter = fn(KeyframeValue) -> KeyframeValue;

/// Which property an animation drives and how.
#[derive(Debug, Clone)]
pub struct AnimationInstruction {
    pub property: String,
    /// Quaternion paths use SQUAD through spline tangents instead of SLERP.
    pub smooth: bool,
    pub filter: Option<ValueFilter>,
}

impl AnimationInstruction {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            smooth: false,
            filter: None,
        }
    }

    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    pub fn with_filter(mut self, filter: Option<ValueFilter>) -> Self {
        self.filter = filter;
        self
    }
}

/// Sent once when an animation reaches the end of its timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationSignal {
    Complete(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    Playing,
    Paused,
    Stopped,
    Complete,
}

#[derive(Debug)]
pub struct Animation {
    index: usize,
    instruction: AnimationInstruction,
    timeline: Timeline,
    easing: Easing,
    time: f64,
    state: AnimationState,
    signal: Option<Sender<AnimationSignal>>,
}

impl Animation {
    pub fn new(index: usize, instruction: AnimationInstruction, signal: Sender<AnimationSignal>) -> Self {
        Self {
            index,
            instruction,
            timeline: Timeline::new(),
            easing: Easing::Linear,
            time: 0.0,
            state: AnimationState::Idle,
            signal: Some(signal),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn instruction(&self) -> &AnimationInstruction {
        &self.instruction
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn set_timeline(&mut self, timeline: Timeline) {
        self.timeline = timeline;
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn set_easing(&mut self, easing: Easing) {
        self.easing = easing;
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn duration(&self) -> f64 {
        self.timeline.duration()
    }

    pub fn play(&mut self) {
        self.time = 0.0;
        self.state = AnimationState::Playing;
    }

    /// Stops without signalling completion.
    pub fn stop(&mut self) {
        if matches!(self.state, AnimationState::Playing | AnimationState::Paused) {
            self.state = AnimationState::Stopped;
        }
    }

    pub fn pause(&mut self) {
        if self.state == AnimationState::Playing {
            self.state = AnimationState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == AnimationState::Paused {
            self.state = AnimationState::Playing;
        }
    }

    /// Advances by `dt` seconds and writes the sampled value onto `target`.
    pub fn update<T: AnimationTarget + ?Sized>(&mut self, dt: f64, target: &mut T) {
        if self.state != AnimationState::Playing {
            return;
        }

        self.time += dt.max(0.0);
        let duration = self.duration();
        let time = self.time.min(duration);

        if let Some(value) = self.sample(time) {
            let value = match self.instruction.filter {
                Some(filter) => filter(value),
                None => value,
            };
            target.set_property(&self.instruction.property, value);
        }

        if self.time >= duration {
            self.complete();
        }
    }

    /// Value of the driven property at `time`; holds the end values outside
    /// the keyframed range.
    pub fn sample(&self, time: f64) -> Option<KeyframeValue> {
        let property = self.instruction.property.as_str();
        let (prev, next) = self.timeline.get_keyframes(time);

        match (prev, next) {
            (Some(kp), Some(kn)) => {
                let from = *kp.value(property)?;
                let to = match kn.value(property) {
                    Some(v) => *v,
                    None => return Some(from),
                };
                let span = kn.time() - kp.time();
                let alpha = if span > 0.0 {
                    self.easing.apply((time - kp.time()) / span)
                } else {
                    1.0
                };
                Some(self.interpolate(time, from, to, alpha))
            }
            (Some(kp), None) => kp.value(property).copied(),
            (None, Some(kn)) => kn.value(property).copied(),
            (None, None) => None,
        }
    }

    fn interpolate(&self, time: f64, from: KeyframeValue, to: KeyframeValue, alpha: f64) -> KeyframeValue {
        match (from, to) {
            (KeyframeValue::Scalar(a), KeyframeValue::Scalar(b)) => KeyframeValue::Scalar(a + (b - a) * alpha),
            (KeyframeValue::Quaternion(q0), KeyframeValue::Quaternion(q1)) => {
                if self.instruction.smooth {
                    let (side_prev, side_next) = self.timeline.get_side_keyframes(time);
                    let property = self.instruction.property.as_str();
                    let qa = side_prev
                        .and_then(|k| k.value(property))
                        .and_then(KeyframeValue::as_quaternion)
                        .unwrap_or(q0);
                    let qd = side_next
                        .and_then(|k| k.value(property))
                        .and_then(KeyframeValue::as_quaternion)
                        .unwrap_or(q1);

                    let a0 = orientation::spline(qa, q0, q1);
                    let a1 = orientation::spline(q0, q1, qd);
                    KeyframeValue::Quaternion(orientation::squad_no_invert(q0, a0, a1, q1, alpha))
                } else {
                    KeyframeValue::Quaternion(orientation::slerp(q0, q1, alpha))
                }
            }
            // 类型不一致时保持起点值
            (from, _) => from,
        }
    }

    fn complete(&mut self) {
        self.state = AnimationState::Complete;
        if let Some(signal) = self.signal.take() {
            // 接收端已被丢弃说明这轮播放已被打断，忽略即可
            let _ = signal.send(AnimationSignal::Complete(self.index));
        }
    }
}
