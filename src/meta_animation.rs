// meta_animation.rs — 多属性动画编排
//
// 一组单属性 Animation 同时启动，完成信号按动画下标去重后计数，
// 全部完成时只触发一次 on_complete。再次 play 会直接丢弃进行中的动画。

use crate::animation::{Animation, AnimationInstruction, AnimationSignal, AnimationState, AnimationTarget};
use crate::easing::Easing;
use crate::timeline::Timeline;
use std::sync::mpsc::{channel, Receiver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaAnimationState {
    Idle,
    Playing,
    /// At least one animation finished, others still running.
    Completing,
    /// Some animation is paused; `resume` continues playback.
    Paused,
    /// Stopped before the end. Completion will not fire.
    Stopped,
    Complete,
}

pub struct MetaAnimation {
    instructions: Vec<AnimationInstruction>,
    animations: Vec<Animation>,
    finished: usize,
    /// 按动画下标记录已收到的完成信号
    completed: Vec<bool>,
    receiver: Option<Receiver<AnimationSignal>>,
    on_complete: Option<Box<dyn FnMut()>>,
    complete: bool,
}

impl MetaAnimation {
    pub fn new(instructions: Vec<AnimationInstruction>) -> Self {
        Self {
            instructions,
            animations: Vec::new(),
            finished: 0,
            completed: Vec::new(),
            receiver: None,
            on_complete: None,
            complete: false,
        }
    }

    pub fn instructions(&self) -> &[AnimationInstruction] {
        &self.instructions
    }

    pub fn instructions_mut(&mut self) -> &mut [AnimationInstruction] {
        &mut self.instructions
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Animation driving `property` in the current playback, if any.
    pub fn animation(&self, property: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.instruction().property == property)
    }

    pub fn finished(&self) -> usize {
        self.finished
    }

    pub fn set_on_complete(&mut self, on_complete: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(on_complete));
    }

    pub fn clear_on_complete(&mut self) {
        self.on_complete = None;
    }

    pub fn state(&self) -> MetaAnimationState {
        if self.complete {
            MetaAnimationState::Complete
        } else if self.animations.is_empty() {
            MetaAnimationState::Idle
        } else if self.any_in(AnimationState::Paused) {
            MetaAnimationState::Paused
        } else if !self.any_in(AnimationState::Playing) && self.any_in(AnimationState::Stopped) {
            MetaAnimationState::Stopped
        } else if self.finished > 0 {
            MetaAnimationState::Completing
        } else {
            MetaAnimationState::Playing
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state(), MetaAnimationState::Playing | MetaAnimationState::Completing)
    }

    fn any_in(&self, state: AnimationState) -> bool {
        self.animations.iter().any(|a| a.state() == state)
    }

    /// Starts one animation per instruction, paired with `timelines` in order.
    /// Instructions without a timeline get an empty one.
    pub fn play_timelines(&mut self, timelines: Vec<Timeline>, easing: Easing) {
        self.empty_animations();

        let (sender, receiver) = channel();
        let mut timelines = timelines.into_iter();

        for (index, instruction) in self.instructions.iter().enumerate() {
            let mut animation = Animation::new(index, instruction.clone(), sender.clone());
            animation.set_timeline(timelines.next().unwrap_or_default());
            animation.set_easing(easing);
            self.animations.push(animation);
        }
        self.receiver = Some(receiver);
        self.completed = vec![false; self.animations.len()];

        for animation in &mut self.animations {
            animation.play();
        }

        log::debug!("meta animation playing {} animations", self.animations.len());

        if self.animations.is_empty() {
            self.finish();
        }
    }

    /// Advances every live animation and collects their completion signals.
    pub fn update<T: AnimationTarget + ?Sized>(&mut self, dt: f64, target: &mut T) {
        for animation in &mut self.animations {
            animation.update(dt, target);
        }
        self.drain_signals();
    }

    pub fn stop(&mut self) {
        for animation in &mut self.animations {
            animation.stop();
        }
    }

    pub fn pause(&mut self) {
        for animation in &mut self.animations {
            animation.pause();
        }
    }

    pub fn resume(&mut self) {
        for animation in &mut self.animations {
            animation.resume();
        }
    }

    pub fn destroy(&mut self) {
        self.empty_animations();
        self.on_complete = None;
    }

    /// Drops the current animations together with their completion channel,
    /// so signals from an interrupted playback never arrive.
    fn empty_animations(&mut self) {
        self.animations.clear();
        self.receiver = None;
        self.finished = 0;
        self.completed.clear();
        self.complete = false;
    }

    fn drain_signals(&mut self) {
        let Some(receiver) = &self.receiver else {
            return;
        };
        let signals: Vec<AnimationSignal> = receiver.try_iter().collect();
        for AnimationSignal::Complete(index) in signals {
            self.on_track_partial_complete(index);
        }
    }

    /// Counts animation `index` as finished. Repeated or unknown indexes are ignored.
    fn on_track_partial_complete(&mut self, index: usize) {
        match self.completed.get_mut(index) {
            Some(done) if !*done => *done = true,
            _ => {
                log::warn!("ignoring completion signal for animation {}", index);
                return;
            }
        }
        self.finished += 1;
        if self.finished == self.animations.len() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        if self.complete {
            return;
        }
        self.complete = true;
        log::debug!("meta animation complete");
        if let Some(on_complete) = self.on_complete.as_mut() {
            on_complete();
        }
    }
}

/// One authored `(time, value)` pair of a single property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertySample {
    pub time: f64,
    pub value: f64,
}

impl PropertySample {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Estimates a property at `time` from the samples that define it.
///
/// Uses the nearest sample strictly before (`kp`) and strictly after (`kn`)
/// `time`. Without `kp`, `current` stands in as a sample at time zero; without
/// `kn`, the value of `kp` is returned. Otherwise the two values are blended
/// linearly with `easing` applied to the progress.
pub fn compute_intermediate_value(time: f64, samples: &[PropertySample], current: f64, easing: Easing) -> f64 {
    let kp = samples
        .iter()
        .filter(|s| s.time < time)
        .max_by(|a, b| a.time.total_cmp(&b.time))
        .copied()
        .unwrap_or(PropertySample::new(0.0, current));

    let kn = samples
        .iter()
        .filter(|s| s.time > time)
        .min_by(|a, b| a.time.total_cmp(&b.time));

    let Some(kn) = kn else {
        return kp.value;
    };

    let span = kn.time - kp.time;
    if span <= 0.0 {
        return kp.value;
    }
    let alpha = easing.apply((time - kp.time) / span);
    kp.value + (kn.value - kp.value) * alpha
}
