// camera_animation.rs — 导演轨道驱动的相机动画
//
// 两条同步轨道：quaternion（可平滑、可取消 roll）和 fov。
// 每次 play 都从轨道重新构建 Timeline，不保留上一次的关键帧。

use crate::animation::{AnimationInstruction, AnimationTarget, ValueFilter};
use crate::camera::{FOV, QUATERNION};
use crate::easing::Easing;
use crate::error::{DirectorError, Result};
use crate::keyframe::{Keyframe, KeyframeValue};
use crate::meta_animation::{compute_intermediate_value, MetaAnimation, MetaAnimationState, PropertySample};
use crate::orientation::{self, EulerAngles};
use crate::timeline::Timeline;
use crate::track::{RawKeyframe, RawKeyframeData, SharedTrackRegistry, Track, TrackRef};
use glam::DQuat;
use std::rc::Rc;

/// Target state sampled right before a track starts. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentState {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub fov: f64,
    pub quaternion: DQuat,
}

impl CurrentState {
    pub fn from_target<T: AnimationTarget + ?Sized>(target: &T) -> Self {
        let quaternion = target
            .property(QUATERNION)
            .and_then(|v| v.as_quaternion())
            .unwrap_or(DQuat::IDENTITY);
        let fov = target.property(FOV).and_then(|v| v.as_scalar()).unwrap_or(0.0);
        let [yaw, pitch, roll] = orientation::quaternion_to_euler(quaternion).to_degrees();

        Self {
            yaw,
            pitch,
            roll,
            fov,
            quaternion,
        }
    }
}

/// A keyframe with every angular component filled in. Degrees, offset applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedKeyframe {
    pub time: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    pub fov: Option<f64>,
}

fn authored_samples(raw: &[RawKeyframe], offset: f64, pick: impl Fn(&RawKeyframeData) -> Option<f64>) -> Vec<PropertySample> {
    raw.iter()
        .filter_map(|k| pick(&k.data).map(|v| PropertySample::new(k.time + offset, v)))
        .collect()
}

/// Fills missing yaw / pitch / roll from the rest of the path.
///
/// First pass gathers the sparse authored samples of each angle, second pass
/// estimates every gap with [`compute_intermediate_value`].
pub fn resolve_keyframes(raw: &[RawKeyframe], offset: f64, easing: Easing, current: &CurrentState) -> Vec<ResolvedKeyframe> {
    let yaws = authored_samples(raw, offset, |data| data.yaw);
    let pitches = authored_samples(raw, offset, |data| data.pitch);
    let rolls = authored_samples(raw, offset, |data| data.roll);

    raw.iter()
        .map(|k| {
            let time = k.time + offset;
            let fill = |value: Option<f64>, samples: &[PropertySample], fallback: f64| {
                value.unwrap_or_else(|| compute_intermediate_value(time, samples, fallback, easing))
            };

            ResolvedKeyframe {
                time,
                yaw: fill(k.data.yaw, &yaws, current.yaw),
                pitch: fill(k.data.pitch, &pitches, current.pitch),
                roll: fill(k.data.roll, &rolls, current.roll),
                fov: k.data.fov,
            }
        })
        .collect()
}

/// Builds the quaternion and fov timelines for a track.
///
/// A keyframe at time zero holding `current` is injected when the first
/// authored keyframe starts later or an offset is given, so playback starts
/// from wherever the camera is. The fov timeline gets the same start whenever
/// its first authored fov comes after time zero.
pub fn prepare_keyframes(raw: &[RawKeyframe], offset: f64, easing: Easing, current: &CurrentState) -> (Timeline, Timeline) {
    let mut resolved = resolve_keyframes(raw, offset, easing, current);
    resolved.sort_by(|a, b| a.time.total_cmp(&b.time));

    let first_time = raw.iter().map(|k| k.time).fold(f64::INFINITY, f64::min);
    let inject_current = (first_time.is_finite() && first_time > 0.0) || offset > 0.0;

    let mut quaternions = Timeline::new();
    let mut fovs = Timeline::new();
    let mut previous: Option<DQuat> = None;

    if inject_current {
        log::debug!("injecting current camera state at t=0");
        quaternions.add_keyframe(Keyframe::with_value(0.0, QUATERNION, current.quaternion));
        fovs.add_keyframe(Keyframe::with_value(0.0, FOV, current.fov));
        previous = Some(current.quaternion);
    }

    for keyframe in &resolved {
        let q = EulerAngles::from_degrees(keyframe.yaw, keyframe.pitch, keyframe.roll).to_quaternion();
        // 保持相邻四元数在同一半球，避免 spline 走长弧
        let q = match previous {
            Some(p) => orientation::align_hemisphere(p, q),
            None => q,
        };
        previous = Some(q);

        quaternions.add_keyframe(Keyframe::with_value(keyframe.time, QUATERNION, q));

        if let Some(fov) = keyframe.fov {
            fovs.add_keyframe(Keyframe::with_value(keyframe.time, FOV, fov));
        }
    }

    // fov 只在后面的关键帧出现时，从当前值出发
    if fovs.keyframe(0).is_some_and(|k| k.time() > 0.0) {
        fovs.add_keyframe(Keyframe::with_value(0.0, FOV, current.fov));
    }

    log::debug!(
        "prepared {} quaternion / {} fov keyframes",
        quaternions.len(),
        fovs.len()
    );

    (quaternions, fovs)
}

fn cancel_roll_filter(value: KeyframeValue) -> KeyframeValue {
    match value {
        KeyframeValue::Quaternion(q) => KeyframeValue::Quaternion(orientation::cancel_roll(q)),
        other => other,
    }
}

pub struct CameraAnimation {
    meta: MetaAnimation,
    registry: SharedTrackRegistry,
    track: Option<Rc<Track>>,
}

impl CameraAnimation {
    pub fn new(registry: SharedTrackRegistry) -> Self {
        let instructions = vec![
            AnimationInstruction::new(QUATERNION),
            // fov 只做标量插值
            AnimationInstruction::new(FOV),
        ];

        Self {
            meta: MetaAnimation::new(instructions),
            registry,
            track: None,
        }
    }

    /// Plays a track given directly or by uid, starting from the target's
    /// current orientation. Any playback in progress is discarded without a
    /// completion event.
    pub fn play<'a, T>(&mut self, track: impl Into<TrackRef<'a>>, target: &mut T) -> Result<()>
    where
        T: AnimationTarget + ?Sized,
    {
        let track = match track.into() {
            TrackRef::Track(track) => Rc::new(track.clone()),
            TrackRef::Uid(uid) => self.registry.borrow().get(uid).ok_or_else(|| {
                log::warn!("cannot play unknown track \"{}\"", uid);
                DirectorError::UnknownTrack(uid.to_string())
            })?,
        };

        let filter: Option<ValueFilter> = if track.cancel_roll() {
            Some(cancel_roll_filter)
        } else {
            None
        };
        if let Some(quaternion) = self.meta.instructions_mut().get_mut(0) {
            quaternion.smooth = track.smooth();
            quaternion.filter = filter;
        }

        let easing = Easing::from_name_or_linear(track.easing());
        let current = CurrentState::from_target(&*target);
        let (quaternions, fovs) = prepare_keyframes(track.keyframes(), track.offset(), easing, &current);

        log::info!("playing camera track \"{}\" ({:.2}s)", track.uid(), quaternions.duration().max(fovs.duration()));

        self.meta.play_timelines(vec![quaternions, fovs], easing);
        self.track = Some(track);
        Ok(())
    }

    pub fn update<T: AnimationTarget + ?Sized>(&mut self, dt: f64, target: &mut T) {
        self.meta.update(dt, target);
    }

    pub fn stop(&mut self) {
        self.meta.stop();
    }

    pub fn pause(&mut self) {
        self.meta.pause();
    }

    pub fn resume(&mut self) {
        self.meta.resume();
    }

    pub fn state(&self) -> MetaAnimationState {
        self.meta.state()
    }

    pub fn is_playing(&self) -> bool {
        self.meta.is_playing()
    }

    pub fn set_on_complete(&mut self, on_complete: impl FnMut() + 'static) {
        self.meta.set_on_complete(on_complete);
    }

    /// Track of the current or last playback.
    pub fn track(&self) -> Option<&Track> {
        self.track.as_deref()
    }

    pub fn meta(&self) -> &MetaAnimation {
        &self.meta
    }

    /// Timeline built for `property` (`"quaternion"` or `"fov"`) by the last play.
    pub fn timeline(&self, property: &str) -> Option<&Timeline> {
        self.meta.animation(property).map(|a| a.timeline())
    }

    pub fn destroy(&mut self) {
        self.meta.destroy();
        self.track = None;
    }
}

/// Keyframe values by property, handy for inspecting a prepared timeline.
pub fn keyframe_values(timeline: &Timeline, property: &str) -> Vec<(f64, KeyframeValue)> {
    timeline
        .keyframes()
        .iter()
        .filter_map(|k| k.value(property).map(|v| (k.time(), *v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current_at(yaw: f64, pitch: f64, fov: f64) -> CurrentState {
        let quaternion = EulerAngles::from_degrees(yaw, pitch, 0.0).to_quaternion();
        CurrentState {
            yaw,
            pitch,
            roll: 0.0,
            fov,
            quaternion,
        }
    }

    fn raw(time: f64, yaw: Option<f64>, pitch: Option<f64>, fov: Option<f64>) -> RawKeyframe {
        RawKeyframe::new(
            time,
            RawKeyframeData {
                yaw,
                pitch,
                roll: None,
                fov,
            },
        )
    }

    #[test]
    fn missing_components_are_inferred_from_the_path() {
        let keys = [
            raw(0.0, Some(0.0), Some(0.0), None),
            raw(2.0, None, Some(20.0), None),
            raw(4.0, Some(40.0), None, None),
        ];
        let resolved = resolve_keyframes(&keys, 0.0, Easing::Linear, &current_at(5.0, 5.0, 90.0));

        // yaw 在 t=2 由 0 与 40 线性插值
        assert_eq!(resolved[1].yaw, 20.0);
        // pitch 在 t=4 之后没有样本，保持 20
        assert_eq!(resolved[2].pitch, 20.0);
        // roll 全缺失，取当前值
        assert!(resolved.iter().all(|k| k.roll == 0.0));
    }

    #[test]
    fn offset_shifts_times() {
        let keys = [raw(1.0, Some(10.0), None, Some(60.0))];
        let resolved = resolve_keyframes(&keys, 2.5, Easing::Linear, &current_at(0.0, 0.0, 90.0));
        assert_eq!(resolved[0].time, 3.5);
        assert_eq!(resolved[0].fov, Some(60.0));
    }

    #[test]
    fn no_injection_when_path_starts_at_zero() {
        let keys = [raw(0.0, Some(10.0), None, Some(60.0)), raw(3.0, Some(20.0), None, None)];
        let (quaternions, fovs) = prepare_keyframes(&keys, 0.0, Easing::Linear, &current_at(0.0, 0.0, 90.0));
        assert_eq!(quaternions.len(), 2);
        assert_eq!(fovs.len(), 1);
        assert_eq!(keyframe_values(&fovs, FOV), vec![(0.0, KeyframeValue::Scalar(60.0))]);
    }

    #[test]
    fn offset_forces_injection() {
        let keys = [raw(0.0, Some(10.0), None, Some(60.0))];
        let (quaternions, fovs) = prepare_keyframes(&keys, 1.0, Easing::Linear, &current_at(0.0, 0.0, 90.0));
        assert_eq!(quaternions.len(), 2);
        assert_eq!(
            keyframe_values(&fovs, FOV),
            vec![(0.0, KeyframeValue::Scalar(90.0)), (1.0, KeyframeValue::Scalar(60.0))]
        );
    }

    #[test]
    fn late_fov_starts_from_current() {
        let keys = [raw(0.0, Some(0.0), None, None), raw(5.0, Some(90.0), None, Some(60.0))];
        let (quaternions, fovs) = prepare_keyframes(&keys, 0.0, Easing::Linear, &current_at(0.0, 0.0, 90.0));
        assert_eq!(quaternions.len(), 2);
        assert_eq!(
            keyframe_values(&fovs, FOV),
            vec![(0.0, KeyframeValue::Scalar(90.0)), (5.0, KeyframeValue::Scalar(60.0))]
        );
    }

    #[test]
    fn consecutive_quaternions_share_a_hemisphere() {
        let keys = [
            raw(1.0, Some(170.0), None, None),
            raw(2.0, Some(-170.0), None, None),
            raw(3.0, Some(150.0), None, None),
        ];
        let (quaternions, _) = prepare_keyframes(&keys, 0.0, Easing::Linear, &current_at(0.0, 0.0, 90.0));
        let qs: Vec<DQuat> = keyframe_values(&quaternions, QUATERNION)
            .into_iter()
            .filter_map(|(_, v)| v.as_quaternion())
            .collect();
        assert_eq!(qs.len(), 4);
        assert!(qs.windows(2).all(|w| w[0].dot(w[1]) >= 0.0));
    }
}
