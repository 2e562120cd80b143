// camera.rs — 相机朝向与视场角（动画目标）

use crate::animation::AnimationTarget;
use crate::keyframe::KeyframeValue;
use crate::orientation::{self, EulerAngles};
use crate::view::ViewBounds;
use glam::DQuat;

pub const QUATERNION: &str = "quaternion";
pub const FOV: &str = "fov";

pub const DEFAULT_FOV: f64 = 46.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    quaternion: DQuat,
    /// Vertical field of view in degrees.
    fov: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            quaternion: DQuat::IDENTITY,
            fov: DEFAULT_FOV,
        }
    }

    /// yaw / pitch / roll / fov 均为角度
    pub fn from_degrees(yaw: f64, pitch: f64, roll: f64, fov: f64) -> Self {
        let mut camera = Self::new();
        camera.set_euler(EulerAngles::from_degrees(yaw, pitch, roll));
        camera.fov = fov;
        camera
    }

    pub fn quaternion(&self) -> DQuat {
        self.quaternion
    }

    /// Zero-length or non-finite orientations are ignored.
    pub fn set_quaternion(&mut self, q: DQuat) {
        let length = q.length();
        if length.is_finite() && length > f64::EPSILON {
            self.quaternion = q / length;
        } else {
            log::warn!("ignoring degenerate camera orientation {:?}", q);
        }
    }

    pub fn euler(&self) -> EulerAngles {
        orientation::quaternion_to_euler(self.quaternion)
    }

    pub fn set_euler(&mut self, euler: EulerAngles) {
        self.set_quaternion(euler.to_quaternion());
    }

    pub fn yaw(&self) -> f64 {
        self.euler().yaw
    }

    pub fn pitch(&self) -> f64 {
        self.euler().pitch
    }

    pub fn roll(&self) -> f64 {
        self.euler().roll
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    pub fn fov_radians(&self) -> f64 {
        self.fov.to_radians()
    }

    pub fn set_fov(&mut self, fov: f64) {
        if fov.is_finite() {
            self.fov = fov;
        }
    }

    pub fn reset_roll(&mut self) {
        self.quaternion = orientation::cancel_roll(self.quaternion);
    }

    /// Clamps orientation and fov into `bounds`.
    pub fn constrain(&mut self, bounds: &ViewBounds) {
        let euler = self.euler();
        let clamped = EulerAngles {
            yaw: euler.yaw.clamp(bounds.yaw_min, bounds.yaw_max),
            pitch: euler.pitch.clamp(bounds.pitch_min, bounds.pitch_max),
            roll: euler.roll.clamp(bounds.roll_min, bounds.roll_max),
        };
        if clamped != euler {
            self.set_euler(clamped);
        }

        let fov = self.fov_radians().clamp(bounds.fov_min, bounds.fov_max);
        self.fov = fov.to_degrees();
    }
}

impl AnimationTarget for Camera {
    fn property(&self, name: &str) -> Option<KeyframeValue> {
        match name {
            QUATERNION => Some(KeyframeValue::Quaternion(self.quaternion)),
            FOV => Some(KeyframeValue::Scalar(self.fov)),
            _ => None,
        }
    }

    fn set_property(&mut self, name: &str, value: KeyframeValue) {
        match (name, value) {
            (QUATERNION, KeyframeValue::Quaternion(q)) => self.set_quaternion(q),
            (FOV, KeyframeValue::Scalar(fov)) => self.set_fov(fov),
            _ => log::warn!("camera has no property \"{}\" of that type", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_round_trip() {
        let camera = Camera::from_degrees(30.0, -20.0, 5.0, 70.0);
        let [yaw, pitch, roll] = camera.euler().to_degrees();
        assert!((yaw - 30.0).abs() < 1e-9);
        assert!((pitch + 20.0).abs() < 1e-9);
        assert!((roll - 5.0).abs() < 1e-9);
        assert_eq!(camera.fov(), 70.0);
    }

    #[test]
    fn constrain_clamps_pitch_and_fov() {
        let mut camera = Camera::from_degrees(10.0, 60.0, 0.0, 170.0);
        let bounds = ViewBounds {
            pitch_min: (-45f64).to_radians(),
            pitch_max: 45f64.to_radians(),
            fov_min: 40f64.to_radians(),
            fov_max: 140f64.to_radians(),
            ..ViewBounds::unbounded()
        };
        camera.constrain(&bounds);

        assert!((camera.pitch().to_degrees() - 45.0).abs() < 1e-9);
        assert!((camera.yaw().to_degrees() - 10.0).abs() < 1e-9);
        assert!((camera.fov() - 140.0).abs() < 1e-9);
    }

    #[test]
    fn reset_roll() {
        let mut camera = Camera::from_degrees(20.0, 10.0, 35.0, 90.0);
        camera.reset_roll();
        assert!(camera.roll().abs() < 1e-9);
        assert!((camera.yaw().to_degrees() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn target_properties() {
        let mut camera = Camera::new();
        camera.set_property(FOV, KeyframeValue::Scalar(80.0));
        camera.set_property(FOV, KeyframeValue::Quaternion(DQuat::IDENTITY));
        camera.set_property("zoom", KeyframeValue::Scalar(2.0));
        assert_eq!(camera.property(FOV), Some(KeyframeValue::Scalar(80.0)));
        assert_eq!(camera.property("zoom"), None);
    }

    #[test]
    fn degenerate_orientation_is_ignored() {
        let mut camera = Camera::from_degrees(30.0, 10.0, 0.0, 90.0);
        let before = camera.quaternion();

        // q 与 -q 的线性混合在中点长度为零
        camera.set_quaternion(orientation::nlerp_no_invert(before, -before, 0.5));
        assert_eq!(camera.quaternion(), before);

        camera.set_quaternion(DQuat::from_xyzw(f64::NAN, 0.0, 0.0, 1.0));
        camera.set_property(QUATERNION, KeyframeValue::Quaternion(DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0)));
        camera.set_euler(EulerAngles {
            yaw: f64::INFINITY,
            pitch: 0.0,
            roll: 0.0,
        });
        assert_eq!(camera.quaternion(), before);
        assert!(camera.quaternion().is_finite());

        camera.set_quaternion(DQuat::from_xyzw(0.0, 0.0, 0.0, 2.0));
        assert_eq!(camera.quaternion(), DQuat::IDENTITY);
    }
}
