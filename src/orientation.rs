// orientation.rs — 欧拉角 / 四元数 / 旋转矩阵转换与插值
//
// 约定：yaw 绕 Y，pitch 绕 X（内部取 -pitch 做坐标系修正），roll 绕 Z，
// 乘法顺序 Y·X·Z。所有函数都是纯函数。

use glam::{DMat4, DQuat};

/// `slerp_no_invert` 在 |dot| 超过此阈值时退化为 NLERP
const NLERP_THRESHOLD: f64 = 0.95;

/// 低于此值视为 sin(angle) / angle 为零
const EPSILON: f64 = 1e-9;

/// Yaw / pitch / roll in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl EulerAngles {
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn from_degrees(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self::new(yaw.to_radians(), pitch.to_radians(), roll.to_radians())
    }

    pub fn to_degrees(self) -> [f64; 3] {
        [self.yaw.to_degrees(), self.pitch.to_degrees(), self.roll.to_degrees()]
    }

    pub fn to_quaternion(self) -> DQuat {
        euler_to_quaternion(self.yaw, self.pitch, self.roll)
    }
}

pub fn euler_to_quaternion(yaw: f64, pitch: f64, roll: f64) -> DQuat {
    // pitch 取反：屏幕向上为正 pitch
    DQuat::from_rotation_y(yaw) * DQuat::from_rotation_x(-pitch) * DQuat::from_rotation_z(roll)
}

pub fn quaternion_to_euler(q: DQuat) -> EulerAngles {
    rotation_matrix_to_euler(&DMat4::from_quat(q.normalize()))
}

/// Builds the rotation for the given angles.
///
/// `order_ypr` selects `M(yaw)·M(pitch)·M(roll)`; otherwise the product is
/// `M(roll)·M(pitch)·M(yaw)`. Only the YPR order matches
/// [`euler_to_quaternion`] and can be decoded by [`rotation_matrix_to_euler`].
pub fn euler_to_rotation_matrix(yaw: f64, pitch: f64, roll: f64, order_ypr: bool) -> DMat4 {
    let m_yaw = DMat4::from_rotation_y(yaw);
    let m_pitch = DMat4::from_rotation_x(-pitch);
    let m_roll = DMat4::from_rotation_z(roll);

    if order_ypr {
        m_yaw * m_pitch * m_roll
    } else {
        m_roll * m_pitch * m_yaw
    }
}

/// Inverse of the YPR order of [`euler_to_rotation_matrix`]. Near pitch = ±90°
/// yaw and roll are not separable; roll is reported as zero there.
pub fn rotation_matrix_to_euler(m: &DMat4) -> EulerAngles {
    // m(row, col)
    let at = |row: usize, col: usize| m.col(col)[row];

    let m23 = at(1, 2).clamp(-1.0, 1.0);
    let pitch = m23.asin();

    if m23.abs() < 0.999_999_9 {
        EulerAngles {
            yaw: at(0, 2).atan2(at(2, 2)),
            pitch,
            roll: at(1, 0).atan2(at(1, 1)),
        }
    } else {
        EulerAngles {
            yaw: (-at(2, 0)).atan2(at(0, 0)),
            pitch,
            roll: 0.0,
        }
    }
}

/// Zeroes the roll component while keeping yaw and pitch.
pub fn cancel_roll(q: DQuat) -> DQuat {
    let euler = quaternion_to_euler(q);
    euler_to_quaternion(euler.yaw, euler.pitch, 0.0)
}

pub fn dot(q0: DQuat, q1: DQuat) -> f64 {
    q0.dot(q1)
}

pub fn add(q0: DQuat, q1: DQuat) -> DQuat {
    q0 + q1
}

pub fn scale(q: DQuat, s: f64) -> DQuat {
    q * s
}

/// Quaternion logarithm; the result is a pure quaternion (w = 0).
pub fn log(q: DQuat) -> DQuat {
    if q.w.abs() < 1.0 {
        let angle = q.w.acos();
        let sin = angle.sin();
        if sin.abs() > EPSILON {
            let coeff = angle / sin;
            return DQuat::from_xyzw(q.x * coeff, q.y * coeff, q.z * coeff, 0.0);
        }
    }
    DQuat::from_xyzw(q.x, q.y, q.z, 0.0)
}

/// Quaternion exponential of a pure quaternion.
pub fn exp(q: DQuat) -> DQuat {
    let angle = q.xyz().length();
    let sin = angle.sin();
    let w = angle.cos();

    if angle > EPSILON && sin.abs() > EPSILON {
        let coeff = sin / angle;
        DQuat::from_xyzw(q.x * coeff, q.y * coeff, q.z * coeff, w)
    } else {
        DQuat::from_xyzw(q.x, q.y, q.z, w)
    }
}

/// Shortest-arc spherical interpolation. Endpoints are returned exactly.
pub fn slerp(q0: DQuat, q1: DQuat, t: f64) -> DQuat {
    if t <= 0.0 {
        return q0;
    }
    if t >= 1.0 {
        return q1;
    }
    q0.slerp(q1, t)
}

/// Normalized linear blend, no hemisphere correction.
pub fn nlerp_no_invert(q0: DQuat, q1: DQuat, t: f64) -> DQuat {
    (q0 * (1.0 - t) + q1 * t).normalize()
}

/// Spherical interpolation that keeps the sign of `q1` even when the dot
/// product is negative. The spline path relies on this; use [`slerp`] for
/// plain keyframe blending.
pub fn slerp_no_invert(q0: DQuat, q1: DQuat, t: f64) -> DQuat {
    let d = q0.dot(q1);

    if d.abs() >= NLERP_THRESHOLD {
        return nlerp_no_invert(q0, q1, t);
    }

    let angle = d.acos();
    let sin = angle.sin();
    let w0 = (angle * (1.0 - t)).sin() / sin;
    let w1 = (angle * t).sin() / sin;

    q0 * w0 + q1 * w1
}

/// Spherical quadrangle interpolation between `q0` and `q1` with tangents
/// `a0`, `a1` (see [`spline`]).
pub fn squad_no_invert(q0: DQuat, a0: DQuat, a1: DQuat, q1: DQuat, t: f64) -> DQuat {
    let quat = slerp_no_invert(q0, q1, t);
    let tangent = slerp_no_invert(a0, a1, t);
    slerp_no_invert(quat, tangent, 2.0 * t * (1.0 - t))
}

/// SQUAD tangent at `q_cur` given its neighbours.
pub fn spline(q_prev: DQuat, q_cur: DQuat, q_next: DQuat) -> DQuat {
    let inverse = q_cur.conjugate();

    let log_prev = log(inverse * q_prev);
    let log_next = log(inverse * q_next);
    let sum = scale(add(log_prev, log_next), -0.25);

    (q_cur * exp(sum)).normalize()
}

/// Rotation angle between two orientations, in radians.
pub fn angular_distance(q0: DQuat, q1: DQuat) -> f64 {
    2.0 * q0.dot(q1).abs().min(1.0).acos()
}

/// Returns `q` or `-q`, whichever lies in the same hemisphere as `reference`.
pub fn align_hemisphere(reference: DQuat, q: DQuat) -> DQuat {
    if reference.dot(q) < 0.0 {
        -q
    } else {
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn approx_quat(a: DQuat, b: DQuat, eps: f64) -> bool {
        (a.x - b.x).abs() <= eps
            && (a.y - b.y).abs() <= eps
            && (a.z - b.z).abs() <= eps
            && (a.w - b.w).abs() <= eps
    }

    fn random_unit_quat(rng: &mut StdRng) -> DQuat {
        let yaw = rng.gen_range(-PI..PI);
        let pitch = rng.gen_range(-FRAC_PI_2..FRAC_PI_2);
        let roll = rng.gen_range(-PI..PI);
        euler_to_quaternion(yaw, pitch, roll)
    }

    #[test]
    fn euler_round_trip_outside_gimbal_zone() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..2000 {
            let yaw = rng.gen_range(-PI + 0.01..PI - 0.01);
            let pitch = rng.gen_range(-FRAC_PI_2 + 0.05..FRAC_PI_2 - 0.05);
            let roll = rng.gen_range(-PI + 0.01..PI - 0.01);

            let euler = quaternion_to_euler(euler_to_quaternion(yaw, pitch, roll));
            assert!((euler.yaw - yaw).abs() < 1e-6, "yaw {} != {}", euler.yaw, yaw);
            assert!((euler.pitch - pitch).abs() < 1e-6, "pitch {} != {}", euler.pitch, pitch);
            assert!((euler.roll - roll).abs() < 1e-6, "roll {} != {}", euler.roll, roll);
        }
    }

    #[test]
    fn positive_pitch_tilts_forward_axis_down_in_camera_frame() {
        // 相机本地 forward = -Z；pitch 取反后正 pitch 让 forward 的 y 变负
        let q = euler_to_quaternion(0.0, 0.5, 0.0);
        let forward = q * DVec3::NEG_Z;
        assert!(forward.y < 0.0);
        assert!((quaternion_to_euler(q).pitch - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ypr_matrix_matches_quaternion() {
        let (yaw, pitch, roll) = (0.7, -0.3, 0.2);
        let from_matrix = euler_to_rotation_matrix(yaw, pitch, roll, true);
        let from_quat = DMat4::from_quat(euler_to_quaternion(yaw, pitch, roll));
        assert!(from_matrix.abs_diff_eq(from_quat, 1e-12));

        let euler = rotation_matrix_to_euler(&from_matrix);
        assert!((euler.yaw - yaw).abs() < 1e-9);
        assert!((euler.pitch - pitch).abs() < 1e-9);
        assert!((euler.roll - roll).abs() < 1e-9);
    }

    #[test]
    fn rpy_order_differs_from_ypr() {
        let ypr = euler_to_rotation_matrix(0.7, -0.3, 0.2, true);
        let rpy = euler_to_rotation_matrix(0.7, -0.3, 0.2, false);
        assert!(!ypr.abs_diff_eq(rpy, 1e-6));

        // 单轴旋转时两种顺序等价
        let a = euler_to_rotation_matrix(1.1, 0.0, 0.0, true);
        let b = euler_to_rotation_matrix(1.1, 0.0, 0.0, false);
        assert!(a.abs_diff_eq(b, 1e-12));
    }

    #[test]
    fn gimbal_lock_reports_zero_roll() {
        let m = euler_to_rotation_matrix(0.4, FRAC_PI_2, 0.0, true);
        let euler = rotation_matrix_to_euler(&m);
        assert!((euler.pitch - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(euler.roll, 0.0);
        assert!(euler.yaw.is_finite());
    }

    #[test]
    fn cancel_roll_keeps_yaw_and_pitch() {
        let q = euler_to_quaternion(1.2, 0.4, 0.9);
        let euler = quaternion_to_euler(cancel_roll(q));
        assert!((euler.yaw - 1.2).abs() < 1e-9);
        assert!((euler.pitch - 0.4).abs() < 1e-9);
        assert!(euler.roll.abs() < 1e-9);
    }

    #[test]
    fn slerp_hits_endpoints() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let q0 = random_unit_quat(&mut rng);
            let mut q1 = random_unit_quat(&mut rng);
            if rng.gen_bool(0.5) {
                q1 = -q1;
            }
            assert!(approx_quat(slerp(q0, q1, 0.0), q0, 1e-9));
            assert!(approx_quat(slerp(q0, q1, 1.0), q1, 1e-9));
        }
    }

    #[test]
    fn slerp_takes_shortest_arc() {
        let q0 = euler_to_quaternion(0.0, 0.0, 0.0);
        let q1 = -euler_to_quaternion(0.5, 0.0, 0.0);
        let mid = slerp(q0, q1, 0.5);
        let euler = quaternion_to_euler(mid);
        assert!((euler.yaw - 0.25).abs() < 1e-9);
    }

    #[test]
    fn slerp_no_invert_of_identical_quaternions_is_constant() {
        let q = euler_to_quaternion(0.3, -0.2, 0.1);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert!(approx_quat(slerp_no_invert(q, q, t), q, 1e-12));
        }
    }

    #[test]
    fn slerp_no_invert_keeps_sign_on_negative_dot() {
        let q0 = euler_to_quaternion(0.0, 0.0, 0.0);
        let q1 = -euler_to_quaternion(1.0, 0.0, 0.0);
        assert!(q0.dot(q1) < 0.0);

        let end = slerp_no_invert(q0, q1, 1.0);
        assert!(approx_quat(end, q1, 1e-9));
        // 中点走长弧，和标准 slerp 的结果不同
        let long = slerp_no_invert(q0, q1, 0.5);
        let short = slerp(q0, q1, 0.5);
        assert!(angular_distance(long, short) > 0.1);
    }

    #[test]
    fn nearly_opposite_quaternions_blend_linearly_without_flipping() {
        let q0 = euler_to_quaternion(0.3, 0.1, 0.0);
        let q1 = -euler_to_quaternion(0.5, 0.1, 0.0);
        assert!(q0.dot(q1) <= -NLERP_THRESHOLD);

        assert!(approx_quat(slerp_no_invert(q0, q1, 0.0), q0, 1e-12));
        assert!(approx_quat(slerp_no_invert(q0, q1, 1.0), q1, 1e-12));

        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let blended = slerp_no_invert(q0, q1, t);
            assert_eq!(blended, nlerp_no_invert(q0, q1, t));
            assert!((blended.length() - 1.0).abs() < 1e-12);
            if t > 0.5 && t < 1.0 {
                // 保留 q1 的符号，不翻到 q0 所在半球
                assert!(blended.dot(q1) > 0.0, "t {}", t);
                assert!(blended.dot(slerp(q0, q1, t)) < 0.0, "t {}", t);
            }
        }
    }

    #[test]
    fn close_quaternions_fall_back_to_nlerp() {
        let q0 = euler_to_quaternion(0.3, 0.1, 0.0);
        let q1 = euler_to_quaternion(0.4, 0.1, 0.0);
        let d = q0.dot(q1);
        assert!(d >= NLERP_THRESHOLD && d < 1.0);

        assert!(approx_quat(slerp_no_invert(q0, q1, 0.0), q0, 1e-12));
        assert!(approx_quat(slerp_no_invert(q0, q1, 1.0), q1, 1e-12));

        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let blended = slerp_no_invert(q0, q1, t);
            assert_eq!(blended, nlerp_no_invert(q0, q1, t));
            assert!(blended.dot(q1) > 0.0);
            assert!(angular_distance(blended, slerp(q0, q1, t)) < 1e-4);
        }
    }

    #[test]
    fn slerp_no_invert_matches_slerp_on_wide_positive_arcs() {
        let q0 = euler_to_quaternion(0.0, 0.0, 0.0);
        let q1 = euler_to_quaternion(1.2, 0.3, 0.0);
        for i in 0..=8 {
            let t = i as f64 / 8.0;
            assert!(approx_quat(slerp_no_invert(q0, q1, t), slerp(q0, q1, t), 1e-9));
        }
    }

    #[test]
    fn squad_hits_endpoints() {
        let q0 = euler_to_quaternion(0.0, 0.0, 0.0);
        let q1 = euler_to_quaternion(1.0, 0.2, 0.0);
        let q2 = euler_to_quaternion(2.0, -0.1, 0.0);
        let a0 = spline(q0, q0, q1);
        let a1 = spline(q0, q1, q2);

        assert!(approx_quat(squad_no_invert(q0, a0, a1, q1, 0.0), q0, 1e-9));
        assert!(approx_quat(squad_no_invert(q0, a0, a1, q1, 1.0), q1, 1e-9));
    }

    #[test]
    fn spline_tangent_of_uniform_rotation_is_the_keyframe() {
        let q0 = euler_to_quaternion(0.0, 0.0, 0.0);
        let q1 = euler_to_quaternion(0.5, 0.0, 0.0);
        let q2 = euler_to_quaternion(1.0, 0.0, 0.0);
        assert!(approx_quat(spline(q0, q1, q2), q1, 1e-9));
    }

    #[test]
    fn log_and_exp_guard_identity() {
        let zero = log(DQuat::IDENTITY);
        assert_eq!(zero, DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        let back = exp(zero);
        assert!(approx_quat(back, DQuat::IDENTITY, 1e-12));

        let q = euler_to_quaternion(0.8, 0.0, 0.0);
        assert!(approx_quat(exp(log(q)), q, 1e-9));
    }

    #[test]
    fn angular_distance_is_rotation_angle() {
        let q0 = euler_to_quaternion(0.0, 0.0, 0.0);
        let q1 = euler_to_quaternion(0.75, 0.0, 0.0);
        assert!((angular_distance(q0, q1) - 0.75).abs() < 1e-9);
        assert!((angular_distance(q0, -q1) - 0.75).abs() < 1e-9);
        assert!(angular_distance(q1, q1).abs() < 1e-6);
    }

    #[test]
    fn align_hemisphere_flips_negative_dot() {
        let q0 = euler_to_quaternion(0.1, 0.0, 0.0);
        let q1 = -euler_to_quaternion(0.3, 0.0, 0.0);
        let aligned = align_hemisphere(q0, q1);
        assert!(q0.dot(aligned) > 0.0);
        assert!(angular_distance(aligned, q1) < 1e-9);
    }
}
