// view/flat.rs — 平面（等距柱状）投影
//
// 片元坐标与 yaw/pitch 线性对应，适合 2:1 原图展开查看。
// 不重复平铺时，边界由媒体宽高比、视口宽高比和当前 fov 共同决定。

use super::{apply_parallax, Size, ViewBase, ViewBounds, ViewOptions};
use crate::camera::{Camera, DEFAULT_FOV};
use glam::{DVec2, DVec3};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

const FOV_MIN_DEG: f64 = 20.0;
const FOV_MAX_DEG: f64 = 180.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FlatView {
    base: ViewBase,
    options: ViewOptions,
    media: Option<Size>,
    /// 最近一次同步的 fov（弧度），用于计算边界
    fov: f64,
    bounds: ViewBounds,
}

impl FlatView {
    pub fn new(viewport: Size, options: ViewOptions, media: Option<Size>) -> Self {
        let mut view = Self {
            base: ViewBase::new(viewport),
            options,
            media: media.filter(|m| !m.is_empty()),
            fov: DEFAULT_FOV.to_radians(),
            bounds: ViewBounds::unbounded(),
        };
        view.update_bounds();
        view
    }

    pub fn base(&self) -> &ViewBase {
        &self.base
    }

    pub fn bounds(&self) -> ViewBounds {
        self.bounds
    }

    pub fn options(&self) -> ViewOptions {
        self.options
    }

    pub fn repeat_x(&self) -> bool {
        self.options.repeat_x
    }

    pub fn repeat_y(&self) -> bool {
        self.options.repeat_y
    }

    /// Returns whether the flag changed.
    pub fn set_repeat_x(&mut self, repeat: bool) -> bool {
        if self.options.repeat_x == repeat {
            return false;
        }
        self.options.repeat_x = repeat;
        self.update_bounds();
        true
    }

    /// Returns whether the flag changed.
    pub fn set_repeat_y(&mut self, repeat: bool) -> bool {
        if self.options.repeat_y == repeat {
            return false;
        }
        self.options.repeat_y = repeat;
        self.update_bounds();
        true
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.base.set_viewport(viewport);
        self.update_bounds();
    }

    pub fn set_media(&mut self, media: Option<Size>) {
        self.media = media.filter(|m| !m.is_empty());
        self.update_bounds();
    }

    pub fn set_fov(&mut self, fov_rad: f64) {
        if fov_rad.is_finite() && fov_rad != self.fov {
            self.fov = fov_rad;
            self.update_bounds();
        }
    }

    /// Half the vertical fov: radians per fragment unit.
    pub fn projection_scale(&self, fov_rad: f64) -> f64 {
        fov_rad / 2.0
    }

    fn update_bounds(&mut self) {
        let fov_min = FOV_MIN_DEG.to_radians();
        let mut fov_max = FOV_MAX_DEG.to_radians();
        let viewport_aspect = self.base.viewport().aspect();

        if let Some(media) = self.media {
            let media_aspect = media.aspect();
            if !self.options.repeat_y {
                fov_max = fov_max.min(PI);
            }
            if !self.options.repeat_x {
                fov_max = fov_max.min(PI * media_aspect / viewport_aspect);
            }
        }
        let fov_max = fov_max.max(fov_min);

        let vfov = self.fov.clamp(fov_min, fov_max);
        let hfov = vfov * viewport_aspect;

        let (yaw_limit, pitch_limit) = match self.media {
            Some(media) => (
                ((PI * media.aspect() - hfov) / 2.0).max(0.0),
                ((PI - vfov) / 2.0).max(0.0),
            ),
            None => (PI, FRAC_PI_2),
        };

        let yaw_limit = if self.options.repeat_x { f64::INFINITY } else { yaw_limit };
        let pitch_limit = if self.options.repeat_y { f64::INFINITY } else { pitch_limit };

        self.bounds = ViewBounds {
            yaw_min: -yaw_limit,
            yaw_max: yaw_limit,
            pitch_min: -pitch_limit,
            pitch_max: pitch_limit,
            roll_min: 0.0,
            roll_max: 0.0,
            fov_min,
            fov_max,
        };

        log::debug!(
            "flat bounds: yaw ±{:.3} pitch ±{:.3} fov {:.3}..{:.3}",
            yaw_limit,
            pitch_limit,
            fov_min,
            fov_max
        );
    }

    pub fn world_to_screen(&self, camera: &Camera, direction: DVec3, parallax: f64) -> Option<DVec2> {
        let direction = direction.try_normalize()?;
        let euler = camera.euler();
        let scale = self.projection_scale(camera.fov_radians());

        let yaw = direction.x.atan2(-direction.z);
        let pitch = direction.y.clamp(-1.0, 1.0).asin();
        let d_yaw = wrap_angle(yaw - euler.yaw);
        let d_pitch = pitch - euler.pitch;

        let fragment = DVec2::new(d_yaw / scale, -d_pitch / scale);
        Some(self.base.fragment_to_screen(apply_parallax(fragment, parallax)))
    }

    pub fn screen_to_world(&self, camera: &Camera, point: DVec2) -> Option<DVec3> {
        let euler = camera.euler();
        let fragment = self.base.screen_to_fragment(point) * self.projection_scale(camera.fov_radians());

        let yaw = euler.yaw + fragment.x;
        let pitch = euler.pitch - fragment.y;
        if pitch.abs() > FRAC_PI_2 {
            return None;
        }

        Some(DVec3::new(pitch.cos() * yaw.sin(), pitch.sin(), -pitch.cos() * yaw.cos()))
    }
}

/// Wraps into (-π, π].
fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}
