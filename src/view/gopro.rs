// view/gopro.rs — 立体投影（小行星效果）

use super::{apply_parallax, to_camera_space, to_world_space, Size, ViewBase, ViewBounds};
use crate::camera::Camera;
use glam::{DVec2, DVec3};
use std::f64::consts::PI;

/// 离视线反方向这么近时投影半径发散
const ANTIPODE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct GoProView {
    base: ViewBase,
    bounds: ViewBounds,
}

impl GoProView {
    pub fn new(viewport: Size) -> Self {
        Self {
            base: ViewBase::new(viewport),
            bounds: ViewBounds::spherical(90.0, 30.0, 330.0),
        }
    }

    pub fn base(&self) -> &ViewBase {
        &self.base
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.base.set_viewport(viewport);
    }

    pub fn bounds(&self) -> ViewBounds {
        self.bounds
    }

    /// 2·tan(fov / 4): stereographic radius at the half-fov angle.
    pub fn projection_scale(&self, fov_rad: f64) -> f64 {
        let safe_fov = fov_rad.clamp(1f64.to_radians(), 359f64.to_radians());
        2.0 * (safe_fov / 4.0).tan()
    }

    pub fn world_to_screen(&self, camera: &Camera, direction: DVec3, parallax: f64) -> Option<DVec2> {
        let c = to_camera_space(camera, direction)?;
        let theta = (-c.z).clamp(-1.0, 1.0).acos();
        if theta > PI - ANTIPODE_EPSILON {
            return None;
        }

        let radius = 2.0 * (theta / 2.0).tan();
        let phi = c.y.atan2(c.x);
        let fragment = DVec2::new(phi.cos(), phi.sin()) * radius / self.projection_scale(camera.fov_radians());
        Some(self.base.fragment_to_screen(apply_parallax(fragment, parallax)))
    }

    pub fn screen_to_world(&self, camera: &Camera, point: DVec2) -> Option<DVec3> {
        let fragment = self.base.screen_to_fragment(point) * self.projection_scale(camera.fov_radians());
        let radius = fragment.length();
        let theta = 2.0 * (radius / 2.0).atan();
        let phi = fragment.y.atan2(fragment.x);

        let camera_space = DVec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), -theta.cos());
        to_world_space(camera, camera_space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_and_behind() {
        let view = GoProView::new(Size::new(800.0, 600.0));
        let camera = Camera::from_degrees(0.0, 0.0, 0.0, 120.0);

        let dir = view.screen_to_world(&camera, DVec2::new(400.0, 300.0)).expect("direction");
        assert!((dir - DVec3::new(0.0, 0.0, -1.0)).length() < 1e-9);

        // 背后方向仍能投影，只有正反方向被拒绝
        assert!(view.world_to_screen(&camera, DVec3::new(0.1, 0.0, 1.0), 0.0).is_some());
        assert_eq!(view.world_to_screen(&camera, DVec3::Z, 0.0), None);
    }

    #[test]
    fn half_fov_reaches_the_top_edge() {
        let view = GoProView::new(Size::new(800.0, 600.0));
        let camera = Camera::from_degrees(0.0, 0.0, 0.0, 120.0);

        // 垂直方向上仰 60° 正好落在顶边
        let up = DVec3::new(0.0, (PI / 3.0).sin(), -(PI / 3.0).cos());
        let screen = view.world_to_screen(&camera, up, 0.0).expect("screen");
        assert!((screen - DVec2::new(400.0, 0.0)).length() < 1e-6);
    }
}
