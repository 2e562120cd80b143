// view/rectilinear.rs — 标准透视投影

use super::{apply_parallax, to_camera_space, to_world_space, Size, ViewBase, ViewBounds};
use crate::camera::Camera;
use glam::{DVec2, DVec3};

#[derive(Debug, Clone, PartialEq)]
pub struct RectilinearView {
    base: ViewBase,
    bounds: ViewBounds,
}

impl RectilinearView {
    pub fn new(viewport: Size) -> Self {
        Self {
            base: ViewBase::new(viewport),
            bounds: ViewBounds::spherical(90.0, 40.0, 140.0),
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

    /// tan(fov / 2). fov 在 180° 处是奇点，先做一次安全夹取
    pub fn projection_scale(&self, fov_rad: f64) -> f64 {
        let safe_fov = fov_rad.clamp(1f64.to_radians(), 179.9f64.to_radians());
        (safe_fov / 2.0).tan()
    }

    pub fn world_to_screen(&self, camera: &Camera, direction: DVec3, parallax: f64) -> Option<DVec2> {
        let camera_space = to_camera_space(camera, direction)?;
        let scale = self.projection_scale(camera.fov_radians());
        let fragment = ViewBase::perspective_fragment(camera_space, scale)?;
        Some(self.base.fragment_to_screen(apply_parallax(fragment, parallax)))
    }

    pub fn screen_to_world(&self, camera: &Camera, point: DVec2) -> Option<DVec3> {
        let fragment = self.base.screen_to_fragment(point) * self.projection_scale(camera.fov_radians());
        to_world_space(camera, DVec3::new(fragment.x, fragment.y, -1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> RectilinearView {
        RectilinearView::new(Size::new(1280.0, 720.0))
    }

    #[test]
    fn center_looks_forward() {
        let camera = Camera::from_degrees(0.0, 0.0, 0.0, 90.0);
        let dir = view().screen_to_world(&camera, DVec2::new(640.0, 360.0)).expect("direction");
        assert!((dir - DVec3::new(0.0, 0.0, -1.0)).length() < 1e-9);
    }

    #[test]
    fn yaw_turns_right_and_pitch_looks_up() {
        let view = view();
        let center = DVec2::new(640.0, 360.0);

        let right = Camera::from_degrees(90.0, 0.0, 0.0, 90.0);
        let dir = view.screen_to_world(&right, center).expect("direction");
        assert!((dir - DVec3::X).length() < 1e-9);

        let up = Camera::from_degrees(0.0, 30.0, 0.0, 90.0);
        let dir = view.screen_to_world(&up, center).expect("direction");
        assert!(dir.y > 0.49 && dir.y < 0.51);
    }

    #[test]
    fn top_of_screen_is_above_horizon() {
        let camera = Camera::from_degrees(0.0, 0.0, 0.0, 90.0);
        let dir = view().screen_to_world(&camera, DVec2::new(640.0, 0.0)).expect("direction");
        assert!(dir.y > 0.0);
    }

    #[test]
    fn behind_camera_is_rejected() {
        let camera = Camera::from_degrees(0.0, 0.0, 0.0, 90.0);
        assert_eq!(view().world_to_screen(&camera, DVec3::Z, 0.0), None);
    }

    #[test]
    fn parallax_pulls_towards_center() {
        let camera = Camera::from_degrees(0.0, 0.0, 0.0, 90.0);
        let dir = DVec3::new(0.5, 0.0, -1.0);
        let plain = view().world_to_screen(&camera, dir, 0.0).expect("plain");
        let layered = view().world_to_screen(&camera, dir, 1.0).expect("layered");
        assert!(((layered.x - 640.0) * 2.0 - (plain.x - 640.0)).abs() < 1e-9);
        assert_eq!(layered.y, plain.y);
    }
}
