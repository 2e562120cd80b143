// view/manager.rs — 当前投影的切换与事件通知

use super::{Size, View, ViewBounds, ViewOptions, ViewType, ViewUniforms};
use crate::camera::Camera;
use glam::{DVec2, DVec3};

/// What changed on a [`ViewManager`]; every variant may move the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewChange {
    Type(ViewType),
    Options(ViewOptions),
    VrEnabled,
    VrDisabled,
}

/// View type and options saved while VR forces a rectilinear view.
#[derive(Debug, Clone, Copy, PartialEq)]
struct VrSnapshot {
    view_type: Option<ViewType>,
    options: ViewOptions,
}

pub struct ViewManager {
    view: Option<View>,
    viewport: Size,
    media: Option<Size>,
    options: ViewOptions,
    vr: Option<VrSnapshot>,
    on_change: Option<Box<dyn FnMut(ViewChange)>>,
}

impl ViewManager {
    /// Starts uninitialized; queries return `None` until a view type is set.
    pub fn new(viewport: Size) -> Self {
        Self {
            view: None,
            viewport,
            media: None,
            options: ViewOptions::default(),
            vr: None,
            on_change: None,
        }
    }

    pub fn set_on_change(&mut self, on_change: impl FnMut(ViewChange) + 'static) {
        self.on_change = Some(Box::new(on_change));
    }

    fn emit(&mut self, change: ViewChange) {
        log::debug!("view change: {:?}", change);
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(change);
        }
    }

    pub fn view_type(&self) -> Option<ViewType> {
        self.view.as_ref().map(View::view_type)
    }

    pub fn current(&self) -> Option<&View> {
        self.view.as_ref()
    }

    pub fn options(&self) -> ViewOptions {
        self.options
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn is_vr(&self) -> bool {
        self.vr.is_some()
    }

    /// Replaces the current view with a new instance of `view_type`.
    /// Selecting the active type again is a no-op.
    pub fn set_view_type(&mut self, view_type: ViewType) {
        if self.view_type() == Some(view_type) {
            return;
        }
        self.set_view(View::new(view_type, self.viewport, self.options, self.media));
    }

    /// Installs a prepared view, dropping the previous one.
    pub fn set_view(&mut self, mut view: View) {
        view.set_viewport(self.viewport);
        if let View::Flat(flat) = &mut view {
            flat.set_media(self.media);
            self.options = flat.options();
        }

        let view_type = view.view_type();
        if let Some(previous) = self.view.replace(view) {
            log::info!("view {} -> {}", previous.view_type(), view_type);
        } else {
            log::info!("view {}", view_type);
        }
        self.emit(ViewChange::Type(view_type));
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        if let Some(view) = self.view.as_mut() {
            view.set_viewport(viewport);
        }
    }

    /// Source media size, used by the flat view to bound panning.
    pub fn set_media(&mut self, media: Option<Size>) {
        self.media = media;
        if let Some(View::Flat(flat)) = self.view.as_mut() {
            flat.set_media(media);
        }
    }

    /// Returns whether the option changed.
    pub fn set_repeat_x(&mut self, repeat: bool) -> bool {
        self.set_options(ViewOptions {
            repeat_x: repeat,
            ..self.options
        })
    }

    /// Returns whether the option changed.
    pub fn set_repeat_y(&mut self, repeat: bool) -> bool {
        self.set_options(ViewOptions {
            repeat_y: repeat,
            ..self.options
        })
    }

    fn set_options(&mut self, options: ViewOptions) -> bool {
        if options == self.options {
            return false;
        }
        self.options = options;
        if let Some(View::Flat(flat)) = self.view.as_mut() {
            flat.set_repeat_x(options.repeat_x);
            flat.set_repeat_y(options.repeat_y);
        }
        self.emit(ViewChange::Options(options));
        true
    }

    pub fn bounds(&self) -> Option<ViewBounds> {
        self.view.as_ref().map(View::bounds)
    }

    /// Clamps the camera into the current view's bounds.
    pub fn constrain(&mut self, camera: &mut Camera) {
        if let Some(view) = self.view.as_mut() {
            view.sync_fov(camera.fov_radians());
            camera.constrain(&view.bounds());
        }
    }

    pub fn world_to_screen(&self, camera: &Camera, direction: DVec3, parallax: f64) -> Option<DVec2> {
        self.view.as_ref()?.world_to_screen(camera, direction, parallax)
    }

    pub fn screen_to_world(&self, camera: &Camera, point: DVec2) -> Option<DVec3> {
        self.view.as_ref()?.screen_to_world(camera, point)
    }

    pub fn update_uniforms_data(&mut self, camera: &Camera) -> Option<ViewUniforms> {
        self.view.as_mut().map(|view| view.update_uniforms_data(camera))
    }

    /// Saves the view type and options, then forces a rectilinear view
    /// without repeat. Calling it again while VR is on does nothing.
    pub fn enable_vr(&mut self) {
        if self.vr.is_some() {
            log::warn!("VR already enabled");
            return;
        }
        self.vr = Some(VrSnapshot {
            view_type: self.view_type(),
            options: self.options,
        });

        self.options = ViewOptions::default();
        self.set_view_type(ViewType::Rectilinear);
        self.emit(ViewChange::VrEnabled);
    }

    /// Restores what [`enable_vr`](Self::enable_vr) saved and levels the camera.
    pub fn disable_vr(&mut self, camera: &mut Camera) {
        let Some(snapshot) = self.vr.take() else {
            return;
        };

        self.options = snapshot.options;
        match snapshot.view_type {
            Some(view_type) => {
                // 强制重建，以便带上恢复后的选项
                self.view = None;
                self.set_view_type(view_type);
            }
            None => self.view = None,
        }
        camera.reset_roll();
        self.emit(ViewChange::VrDisabled);
    }
}
