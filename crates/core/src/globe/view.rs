//! Globe interaction state.
//!
//! [`GlobeView`] owns everything the 3D view needs between frames: the globe
//! rotation, camera zoom, the pin marker registry and the draft marker, plus
//! the pointer state that turns raw input into drags and clicks. It draws
//! nothing; a renderer reads [`GlobeView::rotation_matrix`],
//! [`GlobeView::camera`], [`GlobeView::markers`] and
//! [`GlobeView::marker_scale`] each frame.
//!
//! Time is passed in explicitly as milliseconds so the state machine is
//! deterministic under test.

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_3;

use glam::{DMat3, DVec2, DVec3};

use super::camera::{PerspectiveCamera, Viewport};
use crate::geo::{GeoPoint, Sphere, marker_scale, pick_surface_point, to_cartesian, to_geo};
use crate::types::PinId;

/// Tunables for [`GlobeView`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobeConfig {
    pub globe_radius: f64,
    /// Markers float slightly above the surface.
    pub marker_radius: f64,
    pub axial_tilt_deg: f64,
    pub fov_y_deg: f64,
    pub initial_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom change per unit of wheel `deltaY`.
    pub wheel_zoom_speed: f64,
    /// Zoom change per zoom button press.
    pub zoom_step: f64,
    /// Radians of rotation per dragged pixel.
    pub drag_sensitivity: f64,
    /// Limit on the x (tilt) rotation in either direction, in radians.
    pub max_tilt: f64,
    /// Pointer travel below which a press/release counts as a click, in pixels.
    pub click_threshold_px: f64,
    pub auto_rotate_delay_ms: u64,
    pub auto_rotate_ramp_ms: u64,
    /// Radians per frame once fully ramped up.
    pub auto_rotate_speed: f64,
    /// Marker scale at `max_zoom`.
    pub min_marker_scale: f64,
    /// Marker scale at `min_zoom`.
    pub max_marker_scale: f64,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            globe_radius: 5.0,
            marker_radius: 5.05,
            axial_tilt_deg: 23.5,
            fov_y_deg: 55.0,
            initial_zoom: 15.0,
            min_zoom: 5.5,
            max_zoom: 18.0,
            wheel_zoom_speed: 0.05,
            zoom_step: 1.0,
            drag_sensitivity: 0.005,
            max_tilt: FRAC_PI_3,
            click_threshold_px: 5.0,
            auto_rotate_delay_ms: 1000,
            auto_rotate_ramp_ms: 2000,
            auto_rotate_speed: 0.0001,
            min_marker_scale: 0.03,
            max_marker_scale: 2.0,
        }
    }
}

/// Zoom button direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Opaque handle a renderer attaches its drawable to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(u64);

/// A marker placed on the globe, in globe-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub handle: MarkerHandle,
    pub coordinate: GeoPoint,
    pub local_position: DVec3,
}

/// What a pointer release turned out to be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerRelease {
    /// No press was in progress.
    Ignored,
    /// The pointer travelled past the click threshold.
    DragEnded,
    /// A click that hit the globe; the draft marker now sits here.
    Picked(GeoPoint),
    /// A click on empty space.
    Missed,
}

#[derive(Debug, Clone, Copy)]
struct PointerPress {
    origin: DVec2,
    last: DVec2,
}

/// Interaction state for the 3D globe view.
#[derive(Debug, Clone)]
pub struct GlobeView {
    config: GlobeConfig,
    viewport: Viewport,
    zoom: f64,
    /// Euler angles: x is tilt, y is spin.
    rotation: DVec2,
    markers: HashMap<PinId, Marker>,
    draft: Option<Marker>,
    next_handle: u64,
    marker_scale: f64,
    press: Option<PointerPress>,
    last_interaction_ms: u64,
}

impl GlobeView {
    /// Create a view for `viewport` at time `now_ms`.
    #[must_use]
    pub fn new(config: GlobeConfig, viewport: Viewport, now_ms: u64) -> Self {
        let zoom = config.initial_zoom.clamp(config.min_zoom, config.max_zoom);
        let mut view = Self {
            config,
            viewport,
            zoom,
            rotation: DVec2::new(config.axial_tilt_deg.to_radians(), 0.0),
            markers: HashMap::new(),
            draft: None,
            next_handle: 0,
            marker_scale: config.max_marker_scale,
            press: None,
            last_interaction_ms: now_ms,
        };
        view.update_marker_scale();
        view
    }

    #[must_use]
    pub const fn config(&self) -> &GlobeConfig {
        &self.config
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub const fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[must_use]
    pub fn camera(&self) -> PerspectiveCamera {
        PerspectiveCamera {
            fov_y_deg: self.config.fov_y_deg,
            aspect: self.viewport.aspect(),
            distance: self.zoom,
        }
    }

    /// Camera distance from the globe center.
    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current (tilt, spin) rotation in radians.
    #[must_use]
    pub const fn rotation(&self) -> DVec2 {
        self.rotation
    }

    /// Globe-local to world rotation, Euler order XYZ.
    #[must_use]
    pub fn rotation_matrix(&self) -> DMat3 {
        DMat3::from_rotation_x(self.rotation.x) * DMat3::from_rotation_y(self.rotation.y)
    }

    #[must_use]
    pub const fn marker_scale(&self) -> f64 {
        self.marker_scale
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.press.is_some()
    }

    // ---------------------------------------------------------------------
    // Pointer input
    // ---------------------------------------------------------------------

    /// Start a press. Presses outside the viewport are ignored.
    pub fn pointer_down(&mut self, x: f64, y: f64, now_ms: u64) -> bool {
        if !self.viewport.contains(x, y) {
            return false;
        }
        let at = DVec2::new(x, y);
        self.press = Some(PointerPress {
            origin: at,
            last: at,
        });
        self.last_interaction_ms = now_ms;
        true
    }

    /// Rotate the globe by the pointer delta while a press is active.
    ///
    /// Returns whether the rotation changed.
    pub fn pointer_move(&mut self, x: f64, y: f64, now_ms: u64) -> bool {
        let Some(press) = self.press.as_mut() else {
            return false;
        };
        let at = DVec2::new(x, y);
        let delta = at - press.last;
        press.last = at;

        let s = self.config.drag_sensitivity;
        self.rotation.y += delta.x * s;
        self.rotation.x = delta
            .y
            .mul_add(s, self.rotation.x)
            .clamp(-self.config.max_tilt, self.config.max_tilt);
        self.last_interaction_ms = now_ms;
        delta != DVec2::ZERO
    }

    /// End a press. Short presses become clicks that pick a point on the
    /// globe and move the draft marker there.
    pub fn pointer_up(&mut self, x: f64, y: f64, now_ms: u64) -> PointerRelease {
        let Some(press) = self.press.take() else {
            return PointerRelease::Ignored;
        };
        self.last_interaction_ms = now_ms;

        if press.origin.distance(DVec2::new(x, y)) >= self.config.click_threshold_px {
            return PointerRelease::DragEnded;
        }
        match self.pick(x, y) {
            Some(point) => {
                self.set_draft(point);
                PointerRelease::Picked(point)
            }
            None => PointerRelease::Missed,
        }
    }

    /// Abandon a press without treating it as a click.
    pub const fn pointer_cancel(&mut self) {
        self.press = None;
    }

    // ---------------------------------------------------------------------
    // Zoom
    // ---------------------------------------------------------------------

    /// Wheel zoom. Positive `delta_y` moves the camera away. Events outside
    /// the viewport are ignored.
    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64, now_ms: u64) -> bool {
        if !self.viewport.contains(x, y) {
            return false;
        }
        self.set_zoom(delta_y.mul_add(self.config.wheel_zoom_speed, self.zoom));
        self.last_interaction_ms = now_ms;
        true
    }

    /// Zoom button press.
    pub fn zoom_step(&mut self, direction: ZoomDirection, now_ms: u64) {
        let step = match direction {
            ZoomDirection::In => -self.config.zoom_step,
            ZoomDirection::Out => self.config.zoom_step,
        };
        self.set_zoom(self.zoom + step);
        self.last_interaction_ms = now_ms;
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        self.update_marker_scale();
    }

    fn update_marker_scale(&mut self) {
        self.marker_scale = marker_scale(
            self.zoom,
            self.config.min_zoom,
            self.config.max_zoom,
            self.config.min_marker_scale,
            self.config.max_marker_scale,
        );
    }

    // ---------------------------------------------------------------------
    // Frames
    // ---------------------------------------------------------------------

    /// Advance one frame: auto-rotate if the user has been idle long enough
    /// and refresh the marker scale.
    pub fn tick(&mut self, now_ms: u64) {
        if self.press.is_none() {
            let idle = now_ms.saturating_sub(self.last_interaction_ms);
            let delay = self.config.auto_rotate_delay_ms;
            if idle > delay {
                let ramp = self.config.auto_rotate_ramp_ms;
                let elapsed = idle - delay;
                #[allow(clippy::cast_precision_loss)]
                let progress = if ramp == 0 || elapsed >= ramp {
                    1.0
                } else {
                    elapsed as f64 / ramp as f64
                };
                self.rotation.y += self.config.auto_rotate_speed * progress;
            }
        }
        self.update_marker_scale();
    }

    // ---------------------------------------------------------------------
    // Picking
    // ---------------------------------------------------------------------

    /// The geographic point under a pixel position, if the globe is there.
    #[must_use]
    pub fn pick(&self, x: f64, y: f64) -> Option<GeoPoint> {
        let ray = self.camera().ray_through(self.viewport.to_ndc(x, y));
        let hit = pick_surface_point(ray, Sphere::new(DVec3::ZERO, self.config.globe_radius))?;
        let local = self.rotation_matrix().transpose() * hit;
        to_geo(local).ok()
    }

    /// Pixel position of a globe-local point, if it is in front of the camera.
    #[must_use]
    pub fn screen_position(&self, local: DVec3) -> Option<DVec2> {
        let world = self.rotation_matrix() * local;
        self.camera()
            .project(world)
            .map(|ndc| self.viewport.to_pixels(ndc))
    }

    // ---------------------------------------------------------------------
    // Markers
    // ---------------------------------------------------------------------

    const fn next_handle(&mut self) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn make_marker(&mut self, coordinate: GeoPoint) -> Marker {
        Marker {
            handle: self.next_handle(),
            coordinate,
            local_position: to_cartesian(coordinate, self.config.marker_radius),
        }
    }

    /// Place (or move) the marker for a pin. Returns the handle of the marker
    /// it replaced, if any.
    pub fn add_marker(&mut self, pin: PinId, coordinate: GeoPoint) -> Option<MarkerHandle> {
        let marker = self.make_marker(coordinate);
        self.markers.insert(pin, marker).map(|old| old.handle)
    }

    /// Remove the marker for a pin, returning its handle so the renderer can
    /// drop the drawable.
    pub fn remove_marker(&mut self, pin: PinId) -> Option<MarkerHandle> {
        self.markers.remove(&pin).map(|m| m.handle)
    }

    #[must_use]
    pub fn marker(&self, pin: PinId) -> Option<&Marker> {
        self.markers.get(&pin)
    }

    pub fn markers(&self) -> impl Iterator<Item = (&PinId, &Marker)> {
        self.markers.iter()
    }

    /// Replace the whole registry, e.g. after a reload. Returns the handles
    /// of every marker that was removed.
    pub fn replace_markers<I>(&mut self, pins: I) -> Vec<MarkerHandle>
    where
        I: IntoIterator<Item = (PinId, GeoPoint)>,
    {
        let removed = self.markers.drain().map(|(_, m)| m.handle).collect();
        for (pin, coordinate) in pins {
            let marker = self.make_marker(coordinate);
            self.markers.insert(pin, marker);
        }
        removed
    }

    /// World-space position of a pin's marker.
    #[must_use]
    pub fn marker_world_position(&self, pin: PinId) -> Option<DVec3> {
        self.markers
            .get(&pin)
            .map(|m| self.rotation_matrix() * m.local_position)
    }

    /// Move the draft marker, replacing any previous one.
    pub fn set_draft(&mut self, coordinate: GeoPoint) -> Option<MarkerHandle> {
        let marker = self.make_marker(coordinate);
        self.draft.replace(marker).map(|old| old.handle)
    }

    #[must_use]
    pub const fn draft(&self) -> Option<&Marker> {
        self.draft.as_ref()
    }

    pub fn clear_draft(&mut self) -> Option<MarkerHandle> {
        self.draft.take().map(|m| m.handle)
    }
}
