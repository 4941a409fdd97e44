use crate::transform::Transform4;
use crate::vector::Vector3;

/// A view transform and a projection transform, consumed together at draw time.
///
/// Both start as identity and are set independently:
///
/// ```
/// use trigon::{Camera, Vector3};
///
/// let mut camera = Camera::new();
/// camera.set_perspective(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
/// camera.look_at(
///     &Vector3::new(0.0, 2.0, 6.0),
///     &Vector3::ZERO,
///     &Vector3::new(0.0, 1.0, 0.0),
/// );
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Camera {
    view: Transform4,
    projection: Transform4,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the projection. `fov_y` is in radians.
    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        self.projection.perspective(fov_y, aspect, near, far);
    }

    /// Replaces the view so the camera sits at `eye` looking at `center`.
    pub fn look_at(&mut self, eye: &Vector3, center: &Vector3, up: &Vector3) {
        self.view.look_at(eye, center, up);
    }

    pub fn view(&self) -> &Transform4 {
        &self.view
    }

    pub fn projection(&self) -> &Transform4 {
        &self.projection
    }
}
