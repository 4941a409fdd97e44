//! Composable 4×4 transforms.
//!
//! [`Transform4`] wraps a [`glam::Mat4`] and composes by right-multiplication:
//! every `translate`/`rotate_*`/`scale`/`multiply` call post-multiplies the
//! current matrix, so operations accumulate in the order they are invoked.
//!
//! ```
//! use trigon::{Transform4, Vector3};
//!
//! let mut t = Transform4::new();
//! t.translate(&Vector3::new(1.0, 2.0, 3.0))
//!     .rotate_y(std::f32::consts::FRAC_PI_2)
//!     .scale(&Vector3::splat(2.0));
//! ```
//!
//! `perspective` and `look_at` replace the matrix outright instead of
//! composing onto it.

use glam::{Mat4, Vec3};

use crate::vector::Vector3;

/// A 4×4 transformation matrix. Starts as identity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform4 {
    matrix: Mat4,
}

impl Default for Transform4 {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }
}

impl Transform4 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// Resets the matrix to identity.
    pub fn identity(&mut self) -> &mut Self {
        self.matrix = Mat4::IDENTITY;
        self
    }

    pub fn translate(&mut self, offset: &Vector3) -> &mut Self {
        self.matrix *= Mat4::from_translation(Vec3::from(*offset));
        self
    }

    pub fn rotate_x(&mut self, angle: f32) -> &mut Self {
        self.matrix *= Mat4::from_rotation_x(angle);
        self
    }

    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        self.matrix *= Mat4::from_rotation_y(angle);
        self
    }

    pub fn rotate_z(&mut self, angle: f32) -> &mut Self {
        self.matrix *= Mat4::from_rotation_z(angle);
        self
    }

    pub fn scale(&mut self, factors: &Vector3) -> &mut Self {
        self.matrix *= Mat4::from_scale(Vec3::from(*factors));
        self
    }

    pub fn multiply(&mut self, other: &Transform4) -> &mut Self {
        self.matrix *= other.matrix;
        self
    }

    /// Replaces the matrix with a right-handed perspective projection.
    ///
    /// Depth maps to `[0, 1]`, the clip-space convention wgpu uses.
    /// `fov_y` is in radians.
    pub fn perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) -> &mut Self {
        self.matrix = Mat4::perspective_rh(fov_y, aspect, near, far);
        self
    }

    /// Replaces the matrix with a right-handed view matrix looking from `eye`
    /// towards `center`.
    pub fn look_at(&mut self, eye: &Vector3, center: &Vector3, up: &Vector3) -> &mut Self {
        self.matrix = Mat4::look_at_rh(
            Vec3::from(*eye),
            Vec3::from(*center),
            Vec3::from(*up),
        );
        self
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Column-major element order, as uploaded to shaders.
    pub fn to_cols_array(&self) -> [f32; 16] {
        self.matrix.to_cols_array()
    }

    /// Transforms a point (w = 1).
    pub fn transform_point(&self, point: &Vector3) -> Vector3 {
        self.matrix.transform_point3(Vec3::from(*point)).into()
    }
}

impl From<Mat4> for Transform4 {
    fn from(matrix: Mat4) -> Self {
        Self::from_matrix(matrix)
    }
}
