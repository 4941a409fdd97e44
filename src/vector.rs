//! Three-component vectors with in-place arithmetic.
//!
//! [`Vector3`] is the value type behind mesh positions, rotations and scales.
//! Every arithmetic method mutates the receiver and hands back `&mut Self`,
//! so calls can be chained without copying:
//!
//! ```
//! use trigon::Vector3;
//!
//! let mut v = Vector3::new(3.0, 0.0, 4.0);
//! v.normalize().multiply_scalar(2.0);
//! assert!((v.length() - 2.0).abs() < 1e-6);
//! ```
//!
//! Conversions to and from [`glam::Vec3`] are provided for handing values to
//! the matrix math in [`Transform4`](crate::Transform4).

use glam::Vec3;

/// A mutable `(x, y, z)` float triple.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// A vector with all three components set to `value`.
    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }

    /// Overwrites all three components.
    pub fn set(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    pub fn add(&mut self, other: &Vector3) -> &mut Self {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
        self
    }

    pub fn subtract(&mut self, other: &Vector3) -> &mut Self {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
        self
    }

    pub fn multiply_scalar(&mut self, scalar: f32) -> &mut Self {
        self.x *= scalar;
        self.y *= scalar;
        self.z *= scalar;
        self
    }

    /// Scales the vector to unit length.
    ///
    /// Leaves the vector untouched when its length is not positive.
    pub fn normalize(&mut self) -> &mut Self {
        let length = self.length();
        if length > 0.0 {
            self.x /= length;
            self.y /= length;
            self.z /= length;
        }
        self
    }

    /// Copies the components of `other` into this vector.
    pub fn copy_from(&mut self, other: &Vector3) -> &mut Self {
        *self = *other;
        self
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn dot(&self, other: &Vector3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vector3> for [f32; 3] {
    fn from(v: Vector3) -> Self {
        v.to_array()
    }
}

impl From<Vec3> for Vector3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for Vec3 {
    fn from(v: Vector3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}
