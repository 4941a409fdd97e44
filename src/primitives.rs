//! Generators for built-in solids.
//!
//! Each function returns plain [`GeometryData`]; pass it to
//! [`Geometry::new`](crate::Geometry::new) to upload it.
//!
//! | Shape     | Vertices          | Indices     |
//! |-----------|-------------------|-------------|
//! | [`cube`]    | 8                 | 36          |
//! | [`sphere`]  | `(W + 1)(H + 1)`  | `6 · W · H` |
//! | [`pyramid`] | 5                 | 18          |
//!
//! # Winding Order
//!
//! Cube faces wind counter-clockwise when seen from outside. The sphere's
//! ring quads and the pyramid base wind the other way, and the sphere emits
//! zero-area triangles at its poles; the default pipeline draws without face
//! culling so all of them render.

use std::f32::consts::PI;

use crate::geometry::{GeometryData, GeometryError, Vertex};

/// Longitude steps for a sphere when the caller has no preference.
pub const DEFAULT_WIDTH_SEGMENTS: u32 = 32;
/// Latitude rings for a sphere when the caller has no preference.
pub const DEFAULT_HEIGHT_SEGMENTS: u32 = 16;

/// An axis-aligned cube of edge length `size`, centered at the origin.
///
/// The eight corners are shared between faces.
pub fn cube(size: f32) -> GeometryData {
    let h = size / 2.0;

    #[rustfmt::skip]
    let vertices = vec![
        // Front face (Z+)
        Vertex::new(-h, -h,  h),
        Vertex::new( h, -h,  h),
        Vertex::new( h,  h,  h),
        Vertex::new(-h,  h,  h),
        // Back face (Z-)
        Vertex::new(-h, -h, -h),
        Vertex::new(-h,  h, -h),
        Vertex::new( h,  h, -h),
        Vertex::new( h, -h, -h),
    ];

    #[rustfmt::skip]
    let indices = vec![
        0, 1, 2,  0, 2, 3, // front
        4, 5, 6,  4, 6, 7, // back
        3, 2, 6,  3, 6, 5, // top
        0, 4, 7,  0, 7, 1, // bottom
        1, 7, 6,  1, 6, 2, // right
        0, 3, 5,  0, 5, 4, // left
    ];

    GeometryData::new(vertices, indices)
}

/// A UV sphere of the given `radius`, centered at the origin.
///
/// Rings run from the north pole (`+Y`) to the south pole. Ring `y` sits at
/// polar angle `θ = y·π/H` and column `x` at azimuth `φ = x·2π/W`; the seam
/// column is duplicated so each ring holds `W + 1` vertices.
///
/// Segment counts below 1 are raised to 1. Fails with
/// [`GeometryError::TooManyVertices`] when the ring grid cannot be addressed
/// with 16-bit indices.
pub fn sphere(
    radius: f32,
    width_segments: u32,
    height_segments: u32,
) -> Result<GeometryData, GeometryError> {
    let w = width_segments.max(1) as usize;
    let h = height_segments.max(1) as usize;

    let vertex_count = (w + 1) * (h + 1);
    if vertex_count > u16::MAX as usize + 1 {
        return Err(GeometryError::TooManyVertices(vertex_count));
    }

    let mut vertices = Vec::with_capacity(vertex_count);
    let mut indices = Vec::with_capacity(6 * w * h);

    for y in 0..=h {
        let theta = y as f32 * PI / h as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for x in 0..=w {
            let phi = x as f32 * 2.0 * PI / w as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            vertices.push(Vertex::new(
                radius * cos_phi * sin_theta,
                radius * cos_theta,
                radius * sin_phi * sin_theta,
            ));

            if x < w && y < h {
                let first = (y * (w + 1) + x) as u16;
                let second = first + w as u16 + 1;

                indices.extend_from_slice(&[first, second, first + 1]);
                indices.extend_from_slice(&[second, second + 1, first + 1]);
            }
        }
    }

    Ok(GeometryData::new(vertices, indices))
}

/// A square-based pyramid resting on the XZ plane with its apex at
/// `(0, height, 0)`.
pub fn pyramid(base_size: f32, height: f32) -> GeometryData {
    let b = base_size / 2.0;

    #[rustfmt::skip]
    let vertices = vec![
        // Base
        Vertex::new(-b, 0.0,  b),
        Vertex::new( b, 0.0,  b),
        Vertex::new( b, 0.0, -b),
        Vertex::new(-b, 0.0, -b),
        // Apex
        Vertex::new(0.0, height, 0.0),
    ];

    #[rustfmt::skip]
    let indices = vec![
        0, 1, 2,  0, 2, 3, // base
        0, 1, 4,
        1, 2, 4,
        2, 3, 4,
        3, 0, 4,
    ];

    GeometryData::new(vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn cube_counts() {
        let cube = cube(1.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.validate().is_ok());
    }

    #[test]
    fn cube_faces_wind_outward() {
        let cube = cube(2.0);
        for [a, b, c] in cube.triangles() {
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(
                normal.dot(centroid) > 0.0,
                "triangle {a:?} {b:?} {c:?} faces inward"
            );
        }
    }

    #[test]
    fn cube_size_sets_extent() {
        let (min, max) = cube(3.0).bounds();
        assert_eq!(min, Vec3::splat(-1.5));
        assert_eq!(max, Vec3::splat(1.5));
    }

    #[test]
    fn sphere_counts_and_index_range() {
        for (w, h) in [(1, 1), (3, 2), (32, 16), (7, 9)] {
            let sphere = sphere(1.0, w, h).unwrap();
            let (w, h) = (w as usize, h as usize);

            assert_eq!(sphere.vertex_count(), (w + 1) * (h + 1));
            assert_eq!(sphere.indices.len(), 6 * w * h);
            assert!(
                sphere
                    .indices
                    .iter()
                    .all(|&i| (i as usize) < sphere.vertex_count())
            );
        }
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let sphere = sphere(2.5, 12, 6).unwrap();
        for v in &sphere.vertices {
            let length = Vec3::from(v.position).length();
            assert!((length - 2.5).abs() < 1e-4);
        }
    }

    #[test]
    fn sphere_starts_at_north_pole() {
        let sphere = sphere(1.0, 4, 4).unwrap();
        let first = Vec3::from(sphere.vertices[0].position);
        let last = Vec3::from(sphere.vertices.last().unwrap().position);
        assert!((first - Vec3::Y).length() < 1e-5);
        assert!((last + Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn sphere_zero_segments_raised_to_one() {
        let sphere = sphere(1.0, 0, 0).unwrap();
        assert_eq!(sphere.vertex_count(), 4);
        assert_eq!(sphere.indices.len(), 6);
    }

    #[test]
    fn sphere_rejects_grids_beyond_u16() {
        assert_eq!(
            sphere(1.0, 512, 256),
            Err(GeometryError::TooManyVertices(513 * 257))
        );
    }

    #[test]
    fn pyramid_counts() {
        let pyramid = pyramid(2.0, 3.0);
        assert_eq!(pyramid.vertex_count(), 5);
        assert_eq!(pyramid.indices.len(), 18);
        assert!(pyramid.validate().is_ok());

        let (min, max) = pyramid.bounds();
        assert_eq!(min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 3.0, 1.0));
    }
}
