//! Drawable objects: geometry + material + a placement in the world.
//!
//! A [`Mesh`] shares its [`Geometry`] and [`Material`] through `Rc`, so many
//! meshes can reuse one upload and one program. It owns its position,
//! rotation (Euler angles in radians, per axis) and scale.
//!
//! # Model Transform
//!
//! Every setter rebuilds the model transform from identity in a fixed order:
//!
//! ```text
//! translate(position) · rotate_x(rx) · rotate_y(ry) · rotate_z(rz) · scale(scale)
//! ```
//!
//! The matrix is never patched incrementally, so repeated updates cannot
//! accumulate drift.
//!
//! # Drawing
//!
//! [`Mesh::draw`] binds the material, binds the geometry's buffers, uploads
//! `u_model`, `u_view` and `u_projection`, and issues one indexed draw over
//! the full index list.

use std::rc::Rc;

use thiserror::Error;

use crate::camera::Camera;
use crate::context::{
    ContextError, GraphicsContext, MODEL_UNIFORM, PROJECTION_UNIFORM, VIEW_UNIFORM,
};
use crate::geometry::{Geometry, GeometryError};
use crate::material::{Material, MaterialError};
use crate::transform::Transform4;
use crate::vector::Vector3;

/// Why a draw could not be issued.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Material(#[from] MaterialError),
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// A geometry/material pair placed in the world.
#[derive(Debug)]
pub struct Mesh {
    geometry: Rc<Geometry>,
    material: Rc<Material>,
    position: Vector3,
    rotation: Vector3,
    scale: Vector3,
    model: Transform4,
}

impl Mesh {
    /// Creates a mesh at the origin with no rotation and unit scale.
    pub fn new(geometry: Rc<Geometry>, material: Rc<Material>) -> Self {
        let mut mesh = Self {
            geometry,
            material,
            position: Vector3::ZERO,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
            model: Transform4::new(),
        };
        mesh.update_model_matrix();
        mesh
    }

    pub fn geometry(&self) -> &Rc<Geometry> {
        &self.geometry
    }

    pub fn material(&self) -> &Rc<Material> {
        &self.material
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Euler angles in radians.
    pub fn rotation(&self) -> Vector3 {
        self.rotation
    }

    pub fn scale(&self) -> Vector3 {
        self.scale
    }

    pub fn model_matrix(&self) -> &Transform4 {
        &self.model
    }

    pub fn set_position(&mut self, position: Vector3) {
        self.position.copy_from(&position);
        self.update_model_matrix();
    }

    /// Moves the mesh by `offset` relative to its current position.
    pub fn translate(&mut self, offset: Vector3) {
        self.position.add(&offset);
        self.update_model_matrix();
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation.set(x, y, z);
        self.update_model_matrix();
    }

    pub fn rotate_x(&mut self, angle: f32) {
        self.rotation.x += angle;
        self.update_model_matrix();
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation.y += angle;
        self.update_model_matrix();
    }

    pub fn rotate_z(&mut self, angle: f32) {
        self.rotation.z += angle;
        self.update_model_matrix();
    }

    pub fn set_scale(&mut self, scale: Vector3) {
        self.scale.copy_from(&scale);
        self.update_model_matrix();
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.set_scale(Vector3::splat(scale));
    }

    fn update_model_matrix(&mut self) {
        self.model
            .identity()
            .translate(&self.position)
            .rotate_x(self.rotation.x)
            .rotate_y(self.rotation.y)
            .rotate_z(self.rotation.z)
            .scale(&self.scale);
    }

    /// Issues this mesh's draw call with the camera's view and projection.
    pub fn draw(&self, ctx: &mut dyn GraphicsContext, camera: &Camera) -> Result<(), RenderError> {
        let material = &self.material;
        material.bind(ctx);
        self.geometry.bind(ctx, material.program())?;

        for (name, transform) in [
            (MODEL_UNIFORM, &self.model),
            (VIEW_UNIFORM, camera.view()),
            (PROJECTION_UNIFORM, camera.projection()),
        ] {
            let location = material.uniform(ctx, name)?;
            ctx.set_uniform_mat4(location, &transform.matrix());
        }

        ctx.draw_indexed(self.geometry.index_count())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::POSITION_ATTRIBUTE;
    use crate::context::recording::{Call, RecordingContext};
    use crate::primitives;
    use glam::{Mat4, Vec3};

    fn cube_mesh(ctx: &mut RecordingContext) -> Mesh {
        let geometry = Rc::new(Geometry::new(ctx, primitives::cube(1.0)).unwrap());
        let material = Rc::new(Material::basic(ctx).unwrap());
        Mesh::new(geometry, material)
    }

    #[test]
    fn new_mesh_has_identity_model() {
        let mut ctx = RecordingContext::new();
        let mesh = cube_mesh(&mut ctx);
        assert_eq!(mesh.model_matrix().matrix(), Mat4::IDENTITY);
        assert_eq!(mesh.scale(), Vector3::ONE);
    }

    #[test]
    fn set_position_is_pure_translation() {
        let mut ctx = RecordingContext::new();
        let mut mesh = cube_mesh(&mut ctx);

        mesh.set_position(Vector3::new(1.0, 2.0, 3.0));

        assert_eq!(
            mesh.model_matrix().matrix(),
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn model_composes_translate_rotate_scale_in_order() {
        let mut ctx = RecordingContext::new();
        let mut mesh = cube_mesh(&mut ctx);

        mesh.set_scale(Vector3::new(2.0, 3.0, 4.0));
        mesh.set_rotation(0.1, 0.2, 0.3);
        mesh.set_position(Vector3::new(-1.0, 0.5, 8.0));

        let expected = Mat4::from_translation(Vec3::new(-1.0, 0.5, 8.0))
            * Mat4::from_rotation_x(0.1)
            * Mat4::from_rotation_y(0.2)
            * Mat4::from_rotation_z(0.3)
            * Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0));

        assert!(mesh.model_matrix().matrix().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn repeated_updates_do_not_drift() {
        let mut ctx = RecordingContext::new();
        let mut mesh = cube_mesh(&mut ctx);

        for _ in 0..100 {
            mesh.set_position(Vector3::new(1.0, 1.0, 1.0));
            mesh.set_uniform_scale(2.0);
        }

        let expected = Mat4::from_translation(Vec3::ONE) * Mat4::from_scale(Vec3::splat(2.0));
        assert_eq!(mesh.model_matrix().matrix(), expected);
    }

    #[test]
    fn incremental_rotation_accumulates_angles() {
        let mut ctx = RecordingContext::new();
        let mut mesh = cube_mesh(&mut ctx);

        mesh.rotate_x(0.25);
        mesh.rotate_x(0.25);
        mesh.rotate_z(-1.0);
        mesh.translate(Vector3::new(0.0, 1.0, 0.0));
        mesh.translate(Vector3::new(0.0, 1.0, 0.0));

        assert_eq!(mesh.rotation(), Vector3::new(0.5, 0.0, -1.0));
        assert_eq!(mesh.position(), Vector3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn draw_binds_uploads_and_draws_full_index_list() {
        let mut ctx = RecordingContext::new();
        let mut mesh = cube_mesh(&mut ctx);
        mesh.set_position(Vector3::new(0.0, 0.0, -4.0));

        let mut camera = Camera::new();
        camera.set_perspective(1.0, 1.0, 0.1, 10.0);
        ctx.clear_calls();

        mesh.draw(&mut ctx, &camera).unwrap();

        let program = mesh.material().program();
        assert_eq!(
            ctx.calls,
            vec![
                Call::UseProgram(program),
                Call::BindVertexBuffer {
                    buffer: mesh.geometry().vertex_buffer(),
                    location: 0
                },
                Call::BindIndexBuffer(mesh.geometry().index_buffer()),
                Call::SetMat4 {
                    name: MODEL_UNIFORM,
                    value: mesh.model_matrix().matrix()
                },
                Call::SetMat4 {
                    name: VIEW_UNIFORM,
                    value: Mat4::IDENTITY
                },
                Call::SetMat4 {
                    name: PROJECTION_UNIFORM,
                    value: camera.projection().matrix()
                },
                Call::Draw {
                    program,
                    index_buffer: mesh.geometry().index_buffer(),
                    index_count: 36,
                    model: Some(mesh.model_matrix().matrix()),
                },
            ]
        );
    }

    #[test]
    fn draw_reports_missing_position_attribute() {
        let mut ctx = RecordingContext::new();
        ctx.missing_position = true;
        let mesh = cube_mesh(&mut ctx);

        let err = mesh.draw(&mut ctx, &Camera::new()).unwrap_err();

        assert!(matches!(
            err,
            RenderError::Geometry(GeometryError::MissingAttribute(name)) if name == POSITION_ATTRIBUTE
        ));
        assert!(ctx.draws().is_empty());
    }

    #[test]
    fn draw_reports_missing_matrix_uniform() {
        let mut ctx = RecordingContext::new();
        ctx.missing_uniforms.push(VIEW_UNIFORM);
        let mesh = cube_mesh(&mut ctx);

        let err = mesh.draw(&mut ctx, &Camera::new()).unwrap_err();

        assert!(matches!(
            err,
            RenderError::Material(MaterialError::MissingUniform(ref name)) if name == VIEW_UNIFORM
        ));
        assert!(ctx.draws().is_empty());
    }
}
