//! # Trigon
//!
//! **A small retained-mode 3D scene layer over wgpu.**
//!
//! Build meshes from generated geometry and flat-color materials, place them
//! with position/rotation/scale, point a perspective camera at them, and let
//! an [`Animator`] move them over time.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::rc::Rc;
//! use trigon::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     run(|ctx| {
//!         let geometry = Rc::new(Geometry::new(ctx.gpu, primitives::cube(1.0)).unwrap());
//!         let material = Rc::new(Material::basic(ctx.gpu).unwrap());
//!         material.set_color(ctx.gpu, Color::RED).unwrap();
//!         let cube = ctx.scene.add(Mesh::new(geometry, material));
//!
//!         ctx.camera.set_perspective(1.0, ctx.aspect(), 0.1, 100.0);
//!         ctx.camera.look_at(
//!             &Vector3::new(0.0, 2.0, 5.0),
//!             &Vector3::ZERO,
//!             &Vector3::new(0.0, 1.0, 0.0),
//!         );
//!
//!         move |frame| {
//!             if let Some(mesh) = frame.scene.get_mut(cube) {
//!                 mesh.rotate_y(frame.dt);
//!             }
//!         }
//!     })?;
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! - **Math**: [`Vector3`] and [`Transform4`], thin mutable wrappers over glam.
//! - **Graphics seam**: [`GraphicsContext`], implemented by [`GpuContext`].
//! - **Scene graph**: [`Geometry`], [`Material`], [`Mesh`], [`Camera`], [`Scene`].
//! - **Motion**: [`Animator`] tracks that interpolate mesh properties.

mod animation;
mod app;
mod camera;
mod color;
mod context;
mod geometry;
mod gpu;
mod material;
mod mesh;
pub mod primitives;
mod scene;
mod transform;
mod vector;

pub use animation::{AnimatedProperty, Animator, Axes, Easing, Track, TrackState};
pub use app::{AppConfig, Frame, SetupContext, run, run_with_config};
pub use camera::Camera;
pub use color::Color;
pub use context::{
    BufferId, BufferKind, COLOR_UNIFORM, ContextError, GraphicsContext, MODEL_UNIFORM,
    POSITION_ATTRIBUTE, PROJECTION_UNIFORM, ProgramId, ShaderId, ShaderStage, UniformLocation,
    VIEW_UNIFORM,
};
pub use geometry::{Geometry, GeometryData, GeometryError, Vertex};
pub use gpu::{GpuContext, MeshUniforms};
pub use material::{Material, MaterialError, ShaderSources};
pub use mesh::{Mesh, RenderError};
pub use scene::{MeshId, Scene};
pub use transform::Transform4;
pub use vector::Vector3;

// Re-export the math types for convenience
pub use glam::{Mat4, Vec3, Vec4};
