//! The graphics capability the scene layer draws through.
//!
//! Everything above this module (geometry, materials, meshes, scenes) talks to
//! the GPU only via [`GraphicsContext`]. The production implementation is
//! [`GpuContext`](crate::GpuContext), backed by wgpu; tests use a recording
//! double that logs each call.
//!
//! Resources are referred to by typed handles. A [`BufferId`] cannot be passed
//! where a [`ProgramId`] is expected, and the backend owns the actual objects.
//!
//! # Shader interface
//!
//! Programs are expected to read positions from the attribute named
//! [`POSITION_ATTRIBUTE`] and to declare the uniforms [`MODEL_UNIFORM`],
//! [`VIEW_UNIFORM`], [`PROJECTION_UNIFORM`] and [`COLOR_UNIFORM`].

use glam::{Mat4, Vec4};
use thiserror::Error;

#[cfg(test)]
pub(crate) mod recording;

/// Vertex attribute carrying the position triple.
pub const POSITION_ATTRIBUTE: &str = "a_position";
/// Model (object → world) matrix uniform.
pub const MODEL_UNIFORM: &str = "u_model";
/// View (world → camera) matrix uniform.
pub const VIEW_UNIFORM: &str = "u_view";
/// Projection (camera → clip) matrix uniform.
pub const PROJECTION_UNIFORM: &str = "u_projection";
/// Flat RGBA color uniform.
pub const COLOR_UNIFORM: &str = "u_color";

/// Handle to a GPU buffer owned by a [`GraphicsContext`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) usize);

/// Handle to a compiled shader stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderId(pub(crate) usize);

/// Handle to a linked shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub(crate) usize);

/// Location of a uniform inside a program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation {
    pub(crate) program: ProgramId,
    pub(crate) slot: usize,
}

macro_rules! raw_handle {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                /// Wraps a backend-specific index.
                pub fn from_raw(index: usize) -> Self {
                    Self(index)
                }
            }
        )*
    };
}

raw_handle!(BufferId, ShaderId, ProgramId);

impl UniformLocation {
    pub fn new(program: ProgramId, slot: usize) -> Self {
        Self { program, slot }
    }

    pub fn program(self) -> ProgramId {
        self.program
    }

    pub fn slot(self) -> usize {
        self.slot
    }
}

/// Which pipeline stage a shader source targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Intended use of a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Failures reported by a [`GraphicsContext`].
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("program failed to link: {log}")]
    ProgramLink { log: String },
    #[error("unknown {kind} handle {index}")]
    UnknownHandle { kind: &'static str, index: usize },
    #[error("draw issued with no {0} bound")]
    NotBound(&'static str),
}

/// Graphics operations needed to upload geometry, build programs and draw.
///
/// Uniform values are program state: a value set while a program is in use
/// stays until it is overwritten, and every draw sees the values current at
/// the time it was issued.
pub trait GraphicsContext {
    /// Creates a buffer initialised with `contents`.
    fn create_buffer(&mut self, kind: BufferKind, label: &str, contents: &[u8]) -> BufferId;

    /// Compiles one shader stage. The error carries the backend's info log.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str)
    -> Result<ShaderId, ContextError>;

    /// Links a vertex and a fragment shader into a program.
    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, ContextError>;

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32>;

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Makes `program` current for uniform uploads and draws.
    fn use_program(&mut self, program: ProgramId);

    /// Binds a vertex buffer of tightly packed `f32` triples to an attribute.
    fn bind_vertex_buffer(&mut self, buffer: BufferId, location: u32);

    /// Binds a buffer of `u16` triangle indices.
    fn bind_index_buffer(&mut self, buffer: BufferId);

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4);

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4);

    /// Draws `index_count` indices from the bound index buffer as a triangle list.
    fn draw_indexed(&mut self, index_count: u32) -> Result<(), ContextError>;
}
