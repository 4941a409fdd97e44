//! Shader programs and their uniform interface.
//!
//! A [`Material`] is a linked vertex + fragment program. Construction either
//! yields a usable program or an error describing which stage failed and why,
//! so a material can never hold a null program.
//!
//! ```ignore
//! use trigon::{Color, Material};
//!
//! let material = Material::basic(&mut gpu)?;
//! material.set_color(&mut gpu, Color::rgb(0.9, 0.3, 0.2))?;
//! ```

use std::borrow::Cow;

use glam::{Mat4, Vec4};
use thiserror::Error;

use crate::color::Color;
use crate::context::{
    COLOR_UNIFORM, ContextError, GraphicsContext, ProgramId, ShaderStage, UniformLocation,
};

/// Errors raised while building a material or writing its uniforms.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {log}")]
    Link { log: String },
    #[error("uniform `{0}` not found in shader program")]
    MissingUniform(String),
    #[error(transparent)]
    Context(ContextError),
}

impl From<ContextError> for MaterialError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::ShaderCompile { stage, log } => MaterialError::Compile { stage, log },
            ContextError::ProgramLink { log } => MaterialError::Link { log },
            other => MaterialError::Context(other),
        }
    }
}

/// A vertex and fragment shader source pair.
#[derive(Clone, Debug)]
pub struct ShaderSources {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<Cow<'static, str>>, fragment: impl Into<Cow<'static, str>>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Flat-colored shaders: `projection * view * model * position`, filled
    /// with `u_color`.
    pub fn basic() -> Self {
        Self::new(
            include_str!("shaders/basic_vertex.wgsl"),
            include_str!("shaders/basic_fragment.wgsl"),
        )
    }
}

/// A compiled, linked shader program plus the sources it was built from.
#[derive(Debug)]
pub struct Material {
    program: ProgramId,
    sources: ShaderSources,
}

impl Material {
    /// Compiles both stages and links them.
    pub fn new(
        ctx: &mut dyn GraphicsContext,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, MaterialError> {
        Self::from_sources(
            ctx,
            ShaderSources::new(vertex_source.to_owned(), fragment_source.to_owned()),
        )
    }

    pub fn from_sources(
        ctx: &mut dyn GraphicsContext,
        sources: ShaderSources,
    ) -> Result<Self, MaterialError> {
        let program = build_program(ctx, &sources).inspect_err(|err| {
            log::warn!("material build failed: {err}");
        })?;

        log::debug!("linked material program {:?}", program);
        Ok(Self { program, sources })
    }

    /// A material using [`ShaderSources::basic`].
    pub fn basic(ctx: &mut dyn GraphicsContext) -> Result<Self, MaterialError> {
        Self::from_sources(ctx, ShaderSources::basic())
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn sources(&self) -> &ShaderSources {
        &self.sources
    }

    /// Makes this material's program current.
    pub fn bind(&self, ctx: &mut dyn GraphicsContext) {
        ctx.use_program(self.program);
    }

    pub fn uniform(
        &self,
        ctx: &dyn GraphicsContext,
        name: &str,
    ) -> Result<UniformLocation, MaterialError> {
        ctx.uniform_location(self.program, name)
            .ok_or_else(|| MaterialError::MissingUniform(name.to_owned()))
    }

    /// Binds the program and writes `u_color`.
    pub fn set_color(&self, ctx: &mut dyn GraphicsContext, color: Color) -> Result<(), MaterialError> {
        self.set_vec4(ctx, COLOR_UNIFORM, color.into())
    }

    pub fn set_vec4(
        &self,
        ctx: &mut dyn GraphicsContext,
        name: &str,
        value: Vec4,
    ) -> Result<(), MaterialError> {
        let location = self.uniform(ctx, name)?;
        self.bind(ctx);
        ctx.set_uniform_vec4(location, value);
        Ok(())
    }

    pub fn set_mat4(
        &self,
        ctx: &mut dyn GraphicsContext,
        name: &str,
        value: &Mat4,
    ) -> Result<(), MaterialError> {
        let location = self.uniform(ctx, name)?;
        self.bind(ctx);
        ctx.set_uniform_mat4(location, value);
        Ok(())
    }
}

fn build_program(
    ctx: &mut dyn GraphicsContext,
    sources: &ShaderSources,
) -> Result<ProgramId, MaterialError> {
    let vertex = ctx.compile_shader(ShaderStage::Vertex, &sources.vertex)?;
    let fragment = ctx.compile_shader(ShaderStage::Fragment, &sources.fragment)?;
    Ok(ctx.link_program(vertex, fragment)?)
}
