//! A [`GraphicsContext`] that records calls instead of touching a GPU.

use std::collections::HashMap;

use glam::{Mat4, Vec4};

use super::{
    BufferId, BufferKind, COLOR_UNIFORM, ContextError, GraphicsContext, MODEL_UNIFORM,
    POSITION_ATTRIBUTE, PROJECTION_UNIFORM, ProgramId, ShaderId, ShaderStage, UniformLocation,
    VIEW_UNIFORM,
};

/// Shader sources containing this marker fail to compile.
pub(crate) const COMPILE_ERROR_MARKER: &str = "@compile_error";

const UNIFORMS: [&str; 4] = [MODEL_UNIFORM, VIEW_UNIFORM, PROJECTION_UNIFORM, COLOR_UNIFORM];

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    CreateBuffer {
        kind: BufferKind,
        len: usize,
    },
    CompileShader(ShaderStage),
    LinkProgram,
    UseProgram(ProgramId),
    BindVertexBuffer {
        buffer: BufferId,
        location: u32,
    },
    BindIndexBuffer(BufferId),
    SetMat4 {
        name: &'static str,
        value: Mat4,
    },
    SetVec4 {
        name: &'static str,
        value: Vec4,
    },
    Draw {
        program: ProgramId,
        index_buffer: BufferId,
        index_count: u32,
        model: Option<Mat4>,
    },
}

#[derive(Default)]
pub(crate) struct RecordingContext {
    pub calls: Vec<Call>,
    /// Uniform names every linked program pretends not to declare.
    pub missing_uniforms: Vec<&'static str>,
    pub missing_position: bool,
    pub fail_link: bool,
    buffers: Vec<Vec<u8>>,
    shaders: Vec<ShaderStage>,
    programs: usize,
    current_program: Option<ProgramId>,
    index_buffer: Option<BufferId>,
    vertex_bound: bool,
    mat4_values: HashMap<(ProgramId, usize), Mat4>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer_contents(&self, buffer: BufferId) -> &[u8] {
        &self.buffers[buffer.0]
    }

    pub fn draws(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Draw { .. }))
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl GraphicsContext for RecordingContext {
    fn create_buffer(&mut self, kind: BufferKind, _label: &str, contents: &[u8]) -> BufferId {
        self.calls.push(Call::CreateBuffer {
            kind,
            len: contents.len(),
        });
        self.buffers.push(contents.to_vec());
        BufferId(self.buffers.len() - 1)
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderId, ContextError> {
        self.calls.push(Call::CompileShader(stage));
        if source.contains(COMPILE_ERROR_MARKER) {
            return Err(ContextError::ShaderCompile {
                stage,
                log: "unexpected token".to_string(),
            });
        }
        self.shaders.push(stage);
        Ok(ShaderId(self.shaders.len() - 1))
    }

    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, ContextError> {
        self.calls.push(Call::LinkProgram);
        for shader in [vertex, fragment] {
            if shader.0 >= self.shaders.len() {
                return Err(ContextError::UnknownHandle {
                    kind: "shader",
                    index: shader.0,
                });
            }
        }
        if self.fail_link {
            return Err(ContextError::ProgramLink {
                log: "varying mismatch".to_string(),
            });
        }
        self.programs += 1;
        Ok(ProgramId(self.programs - 1))
    }

    fn attribute_location(&self, _program: ProgramId, name: &str) -> Option<u32> {
        (name == POSITION_ATTRIBUTE && !self.missing_position).then_some(0)
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        if self.missing_uniforms.contains(&name) {
            return None;
        }
        UNIFORMS
            .iter()
            .position(|known| *known == name)
            .map(|slot| UniformLocation::new(program, slot))
    }

    fn use_program(&mut self, program: ProgramId) {
        self.calls.push(Call::UseProgram(program));
        self.current_program = Some(program);
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferId, location: u32) {
        self.calls.push(Call::BindVertexBuffer { buffer, location });
        self.vertex_bound = true;
    }

    fn bind_index_buffer(&mut self, buffer: BufferId) {
        self.calls.push(Call::BindIndexBuffer(buffer));
        self.index_buffer = Some(buffer);
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        self.calls.push(Call::SetMat4 {
            name: UNIFORMS[location.slot],
            value: *value,
        });
        self.mat4_values
            .insert((location.program, location.slot), *value);
    }

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4) {
        self.calls.push(Call::SetVec4 {
            name: UNIFORMS[location.slot],
            value,
        });
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<(), ContextError> {
        let program = self.current_program.ok_or(ContextError::NotBound("program"))?;
        let index_buffer = self.index_buffer.ok_or(ContextError::NotBound("index buffer"))?;
        if !self.vertex_bound {
            return Err(ContextError::NotBound("vertex buffer"));
        }
        let model = self.mat4_values.get(&(program, 0)).copied();
        self.calls.push(Call::Draw {
            program,
            index_buffer,
            index_count,
            model,
        });
        Ok(())
    }
}
