//! Vertex and index data, and its GPU-resident form.
//!
//! Shapes are produced as [`GeometryData`], a plain list of position triples
//! plus `u16` triangle indices. [`Geometry::new`] validates that data and
//! uploads it into a vertex buffer and an index buffer once; the buffers live
//! as long as the geometry.
//!
//! ```ignore
//! use trigon::{primitives, Geometry};
//!
//! let cube = Geometry::new(&mut gpu, primitives::cube(1.0))?;
//! ```
//!
//! # Vertex Layout
//!
//! | Attribute    | Format    | Offset | Shader Location |
//! |--------------|-----------|--------|-----------------|
//! | `a_position` | Float32x3 | 0      | 0               |

use glam::Vec3;
use thiserror::Error;

use crate::context::{BufferId, BufferKind, GraphicsContext, POSITION_ATTRIBUTE, ProgramId};

/// Errors raised while validating, uploading or binding geometry.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u16, vertex_count: usize },
    #[error("{0} vertices cannot be addressed by 16-bit indices")]
    TooManyVertices(usize),
    #[error("program has no `{0}` attribute")]
    MissingAttribute(&'static str),
}

/// A single vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    /// The wgpu vertex buffer layout matching [`Vertex`].
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
        }
    }
}

/// Geometry data before GPU upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl GeometryData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u16>) -> Self {
        Self { vertices, indices }
    }

    /// Builds geometry from a flat `[x, y, z, x, y, z, ...]` list.
    ///
    /// A trailing partial triple is ignored.
    pub fn from_flat(positions: &[f32], indices: Vec<u16>) -> Self {
        let vertices = positions
            .chunks_exact(3)
            .map(|p| Vertex::new(p[0], p[1], p[2]))
            .collect();
        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates the vertex positions of each triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [0, 1, 2].map(|corner| Vec3::from(self.vertices[tri[corner] as usize].position))
        })
    }

    /// Computes the axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        if self.vertices.is_empty() {
            return (Vec3::ZERO, Vec3::ZERO);
        }

        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    /// Center of the bounding box.
    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    /// Checks that the indices describe whole triangles over existing vertices.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let vertex_count = self.vertices.len();
        if vertex_count > u16::MAX as usize + 1 {
            return Err(GeometryError::TooManyVertices(vertex_count));
        }
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::IncompleteTriangle(self.indices.len()));
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&index| index as usize >= vertex_count)
        {
            return Err(GeometryError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        Ok(())
    }
}

/// GPU-resident geometry: the source data plus its vertex and index buffers.
///
/// Immutable after construction. Share it between meshes with an `Rc`.
#[derive(Debug)]
pub struct Geometry {
    data: GeometryData,
    vertex_buffer: BufferId,
    index_buffer: BufferId,
}

impl Geometry {
    /// Validates `data` and uploads it.
    pub fn new(ctx: &mut dyn GraphicsContext, data: GeometryData) -> Result<Self, GeometryError> {
        data.validate()?;

        let vertex_buffer = ctx.create_buffer(
            BufferKind::Vertex,
            "Geometry Vertex Buffer",
            bytemuck::cast_slice(&data.vertices),
        );
        let index_buffer = ctx.create_buffer(
            BufferKind::Index,
            "Geometry Index Buffer",
            bytemuck::cast_slice(&data.indices),
        );

        log::debug!(
            "uploaded geometry: {} vertices, {} triangles",
            data.vertex_count(),
            data.triangle_count()
        );

        Ok(Self {
            data,
            vertex_buffer,
            index_buffer,
        })
    }

    /// Binds the buffers and the position attribute layout for `program`.
    pub fn bind(&self, ctx: &mut dyn GraphicsContext, program: ProgramId) -> Result<(), GeometryError> {
        let location = ctx
            .attribute_location(program, POSITION_ATTRIBUTE)
            .ok_or(GeometryError::MissingAttribute(POSITION_ATTRIBUTE))?;

        ctx.bind_vertex_buffer(self.vertex_buffer, location);
        ctx.bind_index_buffer(self.index_buffer);
        Ok(())
    }

    pub fn data(&self) -> &GeometryData {
        &self.data
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.data.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.data.indices
    }

    pub fn index_count(&self) -> u32 {
        self.data.indices.len() as u32
    }

    pub fn vertex_buffer(&self) -> BufferId {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> BufferId {
        self.index_buffer
    }
}
