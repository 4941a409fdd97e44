//! An ordered collection of meshes rendered against one camera.
//!
//! Meshes are added once and addressed afterwards through the [`MeshId`]
//! returned by [`Scene::add`]. Rendering walks the meshes in insertion order
//! and issues exactly one draw per mesh.
//!
//! ```ignore
//! use trigon::*;
//!
//! let mut scene = Scene::new();
//! let cube = scene.add(Mesh::new(cube_geometry, material));
//!
//! scene.get_mut(cube).unwrap().rotate_y(0.01);
//! scene.render(&mut gpu, &camera)?;
//! ```

use crate::camera::Camera;
use crate::context::GraphicsContext;
use crate::mesh::{Mesh, RenderError};

/// Type-safe handle to a mesh stored in a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) usize);

/// Meshes in insertion order.
#[derive(Debug, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a mesh; it will be drawn after every mesh added before it.
    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(index, mesh)| (MeshId(index), mesh))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Draws every mesh in insertion order.
    ///
    /// Stops at the first mesh that fails to draw. Returns the number of
    /// draws issued.
    pub fn render(
        &self,
        ctx: &mut dyn GraphicsContext,
        camera: &Camera,
    ) -> Result<usize, RenderError> {
        for (id, mesh) in self.iter() {
            mesh.draw(ctx, camera).inspect_err(|err| {
                log::error!("failed to draw mesh {:?}: {err}", id);
            })?;
        }
        Ok(self.meshes.len())
    }
}
