//! Uniform and vertex-input names declared by WGSL modules.
//!
//! Lookups on [`GpuContext`](super::GpuContext) answer from what the linked
//! modules actually declare, read with naga's WGSL front end.

use naga::{AddressSpace, Binding, Module, TypeInner};

/// Names one module (or a linked pair of modules) exposes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ShaderInterface {
    /// Members of `var<uniform>` structs, or the variable name for non-struct uniforms.
    pub(crate) uniforms: Vec<String>,
    /// Vertex entry point inputs with their `@location`.
    pub(crate) attributes: Vec<(String, u32)>,
}

impl ShaderInterface {
    /// Parses `source` as WGSL. The error is naga's rendered diagnostic.
    pub(crate) fn parse(source: &str) -> Result<Self, String> {
        let module =
            naga::front::wgsl::parse_str(source).map_err(|err| err.emit_to_string(source))?;
        Ok(Self::from_module(&module))
    }

    fn from_module(module: &Module) -> Self {
        let mut interface = Self::default();

        for (_, global) in module.global_variables.iter() {
            if global.space != AddressSpace::Uniform {
                continue;
            }
            match &module.types[global.ty].inner {
                TypeInner::Struct { members, .. } => interface
                    .uniforms
                    .extend(members.iter().filter_map(|member| member.name.clone())),
                _ => interface.uniforms.extend(global.name.clone()),
            }
        }

        let vertex_entries = module
            .entry_points
            .iter()
            .filter(|entry| entry.stage == naga::ShaderStage::Vertex);
        for entry in vertex_entries {
            for argument in &entry.function.arguments {
                match (&argument.binding, &module.types[argument.ty].inner) {
                    (Some(Binding::Location { location, .. }), _) => {
                        if let Some(name) = &argument.name {
                            interface.attributes.push((name.clone(), *location));
                        }
                    }
                    (None, TypeInner::Struct { members, .. }) => {
                        for member in members {
                            if let (Some(name), Some(Binding::Location { location, .. })) =
                                (&member.name, &member.binding)
                            {
                                interface.attributes.push((name.clone(), *location));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        interface
    }

    /// Interface of a program linked from a vertex and a fragment module.
    pub(crate) fn link(vertex: &ShaderInterface, fragment: &ShaderInterface) -> Self {
        let mut uniforms = vertex.uniforms.clone();
        for name in &fragment.uniforms {
            if !uniforms.contains(name) {
                uniforms.push(name.clone());
            }
        }
        Self {
            uniforms,
            attributes: vertex.attributes.clone(),
        }
    }

    pub(crate) fn declares_uniform(&self, name: &str) -> bool {
        self.uniforms.iter().any(|uniform| uniform == name)
    }

    pub(crate) fn attribute(&self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .find(|(attribute, _)| attribute == name)
            .map(|(_, location)| *location)
    }
}
