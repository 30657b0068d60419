use crate::device::DeviceContext;
use crate::error::{RenderError, Result};

use super::{capabilities_for, reflect_with, EntryPoints, ShaderReflection};

/// A compiled vertex + fragment program.
///
/// Immutable once compiled; every pipeline state built from it shares it.
pub struct ShaderProgram {
    module: wgpu::ShaderModule,
    entries: EntryPoints,
    reflection: ShaderReflection,
}

impl ShaderProgram {
    /// Validates `source` and creates the GPU shader module.
    ///
    /// Source is checked against the shader capabilities of the device's
    /// enabled features; anything wgpu still rejects is reported as a
    /// compile error too. Synchronous and comparatively slow; done once at
    /// startup.
    pub fn compile(ctx: &DeviceContext, source: &str, entries: &EntryPoints) -> Result<Self> {
        let capabilities = capabilities_for(ctx.device().features());
        let reflection = reflect_with(source, entries, capabilities)?;

        let module = ctx
            .validated(|device| {
                device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some("prism shader"),
                    source: wgpu::ShaderSource::Wgsl(source.into()),
                })
            })
            .map_err(|e| RenderError::shader(e.to_string()))?;

        log::debug!(
            "compiled shader `{}`/`{}` with {} vertex input(s)",
            entries.vertex,
            entries.fragment,
            reflection.vertex_inputs.len()
        );

        Ok(Self {
            module,
            entries: entries.clone(),
            reflection,
        })
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    pub fn vertex_entry(&self) -> &str {
        &self.entries.vertex
    }

    pub fn fragment_entry(&self) -> &str {
        &self.entries.fragment
    }

    pub fn reflection(&self) -> &ShaderReflection {
        &self.reflection
    }
}
