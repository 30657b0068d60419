use crate::device::{DeviceContext, OutputFormat};
use crate::error::{RenderError, Result};
use crate::geometry::VertexLayout;
use crate::shader::ShaderProgram;

use super::validate;

/// Triangle rasterization mode.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FillMode {
    #[default]
    Fill,
    /// Edges only. Needs `POLYGON_MODE_LINE`; falls back to `Fill` without it.
    Wireframe,
}

/// Fixed-function options baked into a pipeline state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct PipelineOptions {
    pub fill_mode: FillMode,
    pub cull_mode: Option<wgpu::Face>,
}

/// Immutable render pipeline: shader functions + output format + vertex layout.
pub struct PipelineState {
    pipeline: wgpu::RenderPipeline,
    format: wgpu::TextureFormat,
    layout: VertexLayout,
    fill_mode: FillMode,
}

impl PipelineState {
    /// Validates the inputs and builds the render pipeline.
    ///
    /// `output` comes from [`OutputFormat::of`], i.e. from the surface frames
    /// will be drawn into.
    pub fn build(
        ctx: &DeviceContext,
        program: &ShaderProgram,
        output: OutputFormat,
        layout: &VertexLayout,
        options: &PipelineOptions,
    ) -> Result<Self> {
        validate(program.reflection(), output, layout)?;

        let fill_mode = match options.fill_mode {
            FillMode::Wireframe if !ctx.supports(wgpu::Features::POLYGON_MODE_LINE) => {
                log::warn!("device lacks POLYGON_MODE_LINE; drawing filled triangles instead");
                FillMode::Fill
            }
            mode => mode,
        };
        let polygon_mode = match fill_mode {
            FillMode::Fill => wgpu::PolygonMode::Fill,
            FillMode::Wireframe => wgpu::PolygonMode::Line,
        };

        let attributes = layout.wgpu_attributes();
        // Slots below the layout's buffer index read no attributes, but a
        // pipeline still needs a buffer bound to each of them.
        let mut buffers = vec![
            wgpu::VertexBufferLayout {
                array_stride: 0,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[],
            };
            layout.buffer_index() as usize
        ];
        buffers.push(wgpu::VertexBufferLayout {
            array_stride: layout.stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        });

        let pipeline = ctx
            .validated(|device| {
                let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("prism pipeline layout"),
                    bind_group_layouts: &[],
                    immediate_size: 0,
                });

                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("prism pipeline"),
                    layout: Some(&pipeline_layout),

                    vertex: wgpu::VertexState {
                        module: program.module(),
                        entry_point: Some(program.vertex_entry()),
                        compilation_options: Default::default(),
                        buffers: &buffers,
                    },

                    fragment: Some(wgpu::FragmentState {
                        module: program.module(),
                        entry_point: Some(program.fragment_entry()),
                        compilation_options: Default::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: output.get(),
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),

                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: options.cull_mode,
                        polygon_mode,
                        unclipped_depth: false,
                        conservative: false,
                    },

                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                })
            })
            .map_err(|e| RenderError::PipelineValidationError(e.to_string()))?;

        log::info!(
            "pipeline state built: {:?}, {} attribute(s), stride {}, {fill_mode:?}",
            output.get(),
            attributes.len(),
            layout.stride()
        );

        Ok(Self {
            pipeline,
            format: output.get(),
            layout: layout.clone(),
            fill_mode,
        })
    }

    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn vertex_layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Vertex buffer slots the pipeline expects bound: every slot up to and
    /// including the layout's buffer index.
    pub fn vertex_slots(&self) -> std::ops::RangeInclusive<u32> {
        0..=self.layout.buffer_index()
    }

    /// Fill mode in effect after feature fallback.
    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }
}
