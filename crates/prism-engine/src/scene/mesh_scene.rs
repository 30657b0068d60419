use anyhow::{Context, Result};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{DeviceContext, HostSurface, OutputFormat};
use crate::frame::{DrawCall, FrameOutcome, FrameRenderer};
use crate::geometry::GpuMesh;
use crate::pipeline::PipelineState;
use crate::shader::ShaderProgram;

use super::{SceneConfig, SetupStage};

/// GPU objects created by setup. Shared read-only by every frame.
struct Loaded {
    // Kept alive for the pipeline's lifetime.
    _program: ShaderProgram,
    pipeline: PipelineState,
    mesh: GpuMesh,
}

/// Draws one mesh with one pipeline state, every frame.
pub struct MeshScene {
    config: SceneConfig,
    loaded: Option<Loaded>,
    renderer: FrameRenderer,
}

impl MeshScene {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            loaded: None,
            renderer: FrameRenderer::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Pixel format the pipeline state renders into, once loaded.
    pub fn output_format(&self) -> Option<wgpu::TextureFormat> {
        self.loaded.as_ref().map(|loaded| loaded.pipeline.format())
    }

    /// Number of frames submitted and presented so far.
    pub fn frames_presented(&self) -> u64 {
        self.renderer.frames_presented()
    }

    /// Compiles the program, builds the pipeline state against `surface`'s
    /// format and uploads the mesh, in that order.
    ///
    /// Nothing is kept if any step fails.
    pub fn load(&mut self, ctx: &DeviceContext, surface: &dyn HostSurface) -> Result<()> {
        let config = &self.config;

        let program = ShaderProgram::compile(ctx, &config.shader_source, &config.entries)
            .context(SetupStage::Shaders)?;

        let output = OutputFormat::of(surface);
        let pipeline = PipelineState::build(ctx, &program, output, &config.layout, &config.options)
            .context(SetupStage::PipelineState)?;

        let data = config
            .mesh
            .load(pipeline.vertex_layout())
            .context(SetupStage::Mesh)?;
        let mesh = GpuMesh::upload(ctx, &data);

        log::info!(
            "scene ready: {} vertices, {} indices, {:?} into {:?}",
            data.vertex_count(),
            data.index_count(),
            pipeline.fill_mode(),
            pipeline.format(),
        );

        self.loaded = Some(Loaded {
            _program: program,
            pipeline,
            mesh,
        });
        Ok(())
    }

    /// Runs one frame. A skipped frame is not an error.
    pub fn draw(&mut self, ctx: &DeviceContext, surface: &mut dyn HostSurface) -> Result<FrameOutcome> {
        let loaded = self
            .loaded
            .as_ref()
            .context("frame requested before scene setup")?;

        let call = DrawCall {
            pipeline: &loaded.pipeline,
            mesh: &loaded.mesh,
        };
        let outcome = self.renderer.render_frame(ctx, surface, call)?;
        Ok(outcome)
    }
}

impl App for MeshScene {
    fn setup(&mut self, ctx: &DeviceContext, surface: &dyn HostSurface) -> Result<()> {
        self.load(ctx, surface)
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> Result<AppControl> {
        match self.draw(ctx.device, ctx.surface)? {
            FrameOutcome::Presented(frame) => {
                log::trace!("presented frame {}", frame.frame_index);
            }
            FrameOutcome::Skipped(_) => {}
        }
        Ok(AppControl::Continue)
    }
}
