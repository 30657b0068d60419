use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{DeviceContext, GpuInit, WindowSurface};
use crate::paint::Color;
use crate::scene::SetupStage;

/// When the runtime asks the host for frames.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum RedrawMode {
    /// Request a redraw after every event batch.
    #[default]
    Continuous,
    /// Draw only when the host asks (first show, resize, expose).
    OnDemand,
}

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub clear_color: Color,
    pub redraw: RedrawMode,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            clear_color: Color::rgb(1.0, 1.0, 0.8),
            redraw: RedrawMode::Continuous,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, runs setup once, then the frame callback per redraw.
    ///
    /// Returns the first fatal error raised by setup or by a frame.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// GPU objects that exist once setup has run.
///
/// The surface is declared first so it is released before the device.
struct Active {
    surface: WindowSurface,
    device: DeviceContext,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    active: Option<Active>,
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            active: None,
            failure: None,
        }
    }

    /// Dependency-ordered startup: window, surface, device, then app setup.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Active> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = DeviceContext::create_instance();
        let raw_surface =
            WindowSurface::create_raw(&instance, Arc::clone(&window)).context(SetupStage::Surface)?;

        let device = pollster::block_on(DeviceContext::new(instance, Some(&raw_surface), &self.gpu_init))
            .context(SetupStage::Device)?;

        let surface = WindowSurface::new(
            window,
            raw_surface,
            &device,
            &self.gpu_init,
            self.config.clear_color,
        )
        .context(SetupStage::Surface)?;

        self.app.setup(&device, &surface)?;
        surface.window().request_redraw();

        Ok(Active { surface, device })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        event_loop.exit();
    }

    fn redraw(&mut self) -> Result<AppControl> {
        let Some(active) = self.active.as_mut() else {
            return Ok(AppControl::Continue);
        };

        let control = {
            let mut ctx = FrameCtx {
                device: &active.device,
                surface: &mut active.surface,
            };
            self.app.on_frame(&mut ctx)?
        };

        if active.surface.has_failed() {
            anyhow::bail!("presentation surface failed; cannot acquire further frames");
        }
        Ok(control)
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Device and pipeline objects are created once per process.
        if self.active.is_some() || self.failure.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(active) => self.active = Some(active),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        if self.config.redraw == RedrawMode::Continuous {
            if let Some(active) = &self.active {
                active.surface.window().request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.active.is_none() {
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(new_size) => {
                if let Some(active) = self.active.as_mut() {
                    active.surface.resize(new_size);
                    active.surface.window().request_redraw();
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(active) = self.active.as_mut() {
                    let new_size = active.surface.window().inner_size();
                    active.surface.resize(new_size);
                    active.surface.window().request_redraw();
                }
            }

            WindowEvent::RedrawRequested => match self.redraw() {
                Ok(AppControl::Continue) => {}
                Ok(AppControl::Exit) => event_loop.exit(),
                Err(err) => self.fail(event_loop, err),
            },

            _ => {}
        }
    }
}
