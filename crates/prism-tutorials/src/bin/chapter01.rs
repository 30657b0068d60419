//! Chapter 1: a procedural sphere drawn with the basic program.

use prism_engine::device::GpuInit;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::paint::Color;
use prism_engine::scene::{MeshScene, SceneConfig};
use prism_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let runtime = RuntimeConfig {
        title: "prism: chapter 1".to_string(),
        initial_size: LogicalSize::new(800.0, 600.0),
        clear_color: Color::new(1.0, 1.0, 0.8, 1.0),
        ..RuntimeConfig::default()
    };

    log::info!("chapter 1: procedural sphere");
    Runtime::run(runtime, GpuInit::default(), MeshScene::new(SceneConfig::default()))
}
