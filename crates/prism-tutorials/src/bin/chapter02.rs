//! Chapter 2: a model loaded from `assets/train.obj`, drawn as wireframe.

use prism_engine::device::GpuInit;
use prism_engine::geometry::AssetStore;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::paint::Color;
use prism_engine::pipeline::{FillMode, PipelineOptions};
use prism_engine::scene::{MeshScene, MeshSource, SceneConfig};
use prism_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;

const ASSET_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let runtime = RuntimeConfig {
        title: "prism: chapter 2".to_string(),
        initial_size: LogicalSize::new(512.0, 512.0),
        clear_color: Color::rgb(0.1, 0.1, 0.1),
        ..RuntimeConfig::default()
    };

    let scene = SceneConfig {
        mesh: MeshSource::asset(AssetStore::new(ASSET_ROOT), "train", "obj"),
        options: PipelineOptions {
            fill_mode: FillMode::Wireframe,
            ..PipelineOptions::default()
        },
        ..SceneConfig::default()
    };

    log::info!("chapter 2: train model from {ASSET_ROOT}");
    Runtime::run(runtime, GpuInit::default(), MeshScene::new(scene))
}
