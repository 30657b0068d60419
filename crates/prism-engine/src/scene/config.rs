use std::borrow::Cow;
use std::fmt;

use crate::error::Result;
use crate::geometry::{load_mesh_from_asset, load_procedural_mesh, AssetStore, MeshData, SphereParams, VertexLayout};
use crate::pipeline::PipelineOptions;
use crate::shader::{EntryPoints, BASIC_WGSL};

/// Where the scene's mesh comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshSource {
    Sphere(SphereParams),
    /// `<store root>/<name>.<extension>`, loaded as Wavefront OBJ.
    Asset {
        store: AssetStore,
        name: String,
        extension: String,
    },
}

impl MeshSource {
    pub fn asset(store: AssetStore, name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self::Asset {
            store,
            name: name.into(),
            extension: extension.into(),
        }
    }

    pub fn load(&self, layout: &VertexLayout) -> Result<MeshData> {
        match self {
            Self::Sphere(params) => load_procedural_mesh(params, layout),
            Self::Asset {
                store,
                name,
                extension,
            } => {
                let path = store.resolve(name, extension)?;
                log::info!("loading mesh asset {}", path.display());
                load_mesh_from_asset(&path, layout)
            }
        }
    }
}

impl Default for MeshSource {
    fn default() -> Self {
        Self::Sphere(SphereParams::default())
    }
}

/// Everything [`super::MeshScene`] needs to set itself up.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub mesh: MeshSource,
    pub layout: VertexLayout,
    pub shader_source: Cow<'static, str>,
    pub entries: EntryPoints,
    pub options: PipelineOptions,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            mesh: MeshSource::default(),
            layout: VertexLayout::position_only(),
            shader_source: Cow::Borrowed(BASIC_WGSL),
            entries: EntryPoints::default(),
            options: PipelineOptions::default(),
        }
    }
}

/// Setup steps, in the order they run. Used as error context.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SetupStage {
    Surface,
    Device,
    Shaders,
    PipelineState,
    Mesh,
}

impl SetupStage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Surface => "surface",
            Self::Device => "device",
            Self::Shaders => "shaders",
            Self::PipelineState => "pipeline state",
            Self::Mesh => "mesh",
        }
    }
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "setup failed at stage `{}`", self.name())
    }
}
