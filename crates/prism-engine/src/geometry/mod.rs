//! Geometry provider.
//!
//! Produces CPU-side [`MeshData`] (interleaved vertices described by a
//! [`VertexLayout`], plus indices) either procedurally or from a model file,
//! and uploads it into GPU buffers as a [`GpuMesh`].

mod asset;
mod layout;
mod mesh;
mod sphere;

pub use asset::{load_mesh_from_asset, AssetStore};
pub use layout::{
    Semantic, VertexAttribute, VertexFormat, VertexLayout, MAX_VERTEX_ATTRIBUTES, MAX_VERTEX_BUFFERS,
    MAX_VERTEX_STRIDE,
};
pub use mesh::{GpuMesh, Indices, MeshData, Topology, VertexStreams};
pub use sphere::{load_procedural_mesh, SphereParams};
