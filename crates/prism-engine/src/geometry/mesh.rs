use wgpu::util::DeviceExt;

use crate::device::DeviceContext;
use crate::error::{RenderError, Result};

use super::{Semantic, VertexLayout};

/// Primitive topology of a mesh.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Topology {
    #[default]
    Triangles,
}

/// Index list, stored at the narrowest element width that can address every
/// vertex.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    /// Narrows to 16-bit when `vertex_count` fits.
    pub fn from_u32(indices: Vec<u32>, vertex_count: usize) -> Self {
        if vertex_count <= usize::from(u16::MAX) + 1 {
            Self::U16(indices.into_iter().map(|i| i as u16).collect())
        } else {
            Self::U32(indices)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element width as passed to `set_index_buffer`.
    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            Self::U16(_) => wgpu::IndexFormat::Uint16,
            Self::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::U16(v) => bytemuck::cast_slice(v.as_slice()),
            Self::U32(v) => bytemuck::cast_slice(v.as_slice()),
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = u32> + '_> {
        match self {
            Self::U16(v) => Box::new(v.iter().map(|&i| u32::from(i))),
            Self::U32(v) => Box::new(v.iter().copied()),
        }
    }
}

/// Per-vertex source streams fed to [`MeshData::from_streams`].
///
/// Streams the layout asks for but that are absent here are zero filled.
#[derive(Debug, Copy, Clone, Default)]
pub struct VertexStreams<'a> {
    pub positions: &'a [[f32; 3]],
    pub normals: Option<&'a [[f32; 3]]>,
    pub tex_coords: Option<&'a [[f32; 2]]>,
}

/// CPU-side mesh: interleaved vertex bytes plus indices.
///
/// Invariants: every index references a vertex, and the index count is a
/// multiple of 3 (triangle topology).
#[derive(Debug, Clone)]
pub struct MeshData {
    layout: VertexLayout,
    vertices: Vec<u8>,
    vertex_count: usize,
    indices: Indices,
    topology: Topology,
}

impl MeshData {
    /// Validates the streams and indices and packs the vertices as `layout`
    /// describes.
    pub fn from_streams(layout: &VertexLayout, streams: VertexStreams<'_>, indices: Vec<u32>) -> Result<Self> {
        layout.validate()?;

        let vertex_count = streams.positions.len();
        if vertex_count == 0 {
            return Err(RenderError::InvalidMesh("mesh has no vertices".into()));
        }
        check_stream_len("normal", streams.normals.map(<[_]>::len), vertex_count)?;
        check_stream_len("texture coordinate", streams.tex_coords.map(<[_]>::len), vertex_count)?;

        if indices.is_empty() || indices.len() % 3 != 0 {
            return Err(RenderError::InvalidMesh(format!(
                "index count {} is not a positive multiple of 3",
                indices.len()
            )));
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(RenderError::InvalidMesh(format!(
                "index {bad} is out of range for {vertex_count} vertices"
            )));
        }

        let stride = layout.stride() as usize;
        let mut vertices = vec![0u8; stride * vertex_count];

        for (i, vertex) in vertices.chunks_exact_mut(stride).enumerate() {
            for attr in layout.attributes() {
                // w defaults to 1 so a float4 position is homogeneous.
                let mut values = [0.0f32, 0.0, 0.0, 1.0];
                match attr.semantic {
                    Semantic::Position => values[..3].copy_from_slice(&streams.positions[i]),
                    Semantic::Normal => {
                        if let Some(n) = streams.normals {
                            values[..3].copy_from_slice(&n[i]);
                        }
                    }
                    Semantic::TexCoord => {
                        if let Some(uv) = streams.tex_coords {
                            values[..2].copy_from_slice(&uv[i]);
                        }
                    }
                }

                let n = attr.format.components();
                let start = attr.offset as usize;
                let bytes: &[u8] = bytemuck::cast_slice(&values[..n]);
                vertex[start..start + bytes.len()].copy_from_slice(bytes);
            }
        }

        Ok(Self {
            layout: layout.clone(),
            vertices,
            vertex_count,
            indices: Indices::from_u32(indices, vertex_count),
            topology: Topology::Triangles,
        })
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Interleaved vertex bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn indices(&self) -> &Indices {
        &self.indices
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Reads back the position of vertex `i`, or `None` past the last vertex.
    pub fn position(&self, i: usize) -> Option<[f32; 3]> {
        if i >= self.vertex_count {
            return None;
        }
        let attr = self.layout.find(Semantic::Position)?;
        let start = i * self.layout.stride() as usize + attr.offset as usize;
        let n = attr.format.components().min(3);
        let bytes = self.vertices.get(start..start + n * 4)?;

        let mut out = [0.0f32; 3];
        // Vertex bytes carry no f32 alignment guarantee.
        for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
            *dst = bytemuck::pod_read_unaligned(chunk);
        }
        Some(out)
    }
}

fn check_stream_len(name: &str, len: Option<usize>, vertex_count: usize) -> Result<()> {
    match len {
        Some(len) if len != vertex_count => Err(RenderError::InvalidMesh(format!(
            "{name} stream has {len} entries for {vertex_count} vertices"
        ))),
        _ => Ok(()),
    }
}

/// GPU-resident mesh: one vertex buffer and one index buffer.
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    index_format: wgpu::IndexFormat,
}

impl GpuMesh {
    /// Allocates GPU vertex/index buffers initialized from `mesh`.
    pub fn upload(ctx: &DeviceContext, mesh: &MeshData) -> Self {
        let vertex_buffer = ctx.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism mesh vbo"),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = ctx.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism mesh ibo"),
            contents: mesh.indices().as_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "uploaded mesh: {} vertices, {} indices ({:?})",
            mesh.vertex_count(),
            mesh.index_count(),
            mesh.indices().format()
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
            index_format: mesh.indices().format(),
        }
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn index_format(&self) -> wgpu::IndexFormat {
        self.index_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::VertexFormat;

    const TRI: [[f32; 3]; 3] = [[0.0, 0.5, 0.0], [-0.5, -0.5, 0.0], [0.5, -0.5, 0.0]];

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes.chunks_exact(4).map(bytemuck::pod_read_unaligned).collect()
    }

    fn streams(positions: &[[f32; 3]]) -> VertexStreams<'_> {
        VertexStreams { positions, ..Default::default() }
    }

    #[test]
    fn packs_positions_tightly() {
        let mesh = MeshData::from_streams(&VertexLayout::position_only(), streams(&TRI), vec![0, 1, 2]).unwrap();
        assert_eq!(mesh.vertex_bytes().len(), 3 * 12);
        assert_eq!(mesh.position(2), Some(TRI[2]));
        assert_eq!(mesh.position(3), None);
        assert_eq!(mesh.indices().format(), wgpu::IndexFormat::Uint16);
        assert_eq!(mesh.topology(), Topology::Triangles);
    }

    #[test]
    fn missing_streams_are_zero_filled() {
        let mesh = MeshData::from_streams(&VertexLayout::position_normal_uv(), streams(&TRI), vec![0, 1, 2]).unwrap();
        let stride = mesh.layout().stride() as usize;
        let second = floats(&mesh.vertex_bytes()[stride..2 * stride]);
        assert_eq!(second, vec![-0.5, -0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn float4_position_gets_unit_w() {
        let layout = VertexLayout::new(0).with_attribute(Semantic::Position, VertexFormat::Float32x4, 0);
        let mesh = MeshData::from_streams(&layout, streams(&TRI), vec![0, 1, 2]).unwrap();
        let first = floats(&mesh.vertex_bytes()[..16]);
        assert_eq!(first, vec![0.0, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let err = MeshData::from_streams(&VertexLayout::position_only(), streams(&TRI), vec![0, 1, 3]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidMesh(_)));
    }

    #[test]
    fn index_count_must_be_multiple_of_three() {
        let err = MeshData::from_streams(&VertexLayout::position_only(), streams(&TRI), vec![0, 1, 2, 0]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidMesh(_)));
    }

    #[test]
    fn mismatched_stream_length_is_rejected() {
        let normals = [[0.0, 0.0, 1.0]; 2];
        let s = VertexStreams { positions: &TRI, normals: Some(&normals), tex_coords: None };
        assert!(MeshData::from_streams(&VertexLayout::position_normal_uv(), s, vec![0, 1, 2]).is_err());
    }

    #[test]
    fn invalid_layout_is_reported_before_packing() {
        let layout = VertexLayout::new(0).with_attribute(Semantic::Normal, VertexFormat::Float32x3, 0);
        let err = MeshData::from_streams(&layout, streams(&TRI), vec![0, 1, 2]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidVertexLayout(_)));
    }

    #[test]
    fn index_width_widens_past_u16_range() {
        assert_eq!(Indices::from_u32(vec![0, 1, 2], 65_536).format(), wgpu::IndexFormat::Uint16);
        assert_eq!(Indices::from_u32(vec![0, 1, 2], 65_537).format(), wgpu::IndexFormat::Uint32);
    }

    #[test]
    fn index_bytes_match_width() {
        assert_eq!(Indices::U16(vec![0, 1, 2]).as_bytes().len(), 6);
        assert_eq!(Indices::U32(vec![0, 1, 2]).as_bytes().len(), 12);
    }
}
