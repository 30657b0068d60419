use crate::error::{RenderError, Result};

/// Upper bound on vertex buffer slots, matching wgpu's default limit.
pub const MAX_VERTEX_BUFFERS: u32 = 8;

/// Highest `@location` count per pipeline (wgpu `max_vertex_attributes`).
pub const MAX_VERTEX_ATTRIBUTES: u32 = 16;

/// Largest vertex stride in bytes (wgpu `max_vertex_buffer_array_stride`).
pub const MAX_VERTEX_STRIDE: u64 = 2048;

/// Meaning of a vertex attribute; selects which mesh stream fills it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Semantic {
    Position,
    Normal,
    TexCoord,
}

/// Float vertex formats supported by the mesh packer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    Float32x4,
}

impl VertexFormat {
    #[inline]
    pub const fn components(self) -> usize {
        match self {
            Self::Float32x2 => 2,
            Self::Float32x3 => 3,
            Self::Float32x4 => 4,
        }
    }

    /// Size in bytes.
    #[inline]
    pub const fn size(self) -> u64 {
        (self.components() * std::mem::size_of::<f32>()) as u64
    }

    #[inline]
    pub const fn to_wgpu(self) -> wgpu::VertexFormat {
        match self {
            Self::Float32x2 => wgpu::VertexFormat::Float32x2,
            Self::Float32x3 => wgpu::VertexFormat::Float32x3,
            Self::Float32x4 => wgpu::VertexFormat::Float32x4,
        }
    }
}

/// One attribute slot inside the vertex buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    pub semantic: Semantic,
    pub format: VertexFormat,
    /// Byte offset from the start of the vertex.
    pub offset: u64,
    /// Slot the vertex stage reads it from (`@location(n)`).
    pub shader_location: u32,
}

impl VertexAttribute {
    #[inline]
    fn end(&self) -> u64 {
        self.offset + self.format.size()
    }
}

/// Memory layout of the single interleaved vertex buffer.
///
/// Invariant (checked by [`VertexLayout::validate`]): it describes the mesh
/// buffer exactly, since the GPU reads vertices through it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride: u64,
    buffer_index: u32,
}

impl VertexLayout {
    /// Empty layout for the vertex buffer bound at `buffer_index`.
    pub fn new(buffer_index: u32) -> Self {
        Self {
            attributes: Vec::new(),
            stride: 0,
            buffer_index,
        }
    }

    /// `float3` position at slot 0, buffer 0, tightly packed.
    pub fn position_only() -> Self {
        Self::new(0).with_attribute(Semantic::Position, VertexFormat::Float32x3, 0)
    }

    /// Position, normal and texture coordinate at slots 0, 1 and 2.
    pub fn position_normal_uv() -> Self {
        Self::new(0)
            .with_attribute(Semantic::Position, VertexFormat::Float32x3, 0)
            .with_attribute(Semantic::Normal, VertexFormat::Float32x3, 1)
            .with_attribute(Semantic::TexCoord, VertexFormat::Float32x2, 2)
    }

    /// Appends an attribute packed right after the current stride.
    pub fn with_attribute(self, semantic: Semantic, format: VertexFormat, shader_location: u32) -> Self {
        let offset = self.stride;
        self.with_attribute_at(VertexAttribute {
            semantic,
            format,
            offset,
            shader_location,
        })
    }

    /// Adds an attribute at an explicit offset, growing the stride to cover it.
    pub fn with_attribute_at(mut self, attribute: VertexAttribute) -> Self {
        self.stride = self.stride.max(attribute.end());
        self.attributes.push(attribute);
        self
    }

    /// Overrides the stride (e.g. to pad vertices).
    pub fn with_stride(mut self, stride: u64) -> Self {
        self.stride = stride;
        self
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn buffer_index(&self) -> u32 {
        self.buffer_index
    }

    pub fn attribute_at(&self, shader_location: u32) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.shader_location == shader_location)
    }

    pub fn find(&self, semantic: Semantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.semantic == semantic)
    }

    /// Checks the layout can describe a real vertex buffer.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(RenderError::InvalidVertexLayout(msg));

        if self.attributes.is_empty() {
            return fail("layout has no attributes".into());
        }
        if self.find(Semantic::Position).is_none() {
            return fail("layout does not name a position attribute".into());
        }
        if self.buffer_index >= MAX_VERTEX_BUFFERS {
            return fail(format!(
                "buffer index {} exceeds the {MAX_VERTEX_BUFFERS} vertex buffer slots",
                self.buffer_index
            ));
        }
        if self.stride % 4 != 0 {
            return fail(format!("stride {} is not a multiple of 4", self.stride));
        }
        if self.stride > MAX_VERTEX_STRIDE {
            return fail(format!(
                "stride {} exceeds the {MAX_VERTEX_STRIDE} byte limit",
                self.stride
            ));
        }

        for (i, a) in self.attributes.iter().enumerate() {
            if a.shader_location >= MAX_VERTEX_ATTRIBUTES {
                return fail(format!(
                    "slot {} is past the {MAX_VERTEX_ATTRIBUTES} vertex attribute locations",
                    a.shader_location
                ));
            }
            if a.offset % 4 != 0 {
                return fail(format!("slot {} offset {} is not 4-byte aligned", a.shader_location, a.offset));
            }
            if a.end() > self.stride {
                return fail(format!(
                    "slot {} ends at byte {} past the stride {}",
                    a.shader_location,
                    a.end(),
                    self.stride
                ));
            }
            for b in &self.attributes[i + 1..] {
                if a.shader_location == b.shader_location {
                    return fail(format!("slot {} is declared twice", a.shader_location));
                }
                if a.semantic == b.semantic {
                    return fail(format!("{:?} is declared twice", a.semantic));
                }
                if a.offset < b.end() && b.offset < a.end() {
                    return fail(format!(
                        "slots {} and {} overlap",
                        a.shader_location, b.shader_location
                    ));
                }
            }
        }

        Ok(())
    }

    /// wgpu attribute descriptors for pipeline creation.
    pub fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: a.format.to_wgpu(),
                offset: a.offset,
                shader_location: a.shader_location,
            })
            .collect()
    }
}

impl Default for VertexLayout {
    fn default() -> Self {
        Self::position_only()
    }
}
