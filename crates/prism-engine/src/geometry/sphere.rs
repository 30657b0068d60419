use std::f32::consts::{PI, TAU};

use crate::error::{RenderError, Result};

use super::{MeshData, VertexLayout, VertexStreams};

/// Parameters of the procedural (UV) sphere.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereParams {
    /// Bounding box size per axis; radii are half of it.
    pub extent: [f32; 3],
    /// `[radial, vertical]`: slices around the y axis and stacks from pole to pole.
    pub segments: [u32; 2],
    /// Normals point into the sphere and triangles wind the other way.
    pub inward_normals: bool,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            extent: [0.75, 0.75, 0.75],
            segments: [100, 100],
            inward_normals: false,
        }
    }
}

/// Generates a sphere mesh packed as `layout` describes.
///
/// The grid has `(vertical + 1) * (radial + 1)` vertices (seam and pole rows
/// are duplicated so texture coordinates stay continuous) and two triangles
/// per grid cell, i.e. exactly `radial * vertical * 6` indices. Triangles
/// wind counter-clockwise seen from the side the normals point to.
pub fn load_procedural_mesh(params: &SphereParams, layout: &VertexLayout) -> Result<MeshData> {
    let [radial, vertical] = params.segments;
    if radial < 3 || vertical < 2 {
        return Err(RenderError::InvalidMesh(format!(
            "sphere needs at least 3x2 segments, got {radial}x{vertical}"
        )));
    }
    let vertex_total = (u64::from(radial) + 1) * (u64::from(vertical) + 1);
    let index_total = u64::from(radial) * u64::from(vertical) * 6;
    if vertex_total > u64::from(u32::MAX) || index_total > u64::from(u32::MAX) {
        return Err(RenderError::InvalidMesh(format!(
            "{radial}x{vertical} sphere segments overflow 32-bit indices"
        )));
    }
    if params.extent.iter().any(|e| !e.is_finite() || *e <= 0.0) {
        return Err(RenderError::InvalidMesh(format!(
            "sphere extent must be positive, got {:?}",
            params.extent
        )));
    }

    let radii = params.extent.map(|e| e * 0.5);
    let flip = if params.inward_normals { -1.0 } else { 1.0 };

    let rows = vertical as usize + 1;
    let cols = radial as usize + 1;
    let mut positions = Vec::with_capacity(rows * cols);
    let mut normals = Vec::with_capacity(rows * cols);
    let mut tex_coords = Vec::with_capacity(rows * cols);

    for v in 0..rows {
        let t = v as f32 / vertical as f32;
        let (sin_theta, cos_theta) = (t * PI).sin_cos();

        for u in 0..cols {
            let s = u as f32 / radial as f32;
            let (sin_phi, cos_phi) = (s * TAU).sin_cos();

            let unit = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
            positions.push([unit[0] * radii[0], unit[1] * radii[1], unit[2] * radii[2]]);

            // Ellipsoid normal: gradient of the implicit surface.
            let n = normalize([unit[0] / radii[0], unit[1] / radii[1], unit[2] / radii[2]]);
            normals.push(n.map(|c| c * flip));
            tex_coords.push([s, t]);
        }
    }

    let cols = cols as u32;
    let mut indices = Vec::with_capacity(index_total as usize);
    for v in 0..vertical {
        for u in 0..radial {
            let a = v * cols + u;
            let b = a + cols;
            if params.inward_normals {
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            } else {
                indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }
    }

    MeshData::from_streams(
        layout,
        VertexStreams {
            positions: &positions,
            normals: Some(&normals),
            tex_coords: Some(&tex_coords),
        },
        indices,
    )
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > f32::EPSILON {
        v.map(|c| c / len)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[1] * b[2] - a[2] * b[1], a[2] * b[0] - a[0] * b[2], a[0] * b[1] - a[1] * b[0]]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Sign of (face normal · centroid) for every non-degenerate triangle.
    fn facing_signs(mesh: &MeshData) -> Vec<f32> {
        let idx: Vec<u32> = mesh.indices().iter().collect();
        idx.chunks_exact(3)
            .filter_map(|t| {
                let [p0, p1, p2] = [0, 1, 2].map(|k| mesh.position(t[k] as usize).unwrap());
                let n = cross(sub(p1, p0), sub(p2, p0));
                let area = dot(n, n);
                (area > 1e-12).then(|| {
                    let c = [(p0[0] + p1[0] + p2[0]) / 3.0, (p0[1] + p1[1] + p2[1]) / 3.0, (p0[2] + p1[2] + p2[2]) / 3.0];
                    dot(n, c).signum()
                })
            })
            .collect()
    }

    #[test]
    fn hundred_by_hundred_sphere_has_sixty_thousand_indices() {
        let mesh = load_procedural_mesh(&SphereParams::default(), &VertexLayout::position_only()).unwrap();
        assert_eq!(mesh.index_count(), 100 * 100 * 6);
        assert_eq!(mesh.vertex_count(), 101 * 101);
        assert_eq!(mesh.indices().format(), wgpu::IndexFormat::Uint16);
    }

    #[test]
    fn every_index_references_a_vertex() {
        let mesh = load_procedural_mesh(&SphereParams { segments: [16, 8], ..Default::default() }, &VertexLayout::position_only()).unwrap();
        assert!(mesh.indices().iter().all(|i| (i as usize) < mesh.vertex_count()));
        assert_eq!(mesh.index_count() % 3, 0);
    }

    #[test]
    fn vertices_lie_on_the_extent() {
        let params = SphereParams { extent: [2.0, 1.0, 4.0], segments: [12, 6], ..Default::default() };
        let mesh = load_procedural_mesh(&params, &VertexLayout::position_only()).unwrap();
        for i in 0..mesh.vertex_count() {
            let p = mesh.position(i).unwrap();
            let r = (p[0] / 1.0).powi(2) + (p[1] / 0.5).powi(2) + (p[2] / 2.0).powi(2);
            assert!((r - 1.0).abs() < 1e-4, "vertex {i} at {p:?}");
        }
        assert_eq!(mesh.position(0), Some([0.0, 0.5, 0.0]));
    }

    #[test]
    fn outward_sphere_winds_counter_clockwise_from_outside() {
        let mesh = load_procedural_mesh(&SphereParams { segments: [24, 12], ..Default::default() }, &VertexLayout::position_only()).unwrap();
        let signs = facing_signs(&mesh);
        assert!(!signs.is_empty());
        assert!(signs.iter().all(|&s| s > 0.0));
    }

    #[test]
    fn inward_normals_flip_the_winding() {
        let params = SphereParams { segments: [24, 12], inward_normals: true, ..Default::default() };
        let mesh = load_procedural_mesh(&params, &VertexLayout::position_only()).unwrap();
        assert!(facing_signs(&mesh).iter().all(|&s| s < 0.0));
    }

    #[test]
    fn too_few_segments_is_rejected() {
        let params = SphereParams { segments: [2, 2], ..Default::default() };
        assert!(load_procedural_mesh(&params, &VertexLayout::position_only()).is_err());
    }

    #[test]
    fn segment_counts_past_u32_indices_are_rejected() {
        let params = SphereParams { segments: [u32::MAX, 2], ..Default::default() };
        assert!(matches!(
            load_procedural_mesh(&params, &VertexLayout::position_only()),
            Err(RenderError::InvalidMesh(_))
        ));

        let params = SphereParams { segments: [65_536, 65_536], ..Default::default() };
        assert!(matches!(
            load_procedural_mesh(&params, &VertexLayout::position_only()),
            Err(RenderError::InvalidMesh(_))
        ));
    }

    #[test]
    fn zero_extent_is_rejected() {
        let params = SphereParams { extent: [0.0, 1.0, 1.0], ..Default::default() };
        assert!(load_procedural_mesh(&params, &VertexLayout::position_only()).is_err());
    }
}
