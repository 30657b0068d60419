use std::path::{Path, PathBuf};

use crate::error::{RenderError, Result};

use super::{MeshData, VertexLayout, VertexStreams};

/// Resolves named resources to files under a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `<root>/<name>.<extension>` if it is an existing file.
    pub fn resolve(&self, name: &str, extension: &str) -> Result<PathBuf> {
        let path = self.root.join(name).with_extension(extension);
        if path.is_file() {
            Ok(path)
        } else {
            Err(RenderError::AssetNotFound(path))
        }
    }
}

/// Loads the first mesh of a Wavefront OBJ file, packed as `layout` describes.
///
/// Faces are triangulated and the position/normal/texcoord indices are merged
/// into a single index list. Attributes requested by the layout but missing
/// from the file are zero filled.
pub fn load_mesh_from_asset(path: impl AsRef<Path>, layout: &VertexLayout) -> Result<MeshData> {
    let path = path.as_ref();
    layout.validate()?;

    if !path.is_file() {
        return Err(RenderError::AssetNotFound(path.to_path_buf()));
    }

    let unsupported = |reason: String| RenderError::UnsupportedFormat {
        path: path.to_path_buf(),
        reason,
    };

    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| unsupported(e.to_string()))?;

    // Materials are not used by this renderer; a missing .mtl is fine.
    if let Err(e) = materials {
        log::debug!("ignoring materials of {}: {e}", path.display());
    }

    let Some(model) = models.into_iter().find(|m| !m.mesh.indices.is_empty()) else {
        return Err(unsupported("file contains no meshes".into()));
    };
    log::info!("loaded mesh \"{}\" from {}", model.name, path.display());

    let mesh = model.mesh;
    let positions = to_array3(&mesh.positions);
    let normals = to_array3(&mesh.normals);
    let tex_coords: Vec<[f32; 2]> = mesh
        .texcoords
        .chunks_exact(2)
        .map(|t| [t[0], t[1]])
        .collect();

    let streams = VertexStreams {
        positions: &positions,
        normals: (normals.len() == positions.len()).then_some(normals.as_slice()),
        tex_coords: (tex_coords.len() == positions.len()).then_some(tex_coords.as_slice()),
    };

    MeshData::from_streams(layout, streams, mesh.indices).map_err(|e| match e {
        RenderError::InvalidMesh(reason) => unsupported(reason),
        other => other,
    })
}

fn to_array3(flat: &[f32]) -> Vec<[f32; 3]> {
    flat.chunks_exact(3).map(|v| [v[0], v[1], v[2]]).collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const QUAD_OBJ: &str = "\
o quad
v -0.5 -0.5 0.0
v  0.5 -0.5 0.0
v  0.5  0.5 0.0
v -0.5  0.5 0.0
vn 0 0 1
f 1//1 2//1 3//1 4//1
";

    fn write_asset(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn store_resolves_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_asset(&dir, "quad.obj", QUAD_OBJ);
        let store = AssetStore::new(dir.path());
        assert_eq!(store.resolve("quad", "obj").unwrap(), path);
    }

    #[test]
    fn store_reports_missing_resource() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        let err = store.resolve("train", "obj").unwrap_err();
        assert!(matches!(err, RenderError::AssetNotFound(p) if p.ends_with("train.obj")));
    }

    #[test]
    fn quad_is_triangulated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_asset(&dir, "quad.obj", QUAD_OBJ);
        let mesh = load_mesh_from_asset(&path, &VertexLayout::position_normal_uv()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.position(2), Some([0.5, 0.5, 0.0]));
    }

    #[test]
    fn missing_file_is_asset_not_found() {
        let err = load_mesh_from_asset("/definitely/not/here.obj", &VertexLayout::position_only()).unwrap_err();
        assert!(matches!(err, RenderError::AssetNotFound(_)));
    }

    #[test]
    fn file_without_faces_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_asset(&dir, "points.obj", "# only vertices\nv 0 0 0\nv 1 0 0\n");
        let err = load_mesh_from_asset(&path, &VertexLayout::position_only()).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedFormat { .. }));
    }

    #[test]
    fn layout_must_name_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_asset(&dir, "quad.obj", QUAD_OBJ);
        let layout = VertexLayout::new(0).with_attribute(
            crate::geometry::Semantic::Normal,
            crate::geometry::VertexFormat::Float32x3,
            0,
        );
        let err = load_mesh_from_asset(&path, &layout).unwrap_err();
        assert!(matches!(err, RenderError::InvalidVertexLayout(_)));
    }
}
