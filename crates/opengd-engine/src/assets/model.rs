use std::path::Path;

use crate::render::{MeshData, Vertex3D};

use super::{AssetError, AssetLoader};

/// Imports Wavefront OBJ files as one triangulated, single-indexed mesh.
///
/// Every object in the file is merged; missing normals or UVs are zeroed.
/// Materials are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjLoader;

impl AssetLoader<MeshData<Vertex3D>> for ObjLoader {
    fn load(&mut self, path: &Path) -> Result<MeshData<Vertex3D>, AssetError> {
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, _materials) = tobj::load_obj(path, &options).map_err(|source| match source {
            tobj::LoadError::OpenFileFailed => AssetError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            },
            source => AssetError::Model {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let mut data = MeshData::default();
        for model in &models {
            let mesh = &model.mesh;
            let base = data.vertices.len() as u32;
            let count = mesh.positions.len() / 3;

            data.vertices.extend((0..count).map(|i| Vertex3D {
                position: read3(&mesh.positions, i),
                normal: read3(&mesh.normals, i),
                uv: read2(&mesh.texcoords, i),
            }));
            data.indices.extend(mesh.indices.iter().map(|&i| base + i));
        }

        log::debug!(
            "imported {}: {} objects, {} triangles",
            path.display(),
            models.len(),
            data.triangle_count()
        );
        Ok(data)
    }
}

fn read3(values: &[f32], i: usize) -> [f32; 3] {
    match values.get(i * 3..i * 3 + 3) {
        Some(v) => [v[0], v[1], v[2]],
        None => [0.0; 3],
    }
}

fn read2(values: &[f32], i: usize) -> [f32; 2] {
    match values.get(i * 2..i * 2 + 2) {
        Some(v) => [v[0], v[1]],
        None => [0.0; 2],
    }
}
