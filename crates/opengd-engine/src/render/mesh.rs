//! CPU mesh data, GPU mesh upload and the shared unit quad.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Vertex type with a fixed attribute layout.
pub trait Vertex: Pod {
    const ATTRS: &'static [wgpu::VertexAttribute];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Self::ATTRS,
        }
    }
}

/// Position then UV, tightly packed.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex2D {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl Vertex for Vertex2D {
    const ATTRS: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2  // uv
    ];
}

/// Imported model vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex for Vertex3D {
    const ATTRS: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];
}

/// CPU-side indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

impl<V> MeshData<V> {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Unit quad over `[0, 1]²` with UV equal to position.
///
/// Vertex order: (0,0), (1,0), (1,1), (0,1); indices `0 1 2 2 3 0`.
pub fn load_quad_model() -> MeshData<Vertex2D> {
    let corners = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    MeshData {
        vertices: corners
            .iter()
            .map(|&p| Vertex2D { position: p, uv: p })
            .collect(),
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

/// GPU vertex + index buffers and the layout needed to bind them.
#[derive(Debug)]
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub layout: wgpu::VertexBufferLayout<'static>,
}

impl Mesh {
    pub fn upload<V: Vertex>(device: &wgpu::Device, label: &str, data: &MeshData<V>) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vbo")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} ibo")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            layout: V::layout(),
        }
    }

    pub fn index_format(&self) -> wgpu::IndexFormat {
        wgpu::IndexFormat::Uint32
    }
}

/// Lazily uploaded geometry shared by every draw.
#[derive(Debug, Default)]
pub struct GeometryCache {
    quad: Option<Mesh>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The unit quad, uploaded on first use.
    pub fn quad(&mut self, device: &wgpu::Device) -> &Mesh {
        self.quad
            .get_or_insert_with(|| Mesh::upload(device, "opengd quad", &load_quad_model()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_has_four_vertices_and_six_indices() {
        let quad = load_quad_model();
        assert_eq!(quad.vertices.len(), 4);
        assert_eq!(quad.indices, vec![0, 1, 2, 2, 3, 0]);
        assert_eq!(quad.triangle_count(), 2);
    }

    #[test]
    fn quad_uv_matches_position_in_unit_square() {
        for v in load_quad_model().vertices {
            assert_eq!(v.position, v.uv);
            assert!(v.position.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn vertex2d_is_tightly_packed() {
        let layout = Vertex2D::layout();
        assert_eq!(layout.array_stride, 16);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].offset, 8);
    }

    #[test]
    fn vertex3d_layout() {
        let layout = Vertex3D::layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes[2].offset, 24);
    }
}
