use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::renderer::skinning::SkinnedVertices;
use crate::resources::Geometry;

/// Interleaved vertex shared by the forward and shadow pipelines.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
    const POSITION_ATTRIBUTE: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Position-only view of the same buffer, for depth-only passes.
    #[must_use]
    pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::POSITION_ATTRIBUTE,
        }
    }
}

/// Interleaves a geometry's attributes, filling missing normals and UVs.
#[must_use]
pub fn interleave(geometry: &Geometry) -> Vec<Vertex> {
    geometry
        .positions
        .iter()
        .enumerate()
        .map(|(i, position)| Vertex {
            position: *position,
            normal: geometry.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            uv: geometry.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

/// Vertex and index buffers of one geometry.
pub struct GpuGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    /// Bind-pose vertices kept for CPU skinning; `None` for static meshes.
    bind_pose: Option<Vec<Vertex>>,
}

impl GpuGeometry {
    pub fn new(device: &wgpu::Device, geometry: &Geometry, label: &str) -> Self {
        let vertices = interleave(geometry);
        let skinned = geometry.is_skinned();

        let mut usage = wgpu::BufferUsages::VERTEX;
        if skinned {
            usage |= wgpu::BufferUsages::COPY_DST;
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&vertices),
            usage,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
            bind_pose: skinned.then_some(vertices),
        }
    }

    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.bind_pose.is_some()
    }

    /// Rewrites the vertex buffer with skinned positions and normals.
    pub fn write_skinned(&self, queue: &wgpu::Queue, skinned: &SkinnedVertices) {
        let Some(bind_pose) = &self.bind_pose else {
            return;
        };
        let vertices: Vec<Vertex> = bind_pose
            .iter()
            .zip(skinned.positions.iter().zip(&skinned.normals))
            .map(|(vertex, (position, normal))| Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: vertex.uv,
            })
            .collect();
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
    }
}
