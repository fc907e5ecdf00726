//! Per-object GPU vertex streams, uploaded once.

use asset::RenderObject;
use wgpu::{util::DeviceExt, Buffer, BufferUsages, Device, VertexBufferLayout, VertexStepMode};

/// Stream 0: object-space positions.
pub const POSITION_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
};

/// Stream 1: texture coordinates.
pub const UV_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 2]>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![1 => Float32x2],
};

pub struct GpuMesh {
    pub positions: Buffer,
    pub uvs: Buffer,
    pub vertex_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &Device, label: &str, object: &RenderObject) -> Self {
        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} positions")),
            contents: bytemuck::cast_slice(&object.positions),
            usage: BufferUsages::VERTEX,
        });
        let uvs = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} uvs")),
            contents: bytemuck::cast_slice(&object.uvs),
            usage: BufferUsages::VERTEX,
        });
        Self {
            positions,
            uvs,
            vertex_count: object.vertex_count() as u32,
        }
    }
}

/// Objects worth a draw call: non-empty with matching stream lengths.
pub fn drawable_objects(objects: &[RenderObject]) -> Vec<usize> {
    objects
        .iter()
        .enumerate()
        .filter_map(|(i, obj)| {
            if obj.is_empty() {
                log::warn!("Render object #{i} is empty; skipping");
                None
            } else if !obj.is_consistent() {
                log::warn!(
                    "Render object #{i} has mismatched streams ({} positions, {} uvs); skipping",
                    obj.positions.len(),
                    obj.uvs.len()
                );
                None
            } else {
                Some(i)
            }
        })
        .collect()
}
