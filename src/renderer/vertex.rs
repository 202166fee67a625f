//! Vertex and instance layouts for the scene pipeline

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};

use crate::hall::Material;
use crate::srgb_hex_to_linear;

/// Mesh vertex: position, normal and texture coordinate
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-draw data, one per instance
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model's upper 3x3
    pub normal: [[f32; 3]; 3],
    /// Linear RGB, alpha unused
    pub color: [f32; 4],
    pub uv_repeat: [f32; 2],
    /// roughness, metalness, double_sided, textured
    pub params: [f32; 4],
}

impl InstanceRaw {
    pub fn new(model: Mat4, material: &Material) -> Self {
        let normal = Mat3::from_mat4(model).inverse().transpose();
        let [r, g, b] = srgb_hex_to_linear(material.color);
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
            color: [r, g, b, 1.0],
            uv_repeat: material.uv_repeat.to_array(),
            params: [
                material.roughness,
                material.metalness,
                if material.double_sided { 1.0 } else { 0.0 },
                if material.texture.is_some() { 1.0 } else { 0.0 },
            ],
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 10] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x3,
        8 => Float32x3,
        9 => Float32x3,
        10 => Float32x4,
        11 => Float32x2,
        12 => Float32x4,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
