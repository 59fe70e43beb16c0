//! Fixed-function state and uniform layout shared by the backend and the builder.

use gem_core::{CullFace, FixedState, FrameUniforms, Winding};

/// Mirrors `Uniforms` in the gem shaders (96 bytes, std140-compatible).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuUniforms {
    pub mvp: [[f32; 4]; 4],
    pub eye_position: [f32; 3],
    pub refraction_index: f32,
    pub absorption: [f32; 3],
    pub display_normals: f32,
}

impl From<&FrameUniforms> for GpuUniforms {
    fn from(u: &FrameUniforms) -> Self {
        Self {
            mvp: u.mvp.to_cols_array_2d(),
            eye_position: u.eye_position.to_array(),
            refraction_index: u.refraction_index,
            absorption: u.absorption.to_array(),
            display_normals: if u.display_normals { 1.0 } else { 0.0 },
        }
    }
}

pub fn primitive_state(state: &FixedState) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        front_face: match state.front_face {
            Winding::Ccw => wgpu::FrontFace::Ccw,
            Winding::Cw => wgpu::FrontFace::Cw,
        },
        cull_mode: state.cull_face.map(|face| match face {
            CullFace::Front => wgpu::Face::Front,
            CullFace::Back => wgpu::Face::Back,
        }),
        ..Default::default()
    }
}

pub fn blend_state(state: &FixedState) -> Option<wgpu::BlendState> {
    state.blend.then_some(wgpu::BlendState::ALPHA_BLENDING)
}

/// Float vertex format holding `components` values per vertex.
pub fn vertex_format(components: u32) -> Option<wgpu::VertexFormat> {
    match components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

pub fn uniform_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("gem_bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<GpuUniforms>() as u64),
            },
            count: None,
        }],
    })
}
