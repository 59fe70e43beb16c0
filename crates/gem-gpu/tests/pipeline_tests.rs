// Host-side tests for fixed-state mapping and the uniform block layout.

use gem_core::{CullFace, FixedState, FrameUniforms, Winding, GEM_FIXED_STATE};
use gem_gpu::context::pick_surface_format;
use gem_gpu::pipeline::{blend_state, primitive_state, vertex_format};
use gem_gpu::GpuUniforms;
use glam::{Mat4, Vec3};

#[test]
fn uniform_block_matches_shader_layout() {
    assert_eq!(std::mem::size_of::<GpuUniforms>(), 96);
    assert_eq!(std::mem::offset_of!(GpuUniforms, eye_position), 64);
    assert_eq!(std::mem::offset_of!(GpuUniforms, refraction_index), 76);
    assert_eq!(std::mem::offset_of!(GpuUniforms, absorption), 80);
    assert_eq!(std::mem::offset_of!(GpuUniforms, display_normals), 92);
}

#[test]
fn frame_uniforms_pack_flags_as_floats() {
    let frame = FrameUniforms {
        mvp: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
        eye_position: Vec3::new(0.0, 1.8, 0.0),
        absorption: Vec3::new(0.1, 0.2, 0.3),
        display_normals: true,
        refraction_index: 2.42,
    };
    let packed = GpuUniforms::from(&frame);
    assert_eq!(packed.mvp[3], [1.0, 2.0, 3.0, 1.0]);
    assert_eq!(packed.eye_position, [0.0, 1.8, 0.0]);
    assert_eq!(packed.absorption, [0.1, 0.2, 0.3]);
    assert_eq!(packed.display_normals, 1.0);
    assert_eq!(packed.refraction_index, 2.42);

    let off = GpuUniforms::from(&FrameUniforms {
        display_normals: false,
        ..frame
    });
    assert_eq!(off.display_normals, 0.0);
}

#[test]
fn gem_state_culls_front_faces_without_blending() {
    let p = primitive_state(&GEM_FIXED_STATE);
    assert_eq!(p.front_face, wgpu::FrontFace::Ccw);
    assert_eq!(p.cull_mode, Some(wgpu::Face::Front));
    assert_eq!(p.topology, wgpu::PrimitiveTopology::TriangleList);
    assert_eq!(blend_state(&GEM_FIXED_STATE), None);
}

#[test]
fn other_states_map_through() {
    let state = FixedState {
        front_face: Winding::Cw,
        cull_face: None,
        depth_test: false,
        blend: true,
    };
    let p = primitive_state(&state);
    assert_eq!(p.front_face, wgpu::FrontFace::Cw);
    assert_eq!(p.cull_mode, None);
    assert_eq!(blend_state(&state), Some(wgpu::BlendState::ALPHA_BLENDING));

    let back = FixedState {
        cull_face: Some(CullFace::Back),
        ..state
    };
    assert_eq!(primitive_state(&back).cull_mode, Some(wgpu::Face::Back));
}

#[test]
fn vertex_formats_cover_one_to_four_floats() {
    assert_eq!(vertex_format(3), Some(wgpu::VertexFormat::Float32x3));
    assert_eq!(vertex_format(3).map(|f| f.size()), Some(12));
    assert_eq!(vertex_format(0), None);
    assert_eq!(vertex_format(5), None);
}

#[test]
fn non_srgb_surface_formats_are_preferred() {
    use wgpu::TextureFormat as F;
    assert_eq!(
        pick_surface_format(&[F::Bgra8UnormSrgb, F::Bgra8Unorm]),
        Some(F::Bgra8Unorm)
    );
    assert_eq!(pick_surface_format(&[F::Rgba16Float]), Some(F::Rgba16Float));
    assert_eq!(pick_surface_format(&[]), None);
}
