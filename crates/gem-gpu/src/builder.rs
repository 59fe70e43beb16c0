//! Asynchronous gem pipeline compilation.
//!
//! Templates are instantiated up front; module and pipeline creation run
//! inside a validation error scope whose result arrives asynchronously, so a
//! broken program reports failure through the completion instead of
//! surfacing as an uncaptured device error.

use crate::backend::GemProgram;
use crate::pipeline::{blend_state, primitive_state, vertex_format, GpuUniforms};
use gem_core::{instantiate, template_source, Completion, ShaderBuilder, ShaderError, ShaderRequest};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

pub type LocalFuture = Pin<Box<dyn Future<Output = ()>>>;

/// Drives a build future to completion: `spawn_local` on the web,
/// `pollster::block_on` natively.
pub type Spawner = Rc<dyn Fn(LocalFuture)>;

pub struct WgpuShaderBuilder {
    device: Rc<wgpu::Device>,
    format: wgpu::TextureFormat,
    layout: Rc<wgpu::BindGroupLayout>,
    spawner: Spawner,
}

struct Sources {
    vertex: String,
    fragment: String,
}

impl WgpuShaderBuilder {
    pub fn new(
        device: Rc<wgpu::Device>,
        format: wgpu::TextureFormat,
        layout: Rc<wgpu::BindGroupLayout>,
        spawner: Spawner,
    ) -> Self {
        Self {
            device,
            format,
            layout,
            spawner,
        }
    }
}

impl ShaderBuilder for WgpuShaderBuilder {
    type Program = GemProgram;

    fn build(&self, request: ShaderRequest, done: Completion<GemProgram>) {
        let sources = match instantiate_sources(&request) {
            Ok(s) => s,
            Err(e) => {
                log::error!("[shader] template error: {}", e);
                done(None);
                return;
            }
        };
        let device = self.device.clone();
        let layout = self.layout.clone();
        let format = self.format;
        (self.spawner)(Box::pin(async move {
            let program = compile(&device, format, &layout, &request, &sources).await;
            done(program);
        }));
    }
}

fn instantiate_sources(request: &ShaderRequest) -> Result<Sources, ShaderError> {
    Ok(Sources {
        vertex: instantiate(template_source(request.vertex_template)?, &request.injected)?,
        fragment: instantiate(template_source(request.fragment_template)?, &request.injected)?,
    })
}

async fn compile(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layout: &wgpu::BindGroupLayout,
    request: &ShaderRequest,
    sources: &Sources,
) -> Option<GemProgram> {
    let Some(attribute_format) = vertex_format(request.vertex_components) else {
        log::error!(
            "[shader] unsupported vertex size: {} components",
            request.vertex_components
        );
        return None;
    };
    if request.state.depth_test {
        log::warn!("[shader] depth testing requested but the gem pass has no depth target");
    }

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(request.vertex_template),
        source: wgpu::ShaderSource::Wgsl(sources.vertex.as_str().into()),
    });
    let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(request.fragment_template),
        source: wgpu::ShaderSource::Wgsl(sources.fragment.as_str().into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("gem_pl"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    let attributes = [wgpu::VertexAttribute {
        format: attribute_format,
        offset: 0,
        shader_location: 0,
    }];
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("gem_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vs,
            entry_point: Some(VERTEX_ENTRY),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: attribute_format.size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &attributes,
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: primitive_state(&request.state),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &fs,
            entry_point: Some(FRAGMENT_ENTRY),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: blend_state(&request.state),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    });
    if let Some(err) = device.pop_error_scope().await {
        log::error!("[shader] pipeline build failed: {}", err);
        return None;
    }

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("gem_uniforms"),
        size: std::mem::size_of::<GpuUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("gem_bg"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });
    Some(GemProgram {
        pipeline,
        uniform_buffer,
        bind_group,
    })
}
