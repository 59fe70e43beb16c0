use crate::builder::{Spawner, WgpuShaderBuilder};
use crate::context::GpuContext;
use crate::pipeline::{uniform_layout, GpuUniforms};
use gem_core::{DrawCall, RenderBackend};
use std::rc::Rc;
use wgpu::util::DeviceExt;

/// A linked gem pipeline plus the uniform block it reads.
pub struct GemProgram {
    pub pipeline: wgpu::RenderPipeline,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

pub struct WgpuBackend {
    ctx: GpuContext,
    bind_group_layout: Rc<wgpu::BindGroupLayout>,
    clear_color: wgpu::Color,
}

impl WgpuBackend {
    pub fn new(ctx: GpuContext) -> Self {
        let bind_group_layout = Rc::new(uniform_layout(&ctx.device));
        Self {
            ctx,
            bind_group_layout,
            clear_color: wgpu::Color::BLACK,
        }
    }

    /// A builder producing programs compatible with this backend's surface.
    pub fn shader_builder(&self, spawner: Spawner) -> WgpuShaderBuilder {
        WgpuShaderBuilder::new(
            self.ctx.device.clone(),
            self.ctx.format(),
            self.bind_group_layout.clone(),
            spawner,
        )
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }

    pub fn reconfigure(&self) {
        self.ctx.reconfigure();
    }

    pub fn size(&self) -> (u32, u32) {
        (self.ctx.config.width, self.ctx.config.height)
    }
}

impl RenderBackend for WgpuBackend {
    type Buffer = wgpu::Buffer;
    type Program = GemProgram;
    type Error = wgpu::SurfaceError;

    fn create_vertex_buffer(&mut self, label: &str, vertices: &[f32], components: u32) -> wgpu::Buffer {
        debug_assert!(components > 0 && vertices.len() % components as usize == 0);
        self.ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
    }

    fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.clear_color = wgpu::Color {
            r: rgba[0] as f64,
            g: rgba[1] as f64,
            b: rgba[2] as f64,
            a: rgba[3] as f64,
        };
    }

    fn render(&mut self, draw: Option<DrawCall<'_, wgpu::Buffer, GemProgram>>) -> Result<(), wgpu::SurfaceError> {
        let frame = self.ctx.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(d) = &draw {
            self.ctx.queue.write_buffer(
                &d.program.uniform_buffer,
                0,
                bytemuck::bytes_of(&GpuUniforms::from(&d.uniforms)),
            );
        }

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gem_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some(d) = &draw {
                rpass.set_pipeline(&d.program.pipeline);
                rpass.set_bind_group(0, &d.program.bind_group, &[]);
                rpass.set_vertex_buffer(0, d.buffer.slice(..));
                rpass.draw(0..d.vertex_count, 0..1);
            }
        }
        self.ctx.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn release_program(&mut self, program: GemProgram) {
        log::debug!("[gpu] releasing gem program");
        program.uniform_buffer.destroy();
    }
}
