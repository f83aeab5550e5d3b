use crate::coords::ColorRgb;
use crate::text::GlyphKey;

use super::frame_cache::FrameCache;
use super::texture::GpuTexture;
use super::{
    BoundTexture, DrawCmd, DrawList, DrawUniforms, Mesh, QuadCmd, RenderCtx, RenderTarget,
    ShaderProgram, TextureStore,
};

/// Frames a glyph texture may go unused before it is freed.
const GLYPH_IDLE_FRAMES: u64 = 120;

/// One render pass worth of commands: an optional clear followed by quads.
#[derive(Debug, PartialEq)]
pub(crate) struct PassSegment<'a> {
    pub clear: Option<ColorRgb>,
    pub quads: Vec<&'a QuadCmd>,
}

/// Splits a frame into passes. Every clear opens a new pass; quads before
/// the first clear load the existing framebuffer.
pub(crate) fn split_passes(cmds: &[DrawCmd]) -> Vec<PassSegment<'_>> {
    let mut passes: Vec<PassSegment<'_>> = Vec::new();
    for cmd in cmds {
        match cmd {
            DrawCmd::Clear(color) => passes.push(PassSegment {
                clear: Some(*color),
                quads: Vec::new(),
            }),
            DrawCmd::Quad(q) => match passes.last_mut() {
                Some(pass) => pass.quads.push(q),
                None => passes.push(PassSegment {
                    clear: None,
                    quads: vec![q],
                }),
            },
        }
    }
    passes
}

fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment.max(1)) * alignment.max(1)
}

/// Replays a [`DrawList`] on the GPU with the shared unit quad.
///
/// Each quad gets its own slot in a dynamic-offset uniform buffer, so one
/// `write_buffer` uploads the whole frame. Glyph bitmaps are uploaded on
/// first use and freed after [`GLYPH_IDLE_FRAMES`] frames without use.
pub struct QuadRenderer {
    uniform_buffer: Option<wgpu::Buffer>,
    uniform_bind_group: Option<wgpu::BindGroup>,
    uniform_capacity: usize,
    uniform_stride: u64,
    staging: Vec<u8>,

    glyphs: FrameCache<GlyphKey, GpuTexture>,

    warned_no_program: bool,
    warned_missing_texture: bool,
}

impl Default for QuadRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadRenderer {
    pub fn new() -> Self {
        Self {
            uniform_buffer: None,
            uniform_bind_group: None,
            uniform_capacity: 0,
            uniform_stride: 0,
            staging: Vec::new(),
            glyphs: FrameCache::new(GLYPH_IDLE_FRAMES),
            warned_no_program: false,
            warned_missing_texture: false,
        }
    }

    /// Records `list` into `target`.
    ///
    /// With no `program` the clears still run and every quad is skipped.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        program: Option<&ShaderProgram>,
        quad: &Mesh,
        textures: &TextureStore,
        list: &DrawList,
    ) {
        let passes = split_passes(list.cmds());
        let quad_count: usize = passes.iter().map(|p| p.quads.len()).sum();

        if program.is_none() && quad_count > 0 && !self.warned_no_program {
            log::warn!("no shader program; quad draws are skipped");
            self.warned_no_program = true;
        }

        if let Some(program) = program
            && quad_count > 0
        {
            self.ensure_uniforms(ctx, program, quad_count);
            self.upload_uniforms(ctx, &passes);
            self.upload_glyphs(ctx, textures, &passes);
        }

        let mut slot = 0u64;
        for pass in &passes {
            let mut rpass = begin_pass(target, pass.clear);

            let Some(program) = program else { continue };
            let Some(uniform_bg) = self.uniform_bind_group.as_ref() else { continue };

            rpass.set_vertex_buffer(0, quad.vertex_buffer.slice(..));
            rpass.set_index_buffer(quad.index_buffer.slice(..), quad.index_format());

            for q in &pass.quads {
                let offset = slot * self.uniform_stride;
                slot += 1;

                let (tw, th) = ctx.target_size;
                let vw = q.viewport.width.min(tw);
                let vh = q.viewport.height.min(th);
                if vw == 0 || vh == 0 {
                    continue;
                }

                let texture_bg = match &q.texture {
                    BoundTexture::None => textures.white_bind_group(),
                    BoundTexture::Image(t) => match textures.bind_group(t.raw) {
                        Some(bg) => bg,
                        None => {
                            if !self.warned_missing_texture {
                                log::warn!("texture {} is not loaded; drawing untextured", t.raw.0);
                                self.warned_missing_texture = true;
                            }
                            textures.white_bind_group()
                        }
                    },
                    BoundTexture::Glyph { key, .. } => match self.glyphs.get(key) {
                        Some(gpu) => gpu.bind_group(),
                        None => continue,
                    },
                };

                rpass.set_viewport(0.0, 0.0, vw as f32, vh as f32, 0.0, 1.0);
                rpass.set_pipeline(program.pipeline(q.blend));
                rpass.set_bind_group(0, uniform_bg, &[offset as u32]);
                rpass.set_bind_group(1, texture_bg, &[]);
                rpass.draw_indexed(0..quad.index_count, 0, 0..1);
            }
        }

        let evicted = self.glyphs.end_frame();
        if evicted > 0 {
            log::debug!("evicted {evicted} idle glyph textures");
        }
    }

    fn ensure_uniforms(&mut self, ctx: &RenderCtx<'_>, program: &ShaderProgram, required: usize) {
        let alignment = u64::from(ctx.device.limits().min_uniform_buffer_offset_alignment);
        let stride = align_up(DrawUniforms::SIZE, alignment);

        if required <= self.uniform_capacity
            && stride == self.uniform_stride
            && self.uniform_bind_group.is_some()
        {
            return;
        }

        let capacity = required.next_power_of_two().max(64);
        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("opengd quad uniforms"),
            size: capacity as u64 * stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("opengd quad uniform bind group"),
            layout: program.uniform_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: Some(DrawUniforms::min_binding_size()),
                }),
            }],
        });

        self.uniform_buffer = Some(buffer);
        self.uniform_bind_group = Some(bind_group);
        self.uniform_capacity = capacity;
        self.uniform_stride = stride;
    }

    fn upload_uniforms(&mut self, ctx: &RenderCtx<'_>, passes: &[PassSegment<'_>]) {
        let Some(buffer) = self.uniform_buffer.as_ref() else { return };

        let stride = self.uniform_stride as usize;
        self.staging.clear();
        for q in passes.iter().flat_map(|p| p.quads.iter()) {
            let start = self.staging.len();
            self.staging.extend_from_slice(bytemuck::bytes_of(&DrawUniforms::from_quad(q)));
            self.staging.resize(start + stride, 0);
        }
        ctx.queue.write_buffer(buffer, 0, &self.staging);
    }

    fn upload_glyphs(&mut self, ctx: &RenderCtx<'_>, textures: &TextureStore, passes: &[PassSegment<'_>]) {
        for q in passes.iter().flat_map(|p| p.quads.iter()) {
            let BoundTexture::Glyph { key, glyph } = &q.texture else { continue };
            if glyph.is_empty() {
                continue;
            }
            self.glyphs.get_or_insert_with(*key, || {
                textures.upload_mask(
                    ctx.device,
                    ctx.queue,
                    (glyph.metrics.width, glyph.metrics.height),
                    &glyph.bitmap,
                )
            });
        }
    }
}

fn begin_pass<'e>(target: &'e mut RenderTarget<'_>, clear: Option<ColorRgb>) -> wgpu::RenderPass<'e> {
    let (color_load, depth_load) = match clear {
        Some(c) => (wgpu::LoadOp::Clear(wgpu::Color::from(c)), wgpu::LoadOp::Clear(1.0)),
        None => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
    };

    target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("opengd quad pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: target.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}
