use std::cell::RefCell;
use std::rc::Rc;

use crate::coords::Viewport;
use crate::model::GeometryStream;

use super::ctx::{RenderCtx, RenderTarget};
use super::mask_target::{MaskRenderTarget, MASK_FORMAT};
use super::mesh_buffers::MeshBuffers;
use super::renderer::{FrameInfo, MeshRenderer, PassTarget};
use super::shader_cache::{PipelineKey, ShaderVariantCache};
use super::textures::TextureBindings;
use super::uniforms::{MeshUniforms, UniformArena};
use super::variant::{select_variant, MaskUsage, MeshDraw};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum PassKind {
    Mask,
    Screen,
}

/// [`MeshRenderer`] on wgpu.
///
/// Holds the open render pass between `begin_pass` and `end_pass` (with its
/// encoder lifetime erased), so the host's encoder stays locked until the
/// pass ends. All per-draw state (pipeline, bind groups, buffers) is set
/// explicitly for every draw.
pub struct WgpuMeshRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,

    shaders: Rc<RefCell<ShaderVariantCache>>,

    textures: TextureBindings,
    meshes: MeshBuffers,
    uniforms: UniformArena,

    mask_target: Option<MaskRenderTarget>,
    mask_group: Option<wgpu::BindGroup>,

    pass: Option<wgpu::RenderPass<'static>>,
    pass_kind: Option<PassKind>,

    frame_no: u64,
    released: bool,
    warned_no_pass: bool,
}

impl WgpuMeshRenderer {
    pub fn new(ctx: &RenderCtx<'_>, shaders: Rc<RefCell<ShaderVariantCache>>) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            surface_format: ctx.color_format,
            shaders,
            textures: TextureBindings::new(),
            meshes: MeshBuffers::new(),
            uniforms: UniformArena::new(ctx.device),
            mask_target: None,
            mask_group: None,
            pass: None,
            pass_kind: None,
            frame_no: 0,
            released: false,
            warned_no_pass: false,
        }
    }

    /// Binds a model texture to `slot`.
    ///
    /// Under a [`Compositor`](crate::Compositor), bind through
    /// `Compositor::bind_texture` so masks drawn from `slot` are refreshed.
    pub fn bind_texture(&mut self, slot: u32, view: wgpu::TextureView) {
        self.textures.bind(slot, view);
    }

    pub fn unbind_texture(&mut self, slot: u32) -> Option<wgpu::TextureView> {
        self.textures.unbind(slot)
    }

    #[inline]
    pub fn textures(&self) -> &TextureBindings {
        &self.textures
    }

    #[inline]
    pub fn mask_target(&self) -> Option<&MaskRenderTarget> {
        self.mask_target.as_ref()
    }

    #[inline]
    pub fn shaders(&self) -> &Rc<RefCell<ShaderVariantCache>> {
        &self.shaders
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    fn begin_mask_pass(&mut self, encoder: &mut wgpu::CommandEncoder, size: u32) {
        if MaskRenderTarget::ensure(&mut self.mask_target, &self.device, size) {
            self.mask_group = None;
        }
        let Some(mask) = self.mask_target.as_mut() else { return };
        mask.mark_used(self.frame_no);

        let rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("puppet mask pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: mask.view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    // 1.0 in every channel: nothing is masked in yet.
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        self.pass = Some(rpass.forget_lifetime());
        self.pass_kind = Some(PassKind::Mask);
    }

    fn begin_screen_pass(&mut self, target: &mut RenderTarget<'_>, viewport: Option<Viewport>) {
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("puppet screen pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if let Some(vp) = viewport.filter(|vp| vp.is_valid()) {
            rpass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);
        }

        self.pass = Some(rpass.forget_lifetime());
        self.pass_kind = Some(PassKind::Screen);
    }
}

impl MeshRenderer for WgpuMeshRenderer {
    type Target<'t> = RenderTarget<'t>;

    fn initialize(&mut self, model: &dyn GeometryStream) {
        let count = model.drawable_count();
        let mut uploaded = 0;
        for d in 0..count {
            if self.meshes.upload(
                &self.device,
                &self.queue,
                d,
                model.vertex_positions(d),
                model.vertex_uvs(d),
                model.vertex_indices(d),
            ) {
                uploaded += 1;
            }
        }
        self.released = false;
        log::debug!("mesh renderer initialized: {uploaded}/{count} drawables have geometry");
    }

    fn pre_draw(&mut self, frame: &FrameInfo) {
        if self.released {
            return;
        }
        self.frame_no = frame.frame_no;
        self.warned_no_pass = false;

        let mut shaders = self.shaders.borrow_mut();
        let layouts = shaders.layouts(&self.device);
        self.uniforms.reset(&self.device, &layouts.uniforms, frame.max_draws);
    }

    fn begin_pass(&mut self, target: &mut RenderTarget<'_>, pass: PassTarget) {
        if self.released {
            return;
        }
        self.end_pass();

        match pass {
            PassTarget::Mask { size } => self.begin_mask_pass(target.encoder, size),
            PassTarget::Screen { viewport } => self.begin_screen_pass(target, viewport),
        }
    }

    fn draw_mesh(&mut self, draw: &MeshDraw<'_>) {
        let Some(kind) = self.pass_kind else {
            if !self.warned_no_pass {
                log::warn!("draw_mesh called outside a pass; draw skipped");
                self.warned_no_pass = true;
            }
            return;
        };

        let setup = matches!(draw.mask, MaskUsage::Setup(_));
        if setup != (kind == PassKind::Mask) {
            log::debug!("drawable {} does not belong to the {kind:?} pass; skipped", draw.drawable);
            return;
        }

        let (variant, _) = select_variant(draw.blend_mode, &draw.mask);
        let format = match kind {
            PassKind::Mask => MASK_FORMAT,
            PassKind::Screen => self.surface_format,
        };

        // Mutating methods must happen before borrowing pipeline/buffers immutably.
        if !self.meshes.upload(
            &self.device,
            &self.queue,
            draw.drawable,
            draw.positions,
            draw.uvs,
            draw.indices,
        ) {
            log::debug!("drawable {} has no drawable geometry; skipped", draw.drawable);
            return;
        }

        let Some(offset) = self.uniforms.push(&self.queue, &MeshUniforms::for_draw(draw)) else {
            return;
        };

        let mut shaders = self.shaders.borrow_mut();
        {
            let layouts = shaders.layouts(&self.device);
            self.textures.prepare(&self.device, &self.queue, &layouts.texture, draw.texture_index);

            if variant.samples_mask() {
                if self.mask_group.is_none()
                    && let Some(mask) = self.mask_target.as_ref()
                {
                    let group = self.textures.group_for_view(
                        &self.device,
                        &layouts.texture,
                        mask.view(),
                        "puppet mask bind group",
                    );
                    self.mask_group = Some(group);
                }
                if self.mask_group.is_none() {
                    self.textures.ensure_placeholder(&self.device, &self.queue, &layouts.texture);
                }
            }
        }

        let key = PipelineKey {
            variant,
            format,
            culling: draw.culling,
        };

        let Some(pipeline) = shaders.variant_for(&self.device, key) else { return };
        let Some(mesh) = self.meshes.slices(draw.drawable) else { return };
        let Some(uniform_group) = self.uniforms.bind_group() else { return };
        let Some(texture_group) = self.textures.bind_group(draw.texture_index) else { return };
        let Some(pass) = self.pass.as_mut() else { return };

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, uniform_group, &[offset]);
        pass.set_bind_group(1, texture_group, &[]);
        if variant.samples_mask() {
            let Some(mask_group) = self.mask_group.as_ref().or(self.textures.placeholder()) else {
                return;
            };
            pass.set_bind_group(2, mask_group, &[]);
        }
        pass.set_vertex_buffer(0, mesh.positions);
        pass.set_vertex_buffer(1, mesh.uvs);
        pass.set_index_buffer(mesh.indices, wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn end_pass(&mut self) {
        // Dropping the pass ends it and unlocks the host's encoder.
        self.pass = None;
        self.pass_kind = None;
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.end_pass();

        self.meshes.clear();
        self.textures.clear();
        self.uniforms.clear();
        self.mask_group = None;
        self.mask_target = None;

        // Sole owner of the cache: tear it down too.
        if Rc::strong_count(&self.shaders) == 1 {
            self.shaders.borrow_mut().release();
        }

        self.released = true;
        log::debug!("mesh renderer released");
    }
}
