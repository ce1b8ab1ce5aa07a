/// Offscreen RGBA texture the mask pass renders into.
///
/// Square, `size × size`. Recreated only when the requested size changes.
pub struct MaskRenderTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    last_used_frame: u64,
}

pub const MASK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

impl MaskRenderTarget {
    fn create(device: &wgpu::Device, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("puppet mask texture"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: MASK_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            last_used_frame: 0,
        }
    }

    /// Makes sure `slot` holds a target of `size` (clamped to device limits).
    ///
    /// Returns `true` if a new texture was created.
    pub fn ensure(slot: &mut Option<Self>, device: &wgpu::Device, size: u32) -> bool {
        let size = clamp_size(size, device.limits().max_texture_dimension_2d);
        if slot.as_ref().is_some_and(|t| t.size() == size) {
            return false;
        }

        match slot {
            Some(old) => log::info!("mask texture resized {0}×{0} → {1}×{1}", old.size(), size),
            None => log::debug!("mask texture created {size}×{size}"),
        }
        *slot = Some(Self::create(device, size));
        true
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.texture.width()
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Frame number of the last mask pass that rendered into this target.
    #[inline]
    pub fn last_used_frame(&self) -> u64 {
        self.last_used_frame
    }

    pub fn mark_used(&mut self, frame: u64) {
        self.last_used_frame = frame;
    }
}

fn clamp_size(requested: u32, max: u32) -> u32 {
    let size = requested.clamp(1, max.max(1));
    if size != requested {
        log::warn!("mask buffer size {requested} clamped to {size}");
    }
    size
}
