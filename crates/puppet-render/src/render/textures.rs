use std::collections::HashSet;

/// Dense table indexed by model texture slot.
#[derive(Debug)]
pub(crate) struct SlotTable<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for SlotTable<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T> SlotTable<T> {
    pub(crate) fn get(&self, slot: u32) -> Option<&T> {
        self.slots.get(slot as usize)?.as_ref()
    }

    /// Stores `value`, returning the previous occupant.
    pub(crate) fn insert(&mut self, slot: u32, value: T) -> Option<T> {
        let i = slot as usize;
        if i >= self.slots.len() {
            self.slots.resize_with(i + 1, || None);
        }
        self.slots[i].replace(value)
    }

    pub(crate) fn remove(&mut self, slot: u32) -> Option<T> {
        self.slots.get_mut(slot as usize)?.take()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Model textures by slot, with one cached bind group per slot.
///
/// Draws that reference an unbound slot sample a 1×1 transparent placeholder
/// and log a warning once per slot.
pub struct TextureBindings {
    views: SlotTable<wgpu::TextureView>,
    bind_groups: SlotTable<wgpu::BindGroup>,

    sampler: Option<wgpu::Sampler>,
    placeholder_group: Option<wgpu::BindGroup>,

    warned_missing: HashSet<u32>,
}

impl Default for TextureBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureBindings {
    pub fn new() -> Self {
        Self {
            views: SlotTable::default(),
            bind_groups: SlotTable::default(),
            sampler: None,
            placeholder_group: None,
            warned_missing: HashSet::new(),
        }
    }

    /// Binds `view` to `slot`, replacing any previous texture.
    pub fn bind(&mut self, slot: u32, view: wgpu::TextureView) {
        if self.views.insert(slot, view).is_some() {
            log::debug!("texture slot {slot} rebound");
        } else {
            log::debug!("texture slot {slot} bound, {} slots in use", self.views.len());
        }
        self.bind_groups.remove(slot);
        self.warned_missing.remove(&slot);
    }

    pub fn unbind(&mut self, slot: u32) -> Option<wgpu::TextureView> {
        self.bind_groups.remove(slot);
        self.views.remove(slot)
    }

    /// Shared linear clamp sampler for model and mask textures.
    pub fn sampler(&mut self, device: &wgpu::Device) -> &wgpu::Sampler {
        self.sampler.get_or_insert_with(|| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("puppet texture sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        })
    }

    /// Prepares the bind group for `slot` (or the placeholder) so that
    /// [`bind_group`](Self::bind_group) can hand it out immutably.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        slot: u32,
    ) {
        if self.bind_groups.get(slot).is_some() {
            return;
        }

        if self.views.get(slot).is_none() {
            if self.warned_missing.insert(slot) {
                log::warn!("texture slot {slot} is not bound; drawing with a transparent placeholder");
            }
            self.ensure_placeholder(device, queue, layout);
            return;
        }

        self.sampler(device);
        let (Some(view), Some(sampler)) = (self.views.get(slot), self.sampler.as_ref()) else {
            return;
        };
        let group = texture_bind_group(device, layout, view, sampler, "puppet model texture bind group");
        self.bind_groups.insert(slot, group);
    }

    /// Bind group for `slot`, falling back to the placeholder.
    ///
    /// `None` only if neither was prepared.
    pub fn bind_group(&self, slot: u32) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(slot).or(self.placeholder_group.as_ref())
    }

    /// Placeholder bind group; also stands in for a missing mask texture.
    pub fn placeholder(&self) -> Option<&wgpu::BindGroup> {
        self.placeholder_group.as_ref()
    }

    /// Bind group over an arbitrary view with the shared sampler.
    pub fn group_for_view(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        view: &wgpu::TextureView,
        label: &str,
    ) -> wgpu::BindGroup {
        let sampler = self.sampler(device);
        texture_bind_group(device, layout, view, sampler, label)
    }

    /// Drops every GPU object. Bound views are released too.
    pub fn clear(&mut self) {
        self.views.clear();
        self.bind_groups.clear();
        self.sampler = None;
        self.placeholder_group = None;
        self.warned_missing.clear();
    }

    pub fn ensure_placeholder(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, layout: &wgpu::BindGroupLayout) {
        if self.placeholder_group.is_some() {
            return;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("puppet placeholder texture"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[0u8; 4],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let group = self.group_for_view(device, layout, &view, "puppet placeholder bind group");
        self.placeholder_group = Some(group);
    }
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
