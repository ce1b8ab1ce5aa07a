use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use super::variant::{MaskUsage, MeshDraw};

/// Per-draw uniform block (160 bytes), matching `MeshUniforms` in `mesh.wgsl`.
///
///  offset   0  matrix        mat4x4   model → clip
///  offset  64  clip_matrix   mat4x4   model → mask space
///  offset 128  base_color    vec4     premultiplied tint (setup: slot edges in clip space)
///  offset 144  channel_flag  vec4     one-hot mask channel selector
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshUniforms {
    pub matrix: [f32; 16],
    pub clip_matrix: [f32; 16],
    pub base_color: [f32; 4],
    pub channel_flag: [f32; 4],
}

pub(crate) const MESH_UNIFORMS_SIZE: u64 = std::mem::size_of::<MeshUniforms>() as u64;

impl MeshUniforms {
    pub fn for_draw(draw: &MeshDraw<'_>) -> Self {
        match &draw.mask {
            MaskUsage::Setup(ctx) => {
                let b = ctx.layout_bounds;
                Self {
                    matrix: ctx.matrix.to_cols_array(),
                    clip_matrix: ctx.matrix.to_cols_array(),
                    base_color: [
                        b.origin.x * 2.0 - 1.0,
                        b.origin.y * 2.0 - 1.0,
                        b.right() * 2.0 - 1.0,
                        b.bottom() * 2.0 - 1.0,
                    ],
                    channel_flag: ctx.channel.flag(),
                }
            }
            MaskUsage::Consume { context, .. } => Self {
                matrix: draw.mvp.to_cols_array(),
                clip_matrix: context.matrix.to_cols_array(),
                base_color: tint(draw),
                channel_flag: context.channel.flag(),
            },
            MaskUsage::None => Self {
                matrix: draw.mvp.to_cols_array(),
                clip_matrix: Mat4::IDENTITY.to_cols_array(),
                base_color: tint(draw),
                channel_flag: [0.0; 4],
            },
        }
    }
}

fn tint(draw: &MeshDraw<'_>) -> [f32; 4] {
    draw.model_color.with_opacity(draw.opacity).premultiplied().to_array()
}

/// Ring of uniform slots addressed with dynamic offsets.
///
/// One slot per draw call in a frame; reset at the start of each frame.
pub(crate) struct UniformArena {
    buffer: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
    stride: u64,
    capacity: usize,
    cursor: usize,
    warned_full: bool,
}

impl UniformArena {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let align = u64::from(device.limits().min_uniform_buffer_offset_alignment).max(1);
        Self {
            buffer: None,
            bind_group: None,
            stride: MESH_UNIFORMS_SIZE.div_ceil(align) * align,
            capacity: 0,
            cursor: 0,
            warned_full: false,
        }
    }

    /// Starts a new frame with room for at least `slots` draws.
    pub(crate) fn reset(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, slots: usize) {
        self.cursor = 0;
        if slots <= self.capacity && self.buffer.is_some() {
            return;
        }

        let capacity = slots.next_power_of_two().max(64);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("puppet mesh uniforms"),
            size: self.stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("puppet mesh uniforms bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(MESH_UNIFORMS_SIZE),
                }),
            }],
        });

        log::debug!("uniform arena grown to {capacity} slots");
        self.buffer = Some(buffer);
        self.bind_group = Some(bind_group);
        self.capacity = capacity;
        self.warned_full = false;
    }

    /// Uploads `uniforms` into the next free slot and returns its dynamic offset.
    pub(crate) fn push(&mut self, queue: &wgpu::Queue, uniforms: &MeshUniforms) -> Option<u32> {
        let buffer = self.buffer.as_ref()?;
        if self.cursor >= self.capacity {
            if !self.warned_full {
                log::warn!("uniform arena full ({} slots); dropping draws", self.capacity);
                self.warned_full = true;
            }
            return None;
        }

        let offset = self.stride * self.cursor as u64;
        queue.write_buffer(buffer, offset, bytemuck::bytes_of(uniforms));
        self.cursor += 1;
        u32::try_from(offset).ok()
    }

    pub(crate) fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    pub(crate) fn clear(&mut self) {
        self.buffer = None;
        self.bind_group = None;
        self.capacity = 0;
        self.cursor = 0;
    }
}
