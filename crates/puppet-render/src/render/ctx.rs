use glam::Mat4;

use crate::coords::Viewport;

/// Device handles a renderer is created against.
///
/// `color_format` is the format of the host's frame; screen pipelines are
/// keyed on it.
#[derive(Clone, Copy)]
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub color_format: wgpu::TextureFormat,
}

impl<'a> RenderCtx<'a> {
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue, color_format: wgpu::TextureFormat) -> Self {
        Self { device, queue, color_format }
    }
}

/// Where one frame is recorded: the host's encoder and its color attachment.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, view: &'a wgpu::TextureView) -> Self {
        Self { encoder, view }
    }
}

/// Per-frame render state supplied by the host.
///
/// The screen pass restores `viewport` after the mask pass has drawn at mask
/// resolution. `None` keeps the full color target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameState {
    /// Model → clip space transform for screen draws.
    pub mvp: Mat4,
    pub viewport: Option<Viewport>,
}

impl Default for FrameState {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, None)
    }
}

impl FrameState {
    pub fn new(mvp: Mat4, viewport: Option<Viewport>) -> Self {
        Self { mvp, viewport }
    }
}
