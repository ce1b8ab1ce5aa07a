//! Headless GPU device management.
//!
//! Hosts with a window own their device and hand it to the renderer through
//! [`RenderCtx`](crate::render::RenderCtx). This module covers the offscreen
//! case: creating the wgpu Instance/Adapter/Device/Queue without a surface,
//! plus color targets and model textures on that device.

mod headless;

pub use headless::{HeadlessGpu, HeadlessInit, OffscreenTarget};
