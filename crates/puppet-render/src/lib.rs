//! Mask compositing and shader dispatch for deformable 2D mesh models.
//!
//! A model is a set of drawables (textured triangle meshes) that some host
//! deforms every frame. Drawables may be clipped by other drawables; this
//! crate packs all clip masks of a model into one RGBA texture, renders them
//! in a mask pass and then draws the model in render order, sampling the
//! mask where needed.
//!
//! - [`mask`]: groups drawables by mask set and lays out their masks.
//! - [`render`]: shader variants, blend state and the wgpu mesh renderer.
//! - [`compositor`]: per-frame orchestration.

pub mod compositor;
pub mod coords;
pub mod device;
pub mod logging;
pub mod mask;
pub mod model;
pub mod paint;
pub mod render;

pub use compositor::{Compositor, CompositorConfig};
pub use mask::MaskLayoutEngine;
pub use model::{GeometryStream, MeshModel};
pub use render::{FrameState, MeshRenderer, ShaderVariantCache, WgpuMeshRenderer};
