//! GPU rendering of model meshes.
//!
//! The compositor describes each draw as a [`MeshDraw`]; a [`MeshRenderer`]
//! turns it into GPU commands. [`WgpuMeshRenderer`] is the wgpu backend and
//! owns per-model GPU resources (mesh buffers, texture bindings, mask target).
//! Compiled pipelines live in a [`ShaderVariantCache`] that several renderers
//! on the same device may share.
//!
//! Convention:
//! - Model geometry is in model units (+Y up); `FrameState::mvp` maps it to clip space.
//! - Every color reaching a shader is premultiplied.

mod blend;
mod ctx;
mod mask_target;
mod mesh_buffers;
mod renderer;
mod shader_cache;
mod textures;
mod uniforms;
mod variant;
mod wgpu_renderer;

pub use blend::{BlendFactor, BlendFunc};
pub use ctx::{FrameState, RenderCtx, RenderTarget};
pub use mask_target::{MaskRenderTarget, MASK_FORMAT};
pub use mesh_buffers::{MeshBuffers, MeshSlices};
pub use renderer::{FrameInfo, MeshRenderer, PassTarget};
pub use shader_cache::{validate_wgsl, BindLayouts, CompileStage, PipelineKey, ShaderVariantCache, MESH_WGSL};
pub use textures::TextureBindings;
pub use uniforms::MeshUniforms;
pub use variant::{select_variant, MaskState, MaskUsage, MeshDraw, ShaderPass, ShaderVariantKey};
pub use wgpu_renderer::WgpuMeshRenderer;
