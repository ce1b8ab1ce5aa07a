//! Per-frame orchestration: mask pass, then screen pass.

mod compositor;
mod config;
mod order;

pub use compositor::{Compositor, FrameStage};
pub use config::{CompositorConfig, DEFAULT_MASK_BUFFER_SIZE};
pub use order::rebuild_draw_order;
