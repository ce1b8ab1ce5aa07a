//! Clip-mask grouping and layout.
//!
//! Drawables that share the same set of mask sources form one [`ClipGroup`].
//! All groups render into a single RGBA texture: each group gets one color
//! channel and a sub-rectangle of it (up to 3×3 per channel).
//!
//! Mask texture convention: 1.0 means excluded, values near 0.0 included.

mod channel;
mod engine;
mod group;
pub mod layout;

pub use channel::{ColorChannel, CHANNEL_COUNT};
pub use engine::MaskLayoutEngine;
pub use group::{ClipGroup, MaskContext};
