//! Geometry types shared by the mask engine and the renderers.
//!
//! Model space is whatever unit the model data uses (+Y up). Mask layout
//! slots live in the normalized `[0, 1]²` square of the mask texture.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
