//! Color handling for model tinting.

mod color;

pub use color::Color;
