//! Model data as seen by the renderer.
//!
//! The renderer consumes geometry through [`GeometryStream`]. Deformation,
//! physics and file parsing happen elsewhere; this crate only reads.

mod mesh;
mod stream;

pub use mesh::{DrawableMesh, MeshModel};
pub use stream::{BlendMode, GeometryStream};
