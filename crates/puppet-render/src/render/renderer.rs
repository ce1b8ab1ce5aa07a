use crate::coords::Viewport;
use crate::model::GeometryStream;

use super::variant::MeshDraw;

/// Per-frame information handed to [`MeshRenderer::pre_draw`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameInfo {
    /// Monotonic frame counter maintained by the compositor.
    pub frame_no: u64,
    /// Upper bound on `draw_mesh` calls this frame (mask and screen passes).
    pub max_draws: usize,
}

/// Which pass [`MeshRenderer::begin_pass`] opens.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PassTarget {
    /// The shared mask texture, `size × size`, cleared to 1.0 in all channels.
    Mask { size: u32 },
    /// The host's color target, loaded (not cleared). `None` keeps the full
    /// target as viewport.
    Screen { viewport: Option<Viewport> },
}

/// Backend that turns [`MeshDraw`]s into GPU commands.
///
/// The compositor drives one frame as
/// `pre_draw → [begin_pass(Mask) → draw_mesh* → end_pass] → begin_pass(Screen) → draw_mesh* → end_pass`.
/// Draws outside an open pass are dropped by implementations.
pub trait MeshRenderer {
    /// Host-provided target a frame is recorded into.
    type Target<'t>;

    /// Called once per model before the first frame.
    fn initialize(&mut self, model: &dyn GeometryStream);

    fn pre_draw(&mut self, frame: &FrameInfo);

    fn begin_pass(&mut self, target: &mut Self::Target<'_>, pass: PassTarget);

    fn draw_mesh(&mut self, draw: &MeshDraw<'_>);

    fn end_pass(&mut self);

    /// Frees GPU resources. Calling it twice is a no-op.
    fn release(&mut self);
}
