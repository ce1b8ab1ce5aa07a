/// Color blending mode of a drawable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Multiplicative,
}

/// Read-only view of a model's per-frame mesh data.
///
/// Drawables are addressed by index in `0..drawable_count()`. Implementations
/// are expected to return the already-deformed geometry for the current frame;
/// the renderer never mutates anything through this trait.
///
/// Positions are in model units; UVs follow the bottom-left texture origin
/// convention (the shaders flip `v`).
pub trait GeometryStream {
    fn drawable_count(&self) -> usize;

    fn vertex_positions(&self, index: usize) -> &[[f32; 2]];
    fn vertex_uvs(&self, index: usize) -> &[[f32; 2]];
    fn vertex_indices(&self, index: usize) -> &[u16];

    /// Model-local texture slot sampled by this drawable.
    fn texture_index(&self, index: usize) -> u32;

    fn is_culling(&self, index: usize) -> bool;
    fn blend_mode(&self, index: usize) -> BlendMode;
    fn opacity(&self, index: usize) -> f32;
    fn render_order(&self, index: usize) -> i32;
    fn is_visible(&self, index: usize) -> bool;

    /// Whether the vertex positions were updated by the last model update.
    fn vertex_positions_did_change(&self, index: usize) -> bool;

    /// Whether the mask should be applied inverted (draw outside the mask).
    fn is_mask_inverted(&self, index: usize) -> bool;

    /// Indices of the drawables that mask this drawable. Empty if unmasked.
    fn masks(&self, index: usize) -> &[usize];

    #[inline]
    fn vertex_count(&self, index: usize) -> usize {
        self.vertex_positions(index).len()
    }
}
