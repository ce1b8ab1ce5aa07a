use glam::Mat4;

use crate::coords::Rect;

use super::ColorChannel;

/// Per-draw mask parameters handed to the renderer.
///
/// For the mask pass `matrix` maps model space to clip space; for masked
/// screen draws it maps model space to mask-texture lookup space `[0, 1]²`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MaskContext {
    pub matrix: Mat4,
    pub layout_bounds: Rect,
    pub channel: ColorChannel,
}

/// A set of mask-source drawables and the drawables they clip.
///
/// Groups compare equal iff their mask-source sets are equal; order and
/// repeated ids in the declaration do not matter.
#[derive(Debug, Clone)]
pub struct ClipGroup {
    /// Mask sources, duplicates removed, declaration order kept (draw order).
    clipping_ids: Vec<usize>,
    /// Sorted form of `clipping_ids`; the identity of the group.
    id_set: Vec<usize>,
    clipped_drawables: Vec<usize>,

    pub(super) in_use: bool,
    pub(super) all_clipped_draw_rect: Rect,
    pub(super) layout_bounds: Rect,
    pub(super) layout_channel: ColorChannel,
    pub(super) matrix_for_mask: Mat4,
    pub(super) matrix_for_draw: Mat4,
}

impl ClipGroup {
    pub fn new(clipping_ids: &[usize]) -> Self {
        let mut ids = Vec::with_capacity(clipping_ids.len());
        for &id in clipping_ids {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        Self {
            id_set: id_set(clipping_ids),
            clipping_ids: ids,
            clipped_drawables: Vec::new(),
            in_use: false,
            all_clipped_draw_rect: Rect::zero(),
            layout_bounds: Rect::UNIT,
            layout_channel: ColorChannel::R,
            matrix_for_mask: Mat4::IDENTITY,
            matrix_for_draw: Mat4::IDENTITY,
        }
    }

    /// Whether `ids` names the same set of mask sources as this group.
    pub fn matches(&self, ids: &[usize]) -> bool {
        self.id_set == id_set(ids)
    }

    pub(super) fn add_clipped_drawable(&mut self, drawable: usize) {
        self.clipped_drawables.push(drawable);
    }

    #[inline]
    pub fn clipping_ids(&self) -> &[usize] {
        &self.clipping_ids
    }

    #[inline]
    pub fn clipped_drawables(&self) -> &[usize] {
        &self.clipped_drawables
    }

    /// Whether any clipped drawable had geometry this frame.
    #[inline]
    pub fn is_in_use(&self) -> bool {
        self.in_use
    }

    /// Union of clipped drawable bounds in model space.
    #[inline]
    pub fn all_clipped_draw_rect(&self) -> Rect {
        self.all_clipped_draw_rect
    }

    /// Assigned slot in the mask texture, normalized to `[0, 1]²`.
    #[inline]
    pub fn layout_bounds(&self) -> Rect {
        self.layout_bounds
    }

    #[inline]
    pub fn layout_channel(&self) -> ColorChannel {
        self.layout_channel
    }

    #[inline]
    pub fn matrix_for_mask(&self) -> Mat4 {
        self.matrix_for_mask
    }

    #[inline]
    pub fn matrix_for_draw(&self) -> Mat4 {
        self.matrix_for_draw
    }

    /// Context for rendering this group's sources into the mask texture.
    pub fn mask_context(&self) -> MaskContext {
        MaskContext {
            matrix: self.matrix_for_mask,
            layout_bounds: self.layout_bounds,
            channel: self.layout_channel,
        }
    }

    /// Context for drawing a clipped drawable against the mask texture.
    pub fn draw_context(&self) -> MaskContext {
        MaskContext {
            matrix: self.matrix_for_draw,
            layout_bounds: self.layout_bounds,
            channel: self.layout_channel,
        }
    }
}

impl PartialEq for ClipGroup {
    fn eq(&self, other: &Self) -> bool {
        self.id_set == other.id_set
    }
}

impl Eq for ClipGroup {}

fn id_set(ids: &[usize]) -> Vec<usize> {
    let mut set = ids.to_vec();
    set.sort_unstable();
    set.dedup();
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_set_in_any_order_matches() {
        let g = ClipGroup::new(&[1, 2, 3]);
        assert!(g.matches(&[3, 2, 1]));
        assert!(g.matches(&[2, 3, 1]));
    }

    #[test]
    fn subset_does_not_match() {
        let g = ClipGroup::new(&[1, 2, 3]);
        assert!(!g.matches(&[1, 2]));
        assert!(!g.matches(&[1, 2, 3, 4]));
    }

    #[test]
    fn duplicates_collapse() {
        let g = ClipGroup::new(&[1, 1, 2]);
        assert!(g.matches(&[2, 1]));
        assert_eq!(g.clipping_ids(), &[1, 2]);
        assert_eq!(g, ClipGroup::new(&[2, 2, 1, 1]));
    }

    #[test]
    fn repeat_counts_are_ignored() {
        let g = ClipGroup::new(&[1, 1, 2]);
        assert!(g.matches(&[1, 2, 2]));
        assert!(!g.matches(&[1, 3, 3]));
    }

    #[test]
    fn contexts_carry_the_right_matrix() {
        let mut g = ClipGroup::new(&[0]);
        g.matrix_for_mask = Mat4::from_scale(glam::Vec3::splat(2.0));
        g.matrix_for_draw = Mat4::from_scale(glam::Vec3::splat(3.0));
        g.layout_channel = ColorChannel::B;

        assert_eq!(g.mask_context().matrix, g.matrix_for_mask());
        assert_eq!(g.draw_context().matrix, g.matrix_for_draw());
        assert_eq!(g.draw_context().channel, ColorChannel::B);
    }
}
