//! Packing of mask groups into channel sub-rectangles.

use glam::{Mat4, Vec3};

use crate::coords::Rect;

use super::CHANNEL_COUNT;

/// Most groups a single channel can hold (3×3 grid).
pub const MAX_GROUPS_PER_CHANNEL: usize = 9;

/// Margin added around the clipped bounds on each side, as a fraction of the
/// bounds' width/height. Keeps edge texels of the mask from bleeding.
pub const MASK_MARGIN: f32 = 0.05;

/// How many groups each channel (R, G, B, A) receives for `active` groups.
///
/// The first `active % 4` channels get one extra group.
pub fn channel_distribution(active: usize) -> [usize; CHANNEL_COUNT] {
    let base = active / CHANNEL_COUNT;
    let remainder = active % CHANNEL_COUNT;

    let mut counts = [base; CHANNEL_COUNT];
    for count in counts.iter_mut().take(remainder) {
        *count += 1;
    }
    counts
}

/// Slot of the `index`-th group in a channel holding `count` groups.
///
/// Returns `None` for groups past the 3×3 grid capacity.
pub fn slot_in_channel(count: usize, index: usize) -> Option<Rect> {
    match count {
        0 => None,
        1 => Some(Rect::UNIT),
        2 => Some(Rect::new(index as f32 * 0.5, 0.0, 0.5, 1.0)),
        3..=4 => {
            let x = (index % 2) as f32;
            let y = (index / 2) as f32;
            Some(Rect::new(x * 0.5, y * 0.5, 0.5, 0.5))
        }
        _ if index < MAX_GROUPS_PER_CHANNEL => {
            let x = (index % 3) as f32;
            let y = (index / 3) as f32;
            Some(Rect::new(x / 3.0, y / 3.0, 1.0 / 3.0, 1.0 / 3.0))
        }
        _ => None,
    }
}

/// Matrices for a group whose clipped content spans `bounds` (model space)
/// and whose mask lives at `layout` (normalized mask-texture space).
///
/// Returns `(matrix_for_mask, matrix_for_draw)`:
/// - `matrix_for_draw` maps the margin-expanded bounds onto `layout` in `[0, 1]²`;
/// - `matrix_for_mask` additionally remaps `[0, 1]` to `[-1, 1]` clip space.
///
/// Scaling is independent per axis; rotated content is not supported.
pub fn mask_matrices(bounds: Rect, layout: Rect) -> (Mat4, Mat4) {
    let expanded = bounds.expand(bounds.size.x * MASK_MARGIN, bounds.size.y * MASK_MARGIN);

    let scale_x = layout.size.x / expanded.size.x;
    let scale_y = layout.size.y / expanded.size.y;

    let for_draw = Mat4::from_translation(Vec3::new(layout.origin.x, layout.origin.y, 0.0))
        * Mat4::from_scale(Vec3::new(scale_x, scale_y, 1.0))
        * Mat4::from_translation(Vec3::new(-expanded.origin.x, -expanded.origin.y, 0.0));

    let for_mask = Mat4::from_translation(Vec3::new(-1.0, -1.0, 0.0))
        * Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0))
        * for_draw;

    (for_mask, for_draw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn apply(m: Mat4, x: f32, y: f32) -> (f32, f32) {
        let p = m.transform_point3(Vec3::new(x, y, 0.0));
        (p.x, p.y)
    }

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < EPS && (a.1 - b.1).abs() < EPS
    }

    // ── distribution ──────────────────────────────────────────────────────

    #[test]
    fn distribution_sums_to_active() {
        for n in 0..=40 {
            assert_eq!(channel_distribution(n).iter().sum::<usize>(), n, "n = {n}");
        }
    }

    #[test]
    fn distribution_small_counts_one_per_channel() {
        assert_eq!(channel_distribution(1), [1, 0, 0, 0]);
        assert_eq!(channel_distribution(2), [1, 1, 0, 0]);
        assert_eq!(channel_distribution(3), [1, 1, 1, 0]);
        assert_eq!(channel_distribution(4), [1, 1, 1, 1]);
    }

    #[test]
    fn distribution_five_front_loads_red() {
        assert_eq!(channel_distribution(5), [2, 1, 1, 1]);
        assert_eq!(channel_distribution(11), [3, 3, 3, 2]);
    }

    // ── slots ─────────────────────────────────────────────────────────────

    #[test]
    fn single_group_takes_unit_square() {
        assert_eq!(slot_in_channel(1, 0), Some(Rect::UNIT));
    }

    #[test]
    fn two_groups_split_horizontally() {
        assert_eq!(slot_in_channel(2, 0), Some(Rect::new(0.0, 0.0, 0.5, 1.0)));
        assert_eq!(slot_in_channel(2, 1), Some(Rect::new(0.5, 0.0, 0.5, 1.0)));
    }

    #[test]
    fn three_and_four_use_quarters() {
        assert_eq!(slot_in_channel(3, 2), Some(Rect::new(0.0, 0.5, 0.5, 0.5)));
        assert_eq!(slot_in_channel(4, 3), Some(Rect::new(0.5, 0.5, 0.5, 0.5)));
    }

    #[test]
    fn up_to_nine_use_thirds() {
        let third = 1.0 / 3.0;
        assert_eq!(slot_in_channel(5, 0), Some(Rect::new(0.0, 0.0, third, third)));
        assert_eq!(slot_in_channel(9, 4), Some(Rect::new(1.0 / 3.0, 1.0 / 3.0, third, third)));
        assert_eq!(slot_in_channel(9, 8), Some(Rect::new(2.0 / 3.0, 2.0 / 3.0, third, third)));
    }

    #[test]
    fn past_capacity_has_no_slot() {
        assert!(slot_in_channel(10, 8).is_some());
        assert_eq!(slot_in_channel(10, 9), None);
        assert_eq!(slot_in_channel(0, 0), None);
    }

    // ── matrices ──────────────────────────────────────────────────────────

    #[test]
    fn mask_matrix_maps_expanded_corners_onto_slot() {
        let bounds = Rect::new(-2.0, 1.0, 4.0, 2.0);
        let layout = Rect::new(0.5, 0.0, 0.5, 1.0);
        let (for_mask, _) = mask_matrices(bounds, layout);

        let e = bounds.expand(4.0 * MASK_MARGIN, 2.0 * MASK_MARGIN);
        let lo = (layout.origin.x * 2.0 - 1.0, layout.origin.y * 2.0 - 1.0);
        let hi = (layout.right() * 2.0 - 1.0, layout.bottom() * 2.0 - 1.0);

        assert!(close(apply(for_mask, e.origin.x, e.origin.y), lo));
        assert!(close(apply(for_mask, e.right(), e.bottom()), hi));
        assert!(close(apply(for_mask, e.origin.x, e.bottom()), (lo.0, hi.1)));
        assert!(close(apply(for_mask, e.right(), e.origin.y), (hi.0, lo.1)));
    }

    #[test]
    fn full_slot_mask_matrix_fills_clip_space() {
        let bounds = Rect::new(10.0, 20.0, 100.0, 50.0);
        let (for_mask, _) = mask_matrices(bounds, Rect::UNIT);
        let e = bounds.expand(5.0, 2.5);

        assert!(close(apply(for_mask, e.origin.x, e.origin.y), (-1.0, -1.0)));
        assert!(close(apply(for_mask, e.right(), e.bottom()), (1.0, 1.0)));
    }

    #[test]
    fn draw_matrix_stays_in_unit_space() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);
        let layout = Rect::new(1.0 / 3.0, 2.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
        let (_, for_draw) = mask_matrices(bounds, layout);
        let e = bounds.expand(0.5, 0.5);

        assert!(close(apply(for_draw, e.origin.x, e.origin.y), (layout.origin.x, layout.origin.y)));
        assert!(close(apply(for_draw, e.right(), e.bottom()), (layout.right(), layout.bottom())));
    }

    #[test]
    fn bounds_center_lands_on_slot_center() {
        let bounds = Rect::new(-3.0, -1.0, 6.0, 2.0);
        let layout = Rect::new(0.0, 0.5, 0.5, 0.5);
        let (_, for_draw) = mask_matrices(bounds, layout);
        assert!(close(apply(for_draw, 0.0, 0.0), (0.25, 0.75)));
    }
}
