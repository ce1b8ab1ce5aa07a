use crate::model::GeometryStream;

/// Rebuilds `out` with drawable indices in paint order.
///
/// Sorted by render order; `sort_by_key` is stable, so ties keep index order.
pub fn rebuild_draw_order<M: GeometryStream + ?Sized>(out: &mut Vec<usize>, model: &M) {
    out.clear();
    out.extend(0..model.drawable_count());
    out.sort_by_key(|&i| model.render_order(i));
}
