use super::{BlendMode, GeometryStream};

/// One drawable's mesh and flags, owned in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableMesh {
    pub positions: Vec<[f32; 2]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u16>,
    pub texture_index: u32,
    pub culling: bool,
    pub blend_mode: BlendMode,
    pub opacity: f32,
    pub render_order: i32,
    pub visible: bool,
    pub positions_changed: bool,
    pub mask_inverted: bool,
    pub masks: Vec<usize>,
}

impl Default for DrawableMesh {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
            texture_index: 0,
            culling: false,
            blend_mode: BlendMode::Normal,
            opacity: 1.0,
            render_order: 0,
            visible: true,
            positions_changed: true,
            mask_inverted: false,
            masks: Vec::new(),
        }
    }
}

impl DrawableMesh {
    /// Axis-aligned quad covering `x..x+w`, `y..y+h` with full-texture UVs.
    pub fn quad(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            positions: vec![[x, y], [x + w, y], [x + w, y + h], [x, y + h]],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            indices: vec![0, 1, 2, 0, 2, 3],
            ..Self::default()
        }
    }

    pub fn with_render_order(mut self, order: i32) -> Self {
        self.render_order = order;
        self
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    pub fn with_masks(mut self, masks: impl Into<Vec<usize>>) -> Self {
        self.masks = masks.into();
        self
    }

    pub fn inverted_mask(mut self) -> Self {
        self.mask_inverted = true;
        self
    }
}

/// In-memory [`GeometryStream`].
///
/// Useful for hosts that deform meshes themselves and for tests. Out-of-range
/// indices panic, as with slice indexing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshModel {
    drawables: Vec<DrawableMesh>,
}

impl MeshModel {
    pub fn new(drawables: Vec<DrawableMesh>) -> Self {
        Self { drawables }
    }

    pub fn drawables(&self) -> &[DrawableMesh] {
        &self.drawables
    }

    pub fn drawable_mut(&mut self, index: usize) -> &mut DrawableMesh {
        &mut self.drawables[index]
    }

    /// Clears every "positions changed" flag, as a model update with no
    /// deformation would.
    pub fn mark_unchanged(&mut self) {
        for d in &mut self.drawables {
            d.positions_changed = false;
        }
    }
}

impl GeometryStream for MeshModel {
    fn drawable_count(&self) -> usize {
        self.drawables.len()
    }

    fn vertex_positions(&self, index: usize) -> &[[f32; 2]] {
        &self.drawables[index].positions
    }

    fn vertex_uvs(&self, index: usize) -> &[[f32; 2]] {
        &self.drawables[index].uvs
    }

    fn vertex_indices(&self, index: usize) -> &[u16] {
        &self.drawables[index].indices
    }

    fn texture_index(&self, index: usize) -> u32 {
        self.drawables[index].texture_index
    }

    fn is_culling(&self, index: usize) -> bool {
        self.drawables[index].culling
    }

    fn blend_mode(&self, index: usize) -> BlendMode {
        self.drawables[index].blend_mode
    }

    fn opacity(&self, index: usize) -> f32 {
        self.drawables[index].opacity
    }

    fn render_order(&self, index: usize) -> i32 {
        self.drawables[index].render_order
    }

    fn is_visible(&self, index: usize) -> bool {
        self.drawables[index].visible
    }

    fn vertex_positions_did_change(&self, index: usize) -> bool {
        self.drawables[index].positions_changed
    }

    fn is_mask_inverted(&self, index: usize) -> bool {
        self.drawables[index].mask_inverted
    }

    fn masks(&self, index: usize) -> &[usize] {
        &self.drawables[index].masks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_has_four_vertices_two_triangles() {
        let q = DrawableMesh::quad(0.0, 0.0, 2.0, 1.0);
        assert_eq!(q.positions.len(), 4);
        assert_eq!(q.uvs.len(), 4);
        assert_eq!(q.indices.len(), 6);
        assert_eq!(q.positions[2], [2.0, 1.0]);
    }

    #[test]
    fn stream_reads_through_to_drawables() {
        let model = MeshModel::new(vec![
            DrawableMesh::quad(0.0, 0.0, 1.0, 1.0).with_render_order(7),
            DrawableMesh::quad(0.0, 0.0, 1.0, 1.0)
                .with_masks(vec![0])
                .with_blend_mode(BlendMode::Additive)
                .inverted_mask(),
        ]);

        assert_eq!(model.drawable_count(), 2);
        assert_eq!(model.render_order(0), 7);
        assert_eq!(model.masks(1), &[0]);
        assert_eq!(model.blend_mode(1), BlendMode::Additive);
        assert!(model.is_mask_inverted(1));
        assert_eq!(model.vertex_count(0), 4);
    }

    #[test]
    fn mark_unchanged_clears_flags() {
        let mut model = MeshModel::new(vec![DrawableMesh::quad(0.0, 0.0, 1.0, 1.0)]);
        assert!(model.vertex_positions_did_change(0));
        model.mark_unchanged();
        assert!(!model.vertex_positions_did_change(0));
    }
}
