use crate::coords::Rect;
use crate::model::GeometryStream;

use super::layout::{channel_distribution, mask_matrices, slot_in_channel, MAX_GROUPS_PER_CHANNEL};
use super::{ClipGroup, ColorChannel};

/// Groups masked drawables and lays their masks out in one RGBA texture.
///
/// Groups are built once from the model's static mask membership. Each frame
/// [`setup_frame`](Self::setup_frame) refreshes bounds, layout and matrices;
/// the group list itself never changes until the engine is rebuilt.
#[derive(Debug, Clone)]
pub struct MaskLayoutEngine {
    groups: Vec<ClipGroup>,
    /// Group index per drawable; `None` for unmasked drawables.
    group_of: Vec<Option<usize>>,
    mask_buffer_size: u32,
    warned_overflow: bool,
}

impl MaskLayoutEngine {
    pub fn new(mask_buffer_size: u32) -> Self {
        Self {
            groups: Vec::new(),
            group_of: Vec::new(),
            mask_buffer_size,
            warned_overflow: false,
        }
    }

    /// Builds an engine from the mask membership declared by `model`.
    pub fn from_model<M: GeometryStream + ?Sized>(model: &M, mask_buffer_size: u32) -> Self {
        let mut engine = Self::new(mask_buffer_size);
        engine.initialize(model.drawable_count(), |i| model.masks(i));
        engine
    }

    /// Registers every masked drawable with the group matching its mask set,
    /// creating groups as needed. Replaces any previous grouping.
    pub fn initialize<'a, F>(&mut self, drawable_count: usize, mut masks_of: F)
    where
        F: FnMut(usize) -> &'a [usize],
    {
        self.groups.clear();
        self.group_of.clear();
        self.group_of.resize(drawable_count, None);

        for drawable in 0..drawable_count {
            let masks = masks_of(drawable);
            if masks.is_empty() {
                continue;
            }

            let group = match self.find_same_clip(masks) {
                Some(g) => g,
                None => {
                    self.groups.push(ClipGroup::new(masks));
                    self.groups.len() - 1
                }
            };

            self.groups[group].add_clipped_drawable(drawable);
            self.group_of[drawable] = Some(group);
        }

        log::debug!(
            "mask engine: {} clip groups for {} drawables",
            self.groups.len(),
            drawable_count
        );
    }

    /// Index of the group whose mask-source set equals `ids`, if any.
    pub fn find_same_clip(&self, ids: &[usize]) -> Option<usize> {
        self.groups.iter().position(|g| g.matches(ids))
    }

    #[inline]
    pub fn groups(&self) -> &[ClipGroup] {
        &self.groups
    }

    #[inline]
    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }

    #[inline]
    pub fn mask_buffer_size(&self) -> u32 {
        self.mask_buffer_size
    }

    /// Group clipping `drawable`, if it is masked.
    pub fn group_for(&self, drawable: usize) -> Option<&ClipGroup> {
        let index = (*self.group_of.get(drawable)?)?;
        self.groups.get(index)
    }

    /// Refreshes every group for the current frame.
    ///
    /// Returns the number of groups in use, i.e. those that need mask rendering.
    pub fn setup_frame<M: GeometryStream + ?Sized>(&mut self, model: &M) -> usize {
        for group in 0..self.groups.len() {
            self.compute_group_bounds(group, model);
        }

        let active = self.groups.iter().filter(|g| g.in_use).count();
        if active == 0 {
            return 0;
        }

        self.assign_layout(active);
        for group in 0..self.groups.len() {
            if self.groups[group].in_use {
                self.compute_matrices(group);
            }
        }
        active
    }

    /// Unions the vertex bounds of every drawable clipped by `group`.
    ///
    /// Drawables without finite vertices are skipped. If nothing contributes,
    /// or the union has no area, the group is zeroed and marked not in use.
    pub fn compute_group_bounds<M: GeometryStream + ?Sized>(&mut self, group: usize, model: &M) {
        let Some(g) = self.groups.get_mut(group) else { return };

        let total = g
            .clipped_drawables()
            .iter()
            .filter_map(|&d| Rect::bounding(model.vertex_positions(d)))
            .reduce(Rect::union);

        match total {
            Some(rect) if !rect.is_empty() => {
                g.all_clipped_draw_rect = rect;
                g.in_use = true;
            }
            _ => {
                g.all_clipped_draw_rect = Rect::zero();
                g.in_use = false;
            }
        }
    }

    /// Assigns channel and slot to each in-use group, in list order.
    ///
    /// Groups that do not fit a channel's 3×3 grid fall back to the whole red
    /// channel; their masks overlap others and render incorrectly.
    pub fn assign_layout(&mut self, active_count: usize) {
        debug_assert_eq!(active_count, self.groups.iter().filter(|g| g.in_use).count());

        let counts = channel_distribution(active_count);
        let mut in_use = self.groups.iter_mut().filter(|g| g.in_use);

        for (channel, &count) in ColorChannel::ALL.iter().zip(counts.iter()) {
            if count > MAX_GROUPS_PER_CHANNEL && !self.warned_overflow {
                log::error!(
                    "mask engine: {count} clip groups on one channel is not supported \
                     (max {MAX_GROUPS_PER_CHANNEL}); excess masks will render incorrectly"
                );
                self.warned_overflow = true;
            }

            for index in 0..count {
                let Some(g) = in_use.next() else { return };
                match slot_in_channel(count, index) {
                    Some(slot) => {
                        g.layout_channel = *channel;
                        g.layout_bounds = slot;
                    }
                    None => {
                        g.layout_channel = ColorChannel::R;
                        g.layout_bounds = Rect::UNIT;
                    }
                }
            }
        }
    }

    /// Derives the mask and draw matrices from bounds and layout.
    pub fn compute_matrices(&mut self, group: usize) {
        let Some(g) = self.groups.get_mut(group) else { return };
        let (for_mask, for_draw) = mask_matrices(g.all_clipped_draw_rect, g.layout_bounds);
        g.matrix_for_mask = for_mask;
        g.matrix_for_draw = for_draw;
    }
}
