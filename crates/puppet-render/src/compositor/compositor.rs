use anyhow::{Context, Result};
use glam::Mat4;

use crate::mask::{MaskContext, MaskLayoutEngine};
use crate::model::GeometryStream;
use crate::paint::Color;
use crate::render::{FrameInfo, FrameState, MaskUsage, MeshDraw, MeshRenderer, PassTarget, WgpuMeshRenderer};

use super::config::CompositorConfig;
use super::order::rebuild_draw_order;

/// Where the compositor is within a frame.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FrameStage {
    #[default]
    Idle,
    MaskPass,
    ScreenPass,
}

/// Draws one model per frame: mask pass, then screen pass.
///
/// Owns the renderer and the model's [`MaskLayoutEngine`]. The mask texture
/// is redrawn only when a mask source moved, sampled a different texture, or
/// the layout changed; otherwise last frame's masks are reused.
pub struct Compositor<R: MeshRenderer> {
    renderer: R,
    config: CompositorConfig,

    masks: Option<MaskLayoutEngine>,
    /// Mask contexts of the last mask pass, per group (`None` = not in use).
    mask_snapshot: Vec<Option<MaskContext>>,
    /// Whether the renderer's mask texture holds the masks in `mask_snapshot`.
    /// Cleared by any source movement, even while its group is out of use.
    mask_valid: bool,
    /// Texture slot of every source drawn by the last mask pass.
    mask_source_slots: Vec<u32>,

    /// Mask ids per drawable at the last `initialize`.
    membership: Vec<Vec<usize>>,
    drawable_count: usize,
    draw_order: Vec<usize>,
    model_color: Color,

    frame_no: u64,
    stage: FrameStage,

    initialized: bool,
    released: bool,
    warned_straight_alpha: bool,
    warned_released: bool,
}

impl<R: MeshRenderer> Compositor<R> {
    pub fn new(renderer: R, config: CompositorConfig) -> Result<Self> {
        config.validate().context("invalid compositor config")?;

        Ok(Self {
            renderer,
            config,
            masks: None,
            mask_snapshot: Vec::new(),
            mask_valid: false,
            mask_source_slots: Vec::new(),
            membership: Vec::new(),
            drawable_count: 0,
            draw_order: Vec::new(),
            model_color: Color::WHITE,
            frame_no: 0,
            stage: FrameStage::Idle,
            initialized: false,
            released: false,
            warned_straight_alpha: false,
            warned_released: false,
        })
    }

    /// Binds the compositor to `model`: builds clip groups from its mask
    /// membership and lets the renderer allocate per-drawable resources.
    ///
    /// Called implicitly by the first [`draw_model`](Self::draw_model), and
    /// again whenever the drawable count or any drawable's mask ids change.
    /// Hosts that swap in a different model with the same mask ids must call
    /// it themselves: groups and kept masks survive otherwise.
    pub fn initialize(&mut self, model: &dyn GeometryStream) {
        let count = model.drawable_count();

        let invalid = (0..count)
            .flat_map(|d| model.masks(d).iter().copied())
            .filter(|&s| s >= count)
            .count();
        if invalid > 0 {
            log::warn!("model references {invalid} mask sources outside 0..{count}; they are ignored");
        }

        let engine = MaskLayoutEngine::from_model(model, self.config.mask_buffer_size);
        self.masks = engine.has_groups().then_some(engine);
        self.mask_snapshot.clear();
        self.mask_source_slots.clear();
        self.mask_valid = false;

        self.renderer.initialize(model);

        self.membership = (0..count).map(|d| model.masks(d).to_vec()).collect();
        self.drawable_count = count;
        self.initialized = true;
        self.released = false;
        self.warned_released = false;
    }

    /// Changes the mask texture resolution.
    ///
    /// Rebuilds the mask layout engine from `model`; the renderer recreates its
    /// mask target on the next mask pass. Not allowed mid-frame.
    pub fn set_mask_buffer_size(&mut self, model: &dyn GeometryStream, size: u32) -> Result<()> {
        anyhow::ensure!(self.stage == FrameStage::Idle, "cannot resize the mask buffer mid-frame");

        let config = self.config.clone().with_mask_buffer_size(size);
        config.validate()?;
        if config == self.config && self.masks.is_some() {
            return Ok(());
        }

        log::info!("mask buffer resized {} → {size}", self.config.mask_buffer_size);
        self.config = config;

        let engine = MaskLayoutEngine::from_model(model, size);
        self.masks = engine.has_groups().then_some(engine);
        self.mask_snapshot.clear();
        self.mask_valid = false;
        Ok(())
    }

    /// Marks the kept masks stale if a mask source samples `slot`.
    ///
    /// Hosts that rebind textures on the renderer directly call this after
    /// doing so.
    pub fn texture_changed(&mut self, slot: u32) {
        if self.mask_source_slots.contains(&slot) {
            log::debug!("texture slot {slot} feeds a mask source; masks will be redrawn");
            self.mask_valid = false;
        }
    }

    /// Straight-alpha tint applied to every drawable.
    pub fn set_model_color(&mut self, color: Color) {
        if !color.is_finite() {
            log::warn!("ignoring non-finite model color {color:?}");
            return;
        }
        self.model_color = color;
    }

    #[inline]
    pub fn model_color(&self) -> Color {
        self.model_color
    }

    #[inline]
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Layout engine, or `None` if the model has no masked drawables.
    #[inline]
    pub fn masks(&self) -> Option<&MaskLayoutEngine> {
        self.masks.as_ref()
    }

    #[inline]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[inline]
    pub fn stage(&self) -> FrameStage {
        self.stage
    }

    /// Number of frames drawn so far.
    #[inline]
    pub fn frame_no(&self) -> u64 {
        self.frame_no
    }

    /// Mask context `drawable` was (or will be) drawn with, if it is clipped
    /// by an in-use group.
    pub fn draw_context_for(&self, drawable: usize) -> Option<MaskContext> {
        let group = self.masks.as_ref()?.group_for(drawable)?;
        group.is_in_use().then(|| group.draw_context())
    }

    /// Records one frame of `model` into `target`.
    ///
    /// Never fails: problems are logged and the affected draws skipped.
    pub fn draw_model(&mut self, model: &dyn GeometryStream, frame: &FrameState, target: &mut R::Target<'_>) {
        if self.released {
            if !self.warned_released {
                log::warn!("draw_model called on a released compositor; call initialize first");
                self.warned_released = true;
            }
            return;
        }

        if !self.initialized || self.membership_changed(model) {
            self.initialize(model);
        }

        if !self.config.premultiplied_alpha && !self.warned_straight_alpha {
            log::error!("straight-alpha textures are not supported; drawing as premultiplied");
            self.warned_straight_alpha = true;
        }

        self.frame_no += 1;
        let count = self.drawable_count;

        // ── frame setup ────────────────────────────────────────────────────
        let mut redraw_masks = false;
        if let Some(masks) = self.masks.as_mut() {
            // Out-of-use groups included: their kept mask is stale too.
            let sources_moved = masks
                .groups()
                .iter()
                .flat_map(|g| g.clipping_ids().iter().copied())
                .any(|s| s < count && model.vertex_positions_did_change(s));
            if sources_moved {
                self.mask_valid = false;
            }

            if masks.setup_frame(model) > 0 {
                let snapshot: Vec<Option<MaskContext>> = masks
                    .groups()
                    .iter()
                    .map(|g| g.is_in_use().then(|| g.mask_context()))
                    .collect();

                let source_slots: Vec<u32> = masks
                    .groups()
                    .iter()
                    .filter(|g| g.is_in_use())
                    .flat_map(|g| g.clipping_ids().iter().copied())
                    .filter(|&s| s < count)
                    .map(|s| model.texture_index(s))
                    .collect();

                redraw_masks = !self.mask_valid
                    || snapshot != self.mask_snapshot
                    || source_slots != self.mask_source_slots;
                self.mask_snapshot = snapshot;
                self.mask_source_slots = source_slots;
            }
        }

        let mask_sources: usize = self
            .masks
            .iter()
            .flat_map(|m| m.groups())
            .filter(|g| g.is_in_use())
            .map(|g| g.clipping_ids().len())
            .sum();

        self.renderer.pre_draw(&FrameInfo {
            frame_no: self.frame_no,
            max_draws: count + mask_sources,
        });

        // ── mask pass ──────────────────────────────────────────────────────
        if redraw_masks && let Some(masks) = self.masks.as_ref() {
            self.stage = FrameStage::MaskPass;
            encode_mask_pass(&mut self.renderer, masks, model, frame.mvp, target);
            self.mask_valid = true;
        }

        // ── screen pass ────────────────────────────────────────────────────
        self.stage = FrameStage::ScreenPass;
        rebuild_draw_order(&mut self.draw_order, model);

        self.renderer.begin_pass(target, PassTarget::Screen { viewport: frame.viewport });
        for &d in &self.draw_order {
            if !model.is_visible(d) {
                continue;
            }

            let mask = match self.masks.as_ref().and_then(|m| m.group_for(d)) {
                Some(group) if group.is_in_use() => MaskUsage::Consume {
                    context: group.draw_context(),
                    inverted: model.is_mask_inverted(d),
                },
                _ => MaskUsage::None,
            };

            self.renderer.draw_mesh(&mesh_draw(model, d, frame.mvp, self.model_color, mask));
        }
        self.renderer.end_pass();

        self.stage = FrameStage::Idle;
    }

    /// Releases the renderer's GPU resources. Calling it twice is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.renderer.release();
        self.masks = None;
        self.mask_snapshot.clear();
        self.mask_source_slots.clear();
        self.mask_valid = false;
        self.membership.clear();
        self.draw_order.clear();
        self.initialized = false;
        self.released = true;
        self.stage = FrameStage::Idle;
        log::debug!("compositor released after {} frames", self.frame_no);
    }

    fn membership_changed(&self, model: &dyn GeometryStream) -> bool {
        model.drawable_count() != self.drawable_count
            || self
                .membership
                .iter()
                .enumerate()
                .any(|(d, ids)| model.masks(d) != ids.as_slice())
    }
}

impl Compositor<WgpuMeshRenderer> {
    /// Binds a model texture to `slot`, refreshing kept masks that sample it.
    pub fn bind_texture(&mut self, slot: u32, view: wgpu::TextureView) {
        self.renderer.bind_texture(slot, view);
        self.texture_changed(slot);
    }

    pub fn unbind_texture(&mut self, slot: u32) -> Option<wgpu::TextureView> {
        let view = self.renderer.unbind_texture(slot);
        self.texture_changed(slot);
        view
    }
}

/// Clears the mask texture and draws every source of every in-use group into
/// its slot.
fn encode_mask_pass<R: MeshRenderer>(
    renderer: &mut R,
    masks: &MaskLayoutEngine,
    model: &dyn GeometryStream,
    mvp: Mat4,
    target: &mut R::Target<'_>,
) {
    let count = model.drawable_count();
    renderer.begin_pass(target, PassTarget::Mask { size: masks.mask_buffer_size() });

    for group in masks.groups().iter().filter(|g| g.is_in_use()) {
        let context = group.mask_context();
        for &source in group.clipping_ids().iter().filter(|&&s| s < count) {
            renderer.draw_mesh(&mesh_draw(model, source, mvp, Color::WHITE, MaskUsage::Setup(context)));
        }
    }

    renderer.end_pass();
}

fn mesh_draw(model: &dyn GeometryStream, d: usize, mvp: Mat4, model_color: Color, mask: MaskUsage) -> MeshDraw<'_> {
    MeshDraw {
        drawable: d,
        positions: model.vertex_positions(d),
        uvs: model.vertex_uvs(d),
        indices: model.vertex_indices(d),
        texture_index: model.texture_index(d),
        blend_mode: model.blend_mode(d),
        opacity: model.opacity(d),
        culling: model.is_culling(d),
        mvp,
        model_color,
        mask,
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::coords::{Rect, Viewport};
    use crate::mask::ColorChannel;
    use crate::model::{DrawableMesh, MeshModel};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Init(usize),
        PreDraw(FrameInfo),
        Begin(PassTarget),
        Draw { drawable: usize, mask: MaskUsage, culling: bool },
        End,
        Release,
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl Recorder {
        fn draws(&self) -> Vec<(usize, &MaskUsage)> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Draw { drawable, mask, .. } => Some((*drawable, mask)),
                    _ => None,
                })
                .collect()
        }

        fn mask_passes(&self) -> usize {
            self.events
                .iter()
                .filter(|e| matches!(e, Event::Begin(PassTarget::Mask { .. })))
                .count()
        }
    }

    impl MeshRenderer for Recorder {
        type Target<'t> = ();

        fn initialize(&mut self, model: &dyn GeometryStream) {
            self.events.push(Event::Init(model.drawable_count()));
        }

        fn pre_draw(&mut self, frame: &FrameInfo) {
            self.events.push(Event::PreDraw(*frame));
        }

        fn begin_pass(&mut self, _target: &mut (), pass: PassTarget) {
            self.events.push(Event::Begin(pass));
        }

        fn draw_mesh(&mut self, draw: &MeshDraw<'_>) {
            self.events.push(Event::Draw {
                drawable: draw.drawable,
                mask: draw.mask,
                culling: draw.culling,
            });
        }

        fn end_pass(&mut self) {
            self.events.push(Event::End);
        }

        fn release(&mut self) {
            self.events.push(Event::Release);
        }
    }

    fn compositor() -> Compositor<Recorder> {
        Compositor::new(Recorder::default(), CompositorConfig::default()).unwrap()
    }

    /// Drawable 0 masked by drawable 1.
    fn masked_pair() -> MeshModel {
        MeshModel::new(vec![
            DrawableMesh::quad(0.0, 0.0, 10.0, 10.0).with_masks(vec![1]),
            DrawableMesh::quad(2.0, 2.0, 4.0, 4.0),
        ])
    }

    fn draw(c: &mut Compositor<Recorder>, model: &MeshModel) {
        c.draw_model(model, &FrameState::default(), &mut ());
    }

    // ── end to end ────────────────────────────────────────────────────────

    #[test]
    fn masked_pair_renders_mask_then_screen() {
        let model = masked_pair();
        let mut c = compositor();
        draw(&mut c, &model);

        let engine = c.masks().expect("model has a mask group");
        assert_eq!(engine.groups().len(), 1);
        let group = &engine.groups()[0];
        assert_eq!(group.layout_channel(), ColorChannel::R);
        assert_eq!(group.layout_bounds(), Rect::UNIT);

        let setup = MaskUsage::Setup(group.mask_context());
        let consume = MaskUsage::Consume {
            context: group.draw_context(),
            inverted: false,
        };

        assert_eq!(
            c.renderer().events,
            vec![
                Event::Init(2),
                Event::PreDraw(FrameInfo { frame_no: 1, max_draws: 3 }),
                Event::Begin(PassTarget::Mask { size: 256 }),
                Event::Draw { drawable: 1, mask: setup, culling: false },
                Event::End,
                Event::Begin(PassTarget::Screen { viewport: None }),
                Event::Draw { drawable: 0, mask: consume, culling: false },
                Event::Draw { drawable: 1, mask: MaskUsage::None, culling: false },
                Event::End,
            ]
        );
        assert_eq!(c.stage(), FrameStage::Idle);
    }

    #[test]
    fn consumer_draw_matrix_maps_bounds_into_slot() {
        let model = masked_pair();
        let mut c = compositor();
        draw(&mut c, &model);

        let ctx = c.draw_context_for(0).expect("drawable 0 is clipped");
        let center = ctx.matrix.transform_point3(Vec3::new(5.0, 5.0, 0.0));
        assert!((center.x - 0.5).abs() < 1e-5);
        assert!((center.y - 0.5).abs() < 1e-5);
        assert!(c.draw_context_for(1).is_none());
    }

    #[test]
    fn inverted_mask_flag_is_forwarded() {
        let mut model = masked_pair();
        model.drawable_mut(0).mask_inverted = true;
        let mut c = compositor();
        draw(&mut c, &model);

        let draws = c.renderer().draws();
        assert!(matches!(draws[1], (0, MaskUsage::Consume { inverted: true, .. })));
    }

    // ── screen pass ───────────────────────────────────────────────────────

    #[test]
    fn screen_pass_follows_stable_render_order() {
        let model = MeshModel::new(
            [3, 1, 2, 1]
                .into_iter()
                .map(|o| DrawableMesh::quad(0.0, 0.0, 1.0, 1.0).with_render_order(o))
                .collect(),
        );
        let mut c = compositor();
        draw(&mut c, &model);

        let order: Vec<usize> = c.renderer().draws().into_iter().map(|(d, _)| d).collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
    }

    #[test]
    fn invisible_drawables_are_skipped() {
        let mut model = masked_pair();
        model.drawable_mut(1).visible = false;
        let mut c = compositor();
        draw(&mut c, &model);

        // Hidden mask sources still shape the mask.
        let draws = c.renderer().draws();
        assert_eq!(draws.len(), 2);
        assert!(matches!(draws[0], (1, MaskUsage::Setup(_))));
        assert!(matches!(draws[1], (0, MaskUsage::Consume { .. })));
    }

    #[test]
    fn culling_and_viewport_reach_the_renderer() {
        let mut model = MeshModel::new(vec![DrawableMesh::quad(0.0, 0.0, 1.0, 1.0)]);
        model.drawable_mut(0).culling = true;
        let mut c = compositor();
        let viewport = Some(Viewport::sized(640.0, 480.0));
        c.draw_model(&model, &FrameState::new(Mat4::IDENTITY, viewport), &mut ());

        let events = &c.renderer().events;
        assert!(events.contains(&Event::Begin(PassTarget::Screen { viewport })));
        assert!(events.contains(&Event::Draw {
            drawable: 0,
            mask: MaskUsage::None,
            culling: true
        }));
    }

    #[test]
    fn unmasked_model_has_no_mask_pass() {
        let model = MeshModel::new(vec![DrawableMesh::quad(0.0, 0.0, 1.0, 1.0); 3]);
        let mut c = compositor();
        draw(&mut c, &model);

        assert!(c.masks().is_none());
        assert_eq!(c.renderer().mask_passes(), 0);
        assert_eq!(c.renderer().draws().len(), 3);
    }

    // ── mask reuse ────────────────────────────────────────────────────────

    #[test]
    fn static_masks_are_not_redrawn() {
        let mut model = masked_pair();
        let mut c = compositor();
        draw(&mut c, &model);

        model.mark_unchanged();
        draw(&mut c, &model);
        draw(&mut c, &model);

        assert_eq!(c.renderer().mask_passes(), 1);
        // Consumers still sample the kept mask.
        let consumes = c
            .renderer()
            .draws()
            .into_iter()
            .filter(|(_, m)| matches!(m, MaskUsage::Consume { .. }))
            .count();
        assert_eq!(consumes, 3);
    }

    #[test]
    fn moved_source_redraws_masks() {
        let mut model = masked_pair();
        let mut c = compositor();
        draw(&mut c, &model);

        model.mark_unchanged();
        model.drawable_mut(1).positions_changed = true;
        draw(&mut c, &model);

        assert_eq!(c.renderer().mask_passes(), 2);
    }

    #[test]
    fn moved_consumer_changes_layout_and_redraws() {
        let mut model = masked_pair();
        let mut c = compositor();
        draw(&mut c, &model);

        model.mark_unchanged();
        model.drawable_mut(0).positions = DrawableMesh::quad(0.0, 0.0, 20.0, 10.0).positions;
        draw(&mut c, &model);

        assert_eq!(c.renderer().mask_passes(), 2);
    }

    #[test]
    fn source_moved_while_group_idle_redraws_once_back_in_use() {
        let mut model = masked_pair();
        let mut c = compositor();
        draw(&mut c, &model);

        // Consumer collapses to zero height, so the group drops out of use
        // for the frame the source moves in.
        model.mark_unchanged();
        model.drawable_mut(0).positions = DrawableMesh::quad(0.0, 5.0, 10.0, 0.0).positions;
        model.drawable_mut(1).positions = DrawableMesh::quad(4.0, 4.0, 4.0, 4.0).positions;
        model.drawable_mut(1).positions_changed = true;
        draw(&mut c, &model);
        assert_eq!(c.renderer().mask_passes(), 1);

        model.mark_unchanged();
        model.drawable_mut(0).positions = DrawableMesh::quad(0.0, 0.0, 10.0, 10.0).positions;
        draw(&mut c, &model);
        assert_eq!(c.renderer().mask_passes(), 2);

        model.mark_unchanged();
        draw(&mut c, &model);
        assert_eq!(c.renderer().mask_passes(), 2);
    }

    #[test]
    fn source_texture_slot_change_redraws_masks() {
        let mut model = masked_pair();
        let mut c = compositor();
        draw(&mut c, &model);

        model.mark_unchanged();
        model.drawable_mut(1).texture_index = 3;
        draw(&mut c, &model);

        assert_eq!(c.renderer().mask_passes(), 2);
    }

    #[test]
    fn rebinding_a_source_texture_redraws_masks() {
        let mut model = masked_pair();
        model.drawable_mut(0).texture_index = 1;
        model.drawable_mut(1).texture_index = 2;
        let mut c = compositor();
        draw(&mut c, &model);
        model.mark_unchanged();

        // The consumer's own texture does not shape the mask.
        c.texture_changed(1);
        draw(&mut c, &model);
        assert_eq!(c.renderer().mask_passes(), 1);

        c.texture_changed(2);
        draw(&mut c, &model);
        assert_eq!(c.renderer().mask_passes(), 2);
    }

    // ── configuration ─────────────────────────────────────────────────────

    #[test]
    fn zero_mask_size_is_rejected() {
        let cfg = CompositorConfig::default().with_mask_buffer_size(0);
        assert!(Compositor::new(Recorder::default(), cfg).is_err());
    }

    #[test]
    fn resize_rebuilds_engine_and_redraws() {
        let mut model = masked_pair();
        let mut c = compositor();
        draw(&mut c, &model);

        c.set_mask_buffer_size(&model, 512).unwrap();
        assert_eq!(c.masks().map(|m| m.mask_buffer_size()), Some(512));
        assert!(c.set_mask_buffer_size(&model, 0).is_err());
        assert_eq!(c.config().mask_buffer_size, 512);

        model.mark_unchanged();
        draw(&mut c, &model);
        assert!(c
            .renderer()
            .events
            .contains(&Event::Begin(PassTarget::Mask { size: 512 })));
    }

    #[test]
    fn straight_alpha_still_draws() {
        let model = masked_pair();
        let cfg = CompositorConfig {
            premultiplied_alpha: false,
            ..CompositorConfig::default()
        };
        let mut c = Compositor::new(Recorder::default(), cfg).unwrap();
        draw(&mut c, &model);
        draw(&mut c, &model);
        assert_eq!(c.renderer().draws().len(), 6);
    }

    #[test]
    fn model_change_reinitializes() {
        let mut c = compositor();
        draw(&mut c, &masked_pair());
        draw(&mut c, &MeshModel::new(vec![DrawableMesh::quad(0.0, 0.0, 1.0, 1.0)]));

        let inits: Vec<&Event> = c
            .renderer()
            .events
            .iter()
            .filter(|e| matches!(e, Event::Init(_)))
            .collect();
        assert_eq!(inits, vec![&Event::Init(2), &Event::Init(1)]);
        assert!(c.masks().is_none());
    }

    #[test]
    fn same_count_with_new_mask_ids_reinitializes() {
        let mut c = compositor();
        draw(&mut c, &masked_pair());

        let swapped = MeshModel::new(vec![
            DrawableMesh::quad(2.0, 2.0, 4.0, 4.0),
            DrawableMesh::quad(0.0, 0.0, 10.0, 10.0).with_masks(vec![0]),
        ]);
        draw(&mut c, &swapped);

        let inits = c.renderer().events.iter().filter(|e| matches!(e, Event::Init(_))).count();
        assert_eq!(inits, 2);
        assert!(c.draw_context_for(0).is_none());
        assert!(c.draw_context_for(1).is_some());
        assert_eq!(c.renderer().mask_passes(), 2);
    }

    #[test]
    fn non_finite_model_color_is_ignored() {
        let mut c = compositor();
        c.set_model_color(Color::new(1.0, 0.5, 0.0, 1.0));
        c.set_model_color(Color::new(f32::NAN, 0.0, 0.0, 1.0));
        assert_eq!(c.model_color(), Color::new(1.0, 0.5, 0.0, 1.0));
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn release_is_idempotent_and_stops_drawing() {
        let model = masked_pair();
        let mut c = compositor();
        draw(&mut c, &model);

        c.release();
        c.release();
        let before = c.renderer().events.len();
        draw(&mut c, &model);

        let releases = c.renderer().events.iter().filter(|e| **e == Event::Release).count();
        assert_eq!(releases, 1);
        assert_eq!(c.renderer().events.len(), before);

        c.initialize(&model);
        draw(&mut c, &model);
        assert!(c.renderer().events.len() > before);
    }
}
