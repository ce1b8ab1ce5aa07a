use glam::Mat4;

use crate::mask::MaskContext;
use crate::model::BlendMode;
use crate::paint::Color;

use super::blend::BlendFunc;

/// Which program family a draw uses.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderPass {
    SetupMask,
    Normal,
    Additive,
    Multiplicative,
}

impl ShaderPass {
    pub const fn for_mode(mode: BlendMode) -> Self {
        match mode {
            BlendMode::Normal => ShaderPass::Normal,
            BlendMode::Additive => ShaderPass::Additive,
            BlendMode::Multiplicative => ShaderPass::Multiplicative,
        }
    }

    pub const fn blend(self) -> BlendFunc {
        match self {
            ShaderPass::SetupMask => BlendFunc::MASK_SETUP,
            ShaderPass::Normal => BlendFunc::NORMAL,
            ShaderPass::Additive => BlendFunc::ADDITIVE,
            ShaderPass::Multiplicative => BlendFunc::MULTIPLICATIVE,
        }
    }
}

/// How a draw relates to the mask texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MaskState {
    Unmasked,
    Masked,
    MaskedInverted,
}

/// Identity of a compiled shader variant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderVariantKey {
    pub pass: ShaderPass,
    pub mask: MaskState,
}

impl ShaderVariantKey {
    pub const SETUP_MASK: ShaderVariantKey = ShaderVariantKey::new(ShaderPass::SetupMask, MaskState::Unmasked);

    pub const fn new(pass: ShaderPass, mask: MaskState) -> Self {
        Self { pass, mask }
    }

    /// Whether the variant samples the mask texture (bind group 2).
    pub const fn samples_mask(self) -> bool {
        !matches!(self.mask, MaskState::Unmasked)
    }

    pub const fn vertex_entry(self) -> &'static str {
        match (self.pass, self.mask) {
            (ShaderPass::SetupMask, _) => "vs_setup_mask",
            (_, MaskState::Unmasked) => "vs_main",
            (_, MaskState::Masked | MaskState::MaskedInverted) => "vs_masked",
        }
    }

    pub const fn fragment_entry(self) -> &'static str {
        match (self.pass, self.mask) {
            (ShaderPass::SetupMask, _) => "fs_setup_mask",
            (_, MaskState::Unmasked) => "fs_main",
            (_, MaskState::Masked) => "fs_masked",
            (_, MaskState::MaskedInverted) => "fs_masked_inverted",
        }
    }
}

/// Mask role of a single draw call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MaskUsage {
    /// Plain draw, no mask involved.
    None,
    /// Rendering a mask source into the mask texture.
    Setup(MaskContext),
    /// Drawing content clipped by a mask.
    Consume { context: MaskContext, inverted: bool },
}

/// Everything the renderer needs to issue one mesh draw.
#[derive(Debug, Clone)]
pub struct MeshDraw<'a> {
    pub drawable: usize,
    pub positions: &'a [[f32; 2]],
    pub uvs: &'a [[f32; 2]],
    pub indices: &'a [u16],
    pub texture_index: u32,
    pub blend_mode: BlendMode,
    pub opacity: f32,
    pub culling: bool,
    /// Model → clip transform for screen draws. Ignored for mask setup.
    pub mvp: Mat4,
    /// Straight-alpha model tint.
    pub model_color: Color,
    pub mask: MaskUsage,
}

/// Picks the shader variant and blend function for a draw.
///
/// Mask setup ignores the drawable's blend mode.
pub fn select_variant(blend_mode: BlendMode, mask: &MaskUsage) -> (ShaderVariantKey, BlendFunc) {
    let key = match mask {
        MaskUsage::Setup(_) => ShaderVariantKey::SETUP_MASK,
        MaskUsage::None => ShaderVariantKey::new(ShaderPass::for_mode(blend_mode), MaskState::Unmasked),
        MaskUsage::Consume { inverted: false, .. } => {
            ShaderVariantKey::new(ShaderPass::for_mode(blend_mode), MaskState::Masked)
        }
        MaskUsage::Consume { inverted: true, .. } => {
            ShaderVariantKey::new(ShaderPass::for_mode(blend_mode), MaskState::MaskedInverted)
        }
    };
    (key, key.pass.blend())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::mask::ColorChannel;

    fn ctx() -> MaskContext {
        MaskContext {
            matrix: Mat4::IDENTITY,
            layout_bounds: Rect::UNIT,
            channel: ColorChannel::G,
        }
    }

    #[test]
    fn setup_ignores_blend_mode() {
        for mode in [BlendMode::Normal, BlendMode::Additive, BlendMode::Multiplicative] {
            let (key, blend) = select_variant(mode, &MaskUsage::Setup(ctx()));
            assert_eq!(key, ShaderVariantKey::SETUP_MASK);
            assert_eq!(blend, BlendFunc::MASK_SETUP);
        }
    }

    #[test]
    fn unmasked_draws_follow_blend_mode() {
        let (key, blend) = select_variant(BlendMode::Additive, &MaskUsage::None);
        assert_eq!(key, ShaderVariantKey::new(ShaderPass::Additive, MaskState::Unmasked));
        assert_eq!(blend, BlendFunc::ADDITIVE);
        assert!(!key.samples_mask());
    }

    #[test]
    fn consumers_pick_masked_variants() {
        let masked = MaskUsage::Consume { context: ctx(), inverted: false };
        let inverted = MaskUsage::Consume { context: ctx(), inverted: true };

        let (key, blend) = select_variant(BlendMode::Multiplicative, &masked);
        assert_eq!(key, ShaderVariantKey::new(ShaderPass::Multiplicative, MaskState::Masked));
        assert_eq!(blend, BlendFunc::MULTIPLICATIVE);
        assert!(key.samples_mask());

        let (key, _) = select_variant(BlendMode::Normal, &inverted);
        assert_eq!(key.mask, MaskState::MaskedInverted);
        assert_eq!(key.fragment_entry(), "fs_masked_inverted");
    }

    #[test]
    fn entry_points_per_variant() {
        assert_eq!(ShaderVariantKey::SETUP_MASK.vertex_entry(), "vs_setup_mask");
        assert_eq!(ShaderVariantKey::SETUP_MASK.fragment_entry(), "fs_setup_mask");

        let plain = ShaderVariantKey::new(ShaderPass::Normal, MaskState::Unmasked);
        assert_eq!((plain.vertex_entry(), plain.fragment_entry()), ("vs_main", "fs_main"));

        let masked = ShaderVariantKey::new(ShaderPass::Additive, MaskState::Masked);
        assert_eq!((masked.vertex_entry(), masked.fragment_entry()), ("vs_masked", "fs_masked"));
    }
}
