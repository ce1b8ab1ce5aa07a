//! Blend functions per draw kind.
//!
//! Expressed as separate color/alpha factor pairs (`src, dst`) and converted to
//! `wgpu::BlendState` when a pipeline is built. All equations are additive.

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    OneMinusSrcColor,
    OneMinusSrcAlpha,
    DstColor,
}

impl BlendFactor {
    fn to_wgpu(self) -> wgpu::BlendFactor {
        match self {
            BlendFactor::Zero => wgpu::BlendFactor::Zero,
            BlendFactor::One => wgpu::BlendFactor::One,
            BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
            BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
            BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        }
    }
}

/// `(src_color, dst_color, src_alpha, dst_alpha)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendFunc {
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl BlendFunc {
    /// Mask generation: `dst *= 1 - src`, so drawn regions pull the cleared
    /// 1.0 toward 0.0 in the selected channel.
    pub const MASK_SETUP: BlendFunc = BlendFunc::new(
        BlendFactor::Zero,
        BlendFactor::OneMinusSrcColor,
        BlendFactor::Zero,
        BlendFactor::OneMinusSrcAlpha,
    );

    pub const NORMAL: BlendFunc = BlendFunc::new(
        BlendFactor::One,
        BlendFactor::OneMinusSrcAlpha,
        BlendFactor::One,
        BlendFactor::OneMinusSrcAlpha,
    );

    pub const ADDITIVE: BlendFunc = BlendFunc::new(
        BlendFactor::One,
        BlendFactor::One,
        BlendFactor::Zero,
        BlendFactor::One,
    );

    pub const MULTIPLICATIVE: BlendFunc = BlendFunc::new(
        BlendFactor::DstColor,
        BlendFactor::OneMinusSrcAlpha,
        BlendFactor::Zero,
        BlendFactor::One,
    );

    pub const fn new(
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) -> Self {
        Self {
            src_color,
            dst_color,
            src_alpha,
            dst_alpha,
        }
    }

    pub fn to_wgpu(self) -> wgpu::BlendState {
        wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: self.src_color.to_wgpu(),
                dst_factor: self.dst_color.to_wgpu(),
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: self.src_alpha.to_wgpu(),
                dst_factor: self.dst_alpha.to_wgpu(),
                operation: wgpu::BlendOperation::Add,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_is_premultiplied_over() {
        let state = BlendFunc::NORMAL.to_wgpu();
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(state.alpha, state.color);
    }

    #[test]
    fn mask_setup_multiplies_destination_down() {
        let state = BlendFunc::MASK_SETUP.to_wgpu();
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::Zero);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::OneMinusSrc);
        assert_eq!(state.alpha.src_factor, wgpu::BlendFactor::Zero);
        assert_eq!(state.alpha.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
    }

    #[test]
    fn multiplicative_keeps_destination_alpha() {
        let state = BlendFunc::MULTIPLICATIVE.to_wgpu();
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::Dst);
        assert_eq!(state.alpha.src_factor, wgpu::BlendFactor::Zero);
        assert_eq!(state.alpha.dst_factor, wgpu::BlendFactor::One);
    }
}
