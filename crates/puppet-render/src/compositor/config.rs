use anyhow::Result;

/// Side length of the mask texture when none is configured.
pub const DEFAULT_MASK_BUFFER_SIZE: u32 = 256;

/// Compositor settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorConfig {
    /// Mask texture is `mask_buffer_size × mask_buffer_size` pixels.
    pub mask_buffer_size: u32,

    /// Whether model textures carry premultiplied alpha.
    ///
    /// Straight-alpha input is not supported; it is reported once and drawn
    /// as if premultiplied.
    pub premultiplied_alpha: bool,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            mask_buffer_size: DEFAULT_MASK_BUFFER_SIZE,
            premultiplied_alpha: true,
        }
    }
}

impl CompositorConfig {
    pub fn with_mask_buffer_size(mut self, size: u32) -> Self {
        self.mask_buffer_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.mask_buffer_size > 0,
            "mask buffer size must be positive (got {})",
            self.mask_buffer_size
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = CompositorConfig::default();
        assert_eq!(cfg.mask_buffer_size, 256);
        assert!(cfg.premultiplied_alpha);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_size_is_rejected() {
        let cfg = CompositorConfig::default().with_mask_buffer_size(0);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("mask buffer size"));
    }
}
