/// Number of color channels in the mask texture.
pub const CHANNEL_COUNT: usize = 4;

/// Color channel of the mask texture that carries a group's mask.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ColorChannel {
    #[default]
    R,
    G,
    B,
    A,
}

impl ColorChannel {
    pub const ALL: [ColorChannel; CHANNEL_COUNT] =
        [ColorChannel::R, ColorChannel::G, ColorChannel::B, ColorChannel::A];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Selector uniform: 1.0 in this channel's component, 0.0 elsewhere.
    #[inline]
    pub fn flag(self) -> [f32; 4] {
        let mut flag = [0.0; 4];
        flag[self.index()] = 1.0;
        flag
    }
}
