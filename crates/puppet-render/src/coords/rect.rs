use super::Vec2;

/// Axis-aligned rectangle.
///
/// Used both for model-space bounds (units of the model, +Y up) and for
/// normalized mask-layout slots in `[0, 1]²`. The type itself is agnostic.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    /// Unit square `[0, 1]²`.
    pub const UNIT: Rect = Rect::new(0.0, 0.0, 1.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Builds a rectangle spanning `min..max`.
    #[inline]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.origin.x + self.size.x
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.origin.y + self.size.y
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Grows the rectangle by `dx` on the left and right and by `dy` on the
    /// top and bottom. The center is unchanged.
    #[inline]
    pub fn expand(self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.origin.x - dx,
            self.origin.y - dy,
            self.size.x + dx * 2.0,
            self.size.y + dy * 2.0,
        )
    }

    /// Smallest rectangle containing both `self` and `other`.
    #[inline]
    pub fn union(self, other: Rect) -> Self {
        let min = Vec2::new(
            self.origin.x.min(other.origin.x),
            self.origin.y.min(other.origin.y),
        );
        let max = Vec2::new(self.right().max(other.right()), self.bottom().max(other.bottom()));
        Self::from_min_max(min, max)
    }

    /// Bounding box of a point cloud.
    ///
    /// Non-finite points are ignored. Returns `None` when no finite point exists.
    pub fn bounding(points: &[[f32; 2]]) -> Option<Self> {
        let mut min = Vec2::new(f32::MAX, f32::MAX);
        let mut max = Vec2::new(f32::MIN, f32::MIN);
        let mut any = false;

        for &[x, y] in points {
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            any = true;
        }

        any.then(|| Self::from_min_max(min, max))
    }
}
