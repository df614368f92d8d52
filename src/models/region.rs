use std::fmt;

/// Axis-aligned pixel rectangle, min inclusive and max exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    /// Left edge
    pub x0: u32,
    /// Top edge
    pub y0: u32,
    /// Right edge (exclusive)
    pub x1: u32,
    /// Bottom edge (exclusive)
    pub y1: u32,
}

impl Region {
    /// Create a region from two corners
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a region from its top-left corner and size
    pub fn at(x0: u32, y0: u32, width: u32, height: u32) -> Self {
        Self {
            x0,
            y0,
            x1: x0.saturating_add(width),
            y1: y0.saturating_add(height),
        }
    }

    /// Width in pixels (0 when the corners are inverted)
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    /// Height in pixels (0 when the corners are inverted)
    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    /// True when the region covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Shift the region down by `dy` pixels, clamped at `u32::MAX`
    pub fn offset_y(&self, dy: u32) -> Self {
        Self {
            x0: self.x0,
            y0: self.y0.saturating_add(dy),
            x1: self.x1,
            y1: self.y1.saturating_add(dy),
        }
    }

    /// True when the region lies inside a `width` x `height` image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x0 <= self.x1 && self.y0 <= self.y1 && self.x1 <= width && self.y1 <= height
    }

    /// True when the two regions share at least one pixel
    pub fn intersects(&self, other: &Region) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})-({},{})", self.x0, self.y0, self.x1, self.y1)
    }
}
