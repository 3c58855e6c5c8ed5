/// An axis-aligned rectangle inside a bin.
///
/// `Rect` is used both for space that has been handed out by a packer and for
/// the free space that packers keep track of internally. The origin is the
/// corner with the smallest coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[inline]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub(crate) fn at(pos: (u32, u32), size: (u32, u32)) -> Self {
        Self::new(pos.0, pos.1, size.0, size.1)
    }

    #[inline]
    pub fn position(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn min(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> (u32, u32) {
        (self.right(), self.bottom())
    }

    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the two rectangles share any area. Rectangles that only touch
    /// along an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Whether `other` lies completely inside of this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Whether a rectangle of the given size fits into `space` without rotating.
#[inline]
pub(crate) fn fits(size: (u32, u32), space: (u32, u32)) -> bool {
    size.0 > 0 && size.1 > 0 && size.0 <= space.0 && size.1 <= space.1
}

#[inline]
pub(crate) fn flipped(size: (u32, u32)) -> (u32, u32) {
    (size.1, size.0)
}

#[inline]
pub(crate) fn area(size: (u32, u32)) -> u64 {
    u64::from(size.0) * u64::from(size.1)
}

/// Used-area divided by bin-area, or zero for a degenerate bin.
pub(crate) fn occupancy(used_area: u64, bin_size: (u32, u32)) -> f64 {
    let bin_area = area(bin_size);

    if bin_area == 0 {
        return 0.0;
    }

    used_area as f64 / bin_area as f64
}
