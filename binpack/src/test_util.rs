//! Helpers shared by the packer test suites.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::{geometry::Rect, types::InputItem};

pub(crate) fn rng(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

pub(crate) fn random_size(rng: &mut Xoshiro256PlusPlus, max: u32) -> (u32, u32) {
    (rng.gen_range(1..=max), rng.gen_range(1..=max))
}

pub(crate) fn random_items(seed: u64, count: usize, max: u32) -> Vec<InputItem> {
    let mut rng = rng(seed);

    (0..count)
        .map(|_| InputItem::new(random_size(&mut rng, max)))
        .collect()
}

/// Every rectangle must be non-empty and inside the bin.
pub(crate) fn assert_in_bin(rects: &[Rect], bin: (u32, u32)) {
    for rect in rects {
        assert!(!rect.is_empty(), "{:?} is empty", rect);
        assert!(
            rect.right() <= bin.0 && rect.bottom() <= bin.1,
            "{:?} is outside of a {}x{} bin",
            rect,
            bin.0,
            bin.1
        );
    }
}

/// No two rectangles may share any area.
pub(crate) fn assert_disjoint(rects: &[Rect]) {
    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
        }
    }
}

/// No rectangle in `a` may share any area with a rectangle in `b`.
pub(crate) fn assert_apart(a: &[Rect], b: &[Rect]) {
    for first in a {
        for second in b {
            assert!(!first.intersects(second), "{:?} overlaps {:?}", first, second);
        }
    }
}

/// A placement must either keep the requested size or swap it exactly.
pub(crate) fn assert_same_or_rotated(requested: (u32, u32), placed: &Rect) {
    let size = placed.size();

    if size != requested {
        assert_eq!(size, (requested.1, requested.0));
    }
}

pub(crate) fn used_area(rects: &[Rect]) -> u64 {
    rects.iter().map(Rect::area).sum()
}
