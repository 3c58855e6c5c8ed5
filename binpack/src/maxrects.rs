//! MaxRects packing.
//!
//! The free space of the bin is tracked as the list of maximal free
//! rectangles. Unlike guillotine packing these overlap each other: every free
//! rectangle touched by a placement is replaced by up to four slivers around
//! it, and slivers that end up inside another free rectangle are pruned.
//!
//! The free list is not bounded by the number of placed rectangles. A single
//! placement in the middle of the bin already leaves four free rectangles
//! behind, and pathological inputs can grow the list well beyond that.

use std::mem;

use crate::{
    geometry::{self, Rect},
    types::{BatchOutput, InputItem},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaxRectsHeuristic {
    /// Minimize the shorter leftover side of the free rectangle.
    BestShortSideFit,
    /// Minimize the longer leftover side of the free rectangle.
    BestLongSideFit,
    /// Pick the smallest free rectangle that fits.
    BestAreaFit,
    /// Tetris placement: lowest top edge first, then leftmost.
    BottomLeftRule,
    /// Maximize the length of edges shared with the bin border and with
    /// rectangles placed earlier.
    ContactPointRule,
}

impl MaxRectsHeuristic {
    pub const ALL: [MaxRectsHeuristic; 5] = [
        MaxRectsHeuristic::BestShortSideFit,
        MaxRectsHeuristic::BestLongSideFit,
        MaxRectsHeuristic::BestAreaFit,
        MaxRectsHeuristic::BottomLeftRule,
        MaxRectsHeuristic::ContactPointRule,
    ];
}

/// Primary and secondary penalty of a candidate position, compared
/// lexicographically. Lower is better.
///
/// The area of a `u32` bin overflows `i64`.
type Score = (i128, i128);

#[derive(Debug, Clone)]
pub struct MaxRectsPacker {
    bin_size: (u32, u32),
    allow_rotation: bool,
    used_rects: Vec<Rect>,

    /// Invariant: after every placement no entry is contained in another.
    free_rects: Vec<Rect>,
}

impl MaxRectsPacker {
    pub fn new(width: u32, height: u32) -> Self {
        let mut packer = Self {
            bin_size: (0, 0),
            allow_rotation: true,
            used_rects: Vec::new(),
            free_rects: Vec::new(),
        };
        packer.reset(width, height);
        packer
    }

    /// Sets whether rectangles may be turned by 90 degrees to fit better.
    /// Rotation is allowed by default.
    pub fn with_rotation(mut self, allow_rotation: bool) -> Self {
        self.allow_rotation = allow_rotation;
        self
    }

    pub fn reset(&mut self, width: u32, height: u32) {
        self.bin_size = (width, height);
        self.used_rects.clear();
        self.free_rects.clear();

        let bin = Rect::new(0, 0, width, height);
        if !bin.is_empty() {
            self.free_rects.push(bin);
        }
    }

    #[inline]
    pub fn bin_size(&self) -> (u32, u32) {
        self.bin_size
    }

    #[inline]
    pub fn free_rects(&self) -> &[Rect] {
        &self.free_rects
    }

    #[inline]
    pub fn used_rects(&self) -> &[Rect] {
        &self.used_rects
    }

    pub fn insert(&mut self, size: (u32, u32), heuristic: MaxRectsHeuristic) -> Option<Rect> {
        let (rect, _) = self.find_position(size, heuristic)?;

        log::trace!("Placing {}x{} at {:?}", size.0, size.1, rect);

        self.place(rect);
        Some(rect)
    }

    /// Packs as many of `items` as possible, each round placing the item whose
    /// best position scores best over all remaining items.
    pub fn insert_batch(
        &mut self,
        items: Vec<InputItem>,
        heuristic: MaxRectsHeuristic,
    ) -> BatchOutput {
        let mut remaining = items;
        let mut placed = Vec::with_capacity(remaining.len());

        log::trace!("Batch packing {} items", remaining.len());

        while !remaining.is_empty() {
            let mut best: Option<(Score, usize, Rect)> = None;

            for (index, item) in remaining.iter().enumerate() {
                if let Some((rect, score)) = self.find_position(item.size, heuristic) {
                    if best.map_or(true, |(best_score, ..)| score < best_score) {
                        best = Some((score, index, rect));
                    }
                }
            }

            let (_, index, rect) = match best {
                Some(best) => best,
                None => break,
            };

            self.place(rect);

            let item = remaining.remove(index);
            log::trace!("Placed item {} at {:?}", item.id, rect);
            placed.push(item.placed(rect));
        }

        log::trace!(
            "Batch placed {} items, {} did not fit",
            placed.len(),
            remaining.len()
        );

        (placed, remaining)
    }

    pub fn occupancy(&self) -> f64 {
        let used_area = self.used_rects.iter().map(Rect::area).sum();
        geometry::occupancy(used_area, self.bin_size)
    }

    /// Scans every free rectangle in both orientations and returns the best
    /// scoring position. Ties go to the first candidate found.
    fn find_position(
        &self,
        size: (u32, u32),
        heuristic: MaxRectsHeuristic,
    ) -> Option<(Rect, Score)> {
        let candidates = [size, geometry::flipped(size)];
        let orientations = if self.allow_rotation {
            &candidates[..]
        } else {
            &candidates[..1]
        };

        let mut best: Option<(Rect, Score)> = None;

        for free in &self.free_rects {
            for &candidate in orientations {
                if !geometry::fits(candidate, free.size()) {
                    continue;
                }

                let rect = Rect::at(free.position(), candidate);
                let score = self.score(heuristic, &rect, free);

                if best.map_or(true, |(_, best_score)| score < best_score) {
                    best = Some((rect, score));
                }
            }
        }

        best
    }

    fn score(&self, heuristic: MaxRectsHeuristic, rect: &Rect, free: &Rect) -> Score {
        let leftover_x = i128::from(free.width - rect.width);
        let leftover_y = i128::from(free.height - rect.height);
        let short_side = leftover_x.min(leftover_y);
        let long_side = leftover_x.max(leftover_y);

        match heuristic {
            MaxRectsHeuristic::BestShortSideFit => (short_side, long_side),
            MaxRectsHeuristic::BestLongSideFit => (long_side, short_side),
            MaxRectsHeuristic::BestAreaFit => {
                (i128::from(free.area() - rect.area()), short_side)
            }
            MaxRectsHeuristic::BottomLeftRule => {
                (i128::from(rect.bottom()), i128::from(rect.x))
            }
            MaxRectsHeuristic::ContactPointRule => {
                (-i128::from(self.contact_point_score(rect)), 0)
            }
        }
    }

    /// Total length of the edges of `rect` that touch the bin border or an
    /// already placed rectangle.
    fn contact_point_score(&self, rect: &Rect) -> i64 {
        let mut score = 0;

        if rect.x == 0 || rect.right() == self.bin_size.0 {
            score += i64::from(rect.height);
        }

        if rect.y == 0 || rect.bottom() == self.bin_size.1 {
            score += i64::from(rect.width);
        }

        for used in &self.used_rects {
            if used.x == rect.right() || used.right() == rect.x {
                score += common_interval(used.y, used.bottom(), rect.y, rect.bottom());
            }

            if used.y == rect.bottom() || used.bottom() == rect.y {
                score += common_interval(used.x, used.right(), rect.x, rect.right());
            }
        }

        score
    }

    fn place(&mut self, rect: Rect) {
        let old_free = mem::take(&mut self.free_rects);
        let mut fragments = Vec::new();

        for free in old_free {
            if free.intersects(&rect) {
                split_free_rect(&free, &rect, &mut fragments);
            } else {
                self.free_rects.push(free);
            }
        }

        self.free_rects.extend(fragments);
        self.prune_free_list();

        self.used_rects.push(rect);
    }

    /// Removes every free rectangle that is contained in another one. O(n²)
    /// in the length of the free list.
    fn prune_free_list(&mut self) {
        let free = &mut self.free_rects;

        let mut i = 0;
        'outer: while i < free.len() {
            let mut j = i + 1;

            while j < free.len() {
                if free[j].contains(&free[i]) {
                    free.remove(i);
                    continue 'outer;
                }

                if free[i].contains(&free[j]) {
                    free.remove(j);
                } else {
                    j += 1;
                }
            }

            i += 1;
        }
    }
}

/// Cuts the parts of `free` that are not covered by `used` into up to four
/// maximal slivers: above, below, left of and right of `used`. The slivers
/// overlap each other in the corners.
fn split_free_rect(free: &Rect, used: &Rect, out: &mut Vec<Rect>) {
    debug_assert!(free.intersects(used));

    if used.y > free.y {
        out.push(Rect::new(free.x, free.y, free.width, used.y - free.y));
    }

    if used.bottom() < free.bottom() {
        out.push(Rect::new(
            free.x,
            used.bottom(),
            free.width,
            free.bottom() - used.bottom(),
        ));
    }

    if used.x > free.x {
        out.push(Rect::new(free.x, free.y, used.x - free.x, free.height));
    }

    if used.right() < free.right() {
        out.push(Rect::new(
            used.right(),
            free.y,
            free.right() - used.right(),
            free.height,
        ));
    }
}

/// Length of the overlap of the intervals `[a_start, a_end]` and
/// `[b_start, b_end]`.
fn common_interval(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> i64 {
    if a_end < b_start || b_end < a_start {
        return 0;
    }

    i64::from(a_end.min(b_end) - a_start.max(b_start))
}
