//! Guillotine packing.
//!
//! The free space of the bin is tracked as a list of pairwise disjoint
//! rectangles. Every placement goes into the corner of one free rectangle, and
//! the L-shaped leftover of that rectangle is cut along one axis into at most
//! two new free rectangles.

use crate::{
    geometry::{self, Rect},
    types::{BatchOutput, InputItem},
};

/// Chooses which free rectangle receives a new rectangle. Scores are
/// penalties, so lower is better; the `Worst*` variants negate their `Best*`
/// counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FreeRectChoice {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
    WorstAreaFit,
    WorstShortSideFit,
    WorstLongSideFit,
}

impl FreeRectChoice {
    pub const ALL: [FreeRectChoice; 6] = [
        FreeRectChoice::BestAreaFit,
        FreeRectChoice::BestShortSideFit,
        FreeRectChoice::BestLongSideFit,
        FreeRectChoice::WorstAreaFit,
        FreeRectChoice::WorstShortSideFit,
        FreeRectChoice::WorstLongSideFit,
    ];

    /// Scores placing a rectangle of `size` into `free`. The size must fit.
    ///
    /// Scores are `i128` since the area of a `u32` bin overflows `i64`.
    pub fn score(self, size: (u32, u32), free: &Rect) -> i128 {
        let leftover_x = i128::from(free.width) - i128::from(size.0);
        let leftover_y = i128::from(free.height) - i128::from(size.1);
        let area_fit = i128::from(free.area().saturating_sub(geometry::area(size)));

        match self {
            FreeRectChoice::BestAreaFit => area_fit,
            FreeRectChoice::BestShortSideFit => leftover_x.min(leftover_y),
            FreeRectChoice::BestLongSideFit => leftover_x.max(leftover_y),
            FreeRectChoice::WorstAreaFit => -area_fit,
            FreeRectChoice::WorstShortSideFit => -leftover_x.min(leftover_y),
            FreeRectChoice::WorstLongSideFit => -leftover_x.max(leftover_y),
        }
    }
}

/// Chooses the axis along which the leftover of a free rectangle is cut.
///
/// Cutting horizontally gives the full width of the free rectangle to the
/// piece below the placed rectangle; cutting vertically gives the full height
/// to the piece beside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitMethod {
    ShorterLeftoverAxis,
    LongerLeftoverAxis,
    MinimizeArea,
    MaximizeArea,
    ShorterAxis,
    LongerAxis,
}

impl SplitMethod {
    pub const ALL: [SplitMethod; 6] = [
        SplitMethod::ShorterLeftoverAxis,
        SplitMethod::LongerLeftoverAxis,
        SplitMethod::MinimizeArea,
        SplitMethod::MaximizeArea,
        SplitMethod::ShorterAxis,
        SplitMethod::LongerAxis,
    ];

    fn split_horizontally(self, free: &Rect, placed: &Rect) -> bool {
        let leftover_x = u64::from(free.width - placed.width);
        let leftover_y = u64::from(free.height - placed.height);

        match self {
            SplitMethod::ShorterLeftoverAxis => leftover_x <= leftover_y,
            SplitMethod::LongerLeftoverAxis => leftover_x > leftover_y,
            SplitMethod::MinimizeArea => {
                u64::from(placed.width) * leftover_y > leftover_x * u64::from(placed.height)
            }
            SplitMethod::MaximizeArea => {
                u64::from(placed.width) * leftover_y <= leftover_x * u64::from(placed.height)
            }
            SplitMethod::ShorterAxis => free.width <= free.height,
            SplitMethod::LongerAxis => free.width > free.height,
        }
    }
}

/// All of the knobs a guillotine insert takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuillotineOptions {
    /// Run `merge_free_list` after every placement.
    pub merge: bool,
    pub choice: FreeRectChoice,
    pub split: SplitMethod,
}

impl Default for GuillotineOptions {
    fn default() -> Self {
        Self {
            merge: true,
            choice: FreeRectChoice::BestShortSideFit,
            split: SplitMethod::ShorterLeftoverAxis,
        }
    }
}

/// Options used by packers that keep a guillotine waste map around to
/// reclaim space they could not use themselves.
pub(crate) const WASTE_MAP_OPTIONS: GuillotineOptions = GuillotineOptions {
    merge: true,
    choice: FreeRectChoice::BestShortSideFit,
    split: SplitMethod::MaximizeArea,
};

/// Score used for a free rectangle that matches the requested size exactly.
/// Nothing can beat it, so searches stop as soon as one is found.
const EXACT_FIT: i128 = i128::MIN;

#[derive(Debug, Clone)]
pub struct GuillotinePacker {
    bin_size: (u32, u32),
    used_rects: Vec<Rect>,

    /// Invariant: pairwise disjoint and never overlapping a used rectangle.
    free_rects: Vec<Rect>,
}

impl GuillotinePacker {
    pub fn new(width: u32, height: u32) -> Self {
        let mut packer = Self {
            bin_size: (0, 0),
            used_rects: Vec::new(),
            free_rects: Vec::new(),
        };
        packer.reset(width, height);
        packer
    }

    /// A packer over the given bin that starts out without any free space.
    /// Owners of a waste map hand it free rectangles as they come up.
    pub(crate) fn waste_map(width: u32, height: u32) -> Self {
        let mut packer = Self::new(width, height);
        packer.free_rects.clear();
        packer
    }

    /// Throws away all placements and makes the whole bin free again.
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

    pub(crate) fn add_free_rect(&mut self, rect: Rect) {
        debug_assert!(!rect.is_empty());
        self.free_rects.push(rect);
    }

    /// Places a single rectangle, possibly rotated by 90 degrees, or returns
    /// `None` if no free rectangle can hold it in either orientation.
    pub fn insert(&mut self, size: (u32, u32), options: GuillotineOptions) -> Option<Rect> {
        let (free_index, rect) = self.find_position(size, options.choice)?;

        log::trace!(
            "Placing {}x{} at {:?} (free rect {:?})",
            size.0,
            size.1,
            rect,
            self.free_rects[free_index]
        );

        self.place(free_index, rect, options);
        Some(rect)
    }

    /// Packs as many of `items` as possible. Every round picks the best
    /// pairing of remaining item and free rectangle over all candidates, so
    /// the output comes back in placement order rather than input order.
    pub fn insert_batch(
        &mut self,
        items: Vec<InputItem>,
        options: GuillotineOptions,
    ) -> BatchOutput {
        let mut remaining = items;
        let mut placed = Vec::with_capacity(remaining.len());

        log::trace!("Batch packing {} items", remaining.len());

        while !remaining.is_empty() {
            let mut best: Option<(i128, usize, usize, Rect)> = None;

            'search: for (free_index, free) in self.free_rects.iter().enumerate() {
                for (item_index, item) in remaining.iter().enumerate() {
                    let (score, rect) = match score_placement(item.size, free, options.choice) {
                        Some(candidate) => candidate,
                        None => continue,
                    };

                    if best.map_or(true, |(best_score, ..)| score < best_score) {
                        best = Some((score, free_index, item_index, rect));

                        if score == EXACT_FIT {
                            break 'search;
                        }
                    }
                }
            }

            let (_, free_index, item_index, rect) = match best {
                Some(best) => best,
                None => break,
            };

            self.place(free_index, rect, options);

            let item = remaining.remove(item_index);
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

    /// Merges pairs of free rectangles that share a full edge. A single pass
    /// does not find every possible merge; three rectangles that only merge
    /// together can stay separate.
    pub fn merge_free_list(&mut self) {
        let free = &mut self.free_rects;

        let mut i = 0;
        while i < free.len() {
            let mut j = i + 1;

            while j < free.len() {
                let (a, b) = (free[i], free[j]);

                let merged = if a.width == b.width && a.x == b.x {
                    if a.y == b.bottom() {
                        Some(Rect::new(a.x, b.y, a.width, a.height + b.height))
                    } else if a.bottom() == b.y {
                        Some(Rect::new(a.x, a.y, a.width, a.height + b.height))
                    } else {
                        None
                    }
                } else if a.height == b.height && a.y == b.y {
                    if a.x == b.right() {
                        Some(Rect::new(b.x, a.y, a.width + b.width, a.height))
                    } else if a.right() == b.x {
                        Some(Rect::new(a.x, a.y, a.width + b.width, a.height))
                    } else {
                        None
                    }
                } else {
                    None
                };

                match merged {
                    Some(rect) => {
                        free[i] = rect;
                        free.remove(j);
                    }
                    None => j += 1,
                }
            }

            i += 1;
        }
    }

    /// Sum of all placed areas divided by the bin area.
    pub fn occupancy(&self) -> f64 {
        let used_area = self.used_rects.iter().map(Rect::area).sum();
        geometry::occupancy(used_area, self.bin_size)
    }

    fn find_position(&self, size: (u32, u32), choice: FreeRectChoice) -> Option<(usize, Rect)> {
        let mut best: Option<(i128, usize, Rect)> = None;

        for (index, free) in self.free_rects.iter().enumerate() {
            let (score, rect) = match score_placement(size, free, choice) {
                Some(candidate) => candidate,
                None => continue,
            };

            if best.map_or(true, |(best_score, ..)| score < best_score) {
                best = Some((score, index, rect));

                if score == EXACT_FIT {
                    break;
                }
            }
        }

        best.map(|(_, index, rect)| (index, rect))
    }

    fn place(&mut self, free_index: usize, rect: Rect, options: GuillotineOptions) {
        let free = self.free_rects.remove(free_index);
        self.split_free_rect(&free, &rect, options.split.split_horizontally(&free, &rect));

        if options.merge {
            self.merge_free_list();
        }

        self.used_rects.push(rect);
    }

    /// Cuts the part of `free` not covered by `placed` into a piece below and
    /// a piece to the right of `placed`. Both share the origin of `free`.
    fn split_free_rect(&mut self, free: &Rect, placed: &Rect, horizontal: bool) {
        let mut bottom = Rect::new(
            free.x,
            placed.bottom(),
            0,
            free.height - placed.height,
        );
        let mut right = Rect::new(placed.right(), free.y, free.width - placed.width, 0);

        if horizontal {
            bottom.width = free.width;
            right.height = placed.height;
        } else {
            bottom.width = placed.width;
            right.height = free.height;
        }

        if !bottom.is_empty() {
            self.free_rects.push(bottom);
        }

        if !right.is_empty() {
            self.free_rects.push(right);
        }
    }
}

/// Scores putting a rectangle of `size` into the corner of `free`, trying the
/// upright orientation before the rotated one.
fn score_placement(
    size: (u32, u32),
    free: &Rect,
    choice: FreeRectChoice,
) -> Option<(i128, Rect)> {
    if size.0 == 0 || size.1 == 0 {
        return None;
    }

    let rotated = geometry::flipped(size);

    if size == free.size() {
        Some((EXACT_FIT, Rect::at(free.position(), size)))
    } else if rotated == free.size() {
        Some((EXACT_FIT, Rect::at(free.position(), rotated)))
    } else if geometry::fits(size, free.size()) {
        Some((choice.score(size, free), Rect::at(free.position(), size)))
    } else if geometry::fits(rotated, free.size()) {
        Some((choice.score(rotated, free), Rect::at(free.position(), rotated)))
    } else {
        None
    }
}
