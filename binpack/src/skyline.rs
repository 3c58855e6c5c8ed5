//! Skyline packing.
//!
//! The packer only remembers the top profile of everything placed so far: a
//! list of horizontal segments ordered by x that together span the width of
//! the bin. New rectangles always sit on top of that profile, so any space
//! trapped underneath them is lost unless a waste map picks it up.

use crate::{
    geometry::{self, Rect},
    guillotine::{GuillotinePacker, WASTE_MAP_OPTIONS},
    types::{BatchOutput, InputItem},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkylineHeuristic {
    /// Lowest resulting top edge, ties broken by the narrowest segment.
    BottomLeft,
    /// Least area trapped underneath, ties broken by the lowest top edge.
    MinWasteFit,
}

impl SkylineHeuristic {
    pub const ALL: [SkylineHeuristic; 2] =
        [SkylineHeuristic::BottomLeft, SkylineHeuristic::MinWasteFit];
}

/// One horizontal segment of the skyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkylineNode {
    pub x: u32,
    pub y: u32,
    pub width: u32,
}

impl SkylineNode {
    #[inline]
    fn right(&self) -> u32 {
        self.x + self.width
    }
}

type Score = (u64, u64);

#[derive(Debug, Clone)]
pub struct SkylinePacker {
    bin_size: (u32, u32),
    used_area: u64,

    /// Invariant: sorted by x, no gaps, every width non-zero and no two
    /// neighbors at the same height.
    skyline: Vec<SkylineNode>,

    /// Collects the space trapped underneath placed rectangles.
    waste_map: Option<GuillotinePacker>,
}

impl SkylinePacker {
    pub fn new(width: u32, height: u32, use_waste_map: bool) -> Self {
        let mut packer = Self {
            bin_size: (0, 0),
            used_area: 0,
            skyline: Vec::new(),
            waste_map: None,
        };
        packer.reset(width, height, use_waste_map);
        packer
    }

    pub fn reset(&mut self, width: u32, height: u32, use_waste_map: bool) {
        self.bin_size = (width, height);
        self.used_area = 0;

        self.skyline.clear();
        if width > 0 {
            self.skyline.push(SkylineNode { x: 0, y: 0, width });
        }

        self.waste_map = if use_waste_map {
            Some(GuillotinePacker::waste_map(width, height))
        } else {
            None
        };
    }

    #[inline]
    pub fn bin_size(&self) -> (u32, u32) {
        self.bin_size
    }

    #[inline]
    pub fn skyline(&self) -> &[SkylineNode] {
        &self.skyline
    }

    #[inline]
    pub fn uses_waste_map(&self) -> bool {
        self.waste_map.is_some()
    }

    /// Places a single rectangle. The waste map, if there is one, gets the
    /// first chance at it.
    pub fn insert(&mut self, size: (u32, u32), heuristic: SkylineHeuristic) -> Option<Rect> {
        if size.0 == 0 || size.1 == 0 {
            return None;
        }

        if let Some(waste_map) = &mut self.waste_map {
            if let Some(rect) = waste_map.insert(size, WASTE_MAP_OPTIONS) {
                log::trace!("Reclaimed waste for {}x{} at {:?}", size.0, size.1, rect);

                self.used_area += rect.area();
                return Some(rect);
            }
        }

        let (index, rect, _) = self.find_position(size, heuristic)?;

        log::trace!("Placing {}x{} at {:?}", size.0, size.1, rect);

        self.add_level(index, rect);
        self.used_area += rect.area();

        Some(rect)
    }

    /// Packs as many of `items` as possible, each round placing the item whose
    /// best position scores best over all remaining items. Batches go straight
    /// to the skyline; the waste map is only consulted by `insert`.
    pub fn insert_batch(
        &mut self,
        items: Vec<InputItem>,
        heuristic: SkylineHeuristic,
    ) -> BatchOutput {
        let mut remaining = items;
        let mut placed = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let mut best: Option<(Score, usize, usize, Rect)> = None;

            for (item_index, item) in remaining.iter().enumerate() {
                if let Some((node_index, rect, score)) = self.find_position(item.size, heuristic) {
                    if best.map_or(true, |(best_score, ..)| score < best_score) {
                        best = Some((score, item_index, node_index, rect));
                    }
                }
            }

            let (_, item_index, node_index, rect) = match best {
                Some(best) => best,
                None => break,
            };

            self.add_level(node_index, rect);
            self.used_area += rect.area();

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

    pub fn occupancy(&self) -> f64 {
        geometry::occupancy(self.used_area, self.bin_size)
    }

    fn find_position(
        &self,
        size: (u32, u32),
        heuristic: SkylineHeuristic,
    ) -> Option<(usize, Rect, Score)> {
        let mut best: Option<(usize, Rect, Score)> = None;

        for (index, node) in self.skyline.iter().enumerate() {
            for &candidate in &[size, geometry::flipped(size)] {
                let y = match self.rectangle_fits(index, candidate) {
                    Some(y) => y,
                    None => continue,
                };

                let top = u64::from(y) + u64::from(candidate.1);
                let score = match heuristic {
                    SkylineHeuristic::BottomLeft => (top, u64::from(node.width)),
                    SkylineHeuristic::MinWasteFit => {
                        (self.wasted_area(index, candidate.0, y), top)
                    }
                };

                if best.map_or(true, |(.., best_score)| score < best_score) {
                    best = Some((index, Rect::at((node.x, y), candidate), score));
                }
            }
        }

        best
    }

    /// Checks whether a rectangle of `size` can sit on the skyline starting at
    /// the segment `index`, possibly spanning several segments. Returns the y
    /// coordinate it would rest at.
    fn rectangle_fits(&self, index: usize, size: (u32, u32)) -> Option<u32> {
        let (width, height) = size;
        let start = self.skyline[index].x;

        if width == 0 || height == 0 {
            return None;
        }

        if u64::from(start) + u64::from(width) > u64::from(self.bin_size.0) {
            return None;
        }

        let mut width_left = width;
        let mut y = 0;

        for node in &self.skyline[index..] {
            if width_left == 0 {
                break;
            }

            y = y.max(node.y);

            if u64::from(y) + u64::from(height) > u64::from(self.bin_size.1) {
                return None;
            }

            width_left = width_left.saturating_sub(node.width);
        }

        debug_assert_eq!(width_left, 0);
        Some(y)
    }

    /// Visits the part of every segment that lies underneath a rectangle of
    /// `width` resting at `y` on top of segment `index`, as `(x, y, width,
    /// height)` of the gap between the segment and the rectangle.
    fn gaps_below(&self, index: usize, width: u32, y: u32) -> impl Iterator<Item = Rect> + '_ {
        let left = self.skyline[index].x;
        let right = left + width;

        self.skyline[index..]
            .iter()
            .take_while(move |node| node.x < right && node.right() > left)
            .map(move |node| {
                debug_assert!(y >= node.y);

                let gap_right = right.min(node.right());
                Rect::new(node.x, node.y, gap_right - node.x, y - node.y)
            })
    }

    fn wasted_area(&self, index: usize, width: u32, y: u32) -> u64 {
        self.gaps_below(index, width, y).map(|gap| gap.area()).sum()
    }

    /// Raises the skyline to the top of `rect`, which sits on segment `index`.
    fn add_level(&mut self, index: usize, rect: Rect) {
        if self.waste_map.is_some() {
            let gaps: Vec<_> = self
                .gaps_below(index, rect.width, rect.y)
                .filter(|gap| !gap.is_empty())
                .collect();

            if let Some(waste_map) = &mut self.waste_map {
                for gap in gaps {
                    waste_map.add_free_rect(gap);
                }
            }
        }

        let node = SkylineNode {
            x: rect.x,
            y: rect.bottom(),
            width: rect.width,
        };

        debug_assert!(node.right() <= self.bin_size.0);
        debug_assert!(node.y <= self.bin_size.1);

        self.skyline.insert(index, node);

        // Cut away whatever the new segment now covers.
        let mut i = index + 1;
        while i < self.skyline.len() {
            let previous_right = self.skyline[i - 1].right();
            let current = &mut self.skyline[i];

            if current.x >= previous_right {
                break;
            }

            let shrink = previous_right - current.x;
            if shrink >= current.width {
                self.skyline.remove(i);
            } else {
                current.x += shrink;
                current.width -= shrink;
                break;
            }
        }

        self.merge_skylines();
    }

    /// Joins neighboring segments at the same height.
    fn merge_skylines(&mut self) {
        self.skyline.dedup_by(|next, previous| {
            if next.y == previous.y {
                previous.width += next.width;
                true
            } else {
                false
            }
        });
    }
}
