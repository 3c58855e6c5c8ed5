//! Shelf packing.
//!
//! Rectangles are lined up left to right on horizontal shelves that are
//! stacked from the bottom of the bin upwards. Only the topmost shelf can still
//! grow taller; every shelf below it is closed.

use crate::{
    geometry::{self, Rect},
    guillotine::{GuillotinePacker, WASTE_MAP_OPTIONS},
};

/// Chooses the shelf a new rectangle goes onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShelfChoice {
    /// Always the topmost shelf.
    NextFit,
    /// The lowest shelf with room.
    FirstFit,
    /// The shelf with the least remaining area.
    BestAreaFit,
    /// The shelf with the most remaining area.
    WorstAreaFit,
    /// The shelf whose height is closest to the rectangle's height.
    BestHeightFit,
    /// The shelf with the least horizontal room left after placement.
    BestWidthFit,
    /// The shelf with the most horizontal room left after placement.
    WorstWidthFit,
}

impl ShelfChoice {
    pub const ALL: [ShelfChoice; 7] = [
        ShelfChoice::NextFit,
        ShelfChoice::FirstFit,
        ShelfChoice::BestAreaFit,
        ShelfChoice::WorstAreaFit,
        ShelfChoice::BestHeightFit,
        ShelfChoice::BestWidthFit,
        ShelfChoice::WorstWidthFit,
    ];
}

#[derive(Debug, Clone)]
pub struct Shelf {
    current_x: u32,
    start_y: u32,
    height: u32,
    used_rects: Vec<Rect>,
}

impl Shelf {
    fn new(start_y: u32, height: u32) -> Self {
        Self {
            current_x: 0,
            start_y,
            height,
            used_rects: Vec::new(),
        }
    }

    /// The x coordinate where the next rectangle on this shelf would go.
    #[inline]
    pub fn current_x(&self) -> u32 {
        self.current_x
    }

    #[inline]
    pub fn start_y(&self) -> u32 {
        self.start_y
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn used_rects(&self) -> &[Rect] {
        &self.used_rects
    }

    /// Turns `size` the way it should sit on this shelf: long edge up if that
    /// still fits under the shelf's ceiling, long edge flat if the shelf is
    /// too short for it or the remaining width needs it.
    fn orient(&self, size: (u32, u32), bin_width: u32) -> (u32, u32) {
        let (width, height) = size;
        let room = bin_width - self.current_x;

        let flip = (width > height && width > room)
            || (width > height && width < self.height)
            || (width < height && height > self.height && height <= room);

        if flip {
            geometry::flipped(size)
        } else {
            size
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShelfPacker {
    bin_size: (u32, u32),
    used_area: u64,

    /// Never empty. Ordered bottom to top.
    shelves: Vec<Shelf>,

    /// Collects the space left over when a shelf is closed.
    waste_map: Option<GuillotinePacker>,
}

impl ShelfPacker {
    pub fn new(width: u32, height: u32, use_waste_map: bool) -> Self {
        let mut packer = Self {
            bin_size: (0, 0),
            used_area: 0,
            shelves: Vec::new(),
            waste_map: None,
        };
        packer.reset(width, height, use_waste_map);
        packer
    }

    pub fn reset(&mut self, width: u32, height: u32, use_waste_map: bool) {
        self.bin_size = (width, height);
        self.used_area = 0;

        self.shelves.clear();
        self.shelves.push(Shelf::new(0, 0));

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
    pub fn shelves(&self) -> &[Shelf] {
        &self.shelves
    }

    #[inline]
    pub fn uses_waste_map(&self) -> bool {
        self.waste_map.is_some()
    }

    pub fn insert(&mut self, size: (u32, u32), choice: ShelfChoice) -> Option<Rect> {
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

        let last = self.shelves.len() - 1;
        let mut size = size;

        let target = match choice {
            ShelfChoice::NextFit => {
                if self.fits_on_shelf(last, size, true) {
                    Some(last)
                } else {
                    None
                }
            }
            ShelfChoice::FirstFit => {
                (0..=last).find(|&index| self.fits_on_shelf(index, size, index == last))
            }
            _ => self.best_shelf(&mut size, choice),
        };

        if let Some(index) = target {
            return Some(self.add_to_shelf(index, size));
        }

        // Nothing had room, so open a new shelf with the long edge lying flat.
        let (width, height) = size;
        if width < height && height <= self.bin_size.0 {
            size = geometry::flipped(size);
        }

        self.start_new_shelf_for(size)
    }

    /// Sum of all placed areas, including those placed into the waste map,
    /// divided by the bin area.
    pub fn occupancy(&self) -> f64 {
        geometry::occupancy(self.used_area, self.bin_size)
    }

    /// Whether `size` fits onto the shelf at `index` in either orientation.
    /// A shelf that can resize may grow up to the top of the bin.
    fn fits_on_shelf(&self, index: usize, size: (u32, u32), can_resize: bool) -> bool {
        let shelf = &self.shelves[index];

        let shelf_height = if can_resize {
            self.bin_size.1 - shelf.start_y
        } else {
            shelf.height
        };
        let room = (self.bin_size.0 - shelf.current_x, shelf_height);

        geometry::fits(size, room) || geometry::fits(geometry::flipped(size), room)
    }

    /// Finds the best scoring shelf. Every shelf turns `size` its own way
    /// before being scored, and that orientation carries over to the shelves
    /// after it.
    fn best_shelf(&self, size: &mut (u32, u32), choice: ShelfChoice) -> Option<usize> {
        let bin_width = i128::from(self.bin_size.0);
        let last = self.shelves.len() - 1;

        let mut best: Option<(i128, usize)> = None;

        for (index, shelf) in self.shelves.iter().enumerate() {
            *size = shelf.orient(*size, self.bin_size.0);

            if !self.fits_on_shelf(index, *size, index == last) {
                continue;
            }

            let room = bin_width - i128::from(shelf.current_x);
            let remaining_area = room * i128::from(shelf.height);
            let width_left = room - i128::from(size.0);
            let height_left = (i128::from(shelf.height) - i128::from(size.1)).max(0);

            let score = match choice {
                ShelfChoice::BestAreaFit => remaining_area,
                ShelfChoice::WorstAreaFit => -remaining_area,
                ShelfChoice::BestHeightFit => height_left,
                ShelfChoice::BestWidthFit => width_left,
                ShelfChoice::WorstWidthFit => -width_left,
                ShelfChoice::NextFit | ShelfChoice::FirstFit => {
                    unreachable!("{:?} does not score shelves", choice)
                }
            };

            if best.map_or(true, |(best_score, _)| score < best_score) {
                best = Some((score, index));
            }
        }

        best.map(|(_, index)| index)
    }

    fn add_to_shelf(&mut self, index: usize, size: (u32, u32)) -> Rect {
        let bin_width = self.bin_size.0;
        let shelf = &mut self.shelves[index];

        let size = shelf.orient(size, bin_width);
        let rect = Rect::at((shelf.current_x, shelf.start_y), size);

        shelf.used_rects.push(rect);
        shelf.current_x += size.0;
        shelf.height = shelf.height.max(size.1);

        debug_assert!(rect.right() <= self.bin_size.0 && rect.bottom() <= self.bin_size.1);

        log::trace!("Placed {}x{} on shelf {} at {:?}", size.0, size.1, index, rect);

        self.used_area += rect.area();
        rect
    }

    /// Closes the topmost shelf and places `size` at the start of a new one
    /// right above it, if the bin has the height left for that.
    fn start_new_shelf_for(&mut self, size: (u32, u32)) -> Option<Rect> {
        let top = self.shelves.len() - 1;
        let start_y = self.shelves[top].start_y + self.shelves[top].height;

        if u64::from(start_y) + u64::from(size.1) > u64::from(self.bin_size.1) {
            log::trace!("No room for a new shelf of height {}", size.1);
            return None;
        }

        let room = (self.bin_size.0, self.bin_size.1 - start_y);
        if !geometry::fits(size, room) && !geometry::fits(geometry::flipped(size), room) {
            return None;
        }

        self.move_shelf_to_waste_map(top);

        log::trace!("Starting shelf at y = {} with height {}", start_y, size.1);
        self.shelves.push(Shelf::new(start_y, size.1));

        Some(self.add_to_shelf(top + 1, size))
    }

    /// Hands the space above each rectangle and to the right of the last one
    /// on a shelf over to the waste map, then marks the shelf as full.
    fn move_shelf_to_waste_map(&mut self, index: usize) {
        let bin_width = self.bin_size.0;

        let waste_map = match &mut self.waste_map {
            Some(waste_map) => waste_map,
            None => return,
        };

        let shelf = &mut self.shelves[index];

        for rect in &shelf.used_rects {
            let gap = Rect::new(rect.x, rect.bottom(), rect.width, shelf.height - rect.height);

            if !gap.is_empty() {
                waste_map.add_free_rect(gap);
            }
        }

        let tail = Rect::new(
            shelf.current_x,
            shelf.start_y,
            bin_width - shelf.current_x,
            shelf.height,
        );

        if !tail.is_empty() {
            waste_map.add_free_rect(tail);
        }

        shelf.current_x = bin_width;
        waste_map.merge_free_list();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::test_util::*;

    #[test]
    fn shelves_fill_the_bin_exactly() {
        let mut packer = ShelfPacker::new(10, 10, true);

        assert_eq!(
            packer.insert((10, 3), ShelfChoice::NextFit),
            Some(Rect::new(0, 0, 10, 3))
        );
        assert_eq!(
            packer.insert((10, 3), ShelfChoice::NextFit),
            Some(Rect::new(0, 3, 10, 3))
        );
        assert_eq!(
            packer.insert((10, 2), ShelfChoice::NextFit),
            Some(Rect::new(0, 6, 10, 2))
        );
        assert_eq!(
            packer.insert((10, 2), ShelfChoice::NextFit),
            Some(Rect::new(0, 8, 10, 2))
        );

        assert_eq!(packer.shelves().len(), 4);
        assert_eq!(packer.occupancy(), 1.0);
    }

    #[test]
    fn shelf_that_would_overflow_is_rejected() {
        let mut packer = ShelfPacker::new(10, 10, true);

        for _ in 0..3 {
            assert!(packer.insert((10, 3), ShelfChoice::NextFit).is_some());
        }

        assert_eq!(packer.insert((10, 2), ShelfChoice::NextFit), None);
        assert_eq!(packer.occupancy(), 0.9);
    }

    #[test]
    fn does_not_fit_at_all() {
        let mut packer = ShelfPacker::new(10, 10, false);

        assert_eq!(packer.insert((20, 20), ShelfChoice::FirstFit), None);
        assert_eq!(packer.insert((11, 11), ShelfChoice::BestAreaFit), None);
        assert_eq!(packer.insert((0, 4), ShelfChoice::NextFit), None);
        assert_eq!(packer.shelves().len(), 1);
    }

    #[test]
    fn wide_rect_rotates_onto_short_bin() {
        let mut packer = ShelfPacker::new(10, 30, false);

        assert_eq!(
            packer.insert((20, 5), ShelfChoice::NextFit),
            Some(Rect::new(0, 0, 5, 20))
        );
    }

    #[test]
    fn waste_map_reclaims_closed_shelf() {
        let mut packer = ShelfPacker::new(10, 12, true);

        packer.insert((4, 4), ShelfChoice::NextFit);
        assert_eq!(
            packer.insert((7, 7), ShelfChoice::NextFit),
            Some(Rect::new(0, 4, 7, 7))
        );

        // The rest of the first shelf went into the waste map.
        assert_eq!(
            packer.insert((3, 3), ShelfChoice::NextFit),
            Some(Rect::new(4, 0, 3, 3))
        );
        assert_eq!(packer.occupancy(), (16 + 49 + 9) as f64 / 120.0);
    }

    #[test]
    fn without_waste_map_closed_shelves_stay_full() {
        let mut packer = ShelfPacker::new(10, 12, false);

        packer.insert((4, 4), ShelfChoice::NextFit);
        packer.insert((7, 7), ShelfChoice::NextFit);

        assert_eq!(
            packer.insert((3, 3), ShelfChoice::NextFit),
            Some(Rect::new(7, 4, 3, 3))
        );
    }

    fn two_shelves() -> ShelfPacker {
        let mut packer = ShelfPacker::new(10, 20, false);

        packer.insert((7, 2), ShelfChoice::NextFit);
        packer.insert((7, 4), ShelfChoice::NextFit);

        assert_eq!(packer.shelves().len(), 2);
        packer
    }

    #[test]
    fn first_fit_uses_lowest_shelf() {
        let mut packer = two_shelves();

        assert_eq!(
            packer.insert((3, 2), ShelfChoice::FirstFit),
            Some(Rect::new(7, 0, 3, 2))
        );
    }

    #[test]
    fn next_fit_stands_rect_up_on_top_shelf() {
        let mut packer = two_shelves();

        assert_eq!(
            packer.insert((3, 2), ShelfChoice::NextFit),
            Some(Rect::new(7, 2, 2, 3))
        );
    }

    #[test]
    fn best_height_fit_picks_matching_shelf() {
        let mut packer = two_shelves();

        assert_eq!(
            packer.insert((3, 2), ShelfChoice::BestHeightFit),
            Some(Rect::new(7, 0, 3, 2))
        );
    }

    #[test]
    fn worst_width_fit_picks_roomiest_shelf() {
        let mut packer = ShelfPacker::new(10, 20, false);

        packer.insert((7, 2), ShelfChoice::NextFit);
        packer.insert((7, 4), ShelfChoice::NextFit);
        packer.insert((3, 1), ShelfChoice::FirstFit);

        // Shelf 0 is full now, the top shelf still has 3 columns.
        assert_eq!(
            packer.insert((1, 1), ShelfChoice::WorstWidthFit),
            Some(Rect::new(7, 2, 1, 1))
        );
    }

    #[test]
    fn scored_choices_pick_their_shelf() {
        // Shelf 0 is 2 tall with 3 columns left, the top shelf is 4 tall
        // with 5 columns left.
        let uneven_shelves = || {
            let mut packer = ShelfPacker::new(10, 20, false);
            packer.insert((7, 2), ShelfChoice::NextFit);
            packer.insert((5, 4), ShelfChoice::NextFit);
            packer
        };

        let bottom = Rect::new(7, 0, 2, 2);
        let top = Rect::new(5, 2, 2, 2);

        let cases = [
            (ShelfChoice::BestAreaFit, bottom),
            (ShelfChoice::WorstAreaFit, top),
            (ShelfChoice::BestHeightFit, bottom),
            (ShelfChoice::BestWidthFit, bottom),
            (ShelfChoice::WorstWidthFit, top),
        ];

        for &(choice, expected) in &cases {
            let mut packer = uneven_shelves();

            assert_eq!(packer.insert((2, 2), choice), Some(expected), "{:?}", choice);
        }
    }

    #[test]
    fn only_top_shelf_grows() {
        let mut packer = two_shelves();

        packer.insert((1, 2), ShelfChoice::FirstFit);
        packer.insert((1, 9), ShelfChoice::NextFit);

        let heights: Vec<_> = packer.shelves().iter().map(Shelf::height).collect();
        assert_eq!(heights, vec![2, 9]);
    }

    #[test]
    fn random_sequences_produce_valid_layouts() {
        for (seed, &choice) in ShelfChoice::ALL.iter().enumerate() {
            for &use_waste_map in &[false, true] {
                let mut rng = rng(seed as u64);
                let mut packer = ShelfPacker::new(50, 70, use_waste_map);
                let mut placed = Vec::new();

                for _ in 0..80 {
                    let size = random_size(&mut rng, 14);

                    if let Some(rect) = packer.insert(size, choice) {
                        assert_same_or_rotated(size, &rect);
                        placed.push(rect);
                    }
                }

                assert!(!placed.is_empty());
                assert_in_bin(&placed, packer.bin_size());
                assert_disjoint(&placed);

                let occupancy = packer.occupancy();
                assert!((0.0..=1.0).contains(&occupancy));
                assert_eq!(occupancy, used_area(&placed) as f64 / (50.0 * 70.0));

                for pair in packer.shelves().windows(2) {
                    assert_eq!(pair[0].start_y() + pair[0].height(), pair[1].start_y());
                }
            }
        }
    }
}
