//! Tries every packing algorithm on the same input, growing the bin until one
//! of them manages to place everything.

use std::fmt;

use thiserror::Error;

use crate::{
    geometry::Rect,
    guillotine::{FreeRectChoice, GuillotineOptions, GuillotinePacker, SplitMethod},
    id::Id,
    maxrects::{MaxRectsHeuristic, MaxRectsPacker},
    shelf::{ShelfChoice, ShelfPacker},
    skyline::{SkylineHeuristic, SkylinePacker},
};

pub const SHELF_CHOICE: ShelfChoice = ShelfChoice::BestAreaFit;

pub const GUILLOTINE_OPTIONS: GuillotineOptions = GuillotineOptions {
    merge: true,
    choice: FreeRectChoice::BestShortSideFit,
    split: SplitMethod::ShorterLeftoverAxis,
};

pub const SKYLINE_HEURISTIC: SkylineHeuristic = SkylineHeuristic::MinWasteFit;

pub const MAX_RECTS_HEURISTIC: MaxRectsHeuristic = MaxRectsHeuristic::BestShortSideFit;

/// The packing algorithms `MetaPacker` chooses from, in the order it tries
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Shelf,
    Guillotine,
    Skyline,
    MaxRects,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Shelf,
        Algorithm::Guillotine,
        Algorithm::Skyline,
        Algorithm::MaxRects,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Shelf => "shelf",
            Algorithm::Guillotine => "guillotine",
            Algorithm::Skyline => "skyline",
            Algorithm::MaxRects => "maxrects",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A rectangle to be packed by `MetaPacker`. Keeps the size it was created
/// with so that callers can tell whether the placement rotated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaRect {
    id: Id,
    size: (u32, u32),
    rect: Option<Rect>,
    rotated: bool,
}

impl MetaRect {
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            id: Id::new(),
            size,
            rect: None,
            rotated: false,
        }
    }

    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The size this rectangle was created with.
    #[inline]
    pub fn original_size(&self) -> (u32, u32) {
        self.size
    }

    /// Where the rectangle ended up, if the last `pack` succeeded.
    #[inline]
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    /// Whether the placement is turned by 90 degrees relative to the original
    /// size.
    #[inline]
    pub fn rotated(&self) -> bool {
        self.rotated
    }

    fn place(&mut self, rect: Rect) {
        self.rect = Some(rect);
        self.rotated = rect.size() != self.size;
    }

    fn clear(&mut self) {
        self.rect = None;
        self.rotated = false;
    }
}

/// Describes a successful `MetaPacker::pack`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaOutcome {
    pub bin_size: (u32, u32),
    pub algorithm: Algorithm,
    pub occupancy: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackError {
    #[error("rectangle {id} has a zero-sized side and can never be placed")]
    EmptyRect { id: Id },

    #[error("rectangles do not fit into a {width}x{height} bin with any algorithm")]
    DoesNotFit { width: u32, height: u32 },
}

/// Packs a list of rectangles into the smallest bin it can find, trying every
/// algorithm at each size and doubling the bin until one of them succeeds.
#[derive(Debug, Clone)]
pub struct MetaPacker {
    initial_size: (u32, u32),
    max_doublings: u32,

    shelf: ShelfPacker,
    guillotine: GuillotinePacker,
    skyline: SkylinePacker,
    max_rects: MaxRectsPacker,
}

impl Default for MetaPacker {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaPacker {
    pub fn new() -> Self {
        Self {
            initial_size: (16, 16),
            max_doublings: 15,

            shelf: ShelfPacker::new(0, 0, true),
            guillotine: GuillotinePacker::new(0, 0),
            skyline: SkylinePacker::new(0, 0, true),
            max_rects: MaxRectsPacker::new(0, 0),
        }
    }

    pub fn with_initial_size(mut self, initial_size: (u32, u32)) -> Self {
        self.initial_size = initial_size;
        self
    }

    pub fn with_max_doublings(mut self, max_doublings: u32) -> Self {
        self.max_doublings = max_doublings;
        self
    }

    /// Places every rectangle in `rects`, in order, into a single bin.
    ///
    /// On success every `MetaRect` holds its placement. On failure all
    /// placements are cleared and the error names the largest bin that was
    /// tried.
    pub fn pack(&mut self, rects: &mut [MetaRect]) -> Result<MetaOutcome, PackError> {
        if let Some(empty) = rects.iter().find(|rect| rect.size.0 == 0 || rect.size.1 == 0) {
            return Err(PackError::EmptyRect { id: empty.id });
        }

        let mut size = self.initial_size;

        for run in 0..=self.max_doublings {
            log::debug!(
                "Attempt {}: packing {} rects into {}x{}",
                run,
                rects.len(),
                size.0,
                size.1
            );

            for &algorithm in &Algorithm::ALL {
                if self.pack_at(algorithm, size, rects) {
                    let occupancy = self.occupancy(algorithm);

                    log::debug!(
                        "{} packed everything into {}x{} ({:.1}% occupied)",
                        algorithm,
                        size.0,
                        size.1,
                        occupancy * 100.0
                    );

                    return Ok(MetaOutcome {
                        bin_size: size,
                        algorithm,
                        occupancy,
                    });
                }
            }

            if run == self.max_doublings {
                break;
            }

            size = match (size.0.checked_mul(2), size.1.checked_mul(2)) {
                (Some(width), Some(height)) => (width, height),
                _ => break,
            };
        }

        for rect in rects.iter_mut() {
            rect.clear();
        }

        Err(PackError::DoesNotFit {
            width: size.0,
            height: size.1,
        })
    }

    /// Resets the packer for `algorithm` to `size` and feeds it every
    /// rectangle. Returns false as soon as one does not fit.
    fn pack_at(&mut self, algorithm: Algorithm, size: (u32, u32), rects: &mut [MetaRect]) -> bool {
        self.reset(algorithm, size);

        for rect in rects.iter_mut() {
            match self.insert(algorithm, rect.size) {
                Some(placed) => rect.place(placed),
                None => {
                    log::trace!(
                        "{} could not place {}x{} in {}x{}",
                        algorithm,
                        rect.size.0,
                        rect.size.1,
                        size.0,
                        size.1
                    );
                    return false;
                }
            }
        }

        true
    }

    fn reset(&mut self, algorithm: Algorithm, size: (u32, u32)) {
        let (width, height) = size;

        match algorithm {
            Algorithm::Shelf => self.shelf.reset(width, height, true),
            Algorithm::Guillotine => self.guillotine.reset(width, height),
            Algorithm::Skyline => self.skyline.reset(width, height, true),
            Algorithm::MaxRects => self.max_rects.reset(width, height),
        }
    }

    fn insert(&mut self, algorithm: Algorithm, size: (u32, u32)) -> Option<Rect> {
        match algorithm {
            Algorithm::Shelf => self.shelf.insert(size, SHELF_CHOICE),
            Algorithm::Guillotine => self.guillotine.insert(size, GUILLOTINE_OPTIONS),
            Algorithm::Skyline => self.skyline.insert(size, SKYLINE_HEURISTIC),
            Algorithm::MaxRects => self.max_rects.insert(size, MAX_RECTS_HEURISTIC),
        }
    }

    fn occupancy(&self, algorithm: Algorithm) -> f64 {
        match algorithm {
            Algorithm::Shelf => self.shelf.occupancy(),
            Algorithm::Guillotine => self.guillotine.occupancy(),
            Algorithm::Skyline => self.skyline.occupancy(),
            Algorithm::MaxRects => self.max_rects.occupancy(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::test_util::*;

    #[test]
    fn empty_input_fits_initial_size() {
        let outcome = MetaPacker::new().pack(&mut []).unwrap();

        assert_eq!(outcome.bin_size, (16, 16));
        assert_eq!(outcome.algorithm, Algorithm::Shelf);
        assert_eq!(outcome.occupancy, 0.0);
    }

    #[test]
    fn grows_until_everything_fits() {
        let mut rects = vec![MetaRect::new((100, 20))];

        let outcome = MetaPacker::new().pack(&mut rects).unwrap();

        assert_eq!(outcome.bin_size, (128, 128));
        assert_eq!(outcome.algorithm, Algorithm::Shelf);
        assert_eq!(rects[0].rect(), Some(Rect::new(0, 0, 100, 20)));
        assert!(!rects[0].rotated());
    }

    #[test]
    fn uniform_squares_fill_the_bin() {
        let mut rects: Vec<_> = (0..16).map(|_| MetaRect::new((8, 8))).collect();

        let outcome = MetaPacker::new().pack(&mut rects).unwrap();

        assert_eq!(outcome.bin_size, (32, 32));
        assert_eq!(outcome.occupancy, 1.0);

        let placed: Vec<_> = rects.iter().filter_map(MetaRect::rect).collect();
        assert_eq!(placed.len(), 16);
        assert_disjoint(&placed);
    }

    #[test]
    fn reports_rotation() {
        let mut rects = vec![MetaRect::new((10, 40))];

        MetaPacker::new().pack(&mut rects).unwrap();

        assert_eq!(rects[0].original_size(), (10, 40));
        assert_eq!(rects[0].rect(), Some(Rect::new(0, 0, 40, 10)));
        assert!(rects[0].rotated());
    }

    #[test]
    fn gives_up_after_max_doublings() {
        let mut rects = vec![MetaRect::new((20, 20)), MetaRect::new((64, 64))];
        let mut packer = MetaPacker::new().with_max_doublings(1);

        assert_eq!(
            packer.pack(&mut rects),
            Err(PackError::DoesNotFit {
                width: 32,
                height: 32
            })
        );
        assert!(rects.iter().all(|rect| rect.rect().is_none()));

        // 64x64 is not enough either: the big square cannot share the bin
        // with the small one.
        let outcome = MetaPacker::new()
            .with_max_doublings(3)
            .pack(&mut rects)
            .unwrap();
        assert_eq!(outcome.bin_size, (128, 128));
        assert_eq!(rects[1].rect(), Some(Rect::new(20, 0, 64, 64)));
    }

    #[test]
    fn too_big_for_any_bin() {
        let mut rects = vec![MetaRect::new((600_000, 1))];

        assert_eq!(
            MetaPacker::new().pack(&mut rects),
            Err(PackError::DoesNotFit {
                width: 16 << 15,
                height: 16 << 15
            })
        );
    }

    #[test]
    fn zero_sized_rect_is_rejected() {
        let mut rects = vec![MetaRect::new((4, 4)), MetaRect::new((0, 4))];
        let id = rects[1].id();

        assert_eq!(
            MetaPacker::new().pack(&mut rects),
            Err(PackError::EmptyRect { id })
        );
    }

    #[test]
    fn random_inputs_pack_validly() {
        for seed in 0..4 {
            let mut rng = rng(seed + 300);
            let mut rects: Vec<_> = (0..40)
                .map(|_| MetaRect::new(random_size(&mut rng, 40)))
                .collect();

            let outcome = MetaPacker::new().pack(&mut rects).unwrap();
            let (width, height) = outcome.bin_size;

            assert_eq!(width, height);
            assert!(width.is_power_of_two() && width >= 16);

            let placed: Vec<_> = rects.iter().filter_map(MetaRect::rect).collect();
            assert_eq!(placed.len(), rects.len());
            assert_in_bin(&placed, outcome.bin_size);
            assert_disjoint(&placed);

            for rect in &rects {
                let placed = rect.rect().unwrap();
                assert_same_or_rotated(rect.original_size(), &placed);
                assert_eq!(rect.rotated(), placed.size() != rect.original_size());
            }
        }
    }
}
