//! Turns manifest entries into a packed layout and serializes it.

use std::{collections::HashMap, io::Write};

use binpack::{
    Algorithm, GuillotinePacker, InputItem, MaxRectsPacker, MetaPacker, MetaRect, PackError,
    Rect, ShelfPacker, SkylinePacker, GUILLOTINE_OPTIONS, MAX_RECTS_HEURISTIC, SHELF_CHOICE,
    SKYLINE_HEURISTIC,
};
use serde::Serialize;

use crate::manifest::Entry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub algorithm: String,
    pub occupancy: f64,
    pub rects: Vec<PlacedRect>,
    pub unplaced: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedRect {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub rotated: bool,
}

impl PlacedRect {
    fn new(entry: &Entry, rect: Rect) -> Self {
        Self {
            name: entry.name.clone(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            rotated: rect.size() != entry.size,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

impl Layout {
    /// Packs every entry with `MetaPacker`, searching for the smallest bin
    /// starting from `initial_size`.
    pub fn pack_meta(
        entries: &[Entry],
        initial_size: Option<(u32, u32)>,
    ) -> Result<Self, PackError> {
        let mut packer = MetaPacker::new();
        if let Some(size) = initial_size {
            packer = packer.with_initial_size(size);
        }

        let mut rects: Vec<_> = entries.iter().map(|entry| MetaRect::new(entry.size)).collect();
        let outcome = packer.pack(&mut rects)?;

        let placed = entries
            .iter()
            .zip(&rects)
            .filter_map(|(entry, rect)| Some(PlacedRect::new(entry, rect.rect()?)))
            .collect();

        Ok(Self {
            width: outcome.bin_size.0,
            height: outcome.bin_size.1,
            algorithm: outcome.algorithm.name().to_owned(),
            occupancy: outcome.occupancy,
            rects: placed,
            unplaced: Vec::new(),
        })
    }

    /// Packs as many entries as possible into a single bin of `size` with one
    /// algorithm. Entries that do not fit are listed as unplaced.
    ///
    /// Shelf packing places entries in manifest order. The other algorithms
    /// pick the best fitting entry first.
    pub fn pack_single(algorithm: Algorithm, size: (u32, u32), entries: &[Entry]) -> Self {
        let (width, height) = size;

        let (placements, occupancy) = match algorithm {
            Algorithm::Shelf => {
                let mut packer = ShelfPacker::new(width, height, true);
                let placements = entries
                    .iter()
                    .map(|entry| packer.insert(entry.size, SHELF_CHOICE))
                    .collect();

                (placements, packer.occupancy())
            }
            Algorithm::Guillotine => {
                let mut packer = GuillotinePacker::new(width, height);
                let placements = pack_batch(entries, |items| {
                    packer.insert_batch(items, GUILLOTINE_OPTIONS)
                });

                (placements, packer.occupancy())
            }
            Algorithm::Skyline => {
                let mut packer = SkylinePacker::new(width, height, true);
                let placements = pack_batch(entries, |items| {
                    packer.insert_batch(items, SKYLINE_HEURISTIC)
                });

                (placements, packer.occupancy())
            }
            Algorithm::MaxRects => {
                let mut packer = MaxRectsPacker::new(width, height);
                let placements = pack_batch(entries, |items| {
                    packer.insert_batch(items, MAX_RECTS_HEURISTIC)
                });

                (placements, packer.occupancy())
            }
        };

        Self::from_placements(algorithm, size, occupancy, entries, placements)
    }

    fn from_placements(
        algorithm: Algorithm,
        size: (u32, u32),
        occupancy: f64,
        entries: &[Entry],
        placements: Vec<Option<Rect>>,
    ) -> Self {
        let mut rects = Vec::new();
        let mut unplaced = Vec::new();

        for (entry, placement) in entries.iter().zip(placements) {
            match placement {
                Some(rect) => rects.push(PlacedRect::new(entry, rect)),
                None => unplaced.push(entry.name.clone()),
            }
        }

        Self {
            width: size.0,
            height: size.1,
            algorithm: algorithm.name().to_owned(),
            occupancy,
            rects,
            unplaced,
        }
    }

    pub fn write_json<W: Write>(&self, output: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(output, self)
    }
}

/// Runs a batch insert over `entries` and lines the placements back up with
/// the entries they came from.
fn pack_batch<F>(entries: &[Entry], insert_batch: F) -> Vec<Option<Rect>>
where
    F: FnOnce(Vec<InputItem>) -> binpack::BatchOutput,
{
    let items: Vec<_> = entries.iter().map(|entry| InputItem::new(entry.size)).collect();
    let indices: HashMap<_, _> = items
        .iter()
        .enumerate()
        .map(|(index, item)| (item.id(), index))
        .collect();

    let (placed, _remaining) = insert_batch(items);

    let mut placements = vec![None; entries.len()];
    for item in placed {
        placements[indices[&item.id()]] = Some(item.rect());
    }

    placements
}
