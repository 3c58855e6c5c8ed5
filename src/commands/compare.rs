use binpack::{
    Algorithm, FreeRectChoice, GuillotineOptions, GuillotinePacker, MaxRectsHeuristic,
    MaxRectsPacker, Rect, ShelfChoice, ShelfPacker, SkylineHeuristic, SkylinePacker,
    SplitMethod,
};

use crate::{
    manifest::{Entry, Manifest},
    options::CompareOptions,
};

/// How one algorithm and heuristic combination did on a manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub algorithm: Algorithm,
    pub heuristic: String,
    pub placed: usize,
    pub occupancy: f64,
}

pub fn compare(options: CompareOptions) -> anyhow::Result<()> {
    let manifest = Manifest::read_from_file(&options.manifest)?;
    let entries = manifest.entries()?;

    let results = compare_all(&entries, options.size.as_tuple());

    println!(
        "Packing {} rects into {} in manifest order:",
        entries.len(),
        options.size
    );

    for result in &results {
        println!(
            "{:<12} {:<48} {:>6}/{:<6} {:>6.2}%",
            result.algorithm.name(),
            result.heuristic,
            result.placed,
            entries.len(),
            result.occupancy * 100.0
        );
    }

    Ok(())
}

/// Places `entries` one after another with every algorithm and every
/// heuristic it supports.
pub fn compare_all(entries: &[Entry], size: (u32, u32)) -> Vec<Comparison> {
    let (width, height) = size;
    let mut results = Vec::new();

    for &use_waste_map in &[false, true] {
        for &choice in &ShelfChoice::ALL {
            let mut packer = ShelfPacker::new(width, height, use_waste_map);
            let placed = insert_all(entries, |size| packer.insert(size, choice));

            results.push(Comparison {
                algorithm: Algorithm::Shelf,
                heuristic: with_waste_map(format!("{:?}", choice), use_waste_map),
                placed,
                occupancy: packer.occupancy(),
            });
        }
    }

    for &merge in &[false, true] {
        for &choice in &FreeRectChoice::ALL {
            for &split in &SplitMethod::ALL {
                let options = GuillotineOptions {
                    merge,
                    choice,
                    split,
                };

                let mut packer = GuillotinePacker::new(width, height);
                let placed = insert_all(entries, |size| packer.insert(size, options));

                let mut heuristic = format!("{:?} {:?}", choice, split);
                if merge {
                    heuristic.push_str(" merged");
                }

                results.push(Comparison {
                    algorithm: Algorithm::Guillotine,
                    heuristic,
                    placed,
                    occupancy: packer.occupancy(),
                });
            }
        }
    }

    for &use_waste_map in &[false, true] {
        for &heuristic in &SkylineHeuristic::ALL {
            let mut packer = SkylinePacker::new(width, height, use_waste_map);
            let placed = insert_all(entries, |size| packer.insert(size, heuristic));

            results.push(Comparison {
                algorithm: Algorithm::Skyline,
                heuristic: with_waste_map(format!("{:?}", heuristic), use_waste_map),
                placed,
                occupancy: packer.occupancy(),
            });
        }
    }

    for &heuristic in &MaxRectsHeuristic::ALL {
        let mut packer = MaxRectsPacker::new(width, height);
        let placed = insert_all(entries, |size| packer.insert(size, heuristic));

        results.push(Comparison {
            algorithm: Algorithm::MaxRects,
            heuristic: format!("{:?}", heuristic),
            placed,
            occupancy: packer.occupancy(),
        });
    }

    results
}

/// Inserts every entry, carrying on past the ones that do not fit. Returns
/// how many were placed.
fn insert_all<F>(entries: &[Entry], mut insert: F) -> usize
where
    F: FnMut((u32, u32)) -> Option<Rect>,
{
    entries
        .iter()
        .filter(|entry| insert(entry.size).is_some())
        .count()
}

fn with_waste_map(mut heuristic: String, use_waste_map: bool) -> String {
    if use_waste_map {
        heuristic.push_str(" + waste map");
    }

    heuristic
}
