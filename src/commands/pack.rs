use std::io::{self, BufWriter, Write};

use anyhow::{bail, Context};
use fs_err as fs;

use crate::{
    layout::Layout,
    manifest::Manifest,
    options::{AlgorithmChoice, PackOptions},
    preview::Image,
};

pub fn pack(options: PackOptions) -> anyhow::Result<()> {
    let manifest = Manifest::read_from_file(&options.manifest)?;
    let entries = manifest.entries()?;

    log::info!("Packing {} rects", entries.len());

    let layout = match options.algorithm {
        AlgorithmChoice::Meta => {
            let initial_size = options.size.map(|size| size.as_tuple());
            Layout::pack_meta(&entries, initial_size)
                .with_context(|| format!("could not pack {}", options.manifest.display()))?
        }
        AlgorithmChoice::Single(algorithm) => match options.size {
            Some(size) => Layout::pack_single(algorithm, size.as_tuple(), &entries),
            None => bail!("--size is required when packing with {}", algorithm),
        },
    };

    log::info!(
        "Packed {} of {} rects into {}x{} with {} ({:.1}% occupied)",
        layout.rects.len(),
        entries.len(),
        layout.width,
        layout.height,
        layout.algorithm,
        layout.occupancy * 100.0
    );

    for name in &layout.unplaced {
        log::warn!("{} did not fit", name);
    }

    match &options.output {
        Some(path) => {
            let mut file = BufWriter::new(fs::File::create(path)?);
            layout.write_json(&mut file)?;
            file.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            layout.write_json(&mut handle)?;
            writeln!(handle)?;
        }
    }

    if let Some(path) = &options.preview {
        let file = BufWriter::new(fs::File::create(path)?);
        Image::render(&layout).encode_png(file)?;

        log::info!("Wrote preview to {}", path.display());
    }

    Ok(())
}
