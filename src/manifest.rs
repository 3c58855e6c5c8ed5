//! The manifest lists the rectangles the command line tool should pack.
//!
//! ```toml
//! [[rects]]
//! name = "button"
//! width = 32
//! height = 16
//! count = 4
//! ```

use std::{
    collections::HashSet,
    io,
    path::{Path, PathBuf},
};

use fs_err as fs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub rects: Vec<ManifestRect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ManifestRect {
    pub name: String,
    pub width: u32,
    pub height: u32,

    /// How many copies of this rectangle to pack. Copies are named
    /// `name-0`, `name-1` and so on.
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

/// Upper bound on the number of rects a manifest expands to.
pub const MAX_RECTS: u64 = 100_000;

/// A single rectangle to pack, after counts have been expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub size: (u32, u32),
}

impl Manifest {
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)?;
        let manifest = Self::from_toml(&contents).map_err(|source| ManifestError::Toml {
            path: path.to_owned(),
            source,
        })?;

        log::debug!(
            "Read {} rect definitions from {}",
            manifest.rects.len(),
            path.display()
        );

        Ok(manifest)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Expands every definition into one entry per copy, in manifest order.
    pub fn entries(&self) -> Result<Vec<Entry>, ManifestError> {
        let count: u64 = self.rects.iter().map(|rect| u64::from(rect.count)).sum();
        if count > MAX_RECTS {
            return Err(ManifestError::TooManyRects { count });
        }

        let mut entries = Vec::with_capacity(count as usize);
        let mut seen = HashSet::new();

        for rect in &self.rects {
            if rect.width == 0 || rect.height == 0 {
                return Err(ManifestError::EmptyRect {
                    name: rect.name.clone(),
                });
            }

            for index in 0..rect.count {
                let name = if rect.count == 1 {
                    rect.name.clone()
                } else {
                    format!("{}-{}", rect.name, index)
                };

                if !seen.insert(name.clone()) {
                    return Err(ManifestError::DuplicateName { name });
                }

                entries.push(Entry {
                    name,
                    size: (rect.width, rect.height),
                });
            }
        }

        Ok(entries)
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("{source} in {}", .path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("rect {name:?} has a zero-sized side")]
    EmptyRect { name: String },

    #[error("more than one rect is named {name:?}")]
    DuplicateName { name: String },

    #[error("manifest lists {} rects, more than the limit of {}", .count, MAX_RECTS)]
    TooManyRects { count: u64 },
}
