use std::{fmt, path::PathBuf, str::FromStr};

use binpack::Algorithm;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(about = "Packs rectangles into bins from the command line")]
pub struct Options {
    #[structopt(subcommand)]
    pub command: Subcommand,
}

#[derive(Debug, StructOpt)]
pub enum Subcommand {
    /// Pack the rectangles listed in a manifest and write out the resulting
    /// layout as JSON.
    Pack(PackOptions),

    /// Run every algorithm and heuristic against a manifest at a fixed bin
    /// size and report how well each of them did.
    Compare(CompareOptions),
}

#[derive(Debug, StructOpt)]
pub struct PackOptions {
    /// The path to the TOML manifest listing the rectangles to pack.
    pub manifest: PathBuf,

    /// Where to write the JSON layout. Defaults to stdout.
    #[structopt(long)]
    pub output: Option<PathBuf>,

    /// If given, also render the layout to a PNG image at this path.
    #[structopt(long)]
    pub preview: Option<PathBuf>,

    /// Which algorithm to pack with.
    ///
    /// Options:
    ///
    /// - meta: try every algorithm, growing the bin until one fits everything
    ///
    /// - shelf, guillotine, skyline, maxrects: pack into a single bin of the
    ///   size given by --size
    #[structopt(long, default_value = "meta")]
    pub algorithm: AlgorithmChoice,

    /// The bin size, written as WIDTHxHEIGHT. Required for single algorithms.
    /// With the meta algorithm, this is the size the search starts from.
    #[structopt(long)]
    pub size: Option<BinSize>,
}

#[derive(Debug, StructOpt)]
pub struct CompareOptions {
    /// The path to the TOML manifest listing the rectangles to pack.
    pub manifest: PathBuf,

    /// The bin size, written as WIDTHxHEIGHT.
    #[structopt(long)]
    pub size: BinSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmChoice {
    Meta,
    Single(Algorithm),
}

impl FromStr for AlgorithmChoice {
    type Err = String;

    fn from_str(value: &str) -> Result<AlgorithmChoice, Self::Err> {
        if value == "meta" {
            return Ok(AlgorithmChoice::Meta);
        }

        Algorithm::ALL
            .iter()
            .find(|algorithm| algorithm.name() == value)
            .map(|&algorithm| AlgorithmChoice::Single(algorithm))
            .ok_or_else(|| {
                String::from(
                    "Invalid algorithm. Valid options are 'meta', 'shelf', 'guillotine', 'skyline' and 'maxrects'.",
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinSize {
    pub width: u32,
    pub height: u32,
}

impl BinSize {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl fmt::Display for BinSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for BinSize {
    type Err = String;

    fn from_str(value: &str) -> Result<BinSize, Self::Err> {
        let invalid = || format!("Invalid size '{}'. Sizes look like '256x128'.", value);

        let mut parts = value.splitn(2, |c| c == 'x' || c == 'X');
        let width = parts.next().ok_or_else(invalid)?;
        let height = parts.next().ok_or_else(invalid)?;

        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;

        if width == 0 || height == 0 {
            return Err(format!("Invalid size '{}'. Sizes must not be zero.", value));
        }

        Ok(BinSize { width, height })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_sizes() {
        assert_eq!(
            "256x128".parse(),
            Ok(BinSize {
                width: 256,
                height: 128
            })
        );
        assert_eq!(
            "64X64".parse(),
            Ok(BinSize {
                width: 64,
                height: 64
            })
        );

        assert!("256".parse::<BinSize>().is_err());
        assert!("0x16".parse::<BinSize>().is_err());
        assert!("ax16".parse::<BinSize>().is_err());
        assert!("16x16x16".parse::<BinSize>().is_err());
    }

    #[test]
    fn parse_algorithms() {
        assert_eq!("meta".parse(), Ok(AlgorithmChoice::Meta));
        assert_eq!(
            "maxrects".parse(),
            Ok(AlgorithmChoice::Single(Algorithm::MaxRects))
        );
        assert!("tetris".parse::<AlgorithmChoice>().is_err());
    }
}
