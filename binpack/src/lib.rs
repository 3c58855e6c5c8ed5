//! Binpack is a library for packing rectangles into a fixed-size bin. It was
//! built to lay out texture atlases, but works on plain sizes and knows nothing
//! about images.
//!
//! Four independent algorithms are available, each with its own set of
//! heuristics:
//!
//! - [`GuillotinePacker`][GuillotinePacker] keeps a list of disjoint free
//!   rectangles and cuts one of them up for every placement.
//! - [`ShelfPacker`][ShelfPacker] lines rectangles up on horizontal shelves.
//! - [`MaxRectsPacker`][MaxRectsPacker] keeps a list of maximal, overlapping
//!   free rectangles.
//! - [`SkylinePacker`][SkylinePacker] only tracks the top profile of what has
//!   been placed so far.
//!
//! [`MetaPacker`][MetaPacker] drives all four, growing the bin until one of
//! them places everything. It's the easiest place to start.
//!
//! ## Example
//! ```
//! use binpack::{MetaPacker, MetaRect};
//!
//! // First, describe the rectangles you want to pack.
//! let mut rects = vec![
//!     MetaRect::new((128, 64)),
//!     MetaRect::new((64, 64)),
//!     MetaRect::new((1, 300)),
//! ];
//!
//! // Construct a packer and configure it with your constraints.
//! let mut packer = MetaPacker::new().with_max_doublings(8);
//!
//! // Compute a solution. Every rectangle now knows where it went.
//! let outcome = packer.pack(&mut rects).expect("rectangles should fit");
//!
//! for rect in &rects {
//!     let placed = rect.rect().unwrap();
//!     assert!(placed.right() <= outcome.bin_size.0);
//!     assert!(placed.bottom() <= outcome.bin_size.1);
//! }
//! ```
//!
//! [GuillotinePacker]: struct.GuillotinePacker.html
//! [ShelfPacker]: struct.ShelfPacker.html
//! [MaxRectsPacker]: struct.MaxRectsPacker.html
//! [SkylinePacker]: struct.SkylinePacker.html
//! [MetaPacker]: struct.MetaPacker.html

mod geometry;
mod guillotine;
mod id;
mod maxrects;
mod meta;
mod shelf;
mod skyline;
mod types;

#[cfg(test)]
mod test_util;

pub use geometry::Rect;
pub use guillotine::*;
pub use id::*;
pub use maxrects::*;
pub use meta::*;
pub use shelf::*;
pub use skyline::*;
pub use types::*;
