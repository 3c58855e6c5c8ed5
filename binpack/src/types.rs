use crate::{
    geometry::{self, Rect},
    id::Id,
};

/// An input to the batch packing routines.
///
/// `InputItem` is just a 2D size and a unique identifier generated by this
/// crate. Batch inserts return their results in placement order, so consumers
/// are expected to keep the IDs around and use them to associate the packing
/// results back to the application's own objects.
#[derive(Debug, Clone, Copy)]
pub struct InputItem {
    pub(crate) id: Id,
    pub(crate) size: (u32, u32),
}

impl InputItem {
    #[inline]
    pub fn new(size: (u32, u32)) -> Self {
        Self { id: Id::new(), size }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Records that this item ended up at `rect`, which must have either the
    /// item's size or its size turned by 90 degrees.
    pub(crate) fn placed(self, rect: Rect) -> OutputItem {
        debug_assert!(rect.size() == self.size || rect.size() == geometry::flipped(self.size));

        OutputItem {
            id: self.id,
            rect,
            rotated: rect.size() != self.size,
        }
    }
}

/// An item that was placed by a batch insert.
///
/// `OutputItem` corresponds 1:1 to the `InputItem` objects that were passed in
/// and were placed. They expose the ID from the input, as well as position and
/// size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputItem {
    pub(crate) id: Id,
    pub(crate) rect: Rect,
    pub(crate) rotated: bool,
}

impl OutputItem {
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn position(&self) -> (u32, u32) {
        self.rect.position()
    }

    /// The size the item occupies in the bin. Swapped relative to the input
    /// size if the item was rotated.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.rect.size()
    }

    #[inline]
    pub fn rotated(&self) -> bool {
        self.rotated
    }
}

/// The result of a batch insert: everything that was placed, in placement
/// order, and everything that could not be placed.
pub type BatchOutput = (Vec<OutputItem>, Vec<InputItem>);
