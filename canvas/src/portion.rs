//! The vocabulary of the reference protocol.
use crate::error::{BadAutoAlloc, PortionError};

/// Result of acquiring or releasing a reference on a portion.
pub type RefRc = Result<(), PortionError>;

/// The backing strategy of a canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Storage {
    /// One allocation for the whole surface.
    Flat,
    /// A grid of 64x64 tiles, each allocated on its own.
    Tiled,
    /// Memory shared with another process. Not supported as canvas storage.
    Shared,
}

/// Whether referencing an unallocated portion allocates it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AutoAlloc {
    Off = 0,
    #[default]
    On = 1,
}

/// The geometry of the contiguous memory region covering a pixel.
///
/// For tiled storage this is the tile containing the pixel. Its origin is not clipped but its
/// extent ends at the canvas edge. For flat storage the origin is always `(0, 0)` while the extent
/// is what remains of the canvas to the right of and below the queried pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Portion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Bytes between the starts of two consecutive rows in the portion's memory.
    pub rowstride: usize,
    pub alloced: bool,
}

/// How a reference was acquired, only relevant for statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RefKind {
    Read,
    ReadWrite,
}

/// Outcome of releasing a reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Release {
    Released,
    /// There was no reference to release, the count stayed at zero.
    Unbalanced,
}

impl TryFrom<i32> for AutoAlloc {
    type Error = BadAutoAlloc;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AutoAlloc::Off),
            1 => Ok(AutoAlloc::On),
            other => Err(BadAutoAlloc(other)),
        }
    }
}

impl AutoAlloc {
    pub fn is_on(self) -> bool {
        self == AutoAlloc::On
    }
}
