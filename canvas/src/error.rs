use image_tag::Tag;

use crate::portion::Storage;

/// Error that occurs when constructing a canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    /// The storage strategy can not back a canvas.
    #[error("storage {0:?} is not supported")]
    UnsupportedStorage(Storage),
    /// The tag does not describe a storable pixel.
    #[error("tag {0} does not describe a storable pixel")]
    InvalidTag(Tag),
    /// One of the dimensions is zero.
    #[error("canvas of {width}x{height} pixels is empty")]
    Empty { width: u32, height: u32 },
    /// The storage would not fit into the address space.
    #[error("canvas of {width}x{height} pixels does not fit into memory")]
    TooLarge { width: u32, height: u32 },
}

/// Error of an operation on a single portion of a canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PortionError {
    #[error("({x}, {y}) is outside of the canvas")]
    OutOfBounds { x: u32, y: u32 },
    /// The portion has no memory and none was allowed to be allocated.
    #[error("portion is not allocated")]
    Unallocated,
    #[error("failed to allocate {bytes} bytes")]
    AllocFailed { bytes: usize },
    /// The portion can not be freed while references to it are held.
    #[error("portion is still referenced {refs} times")]
    Referenced { refs: u32 },
}

/// A number that does not name an [`AutoAlloc`](crate::AutoAlloc) mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not an auto-alloc mode")]
pub struct BadAutoAlloc(pub i32);
