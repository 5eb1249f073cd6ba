use core::fmt;

use crate::error::PortionError;
use crate::portion::Release;

/// The operations a backing store offers to the canvas.
///
/// All coordinates are pixel coordinates of the canvas. Every query answers for the portion
/// covering that pixel and `None` when the pixel is outside the surface.
pub(crate) trait PortionStore {
    fn contains(&self, x: u32, y: u32) -> bool;

    fn portion_x(&self, x: u32, y: u32) -> Option<u32>;

    fn portion_y(&self, x: u32, y: u32) -> Option<u32>;

    fn portion_width(&self, x: u32, y: u32) -> Option<u32>;

    fn portion_height(&self, x: u32, y: u32) -> Option<u32>;

    fn portion_rowstride(&self, x: u32, y: u32) -> Option<usize>;

    /// The bytes of the portion's memory, starting at the pixel.
    fn portion_data(&self, x: u32, y: u32) -> Option<&[u8]>;

    fn portion_data_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]>;

    fn portion_alloced(&self, x: u32, y: u32) -> bool;

    fn portion_refs(&self, x: u32, y: u32) -> Option<u32>;

    /// Returns whether memory was allocated by this call.
    fn portion_alloc(&mut self, x: u32, y: u32) -> Result<bool, PortionError>;

    fn portion_unalloc(&mut self, x: u32, y: u32) -> Result<(), PortionError>;

    fn portion_init(&mut self, x: u32, y: u32) -> Result<(), PortionError>;

    /// Take a reference on memory that is already allocated.
    fn portion_acquire(&mut self, x: u32, y: u32) -> Result<(), PortionError>;

    fn portion_release(&mut self, x: u32, y: u32) -> Result<Release, PortionError>;

    /// Write a human readable dump of the storage state.
    fn fmt_info(&self, f: &mut fmt::Formatter) -> fmt::Result;
}
