//! Flat storage, the whole surface as one lazily allocated block.
use core::fmt;

use image_tag::Tag;
use log::{debug, warn};

use crate::block::Block;
use crate::error::{CanvasError, PortionError};
use crate::portion::Release;
use crate::store::PortionStore;

/// Backs a canvas with a single allocation of `width * height` pixels.
///
/// There is exactly one portion: every pixel maps into the same memory block which shares one
/// reference count.
pub struct FlatBuf {
    tag: Tag,
    width: u32,
    height: u32,
    block: Block,
}

impl FlatBuf {
    pub(crate) fn new(tag: Tag, width: u32, height: u32) -> Result<Self, CanvasError> {
        let len = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(w, h)| w.checked_mul(h))
            .and_then(|pixels| pixels.checked_mul(tag.bytes()))
            .ok_or(CanvasError::TooLarge { width, height })?;

        Ok(FlatBuf {
            tag,
            width,
            height,
            block: Block::new(len),
        })
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the memory of the surface has been allocated.
    pub fn is_valid(&self) -> bool {
        self.block.is_alloced()
    }

    /// The number of outstanding references on the surface.
    pub fn ref_count(&self) -> u32 {
        self.block.refs()
    }

    /// The byte offset of a pixel in the block.
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }

        // Bounded by the block length, checked at construction.
        Some((y as usize * self.width as usize + x as usize) * self.tag.bytes())
    }

    fn check(&self, x: u32, y: u32) -> Result<(), PortionError> {
        if self.contains(x, y) {
            Ok(())
        } else {
            Err(PortionError::OutOfBounds { x, y })
        }
    }
}

impl PortionStore for FlatBuf {
    fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    fn portion_x(&self, x: u32, y: u32) -> Option<u32> {
        self.contains(x, y).then_some(0)
    }

    fn portion_y(&self, x: u32, y: u32) -> Option<u32> {
        self.contains(x, y).then_some(0)
    }

    /// What remains of the surface to the right of `x`, not the full width.
    fn portion_width(&self, x: u32, y: u32) -> Option<u32> {
        self.contains(x, y).then(|| self.width - x)
    }

    /// What remains of the surface below `y`, not the full height.
    fn portion_height(&self, x: u32, y: u32) -> Option<u32> {
        self.contains(x, y).then(|| self.height - y)
    }

    fn portion_rowstride(&self, x: u32, y: u32) -> Option<usize> {
        self.contains(x, y)
            .then(|| self.width as usize * self.tag.bytes())
    }

    fn portion_data(&self, x: u32, y: u32) -> Option<&[u8]> {
        let offset = self.offset(x, y)?;
        self.block.bytes()?.get(offset..)
    }

    fn portion_data_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        let offset = self.offset(x, y)?;
        self.block.bytes_mut()?.get_mut(offset..)
    }

    fn portion_alloced(&self, x: u32, y: u32) -> bool {
        self.contains(x, y) && self.block.is_alloced()
    }

    fn portion_refs(&self, x: u32, y: u32) -> Option<u32> {
        self.contains(x, y).then(|| self.block.refs())
    }

    fn portion_alloc(&mut self, x: u32, y: u32) -> Result<bool, PortionError> {
        self.check(x, y)?;
        let fresh = self.block.alloc()?;
        if fresh {
            debug!("flatbuf: allocated {} bytes", self.block.byte_len());
        }
        Ok(fresh)
    }

    fn portion_unalloc(&mut self, x: u32, y: u32) -> Result<(), PortionError> {
        self.check(x, y)?;
        let was_alloced = self.block.is_alloced();
        self.block.unalloc().inspect_err(|err| {
            warn!("flatbuf: refusing to free the surface, {err}");
        })?;

        if was_alloced {
            debug!("flatbuf: freed {} bytes", self.block.byte_len());
        }
        Ok(())
    }

    fn portion_init(&mut self, x: u32, y: u32) -> Result<(), PortionError> {
        self.check(x, y)?;
        self.block.init()
    }

    fn portion_acquire(&mut self, x: u32, y: u32) -> Result<(), PortionError> {
        self.check(x, y)?;
        self.block.acquire()
    }

    fn portion_release(&mut self, x: u32, y: u32) -> Result<Release, PortionError> {
        self.check(x, y)?;
        let release = self.block.release();
        if release == Release::Unbalanced {
            warn!("flatbuf: unref of an unreferenced surface at ({x}, {y})");
        }
        Ok(release)
    }

    fn fmt_info(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "flatbuf {}x{}, {} bytes, {}, {} refs",
            self.width,
            self.height,
            self.block.byte_len(),
            if self.is_valid() { "valid" } else { "invalid" },
            self.ref_count(),
        )
    }
}

impl fmt::Debug for FlatBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FlatBuf")
            .field("tag", &self.tag)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("valid", &self.is_valid())
            .field("ref_count", &self.ref_count())
            .finish()
    }
}
