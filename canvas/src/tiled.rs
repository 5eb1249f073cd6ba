//! Tiled storage, a grid of independently allocated 64x64 tiles.
use core::fmt;

use alloc::boxed::Box;
use alloc::vec::Vec;

use image_tag::Tag;
use log::{debug, warn};

use crate::block::Block;
use crate::error::{CanvasError, PortionError};
use crate::portion::Release;
use crate::store::PortionStore;

/// The number of pixels along the width of a tile.
pub const TILE_WIDTH: u32 = 64;
/// The number of pixels along the height of a tile.
pub const TILE_HEIGHT: u32 = 64;

/// Backs a canvas with a row-major grid of tiles.
///
/// Each tile has its own memory and reference count and is allocated only when first needed.
/// Tiles on the right and bottom edge are full 64x64 allocations even when only part of them
/// covers the surface. Their memory keeps the full 64 pixel row stride, callers must stay within
/// the clipped extent reported by [`Canvas::portion_width`] and [`Canvas::portion_height`].
///
/// [`Canvas::portion_width`]: crate::Canvas::portion_width
/// [`Canvas::portion_height`]: crate::Canvas::portion_height
pub struct TileBuf {
    tag: Tag,
    width: u32,
    height: u32,
    tiles: Box<[Block]>,
}

impl TileBuf {
    pub(crate) fn new(tag: Tag, width: u32, height: u32) -> Result<Self, CanvasError> {
        let too_large = CanvasError::TooLarge { width, height };
        let tile_len = (TILE_WIDTH as usize * TILE_HEIGHT as usize)
            .checked_mul(tag.bytes())
            .ok_or(too_large)?;

        // The whole grid, including the padding of edge tiles, must be addressable.
        let count = (width.div_ceil(TILE_WIDTH) as usize)
            .checked_mul(height.div_ceil(TILE_HEIGHT) as usize)
            .filter(|&count| count.checked_mul(tile_len).is_some())
            .ok_or(too_large)?;

        let mut tiles = Vec::new();
        tiles.try_reserve_exact(count).map_err(|_| too_large)?;
        tiles.resize_with(count, || Block::new(tile_len));

        Ok(TileBuf {
            tag,
            width,
            height,
            tiles: tiles.into_boxed_slice(),
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

    /// The number of tiles needed to cover one row of pixels.
    pub fn tiles_per_row(&self) -> u32 {
        self.width.div_ceil(TILE_WIDTH)
    }

    /// The number of tiles needed to cover one column of pixels.
    pub fn tiles_per_column(&self) -> u32 {
        self.height.div_ceil(TILE_HEIGHT)
    }

    /// The total number of tiles, allocated or not.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// The number of tiles that currently hold memory.
    pub fn alloced_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_alloced()).count()
    }

    /// The row-major index of the tile containing a pixel.
    ///
    /// Two pixels share an index exactly when they share a tile, and indices increase along
    /// rows of tiles first. Returns `None` for pixels outside the surface.
    pub fn tile_index(&self, x: u32, y: u32) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }

        let row = (y / TILE_HEIGHT) as usize;
        let column = (x / TILE_WIDTH) as usize;
        row.checked_mul(self.tiles_per_row() as usize)?
            .checked_add(column)
    }

    fn tile(&self, x: u32, y: u32) -> Option<&Block> {
        self.tiles.get(self.tile_index(x, y)?)
    }

    fn tile_mut(&mut self, x: u32, y: u32) -> Result<(usize, &mut Block), PortionError> {
        let index = self
            .tile_index(x, y)
            .ok_or(PortionError::OutOfBounds { x, y })?;
        let tile = self
            .tiles
            .get_mut(index)
            .ok_or(PortionError::OutOfBounds { x, y })?;
        Ok((index, tile))
    }

    /// The byte offset of a pixel within its tile.
    fn offset_in_tile(&self, x: u32, y: u32) -> usize {
        let xoff = (x % TILE_WIDTH) as usize;
        let yoff = (y % TILE_HEIGHT) as usize;
        self.tag.bytes() * (yoff * TILE_WIDTH as usize + xoff)
    }
}

impl PortionStore for TileBuf {
    fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    fn portion_x(&self, x: u32, y: u32) -> Option<u32> {
        self.contains(x, y).then(|| x - x % TILE_WIDTH)
    }

    fn portion_y(&self, x: u32, y: u32) -> Option<u32> {
        self.contains(x, y).then(|| y - y % TILE_HEIGHT)
    }

    fn portion_width(&self, x: u32, y: u32) -> Option<u32> {
        let start = self.portion_x(x, y)?;
        Some(TILE_WIDTH.min(self.width - start))
    }

    fn portion_height(&self, x: u32, y: u32) -> Option<u32> {
        let start = self.portion_y(x, y)?;
        Some(TILE_HEIGHT.min(self.height - start))
    }

    /// Always a full tile row, also for clipped edge tiles.
    fn portion_rowstride(&self, x: u32, y: u32) -> Option<usize> {
        self.contains(x, y)
            .then(|| TILE_WIDTH as usize * self.tag.bytes())
    }

    fn portion_data(&self, x: u32, y: u32) -> Option<&[u8]> {
        let offset = self.offset_in_tile(x, y);
        self.tile(x, y)?.bytes()?.get(offset..)
    }

    fn portion_data_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        let offset = self.offset_in_tile(x, y);
        let (_, tile) = self.tile_mut(x, y).ok()?;
        tile.bytes_mut()?.get_mut(offset..)
    }

    fn portion_alloced(&self, x: u32, y: u32) -> bool {
        self.tile(x, y).is_some_and(Block::is_alloced)
    }

    fn portion_refs(&self, x: u32, y: u32) -> Option<u32> {
        self.tile(x, y).map(Block::refs)
    }

    fn portion_alloc(&mut self, x: u32, y: u32) -> Result<bool, PortionError> {
        let (index, tile) = self.tile_mut(x, y)?;
        let fresh = tile.alloc()?;
        if fresh {
            debug!("tilebuf: allocated tile {index}");
        }
        Ok(fresh)
    }

    fn portion_unalloc(&mut self, x: u32, y: u32) -> Result<(), PortionError> {
        let (index, tile) = self.tile_mut(x, y)?;
        let was_alloced = tile.is_alloced();
        tile.unalloc().inspect_err(|err| {
            warn!("tilebuf: refusing to free tile {index}, {err}");
        })?;

        if was_alloced {
            debug!("tilebuf: freed tile {index}");
        }
        Ok(())
    }

    fn portion_init(&mut self, x: u32, y: u32) -> Result<(), PortionError> {
        let (_, tile) = self.tile_mut(x, y)?;
        tile.init()
    }

    fn portion_acquire(&mut self, x: u32, y: u32) -> Result<(), PortionError> {
        let (_, tile) = self.tile_mut(x, y)?;
        tile.acquire()
    }

    fn portion_release(&mut self, x: u32, y: u32) -> Result<Release, PortionError> {
        let (index, tile) = self.tile_mut(x, y)?;
        let release = tile.release();
        if release == Release::Unbalanced {
            warn!("tilebuf: unref of unreferenced tile {index} at ({x}, {y})");
        }
        Ok(release)
    }

    fn fmt_info(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "tilebuf {}x{}, {}x{} tiles, {} of {} alloced",
            self.width,
            self.height,
            self.tiles_per_row(),
            self.tiles_per_column(),
            self.alloced_count(),
            self.tile_count(),
        )?;

        for (index, tile) in self.tiles.iter().enumerate() {
            if tile.is_alloced() || tile.refs() != 0 {
                writeln!(
                    f,
                    "  tile {index}: alloced {}, {} refs",
                    tile.is_alloced(),
                    tile.refs()
                )?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for TileBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TileBuf")
            .field("tag", &self.tag)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tiles", &self.tile_count())
            .field("alloced", &self.alloced_count())
            .finish()
    }
}
