// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
use alloc::rc::Rc;

use image_tag::{Alpha, Format, Precision, Tag};
use log::trace;

use crate::error::{CanvasError, PortionError};
use crate::flat::FlatBuf;
use crate::info::Info;
use crate::portion::{AutoAlloc, Portion, RefKind, RefRc, Release, Storage};
use crate::stats::RefStats;
use crate::store::PortionStore;
use crate::tiled::TileBuf;

/// A two-dimensional pixel surface with lazily allocated memory.
///
/// The tag, dimensions and storage strategy are fixed at construction. Memory is organized in
/// *portions*, the contiguous regions that are allocated and reference counted as a unit: the
/// whole surface for [`Storage::Flat`] and one 64x64 tile for [`Storage::Tiled`]. All operations
/// address a portion through any pixel it covers.
///
/// A reader or writer takes a reference with [`portion_ref`](Self::portion_ref) or
/// [`portion_ref_rw`](Self::portion_ref_rw) before touching the data of a portion and releases it
/// with [`portion_unref`](Self::portion_unref) afterwards. Portions can only be freed while no
/// reference is held.
///
/// The canvas is not thread-safe: reference counts are plain integers and the statistics sink is
/// shared through an `Rc`.
pub struct Canvas {
    tag: Tag,
    width: u32,
    height: u32,
    autoalloc: AutoAlloc,
    backing: Backing,
    stats: Rc<RefStats>,
}

/// The one backing store of a canvas.
pub(crate) enum Backing {
    Flat(FlatBuf),
    Tiled(TileBuf),
}

impl Backing {
    fn new(tag: Tag, width: u32, height: u32, storage: Storage) -> Result<Self, CanvasError> {
        match storage {
            Storage::Flat => FlatBuf::new(tag, width, height).map(Backing::Flat),
            Storage::Tiled => TileBuf::new(tag, width, height).map(Backing::Tiled),
            other => Err(CanvasError::UnsupportedStorage(other)),
        }
    }

    fn storage(&self) -> Storage {
        match self {
            Backing::Flat(_) => Storage::Flat,
            Backing::Tiled(_) => Storage::Tiled,
        }
    }

    pub(crate) fn store(&self) -> &dyn PortionStore {
        match self {
            Backing::Flat(flat) => flat,
            Backing::Tiled(tiled) => tiled,
        }
    }

    fn store_mut(&mut self) -> &mut dyn PortionStore {
        match self {
            Backing::Flat(flat) => flat,
            Backing::Tiled(tiled) => tiled,
        }
    }
}

impl Canvas {
    /// Create a canvas with a fresh statistics sink.
    ///
    /// No pixel memory is allocated yet, and auto-allocation is on.
    ///
    /// # Usage
    ///
    /// ```
    /// use image_tag::{Alpha, Format, Precision, Tag};
    /// use tile_canvas::{Canvas, Storage};
    ///
    /// let tag = Tag::new(Precision::U8, Format::Rgb, Alpha::Yes);
    /// let mut canvas = Canvas::new(tag, 200, 150, Storage::Tiled)?;
    ///
    /// canvas.portion_ref_rw(70, 10)?;
    /// let stride = canvas.portion_rowstride(70, 10);
    /// let pixel = canvas.portion_data_mut(70, 10).expect("referenced");
    /// pixel[..4].copy_from_slice(&[0xff, 0, 0, 0xff]);
    /// assert_eq!(stride, 64 * 4);
    /// canvas.portion_unref(70, 10)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(tag: Tag, width: u32, height: u32, storage: Storage) -> Result<Self, CanvasError> {
        Self::with_stats(tag, width, height, storage, Rc::default())
    }

    /// Create a canvas counting its reference operations into a shared sink.
    pub fn with_stats(
        tag: Tag,
        width: u32,
        height: u32,
        storage: Storage,
        stats: Rc<RefStats>,
    ) -> Result<Self, CanvasError> {
        if !tag.is_valid() {
            return Err(CanvasError::InvalidTag(tag));
        }

        if width == 0 || height == 0 {
            return Err(CanvasError::Empty { width, height });
        }

        let backing = Backing::new(tag, width, height, storage)?;

        Ok(Canvas {
            tag,
            width,
            height,
            autoalloc: AutoAlloc::default(),
            backing,
            stats,
        })
    }

    /// Reuse a previous canvas if it already has the requested shape.
    ///
    /// The previous canvas is kept, including its memory and reference counts, when tag,
    /// dimensions and storage all match. Otherwise it is dropped and a new canvas is created.
    pub fn realloc(
        previous: Option<Self>,
        tag: Tag,
        width: u32,
        height: u32,
        storage: Storage,
    ) -> Result<Self, CanvasError> {
        match previous {
            Some(canvas)
                if canvas.tag == tag
                    && canvas.width == width
                    && canvas.height == height
                    && canvas.storage() == storage =>
            {
                Ok(canvas)
            }
            Some(canvas) => Self::with_stats(tag, width, height, storage, canvas.stats),
            None => Self::new(tag, width, height, storage),
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn precision(&self) -> Precision {
        self.tag.precision()
    }

    pub fn format(&self) -> Format {
        self.tag.format()
    }

    pub fn alpha(&self) -> Alpha {
        self.tag.alpha()
    }

    pub fn storage(&self) -> Storage {
        self.backing.storage()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The number of bytes per pixel.
    pub fn bytes(&self) -> usize {
        self.tag.bytes()
    }

    pub fn autoalloc(&self) -> AutoAlloc {
        self.autoalloc
    }

    /// Change whether references allocate missing memory, returns the mode now in effect.
    pub fn set_autoalloc(&mut self, autoalloc: AutoAlloc) -> AutoAlloc {
        self.autoalloc = autoalloc;
        self.autoalloc
    }

    /// The statistics sink of this canvas.
    pub fn stats(&self) -> &Rc<RefStats> {
        &self.stats
    }

    /// The tiled backing store, if this canvas uses one.
    pub fn tiles(&self) -> Option<&TileBuf> {
        match &self.backing {
            Backing::Tiled(tiles) => Some(tiles),
            Backing::Flat(_) => None,
        }
    }

    /// The flat backing store, if this canvas uses one.
    pub fn flat(&self) -> Option<&FlatBuf> {
        match &self.backing {
            Backing::Flat(flat) => Some(flat),
            Backing::Tiled(_) => None,
        }
    }

    /// Acquire a read reference on the portion covering a pixel.
    ///
    /// When the portion has no memory yet it is allocated and initialized first, provided
    /// auto-allocation is on. Fails for pixels outside the canvas, when the allocation fails, or
    /// when the portion is unallocated while auto-allocation is off.
    pub fn portion_ref(&mut self, x: u32, y: u32) -> RefRc {
        self.acquire(x, y, RefKind::Read)
    }

    /// Acquire a reference with the intent to write.
    ///
    /// Behaves exactly like [`portion_ref`](Self::portion_ref), it is only counted separately.
    pub fn portion_ref_rw(&mut self, x: u32, y: u32) -> RefRc {
        self.acquire(x, y, RefKind::ReadWrite)
    }

    /// Release one reference on the portion covering a pixel.
    ///
    /// Releasing a portion that holds no reference is a bug of the caller. It is logged and
    /// counted, the count stays at zero and the call still succeeds.
    pub fn portion_unref(&mut self, x: u32, y: u32) -> RefRc {
        match self.backing.store_mut().portion_release(x, y) {
            Ok(Release::Released) => {
                trace!("canvas: unref ({x}, {y})");
                self.stats.count_unref();
                Ok(())
            }
            Ok(Release::Unbalanced) => {
                trace!("canvas: unref ({x}, {y}) unbalanced");
                self.stats.count_unref_failed();
                Ok(())
            }
            Err(err) => {
                trace!("canvas: unref ({x}, {y}) failed, {err}");
                self.stats.count_unref_failed();
                Err(err)
            }
        }
    }

    fn acquire(&mut self, x: u32, y: u32, kind: RefKind) -> RefRc {
        // The reference is taken last, a failure before it leaves the count untouched.
        let result = self
            .fault_in(x, y)
            .and_then(|()| self.backing.store_mut().portion_acquire(x, y));

        match result {
            Ok(()) => {
                trace!("canvas: {kind:?} ref ({x}, {y})");
                self.stats.count_ref(kind);
                Ok(())
            }
            Err(err) => {
                trace!("canvas: {kind:?} ref ({x}, {y}) failed, {err}");
                self.stats.count_failed();
                Err(err)
            }
        }
    }

    /// Allocate and initialize missing memory ahead of a reference, if auto-allocation is on.
    fn fault_in(&mut self, x: u32, y: u32) -> Result<(), PortionError> {
        if self.autoalloc.is_on() {
            self.portion_alloc(x, y)?;
        }

        Ok(())
    }

    /// The left edge of the portion covering a pixel, or 0 outside the canvas.
    pub fn portion_x(&self, x: u32, y: u32) -> u32 {
        self.backing.store().portion_x(x, y).unwrap_or(0)
    }

    /// The top edge of the portion covering a pixel, or 0 outside the canvas.
    pub fn portion_y(&self, x: u32, y: u32) -> u32 {
        self.backing.store().portion_y(x, y).unwrap_or(0)
    }

    /// The usable width of the portion covering a pixel, or 0 outside the canvas.
    ///
    /// For tiled storage this is the width of the tile, clipped at the canvas edge. For flat
    /// storage it is the width remaining to the right of `x`, starting at `x` itself.
    pub fn portion_width(&self, x: u32, y: u32) -> u32 {
        self.backing.store().portion_width(x, y).unwrap_or(0)
    }

    /// The usable height of the portion covering a pixel, or 0 outside the canvas.
    ///
    /// See [`portion_width`](Self::portion_width) for how the storages differ.
    pub fn portion_height(&self, x: u32, y: u32) -> u32 {
        self.backing.store().portion_height(x, y).unwrap_or(0)
    }

    /// The number of bytes between two rows of the portion's memory, or 0 outside the canvas.
    pub fn portion_rowstride(&self, x: u32, y: u32) -> usize {
        self.backing.store().portion_rowstride(x, y).unwrap_or(0)
    }

    /// The portion's bytes, starting at the given pixel.
    ///
    /// Returns `None` when the portion is not allocated or the pixel outside the canvas. Rows of
    /// the portion are [`portion_rowstride`](Self::portion_rowstride) bytes apart.
    pub fn portion_data(&self, x: u32, y: u32) -> Option<&[u8]> {
        self.backing.store().portion_data(x, y)
    }

    pub fn portion_data_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        self.backing.store_mut().portion_data_mut(x, y)
    }

    /// The portion's channel values, starting at the given pixel.
    ///
    /// Returns `None` additionally when `T` does not evenly divide the bytes of the portion, for
    /// example a `u16` view of an 8-bit rgb canvas.
    pub fn portion_texels<T: bytemuck::Pod>(&self, x: u32, y: u32) -> Option<&[T]> {
        bytemuck::try_cast_slice(self.portion_data(x, y)?).ok()
    }

    pub fn portion_texels_mut<T: bytemuck::Pod>(&mut self, x: u32, y: u32) -> Option<&mut [T]> {
        bytemuck::try_cast_slice_mut(self.portion_data_mut(x, y)?).ok()
    }

    pub fn portion_alloced(&self, x: u32, y: u32) -> bool {
        self.backing.store().portion_alloced(x, y)
    }

    /// The number of references held on the portion covering a pixel.
    pub fn portion_refs(&self, x: u32, y: u32) -> Option<u32> {
        self.backing.store().portion_refs(x, y)
    }

    /// All geometry of the portion covering a pixel.
    pub fn portion(&self, x: u32, y: u32) -> Option<Portion> {
        let store = self.backing.store();
        Some(Portion {
            x: store.portion_x(x, y)?,
            y: store.portion_y(x, y)?,
            width: store.portion_width(x, y)?,
            height: store.portion_height(x, y)?,
            rowstride: store.portion_rowstride(x, y)?,
            alloced: store.portion_alloced(x, y),
        })
    }

    /// Allocate the portion covering a pixel, regardless of auto-allocation.
    ///
    /// Newly allocated memory is initialized with [`portion_init`](Self::portion_init). A portion
    /// that already has memory is left as it is.
    pub fn portion_alloc(&mut self, x: u32, y: u32) -> Result<(), PortionError> {
        if self.backing.store_mut().portion_alloc(x, y)? {
            self.portion_init(x, y)?;
        }

        Ok(())
    }

    /// Free the memory of the portion covering a pixel.
    ///
    /// Refused with [`PortionError::Referenced`] while any reference is held, the memory then
    /// stays intact. Freeing a portion without memory succeeds.
    pub fn portion_unalloc(&mut self, x: u32, y: u32) -> Result<(), PortionError> {
        let result = self.backing.store_mut().portion_unalloc(x, y);
        if let Err(PortionError::Referenced { .. }) = result {
            self.stats.count_unalloc_refused();
        }

        result
    }

    /// Fill the portion covering a pixel with zeros.
    pub fn portion_init(&mut self, x: u32, y: u32) -> Result<(), PortionError> {
        self.backing.store_mut().portion_init(x, y)
    }

    /// A human readable dump of the canvas and its storage.
    pub fn info(&self) -> Info<'_> {
        Info::new(self)
    }

    /// Write [`info`](Self::info) to the debug log.
    pub fn log_info(&self) {
        log::debug!("{}", self.info());
    }

    pub(crate) fn backing(&self) -> &Backing {
        &self.backing
    }
}

impl core::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Canvas")
            .field("tag", &self.tag)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("storage", &self.storage())
            .field("autoalloc", &self.autoalloc)
            .finish()
    }
}
