// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! A pixel canvas with lazily allocated, reference counted memory.
//!
//! A [`Canvas`] describes a fixed surface of pixels, each stored as described by an
//! [`image_tag::Tag`]. Its memory is split into *portions*, the regions that are allocated and
//! reference counted as a unit. Two strategies are available:
//!
//! 1. [`Storage::Flat`] keeps the whole surface in one allocation.
//! 2. [`Storage::Tiled`] splits it into 64x64 tiles that only get memory when touched.
//!
//! Consumers such as compositing or painting routines walk the canvas portion by portion: take a
//! reference, read or write the bytes, and release the reference again.
//!
//! # Usage
//!
//! ```
//! use image_tag::{Alpha, Format, Precision, Tag};
//! use tile_canvas::{Canvas, Storage};
//!
//! let tag = Tag::new(Precision::U8, Format::Gray, Alpha::No);
//! let mut canvas = Canvas::new(tag, 100, 100, Storage::Tiled)?;
//!
//! // Visit every portion once, filling it with a constant.
//! let mut y = 0;
//! while y < canvas.height() {
//!     let mut x = 0;
//!     while x < canvas.width() {
//!         let portion = canvas.portion(x, y).expect("inside the canvas");
//!         canvas.portion_ref_rw(x, y)?;
//!         let data = canvas.portion_data_mut(x, y).expect("referenced");
//!         for row in 0..portion.height as usize {
//!             let start = row * portion.rowstride;
//!             data[start..start + portion.width as usize].fill(0x80);
//!         }
//!         canvas.portion_unref(x, y)?;
//!         x += portion.width;
//!     }
//!     y += canvas.portion_height(0, y);
//! }
//!
//! assert_eq!(canvas.tiles().map(|tiles| tiles.alloced_count()), Some(4));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
// Be std for doctests, avoids a weird warning about missing allocator.
#![cfg_attr(not(doctest), no_std)]
// The only module allowed to be `unsafe` is `align`. It asserts that the aligned storage element
// is plain old data.
#![deny(unsafe_code)]
extern crate alloc;

mod align;
mod block;
mod buf;
mod canvas;
mod error;
mod flat;
mod info;
mod portion;
mod stats;
mod store;
mod tiled;

#[cfg(test)]
mod tests;

pub use self::canvas::Canvas;
pub use self::error::{BadAutoAlloc, CanvasError, PortionError};
pub use self::flat::FlatBuf;
pub use self::info::Info;
pub use self::portion::{AutoAlloc, Portion, RefRc, Storage};
pub use self::stats::{RefCounts, RefStats};
pub use self::tiled::{TileBuf, TILE_HEIGHT, TILE_WIDTH};
