// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! # Tag
//!
//! A small, immutable descriptor of how a single pixel is stored.
//!
//! A [`Tag`] bundles the *precision* of each channel, the channel *format*, and whether an
//! *alpha* channel is present. Everything a storage layer needs to know, the number of bytes per
//! pixel, is derived from those three values.
//!
//! ## Usage
//!
//! ```
//! use image_tag::{Alpha, Format, Precision, Tag};
//!
//! let tag = Tag::new(Precision::U8, Format::Rgb, Alpha::Yes);
//! assert_eq!(tag.num_channels(), 4);
//! assert_eq!(tag.bytes(), 4);
//!
//! // Tags are values, modifying one returns a copy.
//! let deep = tag.with_precision(Precision::U16);
//! assert_eq!(deep.bytes(), 8);
//! assert_eq!(tag.bytes(), 4);
//! ```
// Be std for doctests, avoids a weird warning about missing allocator.
#![cfg_attr(not(doctest), no_std)]
#![forbid(unsafe_code)]

mod tag;

pub use self::tag::{Alpha, DrawableType, Format, Precision, Tag};
