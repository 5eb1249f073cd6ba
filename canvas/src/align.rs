// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! The storage chunk of pixel memory.
//!
//! Same alignment table as `MaxAligned` in `image-texel`: the widest vector register alignment of
//! the target, 8 bytes where none is known.
#![allow(unsafe_code)]

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub(crate) const MAX_ALIGN: usize = 32;

#[cfg(any(target_arch = "arm", target_arch = "aarch64", target_arch = "wasm32"))]
pub(crate) const MAX_ALIGN: usize = 16;

#[cfg(not(any(
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "arm",
    target_arch = "aarch64",
    target_arch = "wasm32"
)))]
pub(crate) const MAX_ALIGN: usize = 8;

/// Bytes aligned for any channel type a tag can describe.
///
/// Size and alignment are both `MAX_ALIGN`, there is no padding.
#[derive(Clone, Copy)]
#[cfg_attr(any(target_arch = "x86", target_arch = "x86_64"), repr(C, align(32)))]
#[cfg_attr(
    any(target_arch = "arm", target_arch = "aarch64", target_arch = "wasm32"),
    repr(C, align(16))
)]
#[cfg_attr(
    not(any(
        target_arch = "x86",
        target_arch = "x86_64",
        target_arch = "arm",
        target_arch = "aarch64",
        target_arch = "wasm32"
    )),
    repr(C, align(8))
)]
pub(crate) struct MaxAligned([u8; MAX_ALIGN]);

impl MaxAligned {
    pub(crate) const ZERO: Self = MaxAligned([0; MAX_ALIGN]);
}

const _: () = assert!(core::mem::size_of::<MaxAligned>() == MAX_ALIGN);
const _: () = assert!(core::mem::align_of::<MaxAligned>() == MAX_ALIGN);

// SAFETY: a byte array with an alignment equal to its size has no padding and every bit pattern
// is valid.
unsafe impl bytemuck::Zeroable for MaxAligned {}
unsafe impl bytemuck::Pod for MaxAligned {}
