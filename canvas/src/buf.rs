// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019 The `image-rs` developers
use core::mem;

use alloc::collections::TryReserveError;
use alloc::vec::Vec;

use crate::align::MaxAligned;

/// Allocates and manages zeroed, highly aligned bytes.
///
/// Contrary to a `Vec<u8>` the storage is always aligned to the maximum alignment of any texel,
/// so a byte slice of it can be reinterpreted as a slice of any plain channel type. The allocated
/// capacity is rounded up to whole aligned chunks, the logical length is remembered separately
/// and is the only length ever visible to users.
#[derive(Clone)]
pub(crate) struct Buffer {
    /// The backing memory.
    inner: Vec<MaxAligned>,
    /// The number of bytes requested.
    len: usize,
}

impl Buffer {
    /// Allocate a new zeroed buffer with a number of bytes.
    ///
    /// Reports an error instead of aborting when the allocator can not provide the memory.
    pub(crate) fn try_new(len: usize) -> Result<Self, TryReserveError> {
        let alloc_len = Self::alloc_len(len);
        let mut inner = Vec::new();
        inner.try_reserve_exact(alloc_len)?;
        inner.resize(alloc_len, MaxAligned::ZERO);

        Ok(Buffer { inner, len })
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        let bytes: &[u8] = bytemuck::cast_slice(&self.inner);
        &bytes[..self.len]
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut self.inner);
        &mut bytes[..self.len]
    }

    /// Overwrite every byte with zero.
    pub(crate) fn zero(&mut self) {
        self.inner.fill(MaxAligned::ZERO);
    }

    /// Calculates the number of elements to have a byte buffer of requested length.
    fn alloc_len(length: usize) -> usize {
        const CHUNK_SIZE: usize = mem::size_of::<MaxAligned>();
        assert!(CHUNK_SIZE > 1);

        // We allocated enough chunks for at least the length. This can never overflow.
        length / CHUNK_SIZE + usize::from(length % CHUNK_SIZE != 0)
    }
}
