//! An independently allocated, reference counted block of pixel memory.
//!
//! Both storages are built from these: the flat storage holds one block for the whole surface and
//! the tiled storage one block per tile.
use crate::buf::Buffer;
use crate::error::PortionError;
use crate::portion::Release;

pub(crate) struct Block {
    /// Present iff the block is allocated.
    data: Option<Buffer>,
    /// Outstanding references. Only meaningful while allocated.
    refs: u32,
    /// The number of bytes to allocate.
    len: usize,
}

impl Block {
    pub(crate) fn new(len: usize) -> Self {
        Block {
            data: None,
            refs: 0,
            len,
        }
    }

    pub(crate) fn is_alloced(&self) -> bool {
        self.data.is_some()
    }

    pub(crate) fn refs(&self) -> u32 {
        self.refs
    }

    pub(crate) fn byte_len(&self) -> usize {
        self.len
    }

    /// Allocate zeroed memory unless there already is some.
    ///
    /// Returns whether memory was allocated by this call.
    pub(crate) fn alloc(&mut self) -> Result<bool, PortionError> {
        if self.data.is_some() {
            return Ok(false);
        }

        let buffer = Buffer::try_new(self.len)
            .map_err(|_| PortionError::AllocFailed { bytes: self.len })?;
        self.data = Some(buffer);
        Ok(true)
    }

    /// Free the memory, refused while referenced.
    pub(crate) fn unalloc(&mut self) -> Result<(), PortionError> {
        if self.refs != 0 {
            return Err(PortionError::Referenced { refs: self.refs });
        }

        self.data = None;
        Ok(())
    }

    pub(crate) fn init(&mut self) -> Result<(), PortionError> {
        match &mut self.data {
            Some(buffer) => {
                buffer.zero();
                Ok(())
            }
            None => Err(PortionError::Unallocated),
        }
    }

    /// Take a reference on the memory, which must already be allocated.
    pub(crate) fn acquire(&mut self) -> Result<(), PortionError> {
        if !self.is_alloced() {
            return Err(PortionError::Unallocated);
        }

        self.refs += 1;
        Ok(())
    }

    pub(crate) fn release(&mut self) -> Release {
        match self.refs.checked_sub(1) {
            Some(refs) => {
                self.refs = refs;
                Release::Released
            }
            None => Release::Unbalanced,
        }
    }

    pub(crate) fn bytes(&self) -> Option<&[u8]> {
        self.data.as_ref().map(Buffer::as_bytes)
    }

    pub(crate) fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        self.data.as_mut().map(Buffer::as_bytes_mut)
    }
}
