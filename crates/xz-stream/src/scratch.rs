// SPDX-License-Identifier: ISC
use crate::{Error, Exhaustion, Result};

/// Growable staging buffer owned by a stream handle.
///
/// Grows to `max(len * 3 / 2, requested)` and never shrinks until released.
#[derive(Debug)]
pub(crate) struct ScratchBuffer {
    buf: Vec<u8>,
}

impl ScratchBuffer {
    pub(crate) fn with_len(len: usize) -> Result<Self> {
        Ok(Self { buf: allocate(len)? })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    /// Makes at least `want` bytes addressable.
    ///
    /// On allocation failure the previous allocation is kept untouched.
    pub(crate) fn ensure(&mut self, want: usize) -> Result<()> {
        if want <= self.buf.len() {
            return Ok(());
        }
        let grown = self.buf.len().saturating_mul(3) / 2;
        self.buf = allocate(grown.max(want))?;
        Ok(())
    }

    #[inline]
    pub(crate) fn region(&self, len: usize) -> &[u8] {
        &self.buf[..len]
    }

    #[inline]
    pub(crate) fn region_mut(&mut self, len: usize) -> &mut [u8] {
        &mut self.buf[..len]
    }

    pub(crate) fn release(&mut self) {
        self.buf = Vec::new();
    }
}

/// Allocates a zeroed buffer, reporting failure instead of aborting.
pub(crate) fn allocate(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| Error::ResourceExhausted(Exhaustion::Allocation))?;
    buf.resize(len, 0);
    Ok(buf)
}
