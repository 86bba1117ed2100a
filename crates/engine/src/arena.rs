//! Fixed-capacity tensor arena
//!
//! All tensor storage is carved out of one caller-provided buffer. The arena
//! never grows: a request that does not fit fails with
//! [`EngineError::ArenaExhausted`].

use crate::error::{EngineError, Result};

/// Alignment used for tensor buffers
pub const DEFAULT_ALIGNMENT: usize = 16;

/// A region of the arena, expressed as offsets into its buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaRegion {
    pub offset: usize,
    pub len: usize,
}

impl ArenaRegion {
    /// One past the last byte
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Bump allocator over an exclusively borrowed byte buffer
#[derive(Debug)]
pub struct MemoryArena<'a> {
    buf: &'a mut [u8],
    used: usize,
}

impl<'a> MemoryArena<'a> {
    /// Wrap a buffer. The whole buffer is available for allocation.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, used: 0 }
    }

    /// Total size in bytes
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes handed out so far, including alignment padding
    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used
    }

    /// Release every region at once
    pub fn reset(&mut self) {
        self.used = 0;
    }

    /// Reserve `len` zeroed bytes aligned to `align` (relative to the buffer start)
    pub fn allocate(&mut self, len: usize, align: usize) -> Result<ArenaRegion> {
        if align == 0 || !align.is_power_of_two() {
            return Err(EngineError::InvalidAlignment(align));
        }

        let offset = (self.used + align - 1) & !(align - 1);
        let end = offset.checked_add(len).filter(|&end| end <= self.capacity());
        let Some(end) = end else {
            return Err(EngineError::ArenaExhausted {
                requested: len,
                available: self.capacity().saturating_sub(offset),
            });
        };

        self.buf[offset..end].fill(0);
        self.used = end;
        Ok(ArenaRegion { offset, len })
    }

    /// Borrow an allocated region
    pub fn slice(&self, region: ArenaRegion) -> Result<&[u8]> {
        self.check(region)?;
        Ok(&self.buf[region.offset..region.end()])
    }

    /// Mutably borrow an allocated region
    pub fn slice_mut(&mut self, region: ArenaRegion) -> Result<&mut [u8]> {
        self.check(region)?;
        Ok(&mut self.buf[region.offset..region.end()])
    }

    fn check(&self, region: ArenaRegion) -> Result<()> {
        if region.end() > self.used {
            return Err(EngineError::AllocationFailed(format!(
                "region {}..{} outside allocated {} bytes",
                region.offset,
                region.end(),
                self.used
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_aligned() {
        let mut buf = [0xFFu8; 64];
        let mut arena = MemoryArena::new(&mut buf);

        let a = arena.allocate(3, 1).unwrap();
        assert_eq!(a, ArenaRegion { offset: 0, len: 3 });

        let b = arena.allocate(4, DEFAULT_ALIGNMENT).unwrap();
        assert_eq!(b.offset, 16);
        assert_eq!(arena.used(), 20);
        assert_eq!(arena.remaining(), 44);

        // Fresh regions are zeroed
        assert!(arena.slice(b).unwrap().iter().all(|&x| x == 0));
    }

    #[test]
    fn test_exhausted() {
        let mut buf = [0u8; 32];
        let mut arena = MemoryArena::new(&mut buf);
        arena.allocate(20, 1).unwrap();

        let err = arena.allocate(20, 1).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ArenaExhausted {
                requested: 20,
                available: 12
            }
        ));
        // A failed request leaves the arena untouched
        assert_eq!(arena.used(), 20);
    }

    #[test]
    fn test_padding_counts_against_capacity() {
        let mut buf = [0u8; 20];
        let mut arena = MemoryArena::new(&mut buf);
        arena.allocate(1, 1).unwrap();
        assert!(matches!(
            arena.allocate(8, 16),
            Err(EngineError::ArenaExhausted { available: 4, .. })
        ));
    }

    #[test]
    fn test_invalid_alignment() {
        let mut buf = [0u8; 8];
        let mut arena = MemoryArena::new(&mut buf);
        assert!(matches!(
            arena.allocate(1, 3),
            Err(EngineError::InvalidAlignment(3))
        ));
        assert!(matches!(
            arena.allocate(1, 0),
            Err(EngineError::InvalidAlignment(0))
        ));
    }

    #[test]
    fn test_reset() {
        let mut buf = [0u8; 8];
        let mut arena = MemoryArena::new(&mut buf);
        let region = arena.allocate(8, 1).unwrap();
        arena.slice_mut(region).unwrap()[0] = 42;
        arena.reset();
        assert_eq!(arena.remaining(), 8);
        assert!(arena.slice(region).is_err());

        let again = arena.allocate(8, 1).unwrap();
        assert_eq!(arena.slice(again).unwrap()[0], 0);
    }
}
