use super::ScratchMemory;
use crate::error::MemoryError;

/// Bump allocator handing out aligned regions of a [scratch memory](ScratchMemory).
///
/// Regions live as long as the allocator borrows the memory, nothing is ever freed.
#[derive(Debug)]
pub struct ScratchAllocator<'a> {
    memory: &'a ScratchMemory,
    cursor: usize,
}

impl<'a> ScratchAllocator<'a> {
    /// Allocator starting at the beginning of the memory.
    pub fn new(memory: &'a ScratchMemory) -> Self {
        Self { memory, cursor: 0 }
    }

    /// The memory regions are carved from.
    pub fn memory(&self) -> &'a ScratchMemory {
        self.memory
    }

    /// Reserve `size` bytes aligned to `align`, a power of two, returning the base address.
    pub fn allocate(&mut self, size: usize, align: usize) -> Result<u32, MemoryError> {
        debug_assert!(align.is_power_of_two());

        let start = self.cursor.next_multiple_of(align);
        let end = start + size;
        if end > self.memory.size() {
            return Err(MemoryError::OutOfScratchMemory {
                requested: end - self.cursor,
                available: self.remaining(),
            });
        }

        log::trace!("Allocated {size} bytes of scratch memory at {start:#x}");
        self.cursor = end;
        Ok(start as u32)
    }

    /// Bytes handed out so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Bytes left.
    pub fn remaining(&self) -> usize {
        self.memory.size() - self.cursor
    }
}
