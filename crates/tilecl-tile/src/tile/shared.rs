use core::marker::PhantomData;
use tilecl_common::Element;
use tilecl_runtime::{
    memory::{ScratchAllocator, ScratchMemory},
    DeviceProperties, MemoryError,
};

use super::{swizzle_bytes, SharedLayout, Swizzle, SwizzleMode, BASE_ROWS};

/// `R x C` tile of `E` in scratch memory.
///
/// Both dimensions are multiples of the base tile shape, checked at compile time. The swizzle
/// period is derived from the element size and the width.
#[derive(Debug, Clone, Copy)]
pub struct SharedTile<'a, E: Element, const R: usize, const C: usize> {
    memory: &'a ScratchMemory,
    base: u32,
    swizzle: Swizzle,
    _elem: PhantomData<E>,
}

impl<'a, E: Element, const R: usize, const C: usize> SharedTile<'a, E, R, C> {
    /// Swizzle period in bytes.
    pub const SWIZZLE_BYTES: usize = {
        assert!(R > 0 && R % BASE_ROWS == 0, "Tile height must be a multiple of 16");
        swizzle_bytes(E::SIZE, C)
    };
    /// Swizzle mode.
    pub const SWIZZLE_MODE: SwizzleMode = SwizzleMode::from_bytes(Self::SWIZZLE_BYTES);
    /// Bytes occupied by the tile.
    pub const SIZE_BYTES: usize = R * C * E::SIZE;

    /// Allocate a tile aligned to the device tile alignment.
    pub fn new(
        allocator: &mut ScratchAllocator<'a>,
        props: &DeviceProperties,
    ) -> Result<Self, MemoryError> {
        let base = allocator.allocate(Self::SIZE_BYTES, props.tile_alignment)?;
        log::debug!(
            "{R}x{C} {} tile at {base:#x} with a {} swizzle",
            E::TYPE,
            Self::SWIZZLE_MODE
        );
        Self::from_raw(allocator.memory(), base, props)
    }

    /// Tile at a raw base address, which must respect the device tile alignment.
    pub fn from_raw(
        memory: &'a ScratchMemory,
        base: u32,
        props: &DeviceProperties,
    ) -> Result<Self, MemoryError> {
        if base as usize % props.tile_alignment != 0 {
            return Err(MemoryError::Misaligned {
                address: base,
                alignment: props.tile_alignment,
            });
        }
        debug_assert!(base as usize + Self::SIZE_BYTES <= memory.size());

        Ok(Self {
            memory,
            base,
            swizzle: Swizzle::from_mode(Self::SWIZZLE_MODE, props.swizzle),
            _elem: PhantomData,
        })
    }
}

impl<E: Element, const R: usize, const C: usize> SharedLayout for SharedTile<'_, E, R, C> {
    type Elem = E;
    const ROWS: usize = R;
    const COLS: usize = C;

    fn memory(&self) -> &ScratchMemory {
        self.memory
    }

    fn base(&self) -> u32 {
        self.base
    }

    fn swizzle(&self) -> Swizzle {
        self.swizzle
    }

    fn swizzle_bytes(&self) -> usize {
        Self::SWIZZLE_BYTES
    }

    fn underlying_rows(&self) -> usize {
        R
    }

    fn offset(&self) -> (usize, usize) {
        (0, 0)
    }
}
