use core::marker::PhantomData;
use tilecl_common::Element;
use tilecl_runtime::memory::ScratchMemory;

use super::{base_cols, SharedLayout, Swizzle, BASE_ROWS};

/// `R x C` window into a parent tile, created with [SharedLayout::subtile].
///
/// Keeps the parent geometry (base, swizzle and full height) so its addresses are exactly the
/// parent addresses at the offset coordinates. Borrows the parent for its whole lifetime.
#[derive(Debug, Clone, Copy)]
pub struct SharedSubtile<'t, E: Element, const R: usize, const C: usize> {
    memory: &'t ScratchMemory,
    base: u32,
    swizzle: Swizzle,
    swizzle_bytes: usize,
    underlying_rows: usize,
    offset: (usize, usize),
    _elem: PhantomData<E>,
}

impl<'t, E: Element, const R: usize, const C: usize> SharedSubtile<'t, E, R, C> {
    const SHAPE_CHECK: () = assert!(
        R > 0 && R % BASE_ROWS == 0 && C > 0 && C % base_cols(E::SIZE) == 0,
        "Subtile shape must be a multiple of the base tile"
    );

    pub(crate) fn new(
        memory: &'t ScratchMemory,
        base: u32,
        swizzle: Swizzle,
        swizzle_bytes: usize,
        underlying_rows: usize,
        offset: (usize, usize),
    ) -> Self {
        let () = Self::SHAPE_CHECK;

        Self {
            memory,
            base,
            swizzle,
            swizzle_bytes,
            underlying_rows,
            offset,
            _elem: PhantomData,
        }
    }
}

impl<E: Element, const R: usize, const C: usize> SharedLayout for SharedSubtile<'_, E, R, C> {
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
        self.swizzle_bytes
    }

    fn underlying_rows(&self) -> usize {
        self.underlying_rows
    }

    fn offset(&self) -> (usize, usize) {
        self.offset
    }
}
