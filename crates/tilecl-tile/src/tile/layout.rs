use tilecl_common::Element;
use tilecl_runtime::memory::ScratchMemory;

use super::{base_cols, SharedSubtile, Swizzle, BASE_ROWS};

/// A swizzled 2D array in scratch memory: a root [tile](super::SharedTile) or a
/// [subtile](SharedSubtile) view into one.
///
/// Addresses are computed from the root tile geometry: elements are grouped in column blocks of
/// `swizzle_bytes / size` columns, each block storing the root's rows one after the other, and
/// the resulting byte address is permuted by the root's [swizzle](Swizzle).
pub trait SharedLayout {
    /// Element stored in the tile.
    type Elem: Element;
    /// Logical rows.
    const ROWS: usize;
    /// Logical columns.
    const COLS: usize;

    /// Memory the tile lives in.
    fn memory(&self) -> &ScratchMemory;
    /// Base address of the root tile.
    fn base(&self) -> u32;
    /// Swizzle of the root tile.
    fn swizzle(&self) -> Swizzle;
    /// Swizzle period of the root tile, in bytes.
    fn swizzle_bytes(&self) -> usize;
    /// Rows of the root tile.
    fn underlying_rows(&self) -> usize;
    /// Position of the first element within the root tile.
    fn offset(&self) -> (usize, usize);

    /// Unswizzled byte offset of `(row, col)` from the root base.
    fn linear_offset(&self, row: usize, col: usize) -> u32 {
        let (row_offset, col_offset) = self.offset();
        let (row, col) = (row + row_offset, col + col_offset);

        let size = Self::Elem::SIZE;
        let subtile_cols = self.swizzle_bytes() / size;
        let outer = col / subtile_cols;
        let offset = outer * self.underlying_rows() * subtile_cols
            + row * subtile_cols
            + col % subtile_cols;

        (offset * size) as u32
    }

    /// Swizzled byte address of `(row, col)`.
    fn address(&self, row: usize, col: usize) -> u32 {
        debug_assert!(
            row < Self::ROWS && col < Self::COLS,
            "({row}, {col}) out of a {}x{} tile",
            Self::ROWS,
            Self::COLS
        );
        self.swizzle().apply(self.base() + self.linear_offset(row, col))
    }

    /// Read the element at `(row, col)`.
    fn get(&self, row: usize, col: usize) -> Self::Elem {
        self.memory().load(self.address(row, col))
    }

    /// Write the element at `(row, col)`.
    fn set(&self, row: usize, col: usize, value: Self::Elem) {
        self.memory().store(self.address(row, col), value)
    }

    /// Non-owning `R x C` window at subtile index `(i, j)`, in units of the subtile shape.
    fn subtile<const R: usize, const C: usize>(
        &self,
        index: (usize, usize),
    ) -> SharedSubtile<'_, Self::Elem, R, C> {
        self.subtile_at::<R, C>(index.0 * R, index.1 * C)
    }

    /// Non-owning `R x C` window starting at element `(row, col)`.
    ///
    /// Offsets are multiples of the base tile shape and the window stays within the tile.
    fn subtile_at<const R: usize, const C: usize>(
        &self,
        row: usize,
        col: usize,
    ) -> SharedSubtile<'_, Self::Elem, R, C> {
        const {
            assert!(
                R <= Self::ROWS && C <= Self::COLS,
                "Subtile larger than its parent"
            )
        };
        debug_assert!(
            row + R <= Self::ROWS && col + C <= Self::COLS,
            "Subtile at ({row}, {col}) out of its parent"
        );
        debug_assert!(
            row % BASE_ROWS == 0 && col % base_cols(Self::Elem::SIZE) == 0,
            "Subtile at ({row}, {col}) not aligned to the base tile"
        );

        let (row_offset, col_offset) = self.offset();
        SharedSubtile::new(
            self.memory(),
            self.base(),
            self.swizzle(),
            self.swizzle_bytes(),
            self.underlying_rows(),
            (row_offset + row, col_offset + col),
        )
    }

    /// Set every element to `value`.
    fn fill(&self, value: Self::Elem) {
        for row in 0..Self::ROWS {
            for col in 0..Self::COLS {
                self.set(row, col, value);
            }
        }
    }

    /// Write a row-major slice of `ROWS * COLS` elements.
    fn copy_from_row_major(&self, values: &[Self::Elem]) {
        assert_eq!(values.len(), Self::ROWS * Self::COLS);
        for (index, value) in values.iter().enumerate() {
            self.set(index / Self::COLS, index % Self::COLS, *value);
        }
    }

    /// Read the tile as a row-major vector.
    fn to_row_major(&self) -> Vec<Self::Elem> {
        (0..Self::ROWS * Self::COLS)
            .map(|index| self.get(index / Self::COLS, index % Self::COLS))
            .collect()
    }
}
