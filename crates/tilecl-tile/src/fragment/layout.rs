use tilecl_common::{WidthClass, WidthKind};

/// Orientation of a register fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatrixLayout {
    /// Packed registers hold consecutive columns of one row.
    RowMajor,
    /// Packed registers hold consecutive rows of one column.
    ColMajor,
}

mod sealed {
    pub trait Sealed {}
}

/// Type-level [matrix layout](MatrixLayout) of a fragment.
pub trait FragmentLayout: sealed::Sealed + Send + Sync + 'static {
    /// Runtime value of the layout.
    const LAYOUT: MatrixLayout;
}

/// Row-major fragment layout, the operand A and accumulator layout of the MMA unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Row;

/// Column-major fragment layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Col;

impl sealed::Sealed for Row {}
impl sealed::Sealed for Col {}

impl FragmentLayout for Row {
    const LAYOUT: MatrixLayout = MatrixLayout::RowMajor;
}

impl FragmentLayout for Col {
    const LAYOUT: MatrixLayout = MatrixLayout::ColMajor;
}

/// Registers per lane for one base tile.
pub const REGISTERS_PER_BASE_TILE: usize = 4;

/// Position within its base tile of element `k` of register `register` held by `lane`.
///
/// | width  | layout | row                           | col                            |
/// |--------|--------|-------------------------------|--------------------------------|
/// | wide   | row    | `lane / 4 + 8 (r % 2)`        | `2 (lane % 4) + 8 (r / 2) + k` |
/// | wide   | col    | `2 (lane % 4) + 8 (r / 2) + k`| `lane / 4 + 8 (r % 2)`         |
/// | narrow | row    | `lane / 4 + 8 (r % 2)`        | `4 (lane % 4) + 16 (r / 2) + k`|
/// | narrow | col    | `4 (lane % 4) + k`            | `lane / 4 + 8 r`               |
pub const fn base_position(
    width: WidthKind,
    layout: MatrixLayout,
    lane: usize,
    register: usize,
    k: usize,
) -> (usize, usize) {
    match (width, layout) {
        (WidthKind::Wide, MatrixLayout::RowMajor) => (
            lane / 4 + 8 * (register % 2),
            2 * (lane % 4) + 8 * (register / 2) + k,
        ),
        (WidthKind::Wide, MatrixLayout::ColMajor) => (
            2 * (lane % 4) + 8 * (register / 2) + k,
            lane / 4 + 8 * (register % 2),
        ),
        (WidthKind::Narrow, MatrixLayout::RowMajor) => (
            lane / 4 + 8 * (register % 2),
            4 * (lane % 4) + 16 * (register / 2) + k,
        ),
        (WidthKind::Narrow, MatrixLayout::ColMajor) => (4 * (lane % 4) + k, lane / 4 + 8 * register),
    }
}

/// Inverse of [base_position]: `(lane, register, k)` holding `(row, col)` of a base tile.
pub const fn base_location(
    width: WidthKind,
    layout: MatrixLayout,
    row: usize,
    col: usize,
) -> (usize, usize, usize) {
    match (width, layout) {
        (WidthKind::Wide, MatrixLayout::RowMajor) => (
            4 * (row % 8) + (col % 8) / 2,
            (row / 8) + 2 * (col / 8),
            col % 2,
        ),
        (WidthKind::Wide, MatrixLayout::ColMajor) => (
            4 * (col % 8) + (row % 8) / 2,
            (col / 8) + 2 * (row / 8),
            row % 2,
        ),
        (WidthKind::Narrow, MatrixLayout::RowMajor) => (
            4 * (row % 8) + (col % 16) / 4,
            (row / 8) + 2 * (col / 16),
            col % 4,
        ),
        (WidthKind::Narrow, MatrixLayout::ColMajor) => {
            (4 * (col % 8) + row / 4, col / 8, row % 4)
        }
    }
}

/// Elements per packed register of a width class.
pub(crate) const fn pack_of(width: WidthKind) -> usize {
    match width {
        WidthKind::Narrow => <tilecl_common::Narrow as WidthClass>::PACK,
        WidthKind::Wide => <tilecl_common::Wide as WidthClass>::PACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_inverts_position() {
        for width in [WidthKind::Wide, WidthKind::Narrow] {
            let pack = pack_of(width);
            for layout in [MatrixLayout::RowMajor, MatrixLayout::ColMajor] {
                let mut seen = std::collections::HashSet::new();
                for lane in 0..32 {
                    for register in 0..REGISTERS_PER_BASE_TILE {
                        for k in 0..pack {
                            let (row, col) = base_position(width, layout, lane, register, k);
                            assert!(row < 16);
                            assert!(col < 8 * pack);
                            assert!(seen.insert((row, col)));
                            assert_eq!(base_location(width, layout, row, col), (lane, register, k));
                        }
                    }
                }
                assert_eq!(seen.len(), 32 * REGISTERS_PER_BASE_TILE * pack);
            }
        }
    }
}
