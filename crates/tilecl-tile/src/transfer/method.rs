use core::fmt::Display;
use tilecl_runtime::{DeviceProperties, Feature};

use crate::fragment::MatrixLayout;

/// Direction of a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Scratch tile to fragment.
    Load,
    /// Fragment to scratch tile.
    Store,
    /// Fragment accumulated into the scratch tile.
    AtomicAdd,
}

/// How lanes address scratch memory for a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransferMethod {
    /// One access per element.
    Manual,
    /// One word access per packed register.
    PackedWord,
    /// One 8-byte pair per register, read with a lane parity folded into the swizzle and swapped
    /// back in registers.
    PairedSwap,
    /// Grouped 8x8 matrix access, every lane providing one row address.
    Matrix {
        /// The matrices are transposed on the fly.
        transposed: bool,
    },
}

impl TransferMethod {
    /// Method used to move tiles of `elem_size` bytes elements to or from a fragment of the given
    /// layout on a device.
    ///
    /// Atomic accumulation of 1-byte elements never reaches this point, it is rejected when
    /// compiling.
    pub fn select(
        elem_size: usize,
        layout: MatrixLayout,
        props: &DeviceProperties,
        direction: Direction,
    ) -> Self {
        let matrix = match direction {
            Direction::Load => props.feature_enabled(Feature::LoadMatrix),
            Direction::Store => props.feature_enabled(Feature::StoreMatrix),
            Direction::AtomicAdd => false,
        };

        match (elem_size, layout) {
            (1 | 2, MatrixLayout::RowMajor) if matrix => Self::Matrix { transposed: false },
            (1 | 2, MatrixLayout::RowMajor) => Self::PackedWord,
            (2, MatrixLayout::ColMajor) if matrix => Self::Matrix { transposed: true },
            (4, MatrixLayout::RowMajor) => Self::PairedSwap,
            _ => Self::Manual,
        }
    }
}

impl Display for TransferMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TransferMethod::Manual => f.write_str("manual"),
            TransferMethod::PackedWord => f.write_str("packed_word"),
            TransferMethod::PairedSwap => f.write_str("paired_swap"),
            TransferMethod::Matrix { transposed: false } => f.write_str("matrix"),
            TransferMethod::Matrix { transposed: true } => f.write_str("matrix_trans"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecl_runtime::Architecture;

    #[test]
    fn ampere_stores_without_matrix_instructions() {
        let props = DeviceProperties::new(Architecture::Ampere);
        let select = |size, layout, direction| TransferMethod::select(size, layout, &props, direction);

        assert_eq!(
            select(2, MatrixLayout::RowMajor, Direction::Load),
            TransferMethod::Matrix { transposed: false }
        );
        assert_eq!(
            select(2, MatrixLayout::ColMajor, Direction::Load),
            TransferMethod::Matrix { transposed: true }
        );
        assert_eq!(select(2, MatrixLayout::RowMajor, Direction::Store), TransferMethod::PackedWord);
        assert_eq!(select(2, MatrixLayout::ColMajor, Direction::Store), TransferMethod::Manual);
        assert_eq!(select(1, MatrixLayout::ColMajor, Direction::Load), TransferMethod::Manual);
    }

    #[test]
    fn hopper_uses_matrix_instructions_both_ways() {
        let props = DeviceProperties::new(Architecture::Hopper);
        let select = |size, layout, direction| TransferMethod::select(size, layout, &props, direction);

        assert_eq!(
            select(1, MatrixLayout::RowMajor, Direction::Store),
            TransferMethod::Matrix { transposed: false }
        );
        assert_eq!(
            select(2, MatrixLayout::ColMajor, Direction::Store),
            TransferMethod::Matrix { transposed: true }
        );
        assert_eq!(select(2, MatrixLayout::RowMajor, Direction::AtomicAdd), TransferMethod::PackedWord);
        assert_eq!(select(2, MatrixLayout::ColMajor, Direction::AtomicAdd), TransferMethod::Manual);
    }

    #[test]
    fn four_byte_elements_ignore_features() {
        for arch in [Architecture::Ampere, Architecture::Hopper] {
            let props = DeviceProperties::new(arch);
            for direction in [Direction::Load, Direction::Store, Direction::AtomicAdd] {
                assert_eq!(
                    TransferMethod::select(4, MatrixLayout::RowMajor, &props, direction),
                    TransferMethod::PairedSwap
                );
                assert_eq!(
                    TransferMethod::select(4, MatrixLayout::ColMajor, &props, direction),
                    TransferMethod::Manual
                );
            }
        }
    }
}
