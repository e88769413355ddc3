use core::fmt::{Debug, Display};
use tilecl_common::ElemType;

use crate::device::Architecture;

/// Output and reduction extents of one hardware instruction.
#[derive(new, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MmaShape {
    /// Rows of the output block.
    pub m: u32,
    /// Columns of the output block.
    pub n: u32,
    /// Reduction depth.
    pub k: u32,
}

impl Display for MmaShape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "m{}n{}k{}", self.m, self.n, self.k)
    }
}

/// Configuration bits shared by every instruction of a dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MmaFlags {
    /// Operand A is stored `K x M`.
    pub transpose_a: bool,
    /// Operand B is stored `N x K`.
    pub transpose_b: bool,
    /// Operand B is scaled by `-1`.
    pub negate_b: bool,
    /// The destination is accumulated into rather than overwritten.
    pub accumulate: bool,
}

/// Where operand A is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperandSource {
    /// A register fragment.
    Registers,
    /// A tile in scratch memory.
    Scratch,
}

/// One hardware matrix-multiply-accumulate instruction.
#[derive(new, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MmaInstruction {
    /// Block computed by the instruction.
    pub shape: MmaShape,
    /// Accumulator type.
    pub accumulator: ElemType,
    /// Operand type.
    pub operand: ElemType,
    /// Where operand A lives.
    pub source_a: OperandSource,
    /// Transpose, sign and accumulate bits.
    pub flags: MmaFlags,
}

/// Position of an instruction within the full product.
#[derive(new, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MmaOrigin {
    /// First output row.
    pub row: u32,
    /// First output column.
    pub col: u32,
    /// First reduction index.
    pub k: u32,
}

/// Operand values seen through their transposition: `a` is `M x K` and `b` is `K x N` whatever
/// their storage.
pub trait MmaOperands {
    /// Element `(row, k)` of operand A.
    fn a(&self, row: u32, k: u32) -> f32;
    /// Element `(k, col)` of operand B.
    fn b(&self, k: u32, col: u32) -> f32;
}

/// Architecture-specific matrix-multiply-accumulate unit.
///
/// Hides the instruction encoding: the dispatcher only picks a shape, issues instructions over
/// the output and awaits their completion through an [MmaFence](super::MmaFence).
pub trait MmaBackend: Debug + Send + Sync {
    /// Architecture the backend executes.
    fn arch(&self) -> Architecture;

    /// Instruction shape used to cover an `m x n` output with operands of type `operand`.
    fn shape(&self, m: u32, n: u32, operand: ElemType) -> MmaShape;

    /// Execute one instruction.
    ///
    /// `acc` is the row-major `shape.m x shape.n` block at `origin` and receives
    /// `acc + sign * A[origin.row.., origin.k..] @ B[origin.k.., origin.col..]`, in full
    /// precision.
    fn execute(
        &self,
        instruction: &MmaInstruction,
        origin: MmaOrigin,
        operands: &dyn MmaOperands,
        acc: &mut [f32],
    );
}
