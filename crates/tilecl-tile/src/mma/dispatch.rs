use tilecl_common::Element;
use tilecl_runtime::{
    mma::{MmaFence, MmaFlags, OperandSource},
    Plane,
};

use super::{operands::DenseOperands, MmaAccumulator, MmaGroup, MmaOp, Sign, ValidSign};
use crate::{
    fragment::{RegisterFragment, Row},
    tile::SharedLayout,
};

/// Bytes of operand consumed along the reduction by one instruction.
const K_BYTES: usize = 32;

/// `D = (accumulate ? D : 0) + sign * op(A) @ op(B)` with A held in registers and B in scratch
/// memory.
///
/// Returns immediately with the [group](MmaGroup) of issued instructions, which holds `dst`
/// until the results land. Collective over a converged plane.
#[allow(clippy::too_many_arguments)]
pub fn mma_rs<
    'a,
    D,
    Op,
    B,
    const M: usize,
    const N: usize,
    const AR: usize,
    const AC: usize,
    const TA: bool,
    const TB: bool,
    const SB: i32,
>(
    plane: &'a Plane,
    fence: &'a MmaFence,
    dst: &'a mut RegisterFragment<D, M, N, Row>,
    a: &RegisterFragment<Op, AR, AC, Row>,
    b: &B,
    op: MmaOp<TA, TB, SB>,
    accumulate: bool,
) -> MmaGroup<'a, D, M, N>
where
    D: MmaAccumulator<Op>,
    Op: Element,
    B: SharedLayout<Elem = Op>,
    Sign<SB>: ValidSign,
{
    debug_assert!(plane.is_converged(), "Mma requires a converged plane");

    let operands = operands_rs::<Op, B, M, N, AR, AC, TA, TB>(a, b);
    let mut group = MmaGroup::new(plane, fence, dst, accumulate);
    group.issue::<Op>("mma_rs", &operands, OperandSource::Registers, op.flags(accumulate));
    group
}

/// `D = (accumulate ? D : 0) + sign * op(A) @ op(B)` with both operands in scratch memory.
///
/// Returns immediately with the [group](MmaGroup) of issued instructions, which holds `dst`
/// until the results land. Collective over a converged plane.
#[allow(clippy::too_many_arguments)]
pub fn mma_ss<
    'a,
    D,
    Op,
    A,
    B,
    const M: usize,
    const N: usize,
    const TA: bool,
    const TB: bool,
    const SB: i32,
>(
    plane: &'a Plane,
    fence: &'a MmaFence,
    dst: &'a mut RegisterFragment<D, M, N, Row>,
    a: &A,
    b: &B,
    op: MmaOp<TA, TB, SB>,
    accumulate: bool,
) -> MmaGroup<'a, D, M, N>
where
    D: MmaAccumulator<Op>,
    Op: Element,
    A: SharedLayout<Elem = Op>,
    B: SharedLayout<Elem = Op>,
    Sign<SB>: ValidSign,
{
    debug_assert!(plane.is_converged(), "Mma requires a converged plane");

    let operands = operands_ss::<Op, A, B, M, N, TA, TB>(a, b);
    let mut group = MmaGroup::new(plane, fence, dst, accumulate);
    group.issue::<Op>("mma_ss", &operands, OperandSource::Scratch, op.flags(accumulate));
    group
}

// `(m, k)` of op(A) and `(k, n)` of op(B) from their stored shapes.
const fn check_shapes(
    (m, n): (usize, usize),
    (a_rows, a_cols, transpose_a): (usize, usize, bool),
    (b_rows, b_cols, transpose_b): (usize, usize, bool),
    elem_size: usize,
) -> usize {
    let (a_m, a_k) = match transpose_a {
        false => (a_rows, a_cols),
        true => (a_cols, a_rows),
    };
    let (b_k, b_n) = match transpose_b {
        false => (b_rows, b_cols),
        true => (b_cols, b_rows),
    };

    assert!(a_m == m, "Operand A rows differ from the destination rows");
    assert!(b_n == n, "Operand B columns differ from the destination columns");
    assert!(a_k == b_k, "Operands A and B disagree on the reduction depth");
    assert!(
        a_k % (K_BYTES / elem_size) == 0,
        "Reduction depth must be a multiple of the instruction depth"
    );

    a_k
}

pub(crate) fn operands_rs<
    Op,
    B,
    const M: usize,
    const N: usize,
    const AR: usize,
    const AC: usize,
    const TA: bool,
    const TB: bool,
>(
    a: &RegisterFragment<Op, AR, AC, Row>,
    b: &B,
) -> DenseOperands
where
    Op: Element,
    B: SharedLayout<Elem = Op>,
{
    let k = const { check_shapes((M, N), (AR, AC, TA), (B::ROWS, B::COLS, TB), Op::SIZE) };

    DenseOperands::gather(
        (M, N, k),
        (TA, TB),
        |row, col| a.get(row, col).to_f32(),
        |row, col| b.get(row, col).to_f32(),
    )
}

pub(crate) fn operands_ss<
    Op,
    A,
    B,
    const M: usize,
    const N: usize,
    const TA: bool,
    const TB: bool,
>(
    a: &A,
    b: &B,
) -> DenseOperands
where
    Op: Element,
    A: SharedLayout<Elem = Op>,
    B: SharedLayout<Elem = Op>,
{
    let k = const {
        check_shapes((M, N), (A::ROWS, A::COLS, TA), (B::ROWS, B::COLS, TB), Op::SIZE)
    };

    DenseOperands::gather(
        (M, N, k),
        (TA, TB),
        |row, col| a.get(row, col).to_f32(),
        |row, col| b.get(row, col).to_f32(),
    )
}

/// Short form of an operation, like `-A@B^T acc`.
pub(crate) fn describe(flags: &MmaFlags) -> String {
    let transpose = |set: bool| match set {
        true => "^T",
        false => "",
    };

    format!(
        "{}A{}@B{}{}",
        if flags.negate_b { "-" } else { "" },
        transpose(flags.transpose_a),
        transpose(flags.transpose_b),
        if flags.accumulate { " acc" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_account_for_transposes() {
        assert_eq!(check_shapes((64, 80), (64, 16, false), (16, 80, false), 2), 16);
        assert_eq!(check_shapes((64, 80), (32, 64, true), (80, 32, true), 2), 32);
        assert_eq!(check_shapes((16, 16), (16, 64, false), (64, 16, false), 1), 64);
    }

    #[test]
    fn describe_flags() {
        let flags = MmaFlags {
            transpose_b: true,
            negate_b: true,
            accumulate: true,
            ..Default::default()
        };
        assert_eq!(describe(&flags), "-A@B^T acc");
        assert_eq!(describe(&MmaFlags::default()), "A@B");
    }
}
