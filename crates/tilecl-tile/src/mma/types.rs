use tilecl_common::{
    float::{bf16, e4m3, e5m2, f16},
    Element,
};
use tilecl_runtime::mma::MmaFlags;

mod sealed {
    pub trait Sealed<Op> {}
}

/// Accumulator type the MMA unit supports for operands of type `Op`.
///
/// Implemented for `f32` with every operand type, and for `f16` with `f16` and both fp8
/// operands.
pub trait MmaAccumulator<Op: Element>: Element + sealed::Sealed<Op> {}

macro_rules! impl_accumulator {
    ($($acc:ty => $op:ty),* $(,)?) => {
        $(
            impl sealed::Sealed<$op> for $acc {}
            impl MmaAccumulator<$op> for $acc {}
        )*
    };
}

impl_accumulator!(
    f32 => f16,
    f32 => bf16,
    f32 => e4m3,
    f32 => e5m2,
    f16 => e4m3,
    f16 => e5m2,
    f16 => f16,
);

/// Compile-time scale of operand B.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sign<const S: i32>;

/// Implemented by the only valid scales, `1` and `-1`.
pub trait ValidSign {
    /// Operand B is negated.
    const NEGATE: bool;
}

impl ValidSign for Sign<1> {
    const NEGATE: bool = false;
}

impl ValidSign for Sign<-1> {
    const NEGATE: bool = true;
}

/// Shape of a matrix-multiply-accumulate: `D = sign * op(A) @ op(B)`, where `op` transposes
/// operand A when `TA` is set and operand B when `TB` is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct MmaOp<const TA: bool = false, const TB: bool = false, const SB: i32 = 1>;

/// `A @ B`.
pub type MmaAB = MmaOp<false, false>;
/// `A @ B^T`.
pub type MmaABt = MmaOp<false, true>;
/// `A^T @ B`.
pub type MmaAtB = MmaOp<true, false>;
/// `A^T @ B^T`.
pub type MmaAtBt = MmaOp<true, true>;

impl<const TA: bool, const TB: bool, const SB: i32> MmaOp<TA, TB, SB>
where
    Sign<SB>: ValidSign,
{
    /// Operand A is stored `K x M`.
    pub const TRANSPOSE_A: bool = TA;
    /// Operand B is stored `N x K`.
    pub const TRANSPOSE_B: bool = TB;
    /// Operand B is negated.
    pub const NEGATE_B: bool = <Sign<SB> as ValidSign>::NEGATE;

    /// Instruction flags of the operation.
    pub fn flags(&self, accumulate: bool) -> MmaFlags {
        MmaFlags {
            transpose_a: TA,
            transpose_b: TB,
            negate_b: Self::NEGATE_B,
            accumulate,
        }
    }
}
