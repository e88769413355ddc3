use tilecl_common::Element;
use tilecl_runtime::{
    config::mma::MmaLogLevel,
    mma::{MmaFence, MmaFlags, MmaInstruction, MmaOrigin, MmaState, MmaToken, OperandSource},
    Plane,
};

use super::{
    dispatch::{describe, operands_rs, operands_ss},
    operands::DenseOperands,
    MmaAccumulator, MmaOp, Sign, ValidSign,
};
use crate::{
    fragment::{RegisterFragment, Row},
    tile::SharedLayout,
};

/// Matrix-multiply-accumulate operations issued into one destination fragment.
///
/// The group holds the destination mutably until its results land, which happens once the
/// group is committed and its instructions are observed complete through the fence:
///
/// - *issued*: returned by [mma_rs](super::mma_rs) or [mma_ss](super::mma_ss), more operations
///   can be chained;
/// - *in flight*: after [commit](Self::commit);
/// - *complete*: after [wait](Self::wait), or when the group is dropped, which commits and waits
///   first if needed.
#[must_use = "Results only land in the destination once the group completes"]
#[derive(Debug)]
pub struct MmaGroup<'a, D: Element, const M: usize, const N: usize> {
    plane: &'a Plane,
    fence: &'a MmaFence,
    dst: &'a mut RegisterFragment<D, M, N, Row>,
    staged: RegisterFragment<D, M, N, Row>,
    tokens: Vec<MmaToken>,
    committed: bool,
    finished: bool,
}

impl<'a, D: Element, const M: usize, const N: usize> MmaGroup<'a, D, M, N> {
    pub(crate) fn new(
        plane: &'a Plane,
        fence: &'a MmaFence,
        dst: &'a mut RegisterFragment<D, M, N, Row>,
        accumulate: bool,
    ) -> Self {
        let staged = match accumulate {
            true => dst.clone(),
            false => RegisterFragment::new(),
        };

        Self {
            plane,
            fence,
            dst,
            staged,
            tokens: Vec::new(),
            committed: false,
            finished: false,
        }
    }

    /// Accumulate `sign * op(A) @ op(B)` with A held in registers.
    pub fn mma_rs<
        Op,
        B,
        const AR: usize,
        const AC: usize,
        const TA: bool,
        const TB: bool,
        const SB: i32,
    >(
        mut self,
        a: &RegisterFragment<Op, AR, AC, Row>,
        b: &B,
        op: MmaOp<TA, TB, SB>,
    ) -> Self
    where
        D: MmaAccumulator<Op>,
        Op: Element,
        B: SharedLayout<Elem = Op>,
        Sign<SB>: ValidSign,
    {
        let operands = operands_rs::<Op, B, M, N, AR, AC, TA, TB>(a, b);
        self.issue::<Op>("mma_rs", &operands, OperandSource::Registers, op.flags(true));
        self
    }

    /// Accumulate `sign * op(A) @ op(B)` with both operands in scratch memory.
    pub fn mma_ss<Op, A, B, const TA: bool, const TB: bool, const SB: i32>(
        mut self,
        a: &A,
        b: &B,
        op: MmaOp<TA, TB, SB>,
    ) -> Self
    where
        D: MmaAccumulator<Op>,
        Op: Element,
        A: SharedLayout<Elem = Op>,
        B: SharedLayout<Elem = Op>,
        Sign<SB>: ValidSign,
    {
        let operands = operands_ss::<Op, A, B, M, N, TA, TB>(a, b);
        self.issue::<Op>("mma_ss", &operands, OperandSource::Scratch, op.flags(true));
        self
    }

    /// Issue the instructions covering the destination, rounding to `D` after each of them.
    pub(crate) fn issue<Op: Element>(
        &mut self,
        name: &str,
        operands: &DenseOperands,
        source_a: OperandSource,
        flags: MmaFlags,
    ) {
        let (m, n, k) = operands.shape();
        let plane = self.plane;
        let backend = plane.backend();
        let shape = backend.shape(m as u32, n as u32, Op::TYPE);
        let instruction = MmaInstruction::new(shape, D::TYPE, Op::TYPE, source_a, flags);

        plane.log_mma(MmaLogLevel::Basic, || {
            format!(
                "{name} {m}x{n}x{k} {} <- {} {} with {shape} on {:?}",
                D::TYPE,
                Op::TYPE,
                describe(&flags),
                backend.arch()
            )
        });

        let (block_m, block_n, block_k) = (shape.m as usize, shape.n as usize, shape.k as usize);
        let mut acc = vec![0.0f32; block_m * block_n];

        for row in (0..m).step_by(block_m) {
            for col in (0..n).step_by(block_n) {
                for depth in (0..k).step_by(block_k) {
                    for (index, value) in acc.iter_mut().enumerate() {
                        *value = self
                            .staged
                            .get(row + index / block_n, col + index % block_n)
                            .to_f32();
                    }

                    let origin = MmaOrigin::new(row as u32, col as u32, depth as u32);
                    backend.execute(&instruction, origin, operands, &mut acc);

                    for (index, value) in acc.iter().enumerate() {
                        self.staged
                            .set(row + index / block_n, col + index % block_n, D::from_f32(*value));
                    }

                    self.tokens.push(self.fence.issue());
                    plane.log_mma(MmaLogLevel::Full, || {
                        format!("{shape} at ({row}, {col}, {depth})")
                    });
                }
            }
        }

        self.committed = false;
    }

    /// Commit the issued instructions, which start executing.
    pub fn commit(mut self) -> Self {
        self.commit_issued();
        self
    }

    fn commit_issued(&mut self) {
        if !self.committed {
            self.fence.commit_group();
            self.committed = true;
        }
    }

    /// Tokens of the issued instructions.
    pub fn tokens(&self) -> &[MmaToken] {
        &self.tokens
    }

    /// State of the group, the state of its last instruction.
    pub fn state(&self) -> MmaState {
        match (self.finished, self.tokens.last()) {
            (true, _) | (false, None) => MmaState::Complete,
            (false, Some(token)) => self.fence.state(*token),
        }
    }

    /// Whether the results are in the destination.
    pub fn is_complete(&self) -> bool {
        self.finished
    }

    /// Wait for every instruction of the group and land the results in the destination.
    pub fn wait(mut self) {
        self.complete();
    }

    fn complete(&mut self) {
        if self.finished {
            return;
        }

        self.commit_issued();
        self.fence.wait(0);
        core::mem::swap(self.dst, &mut self.staged);
        self.finished = true;
    }
}

impl<D: Element, const M: usize, const N: usize> Drop for MmaGroup<'_, D, M, N> {
    fn drop(&mut self) {
        self.complete();
    }
}
