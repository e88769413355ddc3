use tilecl_common::ElemType;

use super::{MmaBackend, MmaInstruction, MmaOperands, MmaOrigin, MmaShape};
use crate::device::{Architecture, DeviceProperties, Feature};

/// Bytes of one operand row consumed per instruction.
const K_BYTES: u32 = 32;
/// Widest warpgroup instruction.
const MAX_WARPGROUP_N: u32 = 256;

/// Host model of the tensor cores of an architecture.
///
/// Warpgroup instructions (`m64nN`) are only issued when `warpgroup` is set, otherwise every
/// output is covered with `m16n8` instructions. Products are accumulated in `f32` within an
/// instruction, which is exact for the products of every supported operand type.
#[derive(new, Clone, Copy, Debug)]
pub struct SimulatedTensorCore {
    arch: Architecture,
    warpgroup: bool,
}

impl SimulatedTensorCore {
    /// Tensor cores of a device, using warpgroup instructions when it supports them.
    pub fn from_properties(props: &DeviceProperties) -> Self {
        Self::new(props.arch, props.feature_enabled(Feature::WarpgroupMma))
    }
}

impl MmaBackend for SimulatedTensorCore {
    fn arch(&self) -> Architecture {
        self.arch
    }

    fn shape(&self, m: u32, n: u32, operand: ElemType) -> MmaShape {
        let k = K_BYTES / operand.size() as u32;

        match self.warpgroup {
            true if m % 64 == 0 => {
                let n = (1..=MAX_WARPGROUP_N / 8)
                    .rev()
                    .map(|step| step * 8)
                    .find(|width| n % width == 0)
                    .unwrap_or(8);
                MmaShape::new(64, n, k)
            }
            _ => MmaShape::new(16, 8, k),
        }
    }

    fn execute(
        &self,
        instruction: &MmaInstruction,
        origin: MmaOrigin,
        operands: &dyn MmaOperands,
        acc: &mut [f32],
    ) {
        let MmaShape { m, n, k } = instruction.shape;
        debug_assert_eq!(acc.len(), (m * n) as usize);

        let sign = match instruction.flags.negate_b {
            true => -1.0,
            false => 1.0,
        };

        for i in 0..m {
            for j in 0..n {
                let dot: f32 = (0..k)
                    .map(|kk| {
                        operands.a(origin.row + i, origin.k + kk)
                            * operands.b(origin.k + kk, origin.col + j)
                    })
                    .sum();
                acc[(i * n + j) as usize] += sign * dot;
            }
        }
    }
}
