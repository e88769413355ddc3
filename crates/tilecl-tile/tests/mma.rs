mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use common::*;
use pretty_assertions::assert_eq;
use tilecl_common::{
    float::{bf16, e4m3, e5m2, f16},
    ElemType, Element,
};
use tilecl_runtime::{
    config::{mma::MmaLogLevel, GlobalConfig},
    memory::{ScratchAllocator, ScratchMemory},
    mma::{
        MmaBackend, MmaFence, MmaInstruction, MmaOperands, MmaOrigin, MmaShape, MmaState,
        SimulatedTensorCore,
    },
    Architecture, DeviceProperties, Feature, Plane,
};
use tilecl_tile::{
    load, mma_rs, mma_ss, MmaAB, MmaAccumulator, MmaAtB, MmaOp, RegisterFragment, SharedLayout,
    SharedTile, Sign, ValidSign,
};

/// Dense `op(A) @ op(B)`, operands given row-major as stored.
fn reference(
    (m, n, k): (usize, usize, usize),
    (a, transpose_a): (&[f32], bool),
    (b, transpose_b): (&[f32], bool),
) -> Vec<f32> {
    let op_a = |row: usize, depth: usize| match transpose_a {
        false => a[row * k + depth],
        true => a[depth * m + row],
    };
    let op_b = |depth: usize, col: usize| match transpose_b {
        false => b[depth * n + col],
        true => b[col * k + depth],
    };

    (0..m * n)
        .map(|index| {
            let (row, col) = (index / n, index % n);
            (0..k).map(|depth| op_a(row, depth) * op_b(depth, col)).sum()
        })
        .collect()
}

#[test_log::test]
fn f16_product_matches_the_dense_reference() {
    let mut rng = rng();

    for props in devices() {
        let plane = plane(&props);
        let fence = MmaFence::new();
        let memory = ScratchMemory::new(SCRATCH);
        let mut allocator = ScratchAllocator::new(&memory);

        let a = SharedTile::<f16, 64, 16>::new(&mut allocator, &props).unwrap();
        let b = SharedTile::<f16, 16, 80>::new(&mut allocator, &props).unwrap();
        let a_values = random_ints::<f16>(&mut rng, 64 * 16);
        let b_values = random_ints::<f16>(&mut rng, 16 * 80);
        a.copy_from_row_major(&a_values);
        b.copy_from_row_major(&b_values);

        let expected = reference(
            (64, 80, 16),
            (&to_f32(&a_values), false),
            (&to_f32(&b_values), false),
        );

        // Stale content is discarded without accumulation.
        let mut d = RegisterFragment::<f32, 64, 80>::filled(7.0);
        mma_ss(&plane, &fence, &mut d, &a, &b, MmaAB::default(), false).wait();
        assert_eq!(d.to_row_major(), expected);

        let mut a_fragment = RegisterFragment::<f16, 64, 16>::new();
        load(&plane, &mut a_fragment, &a);

        let mut d = RegisterFragment::<f32, 64, 80>::filled(-1.0);
        mma_rs(&plane, &fence, &mut d, &a_fragment, &b, MmaAB::default(), false).wait();
        assert_eq!(d.to_row_major(), expected);
    }
}

fn check_ss<
    D,
    Op,
    const AR: usize,
    const AC: usize,
    const BR: usize,
    const BC: usize,
    const M: usize,
    const N: usize,
    const TA: bool,
    const TB: bool,
    const SB: i32,
>(
    props: &DeviceProperties,
    accumulate: bool,
) where
    D: MmaAccumulator<Op>,
    Op: Element,
    Sign<SB>: ValidSign,
{
    let mut rng = rng();
    let plane = plane(props);
    let fence = MmaFence::new();
    let memory = ScratchMemory::new(SCRATCH);
    let mut allocator = ScratchAllocator::new(&memory);

    let a = SharedTile::<Op, AR, AC>::new(&mut allocator, props).unwrap();
    let b = SharedTile::<Op, BR, BC>::new(&mut allocator, props).unwrap();
    let a_values = random_ints::<Op>(&mut rng, AR * AC);
    let b_values = random_ints::<Op>(&mut rng, BR * BC);
    a.copy_from_row_major(&a_values);
    b.copy_from_row_major(&b_values);

    let initial = random_ints::<D>(&mut rng, M * N);
    let mut d = RegisterFragment::<D, M, N>::from_row_major(&initial);
    mma_ss(&plane, &fence, &mut d, &a, &b, MmaOp::<TA, TB, SB>, accumulate).wait();

    let k = if TA { AR } else { AC };
    let sign = if SB < 0 { -1.0 } else { 1.0 };
    let product = reference((M, N, k), (&to_f32(&a_values), TA), (&to_f32(&b_values), TB));
    let expected: Vec<f32> = product
        .iter()
        .zip(to_f32(&initial))
        .map(|(product, initial)| match accumulate {
            true => initial + sign * product,
            false => sign * product,
        })
        .collect();

    assert_eq!(
        to_f32(&d.to_row_major()),
        expected,
        "{} <- {} on {:?}",
        D::TYPE,
        Op::TYPE,
        props.arch
    );
}

#[test_log::test]
fn transposes_follow_the_flags() {
    for props in devices() {
        // A^T @ B^T, A stored K x M and B stored N x K.
        check_ss::<f32, bf16, 16, 64, 80, 16, 64, 80, true, true, 1>(&props, true);
        // A @ B^T.
        check_ss::<f32, f16, 64, 32, 48, 32, 64, 48, false, true, 1>(&props, false);
        // A^T @ B.
        check_ss::<f32, f16, 32, 32, 32, 16, 32, 16, true, false, 1>(&props, true);
    }
}

#[test_log::test]
fn negated_operand_b() {
    for props in devices() {
        check_ss::<f32, f16, 64, 32, 48, 32, 64, 48, false, true, -1>(&props, true);
        check_ss::<f32, bf16, 32, 16, 16, 32, 32, 32, false, false, -1>(&props, false);
    }
}

#[test_log::test]
fn fp8_operands() {
    for props in devices() {
        check_ss::<f32, e4m3, 16, 32, 32, 32, 16, 32, false, false, 1>(&props, true);
        check_ss::<f32, e5m2, 32, 64, 32, 64, 32, 32, false, true, 1>(&props, false);
        check_ss::<f16, e4m3, 64, 32, 32, 64, 64, 64, false, false, -1>(&props, true);
        check_ss::<f16, e5m2, 16, 64, 64, 32, 16, 32, false, false, 1>(&props, false);
    }
}

#[test_log::test]
fn half_accumulator() {
    for props in devices() {
        check_ss::<f16, f16, 64, 16, 16, 32, 64, 32, false, false, 1>(&props, true);
        check_ss::<f16, f16, 32, 16, 32, 16, 16, 16, true, false, -1>(&props, false);
    }
}

#[test_log::test]
fn subtile_operands() {
    let mut rng = rng();
    let props = DeviceProperties::new(Architecture::Hopper);
    let plane = plane(&props);
    let fence = MmaFence::new();
    let memory = ScratchMemory::new(SCRATCH);
    let mut allocator = ScratchAllocator::new(&memory);

    let a_parent = SharedTile::<f16, 128, 32>::new(&mut allocator, &props).unwrap();
    let b_parent = SharedTile::<f16, 32, 64>::new(&mut allocator, &props).unwrap();
    let a_values = random_ints::<f16>(&mut rng, 128 * 32);
    let b_values = random_ints::<f16>(&mut rng, 32 * 64);
    a_parent.copy_from_row_major(&a_values);
    b_parent.copy_from_row_major(&b_values);

    // Rows 64..128 of A and columns 32..48 of B.
    let a = a_parent.subtile::<64, 32>((1, 0));
    let b = b_parent.subtile::<32, 16>((0, 2));
    let a_dense: Vec<f32> = (0..64 * 32)
        .map(|i| a_values[(64 + i / 32) * 32 + i % 32].to_f32())
        .collect();
    let b_dense: Vec<f32> = (0..32 * 16)
        .map(|i| b_values[(i / 16) * 64 + 32 + i % 16].to_f32())
        .collect();
    let expected = reference((64, 16, 32), (&a_dense, false), (&b_dense, false));

    let mut d = RegisterFragment::<f32, 64, 16>::new();
    mma_ss(&plane, &fence, &mut d, &a, &b, MmaAB::default(), false).wait();
    assert_eq!(d.to_row_major(), expected);

    let mut a_fragment = RegisterFragment::<f16, 64, 32>::new();
    load(&plane, &mut a_fragment, &a);
    let mut d = RegisterFragment::<f32, 64, 16>::new();
    mma_rs(&plane, &fence, &mut d, &a_fragment, &b, MmaAB::default(), false).wait();
    assert_eq!(d.to_row_major(), expected);
}

#[test_log::test]
fn transposed_register_operand() {
    let mut rng = rng();

    for props in devices() {
        let plane = plane(&props);
        let fence = MmaFence::new();
        let memory = ScratchMemory::new(SCRATCH);
        let mut allocator = ScratchAllocator::new(&memory);

        let a = SharedTile::<bf16, 16, 64>::new(&mut allocator, &props).unwrap();
        let b = SharedTile::<bf16, 16, 32>::new(&mut allocator, &props).unwrap();
        let a_values = random_ints::<bf16>(&mut rng, 16 * 64);
        let b_values = random_ints::<bf16>(&mut rng, 16 * 32);
        a.copy_from_row_major(&a_values);
        b.copy_from_row_major(&b_values);

        let mut a_fragment = RegisterFragment::<bf16, 16, 64>::new();
        load(&plane, &mut a_fragment, &a);

        let mut d = RegisterFragment::<f32, 64, 32>::new();
        mma_rs(&plane, &fence, &mut d, &a_fragment, &b, MmaAtB::default(), false).wait();

        let expected = reference(
            (64, 32, 16),
            (&to_f32(&a_values), true),
            (&to_f32(&b_values), false),
        );
        assert_eq!(d.to_row_major(), expected);
    }
}

#[test_log::test]
fn group_goes_through_every_state() {
    let mut rng = rng();

    for arch in [Architecture::Ampere, Architecture::Hopper] {
        let props = DeviceProperties::new(arch);
        let plane = plane(&props);
        let fence = MmaFence::new();
        let memory = ScratchMemory::new(SCRATCH);
        let mut allocator = ScratchAllocator::new(&memory);

        let a = SharedTile::<f16, 64, 16>::new(&mut allocator, &props).unwrap();
        let b = SharedTile::<f16, 16, 80>::new(&mut allocator, &props).unwrap();
        a.copy_from_row_major(&random_ints::<f16>(&mut rng, 64 * 16));
        b.copy_from_row_major(&random_ints::<f16>(&mut rng, 16 * 80));
        let expected = reference(
            (64, 80, 16),
            (&to_f32(&a.to_row_major()), false),
            (&to_f32(&b.to_row_major()), false),
        );

        let mut d = RegisterFragment::<f32, 64, 80>::new();
        let group = mma_ss(&plane, &fence, &mut d, &a, &b, MmaAB::default(), false);
        assert_eq!(group.state(), MmaState::Issued);
        assert!(!group.is_complete());

        // Ampere covers the output with m16n8 instructions, Hopper with a single m64n80.
        let expected_tokens = match arch {
            Architecture::Ampere => 4 * 10,
            Architecture::Hopper => 1,
        };
        assert_eq!(group.tokens().len(), expected_tokens);

        let group = group.commit();
        assert_eq!(group.state(), MmaState::InFlight);
        assert_eq!(fence.pending_groups(), 1);

        group.wait();
        assert_eq!(fence.pending_groups(), 0);
        assert_eq!(d.to_row_major(), expected);
    }
}

#[test_log::test]
fn chained_operations_accumulate() {
    let mut rng = rng();
    let props = DeviceProperties::new(Architecture::Ampere);
    let plane = plane(&props);
    let fence = MmaFence::new();
    let memory = ScratchMemory::new(SCRATCH);
    let mut allocator = ScratchAllocator::new(&memory);

    let a = SharedTile::<f16, 32, 32>::new(&mut allocator, &props).unwrap();
    let b = SharedTile::<f16, 32, 16>::new(&mut allocator, &props).unwrap();
    let a_values = random_ints::<f16>(&mut rng, 32 * 32);
    let b_values = random_ints::<f16>(&mut rng, 32 * 16);
    a.copy_from_row_major(&a_values);
    b.copy_from_row_major(&b_values);

    let mut a_fragment = RegisterFragment::<f16, 32, 32>::new();
    load(&plane, &mut a_fragment, &a);

    let mut d = RegisterFragment::<f32, 32, 16>::filled(1.0);
    mma_ss(&plane, &fence, &mut d, &a, &b, MmaAB::default(), true)
        .mma_rs(&a_fragment, &b, MmaOp::<false, false, -1>)
        .mma_ss(&a, &b, MmaAB::default())
        .commit()
        .wait();

    let product = reference(
        (32, 16, 32),
        (&to_f32(&a_values), false),
        (&to_f32(&b_values), false),
    );
    let expected: Vec<f32> = product.iter().map(|product| 1.0 + product).collect();
    assert_eq!(d.to_row_major(), expected);
}

#[test_log::test]
fn dropping_the_group_lands_the_results() {
    let props = DeviceProperties::new(Architecture::Hopper);
    let plane = plane(&props);
    let fence = MmaFence::new();
    let memory = ScratchMemory::new(SCRATCH);
    let mut allocator = ScratchAllocator::new(&memory);

    let a = SharedTile::<f16, 64, 16>::new(&mut allocator, &props).unwrap();
    let b = SharedTile::<f16, 16, 16>::new(&mut allocator, &props).unwrap();
    a.fill(f16::from_f32(1.0));
    b.fill(f16::from_f32(0.5));

    let mut d = RegisterFragment::<f32, 64, 16>::new();
    drop(mma_ss(&plane, &fence, &mut d, &a, &b, MmaAB::default(), false));

    assert!(d.to_row_major().iter().all(|value| *value == 8.0));
    assert_eq!(fence.pending_groups(), 0);
}

#[test_log::test]
fn dispatches_are_logged() {
    let path = std::env::temp_dir().join(format!("tilecl-mma-{}.log", std::process::id()));

    let mut config = GlobalConfig::default();
    config.mma.logger.level = MmaLogLevel::Basic;
    config.mma.logger.file = Some(path.clone());
    config.mma.logger.append = false;

    let props = DeviceProperties::new(Architecture::Ampere);
    let plane = Plane::with_config(props.clone(), Arc::new(config));
    let fence = MmaFence::new();
    let memory = ScratchMemory::new(SCRATCH);
    let mut allocator = ScratchAllocator::new(&memory);

    let a = SharedTile::<f16, 64, 16>::new(&mut allocator, &props).unwrap();
    let b = SharedTile::<f16, 80, 16>::new(&mut allocator, &props).unwrap();
    let mut d = RegisterFragment::<f32, 64, 80>::new();
    mma_ss(&plane, &fence, &mut d, &a, &b, MmaOp::<false, true, -1>, true).wait();

    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(
        content,
        "mma_ss 64x80x16 f32 <- f16 -A@B^T acc with m16n8k16 on Ampere\n"
    );
}

/// Checks an `M x N` product of f16 operands with K = 16, returning the instructions issued.
fn issued_instructions<const M: usize, const N: usize>(plane: &Plane) -> usize {
    let mut rng = rng();
    let props = plane.properties();
    let fence = MmaFence::new();
    let memory = ScratchMemory::new(SCRATCH);
    let mut allocator = ScratchAllocator::new(&memory);

    let a = SharedTile::<f16, M, 16>::new(&mut allocator, props).unwrap();
    let b = SharedTile::<f16, 16, N>::new(&mut allocator, props).unwrap();
    let a_values = random_ints::<f16>(&mut rng, M * 16);
    let b_values = random_ints::<f16>(&mut rng, 16 * N);
    a.copy_from_row_major(&a_values);
    b.copy_from_row_major(&b_values);

    let mut d = RegisterFragment::<f32, M, N>::new();
    let group = mma_ss(plane, &fence, &mut d, &a, &b, MmaAB::default(), false);
    let issued = group.tokens().len();
    group.wait();

    let expected = reference(
        (M, N, 16),
        (&to_f32(&a_values), false),
        (&to_f32(&b_values), false),
    );
    assert_eq!(d.to_row_major(), expected);

    issued
}

#[test_log::test]
fn hopper_falls_back_to_m16_instructions() {
    let plane = plane(&DeviceProperties::new(Architecture::Hopper));

    // Heights that are not a multiple of 64 can't use warpgroup instructions.
    assert_eq!(issued_instructions::<32, 48>(&plane), 2 * 6);
    assert_eq!(issued_instructions::<16, 16>(&plane), 2);
    assert_eq!(issued_instructions::<64, 48>(&plane), 1);
}

#[test_log::test]
fn hopper_without_warpgroup_instructions() {
    let mut props = DeviceProperties::new(Architecture::Hopper);
    props.unregister_feature(Feature::WarpgroupMma);
    let plane = plane(&props);

    assert_eq!(issued_instructions::<64, 80>(&plane), 4 * 10);
}

/// Forwards to the simulated unit, restricted to its `m16n8` shapes.
#[derive(Debug)]
struct NarrowBackend {
    inner: SimulatedTensorCore,
    executed: Arc<AtomicUsize>,
}

impl MmaBackend for NarrowBackend {
    fn arch(&self) -> Architecture {
        self.inner.arch()
    }

    fn shape(&self, m: u32, n: u32, operand: ElemType) -> MmaShape {
        MmaShape::new(16, 8, self.inner.shape(m, n, operand).k)
    }

    fn execute(
        &self,
        instruction: &MmaInstruction,
        origin: MmaOrigin,
        operands: &dyn MmaOperands,
        acc: &mut [f32],
    ) {
        self.executed.fetch_add(1, Ordering::Relaxed);
        self.inner.execute(instruction, origin, operands, acc);
    }
}

#[test_log::test]
fn custom_backend_executes_the_dispatch() {
    let props = DeviceProperties::new(Architecture::Hopper);
    let executed = Arc::new(AtomicUsize::new(0));
    let backend = NarrowBackend {
        inner: SimulatedTensorCore::from_properties(&props),
        executed: executed.clone(),
    };
    let plane = plane(&props).with_backend(Box::new(backend));

    assert_eq!(plane.backend().arch(), Architecture::Hopper);
    assert_eq!(issued_instructions::<64, 80>(&plane), 4 * 10);
    assert_eq!(executed.load(Ordering::Relaxed), 4 * 10);
}
