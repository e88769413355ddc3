mod common;

use std::collections::HashSet;

use common::*;
use pretty_assertions::assert_eq;
use tilecl_common::{
    float::{e4m3, f16},
    Element,
};
use tilecl_runtime::{
    memory::{ScratchAllocator, ScratchMemory},
    Architecture, DeviceProperties,
};
use tilecl_tile::{SharedLayout, SharedTile, SharedVector};

fn addresses_are_a_permutation<E: Element, const R: usize, const C: usize>(
    props: &DeviceProperties,
) {
    let memory = ScratchMemory::new(SCRATCH);
    let mut allocator = ScratchAllocator::new(&memory);
    let tile = SharedTile::<E, R, C>::new(&mut allocator, props).unwrap();

    let addresses: HashSet<u32> = (0..R)
        .flat_map(|row| (0..C).map(move |col| (row, col)))
        .map(|(row, col)| tile.address(row, col))
        .collect();

    assert_eq!(addresses.len(), R * C);
    let end = tile.base() + (R * C * E::SIZE) as u32;
    assert!(addresses
        .iter()
        .all(|address| *address >= tile.base() && *address < end));
}

#[test_log::test]
fn swizzled_addresses_stay_inside_the_tile() {
    for props in devices() {
        addresses_are_a_permutation::<f32, 16, 16>(&props);
        addresses_are_a_permutation::<f32, 32, 64>(&props);
        addresses_are_a_permutation::<f16, 16, 48>(&props);
        addresses_are_a_permutation::<f16, 64, 64>(&props);
        addresses_are_a_permutation::<e4m3, 32, 128>(&props);
    }
}

#[test_log::test]
fn neighbouring_tiles_do_not_overlap() {
    let mut rng = rng();
    let props = DeviceProperties::new(Architecture::Hopper);
    let memory = ScratchMemory::new(SCRATCH);
    let mut allocator = ScratchAllocator::new(&memory);

    let first = SharedTile::<f16, 16, 32>::new(&mut allocator, &props).unwrap();
    let vector = SharedVector::<f16, 24>::new(&mut allocator, &props).unwrap();
    let second = SharedTile::<f16, 16, 32>::new(&mut allocator, &props).unwrap();

    let values = random_bits::<f16>(&mut rng, 16 * 32);
    first.copy_from_row_major(&values);
    vector.fill(f16::from_f32(-1.0));
    second.fill(f16::from_f32(5.0));

    assert_eq!(first.to_row_major(), values);
    assert!(vector.to_vec().iter().all(|value| value.to_f32() == -1.0));
    assert_eq!(second.base() as usize % props.tile_alignment, 0);
}

#[test_log::test]
fn vector_round_trip() {
    let mut rng = rng();

    for props in devices() {
        let memory = ScratchMemory::new(SCRATCH);
        let mut allocator = ScratchAllocator::new(&memory);
        let vector = SharedVector::<f16, 32>::new(&mut allocator, &props).unwrap();

        let values = random_ints::<f16>(&mut rng, 32);
        vector.copy_from_slice(&values);

        assert_eq!(vector.to_vec(), values);
        for (index, value) in values.iter().enumerate() {
            assert_eq!(vector.get(index), *value);
            assert_eq!(vector.address(index), vector.base() + 2 * index as u32);
        }
    }
}
