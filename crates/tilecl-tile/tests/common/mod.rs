#![allow(dead_code)]

use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tilecl_common::Element;
use tilecl_runtime::{config::GlobalConfig, Architecture, DeviceProperties, Feature, Plane};

/// Scratch memory large enough for every test.
pub const SCRATCH: usize = 64 * 1024;

/// Devices every transfer is checked on: both architectures, plus one without matrix
/// instructions to force the fallback paths.
pub fn devices() -> Vec<DeviceProperties> {
    let mut fallback = DeviceProperties::new(Architecture::Hopper);
    fallback.unregister_feature(Feature::LoadMatrix);
    fallback.unregister_feature(Feature::StoreMatrix);

    vec![
        DeviceProperties::new(Architecture::Ampere),
        DeviceProperties::new(Architecture::Hopper),
        fallback,
    ]
}

/// Plane with a default configuration, independent of the environment.
pub fn plane(props: &DeviceProperties) -> Plane {
    Plane::with_config(props.clone(), Arc::new(GlobalConfig::default()))
}

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(0x711E)
}

/// `len` elements with arbitrary bit patterns.
pub fn random_bits<E: Element>(rng: &mut StdRng, len: usize) -> Vec<E> {
    (0..len).map(|_| E::from_bits(rng.random::<u32>())).collect()
}

/// `len` small integers, exact in every element type.
pub fn random_ints<E: Element>(rng: &mut StdRng, len: usize) -> Vec<E> {
    (0..len)
        .map(|_| E::from_f32(rng.random_range(-3..=3) as f32))
        .collect()
}

pub fn to_f32<E: Element>(values: &[E]) -> Vec<f32> {
    values.iter().map(|value| value.to_f32()).collect()
}
