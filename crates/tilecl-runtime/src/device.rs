use alloc::collections::BTreeSet;

use crate::config::device::DeviceConfig;

/// Number of lanes of a plane.
pub const PLANE_DIM: u32 = 32;

/// Accelerator generation the device is modelled after.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Architecture {
    /// Plane-wide `m16 n8` tensor cores, matrix loads only.
    #[default]
    #[serde(rename = "ampere")]
    Ampere,

    /// Warpgroup `m64 nN` tensor cores, matrix loads and stores.
    #[serde(rename = "hopper")]
    Hopper,
}

/// Optional hardware capabilities used to pick transfer and mma paths.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Feature {
    /// Grouped 8x8 matrix loads from scratch memory, with optional transposition.
    LoadMatrix,
    /// Grouped 8x8 matrix stores to scratch memory, with optional transposition.
    StoreMatrix,
    /// Warpgroup-wide asynchronous matrix-multiply-accumulate.
    WarpgroupMma,
}

/// Bank geometry of the scratch memory swizzle.
///
/// Chunks of `2^base` bytes are permuted by XOR with the index of the `2^(base + shift)` byte
/// line they belong to.
#[derive(new, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SwizzleGeometry {
    /// Log2 of the permuted chunk size in bytes.
    pub base: u32,
    /// Log2 of the number of chunks in one line.
    pub shift: u32,
}

impl Default for SwizzleGeometry {
    fn default() -> Self {
        // 16-byte chunks, 128-byte lines.
        Self::new(4, 3)
    }
}

/// Properties of what the device can do, like what [features](Feature) are supported by it
/// and how its scratch memory is laid out.
#[derive(Debug, Clone)]
pub struct DeviceProperties {
    set: BTreeSet<Feature>,
    /// Architecture generation.
    pub arch: Architecture,
    /// Lanes per plane.
    pub plane_dim: u32,
    /// Scratch memory available to one block, in bytes.
    pub scratch_size: usize,
    /// Swizzle bank geometry.
    pub swizzle: SwizzleGeometry,
    /// Allocation quantum of vectors, in bytes.
    pub vector_alignment: usize,
    /// Alignment of tile allocations, in bytes.
    pub tile_alignment: usize,
}

impl DeviceProperties {
    /// Properties of the reference device of the given architecture.
    pub fn new(arch: Architecture) -> Self {
        let (features, scratch_size, vector_alignment): (&[Feature], usize, usize) = match arch {
            Architecture::Ampere => (&[Feature::LoadMatrix], 164 * 1024, 32),
            Architecture::Hopper => (
                &[
                    Feature::LoadMatrix,
                    Feature::StoreMatrix,
                    Feature::WarpgroupMma,
                ],
                227 * 1024,
                128,
            ),
        };

        DeviceProperties {
            set: features.iter().copied().collect(),
            arch,
            plane_dim: PLANE_DIM,
            scratch_size,
            swizzle: SwizzleGeometry::default(),
            vector_alignment,
            tile_alignment: 1024,
        }
    }

    /// Properties of the configured device.
    pub fn from_config(config: &DeviceConfig) -> Self {
        let mut props = Self::new(config.arch);
        if let Some(size) = config.scratch_size {
            props.scratch_size = size;
        }
        props
    }

    /// Check if the provided [feature](Feature) is supported by the device.
    pub fn feature_enabled(&self, feature: Feature) -> bool {
        self.set.contains(&feature)
    }

    /// Register a [feature](Feature) supported by the device.
    pub fn register_feature(&mut self, feature: Feature) -> bool {
        self.set.insert(feature)
    }

    /// Remove a [feature](Feature), forcing the fallback paths that don't need it.
    pub fn unregister_feature(&mut self, feature: Feature) -> bool {
        self.set.remove(&feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hopper_supports_every_matrix_feature() {
        let props = DeviceProperties::new(Architecture::Hopper);

        assert!(props.feature_enabled(Feature::LoadMatrix));
        assert!(props.feature_enabled(Feature::StoreMatrix));
        assert!(props.feature_enabled(Feature::WarpgroupMma));
        assert_eq!(props.vector_alignment, 128);
    }

    #[test]
    fn ampere_has_no_matrix_store() {
        let mut props = DeviceProperties::new(Architecture::Ampere);

        assert!(props.feature_enabled(Feature::LoadMatrix));
        assert!(!props.feature_enabled(Feature::StoreMatrix));
        assert_eq!(props.vector_alignment, 32);

        assert!(props.unregister_feature(Feature::LoadMatrix));
        assert!(!props.feature_enabled(Feature::LoadMatrix));
    }

    #[test]
    fn config_overrides_scratch_size() {
        let config = DeviceConfig {
            arch: Architecture::Hopper,
            scratch_size: Some(4096),
        };
        let props = DeviceProperties::from_config(&config);

        assert_eq!(props.arch, Architecture::Hopper);
        assert_eq!(props.scratch_size, 4096);
    }
}
