use crate::device::Architecture;

/// Device the plane is modelled after.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DeviceConfig {
    /// Architecture generation.
    #[serde(default)]
    pub arch: Architecture,

    /// Scratch memory available to one block, in bytes. Defaults to the capacity of the
    /// architecture.
    #[serde(default)]
    pub scratch_size: Option<usize>,
}
