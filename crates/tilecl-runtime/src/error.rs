/// Errors raised while carving tiles out of scratch memory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// The scratch memory can't hold the requested allocation.
    #[error("Out of scratch memory: requested {requested} bytes, {available} available")]
    OutOfScratchMemory {
        /// Requested size in bytes, including alignment padding.
        requested: usize,
        /// Bytes left in the scratch memory.
        available: usize,
    },

    /// A raw base address doesn't respect the required alignment.
    #[error("Address {address:#x} is not aligned to {alignment} bytes")]
    Misaligned {
        /// The rejected address.
        address: u32,
        /// The required alignment.
        alignment: usize,
    },
}

/// Errors raised while loading or saving the global configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file can't be read or written.
    #[cfg(std_io)]
    #[error("Unable to access the configuration file {}: {source}", .path.display())]
    Io {
        /// Path of the configuration file.
        path: std::path::PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file isn't valid TOML or doesn't match the configuration layout.
    #[cfg(std_io)]
    #[error("The file {} doesn't have the right format: {source}", .path.display())]
    Format {
        /// Path of the configuration file.
        path: std::path::PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },

    /// The configuration can't be serialized.
    #[error("Unable to serialize the configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}
