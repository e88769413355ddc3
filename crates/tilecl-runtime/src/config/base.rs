use super::{
    debug::DebugConfig, device::DeviceConfig, mma::MmaConfig, transfer::TransferConfig,
};
use alloc::sync::Arc;

#[cfg(std_io)]
use crate::error::ConfigError;

/// Static mutex holding the global configuration, initialized as `None`.
static TILE_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// Represents the global configuration for TileCL, combining device, debug, transfer and
/// matrix-multiply-accumulate settings.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Device the planes are created for.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Diagnostic dump settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Configuration of the transfer engine.
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Configuration of the matrix-multiply-accumulate dispatcher.
    #[serde(default)]
    pub mma: MmaConfig,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not set.
    ///
    /// If no configuration is set, it attempts to load one from `tilecl.toml` or `TileCL.toml` in the
    /// current directory or its parents, then applies the environment overrides. If no file is
    /// found, a default configuration is used.
    ///
    /// # Notes
    ///
    /// Calling this function takes a global lock. Planes read it once when they are created and
    /// keep the returned [Arc] for their lifetime.
    pub fn get() -> Arc<Self> {
        let mut state = TILE_GLOBAL_CONFIG.lock();
        if let Some(config) = state.as_ref() {
            return config.clone();
        }

        cfg_if::cfg_if! {
            if #[cfg(std_io)] {
                let config = Self::from_current_dir().override_from_env();
            } else {
                let config = Self::default();
            }
        }

        let config = Arc::new(config);
        *state = Some(config.clone());
        config
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    ///
    /// # Warning
    /// This method must be called at the start of the program, before any calls to `get`. Attempting
    /// to set the configuration after it has been initialized will cause a panic.
    pub fn set(config: Self) {
        let mut state = TILE_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    #[cfg(std_io)]
    /// Save the current configuration to the provided file path.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    #[cfg(std_io)]
    /// Overrides configuration fields based on environment variables.
    ///
    /// - `TILECL_ARCH`: `ampere`/`sm80` or `hopper`/`sm90`.
    /// - `TILECL_DEBUG_LOG`: `stdout`, `stderr`, `1`/`true` (log to `/tmp/tilecl.log`),
    ///   `0`/`false` (disable), or a file path.
    /// - `TILECL_DEBUG_OPTION`: `debug` or `debug-full`.
    pub fn override_from_env(mut self) -> Self {
        use super::{mma::MmaLogLevel, transfer::TransferLogLevel};
        use crate::device::Architecture;

        if let Ok(val) = std::env::var("TILECL_ARCH") {
            match val.to_lowercase().as_str() {
                "ampere" | "sm80" => self.device.arch = Architecture::Ampere,
                "hopper" | "sm90" => self.device.arch = Architecture::Hopper,
                other => log::warn!("Unknown architecture `{other}` in TILECL_ARCH, ignored"),
            }
        }

        if let Ok(val) = std::env::var("TILECL_DEBUG_LOG") {
            self.transfer.logger.level = TransferLogLevel::Full;
            self.mma.logger.level = MmaLogLevel::Basic;

            match val.as_str() {
                "stdout" => {
                    self.transfer.logger.stdout = true;
                    self.mma.logger.stdout = true;
                }
                "stderr" => {
                    self.transfer.logger.stderr = true;
                    self.mma.logger.stderr = true;
                }
                "1" | "true" => {
                    let file_path = "/tmp/tilecl.log";
                    self.transfer.logger.file = Some(file_path.into());
                    self.mma.logger.file = Some(file_path.into());
                }
                "0" | "false" => {
                    self.transfer.logger.level = TransferLogLevel::Disabled;
                    self.mma.logger.level = MmaLogLevel::Disabled;
                }
                file_path => {
                    self.transfer.logger.file = Some(file_path.into());
                    self.mma.logger.file = Some(file_path.into());
                }
            }
        };

        if let Ok(val) = std::env::var("TILECL_DEBUG_OPTION") {
            match val.as_str() {
                "debug" => {
                    self.transfer.logger.level = TransferLogLevel::Full;
                    self.mma.logger.level = MmaLogLevel::Basic;
                }
                "debug-full" => {
                    self.transfer.logger.level = TransferLogLevel::Full;
                    self.mma.logger.level = MmaLogLevel::Full;
                }
                _ => {}
            }
        };

        self
    }

    // Loads configuration from `tilecl.toml` or `TileCL.toml` in the current directory or its parents.
    //
    // Traverses up the directory tree until a valid configuration file is found or the root is reached.
    // Returns a default configuration if no file is found.
    #[cfg(std_io)]
    fn from_current_dir() -> Self {
        let Ok(mut dir) = std::env::current_dir() else {
            return Self::default();
        };

        loop {
            for name in ["tilecl.toml", "TileCL.toml"] {
                match Self::from_file_path(dir.join(name)) {
                    Ok(config) => return config,
                    Err(ConfigError::Io { .. }) => {}
                    Err(err) => log::warn!("{err}"),
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }

    /// Loads configuration from a specified file path.
    #[cfg(std_io)]
    pub fn from_file_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Format {
            path: path.to_path_buf(),
            source,
        })
    }
}
