use super::logger::{BinaryLogLevel, LoggerConfig};

/// Configuration of the transfer engine.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TransferConfig {
    /// Logs the method picked for every load, store and atomic accumulate.
    #[serde(default)]
    pub logger: LoggerConfig<TransferLogLevel>,
}

/// Log level of the transfer engine.
pub type TransferLogLevel = BinaryLogLevel;
