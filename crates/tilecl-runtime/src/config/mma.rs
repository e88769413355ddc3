use super::logger::{LogLevel, LoggerConfig};

/// Configuration of the matrix-multiply-accumulate dispatcher.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MmaConfig {
    /// Logger of dispatched operations.
    #[serde(default)]
    pub logger: LoggerConfig<MmaLogLevel>,
}

/// Verbosity of the dispatcher logger.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MmaLogLevel {
    /// Nothing is logged.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// One line per dispatched operation.
    #[serde(rename = "basic")]
    Basic,

    /// One line per dispatched operation and per hardware instruction.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for MmaLogLevel {}
