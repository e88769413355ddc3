use super::{mma::MmaLogLevel, transfer::TransferLogLevel, GlobalConfig};
use alloc::{string::ToString, sync::Arc, vec::Vec};
use core::fmt::Display;
use hashbrown::HashMap;

#[cfg(std_io)]
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::PathBuf,
};

/// Configuration for logging in TileCL, parameterized by a log level type.
///
/// Note that you can use multiple loggers at the same time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct LoggerConfig<L: LogLevel> {
    /// Path to the log file, if file logging is enabled.
    #[serde(default)]
    #[cfg(std_io)]
    pub file: Option<PathBuf>,

    /// Whether to append to the log file (true) or overwrite it (false). Defaults to true.
    ///
    /// ## Notes
    ///
    /// This parameter might get ignored based on other loggers config.
    #[serde(default = "append_default")]
    pub append: bool,

    /// Whether to log to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Whether to log to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Optional crate-level logging configuration (e.g., info, debug, trace).
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    /// The log level for this logger, determining verbosity.
    #[serde(default)]
    pub level: L,
}

impl<L: LogLevel> Default for LoggerConfig<L> {
    fn default() -> Self {
        Self {
            #[cfg(std_io)]
            file: None,
            append: true,
            stdout: false,
            stderr: false,
            log: None,
            level: L::default(),
        }
    }
}

/// Log levels using the `log` crate.
///
/// This enum defines verbosity levels for crate-level logging.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    /// Logs informational messages.
    #[default]
    #[serde(rename = "info")]
    Info,

    /// Logs debugging messages.
    #[serde(rename = "debug")]
    Debug,

    /// Logs trace-level messages.
    #[serde(rename = "trace")]
    Trace,
}

fn append_default() -> bool {
    true
}

/// Trait for types that can be used as log levels in `LoggerConfig`.
pub trait LogLevel:
    serde::de::DeserializeOwned + serde::Serialize + Clone + Copy + core::fmt::Debug + Default
{
}

/// Binary log level for enabling or disabling logging.
///
/// This enum provides a simple on/off toggle for logging.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryLogLevel {
    /// Logging is disabled.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// Logging is fully enabled.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for BinaryLogLevel {}

/// Central logging utility for TileCL, managing multiple log outputs.
#[derive(Debug)]
pub struct Logger {
    /// Collection of logger instances (file, stdout, stderr, or crate-level).
    loggers: Vec<LoggerKind>,

    /// Indices of loggers used for transfer logging.
    transfer_index: Vec<usize>,

    /// Indices of loggers used for matrix-multiply-accumulate logging.
    mma_index: Vec<usize>,

    /// Global configuration for logging settings.
    pub config: Arc<GlobalConfig>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Hash, PartialEq, Eq)]
enum LoggerId {
    #[cfg(std_io)]
    File(PathBuf),
    Stdout,
    Stderr,
    LogCrate(LogCrateLevel),
}

/// Builds the shared outputs of every category, one output per distinct destination.
#[derive(Default)]
struct LoggerRegistry {
    loggers: Vec<LoggerKind>,
    logger2index: HashMap<LoggerId, usize>,
}

impl LoggerRegistry {
    fn register<L: LogLevel>(&mut self, config: &LoggerConfig<L>) -> Vec<usize> {
        let mut indices = Vec::new();

        #[cfg(std_io)]
        if let Some(file) = &config.file {
            let append = config.append;
            self.push(&mut indices, LoggerId::File(file.clone()), || {
                FileLogger::new(file, append).map(LoggerKind::File)
            });
        }

        if config.stdout {
            self.push(&mut indices, LoggerId::Stdout, || Some(LoggerKind::Stdout));
        }

        if config.stderr {
            self.push(&mut indices, LoggerId::Stderr, || Some(LoggerKind::Stderr));
        }

        if let Some(level) = config.log {
            self.push(&mut indices, LoggerId::LogCrate(level), || {
                Some(LoggerKind::Log(level))
            });
        }

        indices
    }

    fn push<F: FnOnce() -> Option<LoggerKind>>(
        &mut self,
        indices: &mut Vec<usize>,
        id: LoggerId,
        create: F,
    ) {
        if let Some(index) = self.logger2index.get(&id) {
            indices.push(*index);
        } else if let Some(logger) = create() {
            let index = self.loggers.len();
            self.logger2index.insert(id, index);
            self.loggers.push(logger);
            indices.push(index);
        }
    }
}

impl Logger {
    /// Creates a new `Logger` instance based on the global configuration.
    ///
    /// Note that creating a logger is quite expensive.
    pub fn new() -> Self {
        Self::from_config(GlobalConfig::get())
    }

    /// Creates a new `Logger` for the provided configuration.
    pub fn from_config(config: Arc<GlobalConfig>) -> Self {
        let mut registry = LoggerRegistry::default();

        let transfer_index = match config.transfer.logger.level {
            TransferLogLevel::Disabled => Vec::new(),
            _ => registry.register(&config.transfer.logger),
        };

        let mma_index = match config.mma.logger.level {
            MmaLogLevel::Disabled => Vec::new(),
            _ => registry.register(&config.mma.logger),
        };

        Self {
            loggers: registry.loggers,
            transfer_index,
            mma_index,
            config,
        }
    }

    /// Logs a message for the transfer engine, directing it to all configured transfer loggers.
    pub fn log_transfer<S: Display>(&mut self, msg: &S) {
        Self::dispatch(&mut self.loggers, &self.transfer_index, msg);
    }

    /// Logs a message for the dispatcher, directing it to all configured mma loggers.
    pub fn log_mma<S: Display>(&mut self, msg: &S) {
        Self::dispatch(&mut self.loggers, &self.mma_index, msg);
    }

    /// Returns the current transfer log level from the global configuration.
    pub fn log_level_transfer(&self) -> TransferLogLevel {
        self.config.transfer.logger.level
    }

    /// Returns the current mma log level from the global configuration.
    pub fn log_level_mma(&self) -> MmaLogLevel {
        self.config.mma.logger.level
    }

    fn dispatch<S: Display>(loggers: &mut [LoggerKind], indices: &[usize], msg: &S) {
        match indices {
            [] => {}
            [index] => loggers[*index].log(msg),
            indices => {
                let msg = msg.to_string();
                for index in indices {
                    loggers[*index].log(&msg);
                }
            }
        }
    }
}

/// Represents different types of loggers.
#[derive(Debug)]
enum LoggerKind {
    /// Logs to a file.
    #[cfg(std_io)]
    File(FileLogger),

    /// Logs to standard output.
    Stdout,

    /// Logs to standard error.
    Stderr,

    /// Logs using the `log` crate with a specified level.
    Log(LogCrateLevel),
}

impl LoggerKind {
    fn log<S: Display>(&mut self, msg: &S) {
        match self {
            #[cfg(std_io)]
            LoggerKind::File(file_logger) => file_logger.log(msg),
            LoggerKind::Stdout => println!("{msg}"),
            LoggerKind::Stderr => eprintln!("{msg}"),
            LoggerKind::Log(level) => match level {
                LogCrateLevel::Info => log::info!("{msg}"),
                LogCrateLevel::Debug => log::debug!("{msg}"),
                LogCrateLevel::Trace => log::trace!("{msg}"),
            },
        }
    }
}

/// Logger that writes messages to a file.
#[derive(Debug)]
#[cfg(std_io)]
struct FileLogger {
    writer: BufWriter<File>,
}

#[cfg(std_io)]
impl FileLogger {
    // Opens the log file, `None` when it can't be created.
    fn new(path: &PathBuf, append: bool) -> Option<Self> {
        let file = OpenOptions::new()
            .write(true)
            .append(append)
            .truncate(!append)
            .create(true)
            .open(path);

        match file {
            Ok(file) => Some(Self {
                writer: BufWriter::new(file),
            }),
            Err(err) => {
                log::warn!("Unable to open log file {}: {err}", path.display());
                None
            }
        }
    }

    // Logs a message to the file, flushing the buffer to ensure immediate write.
    fn log<S: Display>(&mut self, msg: &S) {
        let result = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush());
        if let Err(err) = result {
            log::warn!("Unable to write to log file: {err}");
        }
    }
}
