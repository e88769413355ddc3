use alloc::{boxed::Box, string::String, sync::Arc};
use core::ops::Range;

use crate::{
    config::{mma::MmaLogLevel, transfer::TransferLogLevel, GlobalConfig, Logger},
    device::DeviceProperties,
    mma::{MmaBackend, SimulatedTensorCore},
};

/// A group of lanes executing in lockstep.
///
/// Collective operations take the plane and act on behalf of every lane at once. They require
/// every lane to be active, which is only checked in debug builds.
#[derive(Debug)]
pub struct Plane {
    props: DeviceProperties,
    backend: Box<dyn MmaBackend>,
    active_mask: u32,
    config: Arc<GlobalConfig>,
    logger: spin::Mutex<Logger>,
}

impl Plane {
    /// Plane of the device described by the global configuration.
    pub fn from_config() -> Self {
        let config = GlobalConfig::get();
        let props = DeviceProperties::from_config(&config.device);
        Self::with_config(props, config)
    }

    /// Plane of a device, logging according to the global configuration.
    pub fn new(props: DeviceProperties) -> Self {
        Self::with_config(props, GlobalConfig::get())
    }

    /// Plane of a device with an explicit configuration.
    pub fn with_config(props: DeviceProperties, config: Arc<GlobalConfig>) -> Self {
        let backend = Box::new(SimulatedTensorCore::from_properties(&props));
        let logger = Logger::from_config(config.clone());
        let active_mask = full_mask(props.plane_dim);

        Self {
            props,
            backend,
            active_mask,
            config,
            logger: spin::Mutex::new(logger),
        }
    }

    /// Replace the matrix-multiply-accumulate unit.
    pub fn with_backend(mut self, backend: Box<dyn MmaBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Properties of the device.
    pub fn properties(&self) -> &DeviceProperties {
        &self.props
    }

    /// The matrix-multiply-accumulate unit.
    pub fn backend(&self) -> &dyn MmaBackend {
        self.backend.as_ref()
    }

    /// Configuration the plane was created with.
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Number of lanes.
    pub fn plane_dim(&self) -> u32 {
        self.props.plane_dim
    }

    /// Identity of every lane of the plane.
    pub fn lanes(&self) -> Range<u32> {
        0..self.props.plane_dim
    }

    /// Bit `l` is set when lane `l` is active.
    pub fn active_mask(&self) -> u32 {
        self.active_mask
    }

    /// Restrict the active lanes, emulating divergent control flow.
    pub fn set_active_mask(&mut self, mask: u32) {
        self.active_mask = mask & full_mask(self.props.plane_dim);
    }

    /// Whether every lane is active.
    pub fn is_converged(&self) -> bool {
        self.active_mask == full_mask(self.props.plane_dim)
    }

    /// The lowest active lane, `None` when no lane is active.
    pub fn elect(&self) -> Option<u32> {
        match self.active_mask {
            0 => None,
            mask => Some(mask.trailing_zeros()),
        }
    }

    /// Log a transfer message, built only when transfer logging is enabled.
    pub fn log_transfer<F: FnOnce() -> String>(&self, msg: F) {
        let mut logger = self.logger.lock();
        if let TransferLogLevel::Disabled = logger.log_level_transfer() {
            return;
        }
        logger.log_transfer(&msg());
    }

    /// Log a dispatcher message of the given verbosity, built only when it would be written.
    pub fn log_mma<F: FnOnce() -> String>(&self, level: MmaLogLevel, msg: F) {
        let mut logger = self.logger.lock();
        let enabled = matches!(
            (logger.log_level_mma(), level),
            (MmaLogLevel::Full, _) | (MmaLogLevel::Basic, MmaLogLevel::Basic)
        );
        if enabled {
            logger.log_mma(&msg());
        }
    }
}

fn full_mask(plane_dim: u32) -> u32 {
    match plane_dim {
        32.. => u32::MAX,
        dim => (1 << dim) - 1,
    }
}
