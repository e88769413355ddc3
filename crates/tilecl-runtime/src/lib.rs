#![warn(missing_docs)]

//! TileCL runtime crate: the device model the tile layer runs on.
//!
//! Scratch memory, planes of lanes, matrix-multiply-accumulate units and their completion fence
//! are modelled on the host, with the architecture-specific parts (swizzle geometry, matrix
//! load/store availability, instruction shapes) exposed as replaceable parameters.

extern crate alloc;

#[macro_use]
extern crate derive_new;

/// Global configuration and logging.
pub mod config;
/// Device properties and features.
pub mod device;
/// Runtime errors.
pub mod error;
/// Matrix-multiply-accumulate backends and their completion fence.
pub mod mma;
/// Scratch memory and its allocator.
pub mod memory;

mod plane;

pub use device::{Architecture, DeviceProperties, Feature, SwizzleGeometry, PLANE_DIM};
pub use error::{ConfigError, MemoryError};
pub use plane::*;
