#![warn(missing_docs)]

//! TileCL tile layer: swizzled tiles and vectors in scratch memory, lane-distributed register
//! fragments, the cooperative transfers between them and asynchronous matrix-multiply-accumulate
//! dispatch.
//!
//! Shapes are part of the types and checked when compiling: tiles are made of 16-row base tiles
//! that are 16 columns wide, or 32 for 1-byte elements.
//!
//! ```compile_fail
//! use tilecl_common::float::f16;
//! use tilecl_runtime::{memory::{ScratchAllocator, ScratchMemory}, Architecture, DeviceProperties};
//! use tilecl_tile::SharedTile;
//!
//! let props = DeviceProperties::new(Architecture::Ampere);
//! let memory = ScratchMemory::new(8192);
//! let mut allocator = ScratchAllocator::new(&memory);
//! let tile = SharedTile::<f16, 16, 24>::new(&mut allocator, &props);
//! ```
//!
//! ```compile_fail
//! use tilecl_tile::RegisterFragment;
//!
//! let fragment = RegisterFragment::<f32, 8, 16>::new();
//! ```

/// Diagnostic dumps.
pub mod debug;
pub mod fragment;
pub mod mma;
pub mod tile;
pub mod transfer;

pub use debug::{print_fragment, print_tile};
pub use fragment::{Col, FragmentLayout, MatrixLayout, RegisterFragment, Row};
pub use mma::*;
pub use tile::*;
pub use transfer::{atomic_add, load, store, TransferMethod};
