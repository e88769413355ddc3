//! Asynchronous matrix-multiply-accumulate dispatch.
//!
//! [mma_rs] takes operand A from a register fragment and [mma_ss] from scratch memory; operand B
//! always lives in scratch memory and the destination is a row-major fragment. Both cover the
//! destination with fixed-shape instructions of the plane's [backend](tilecl_runtime::mma::MmaBackend)
//! and return an [MmaGroup] tracking them.
//!
//! ```
//! use tilecl_common::float::f16;
//! use tilecl_runtime::{memory::{ScratchAllocator, ScratchMemory}, mma::MmaFence, Architecture, DeviceProperties, Plane};
//! use tilecl_tile::{mma_ss, MmaAB, RegisterFragment, SharedLayout, SharedTile};
//!
//! let props = DeviceProperties::new(Architecture::Ampere);
//! let plane = Plane::new(props.clone());
//! let fence = MmaFence::new();
//! let memory = ScratchMemory::new(16 * 1024);
//! let mut allocator = ScratchAllocator::new(&memory);
//!
//! let a = SharedTile::<f16, 16, 16>::new(&mut allocator, &props).unwrap();
//! let b = SharedTile::<f16, 16, 32>::new(&mut allocator, &props).unwrap();
//! a.fill(f16::from_f32(1.0));
//! b.fill(f16::from_f32(2.0));
//!
//! let mut d = RegisterFragment::<f32, 16, 32>::new();
//! mma_ss(&plane, &fence, &mut d, &a, &b, MmaAB::default(), false)
//!     .commit()
//!     .wait();
//!
//! assert_eq!(d.get(15, 31), 32.0);
//! ```
//!
//! Only the supported accumulator and operand pairs compile:
//!
//! ```compile_fail
//! use tilecl_common::float::{bf16, f16};
//! use tilecl_runtime::{memory::{ScratchAllocator, ScratchMemory}, mma::MmaFence, Architecture, DeviceProperties, Plane};
//! use tilecl_tile::{mma_ss, MmaAB, RegisterFragment, SharedTile};
//!
//! let props = DeviceProperties::new(Architecture::Ampere);
//! let plane = Plane::new(props.clone());
//! let fence = MmaFence::new();
//! let memory = ScratchMemory::new(16 * 1024);
//! let mut allocator = ScratchAllocator::new(&memory);
//!
//! let a = SharedTile::<bf16, 16, 16>::new(&mut allocator, &props).unwrap();
//! let b = SharedTile::<bf16, 16, 16>::new(&mut allocator, &props).unwrap();
//! let mut d = RegisterFragment::<f16, 16, 16>::new();
//! mma_ss(&plane, &fence, &mut d, &a, &b, MmaAB::default(), false).wait();
//! ```
//!
//! operand B can only be scaled by `1` or `-1`:
//!
//! ```compile_fail
//! use tilecl_common::float::f16;
//! use tilecl_runtime::{memory::{ScratchAllocator, ScratchMemory}, mma::MmaFence, Architecture, DeviceProperties, Plane};
//! use tilecl_tile::{mma_ss, MmaOp, RegisterFragment, SharedTile};
//!
//! let props = DeviceProperties::new(Architecture::Ampere);
//! let plane = Plane::new(props.clone());
//! let fence = MmaFence::new();
//! let memory = ScratchMemory::new(16 * 1024);
//! let mut allocator = ScratchAllocator::new(&memory);
//!
//! let a = SharedTile::<f16, 16, 16>::new(&mut allocator, &props).unwrap();
//! let b = SharedTile::<f16, 16, 16>::new(&mut allocator, &props).unwrap();
//! let mut d = RegisterFragment::<f32, 16, 16>::new();
//! mma_ss(&plane, &fence, &mut d, &a, &b, MmaOp::<false, false, 2>, false).wait();
//! ```
//!
//! and the operand shapes must agree with the destination:
//!
//! ```compile_fail
//! use tilecl_common::float::f16;
//! use tilecl_runtime::{memory::{ScratchAllocator, ScratchMemory}, mma::MmaFence, Architecture, DeviceProperties, Plane};
//! use tilecl_tile::{mma_ss, MmaAB, RegisterFragment, SharedTile};
//!
//! let props = DeviceProperties::new(Architecture::Ampere);
//! let plane = Plane::new(props.clone());
//! let fence = MmaFence::new();
//! let memory = ScratchMemory::new(16 * 1024);
//! let mut allocator = ScratchAllocator::new(&memory);
//!
//! let a = SharedTile::<f16, 16, 32>::new(&mut allocator, &props).unwrap();
//! let b = SharedTile::<f16, 16, 16>::new(&mut allocator, &props).unwrap();
//! let mut d = RegisterFragment::<f32, 16, 16>::new();
//! mma_ss(&plane, &fence, &mut d, &a, &b, MmaAB::default(), false).wait();
//! ```
//!
//! The destination stays borrowed until the group completes:
//!
//! ```compile_fail
//! use tilecl_common::float::f16;
//! use tilecl_runtime::{memory::{ScratchAllocator, ScratchMemory}, mma::MmaFence, Architecture, DeviceProperties, Plane};
//! use tilecl_tile::{mma_ss, MmaAB, RegisterFragment, SharedTile};
//!
//! let props = DeviceProperties::new(Architecture::Ampere);
//! let plane = Plane::new(props.clone());
//! let fence = MmaFence::new();
//! let memory = ScratchMemory::new(16 * 1024);
//! let mut allocator = ScratchAllocator::new(&memory);
//!
//! let a = SharedTile::<f16, 16, 16>::new(&mut allocator, &props).unwrap();
//! let b = SharedTile::<f16, 16, 16>::new(&mut allocator, &props).unwrap();
//! let mut d = RegisterFragment::<f32, 16, 16>::new();
//! let group = mma_ss(&plane, &fence, &mut d, &a, &b, MmaAB::default(), false).commit();
//! let early = d.get(0, 0);
//! group.wait();
//! ```

mod dispatch;
mod group;
mod operands;
mod types;

pub use dispatch::{mma_rs, mma_ss};
pub use group::*;
pub use types::*;
