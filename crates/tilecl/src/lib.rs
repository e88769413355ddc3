//! TileCL: tiles in scratch memory, register fragments, cooperative transfers and asynchronous
//! matrix-multiply-accumulate dispatch.
//!
//! ```
//! use tilecl::prelude::*;
//!
//! let props = DeviceProperties::new(Architecture::Hopper);
//! let plane = Plane::new(props.clone());
//! let memory = ScratchMemory::new(props.scratch_size);
//! let mut allocator = ScratchAllocator::new(&memory);
//!
//! let tile = SharedTile::<bf16, 32, 64>::new(&mut allocator, &props).unwrap();
//! tile.copy_from_row_major(&(0..32 * 64).map(|i| bf16::from_f32(i as f32)).collect::<Vec<_>>());
//!
//! let mut fragment = RegisterFragment::<f32, 32, 64>::new();
//! load(&plane, &mut fragment, &tile);
//! assert_eq!(fragment.get(1, 2), 66.0);
//! ```

pub use tilecl_common as common;
pub use tilecl_runtime as runtime;

pub use tilecl_tile::*;

/// Everything needed to write a tile program.
pub mod prelude {
    pub use tilecl_common::{
        float::{bf16, e4m3, e5m2, f16},
        Element, ElemType, Pair,
    };
    pub use tilecl_runtime::{
        config::GlobalConfig,
        memory::{AtomicElement, ScratchAllocator, ScratchMemory},
        mma::{MmaFence, MmaState},
        Architecture, DeviceProperties, Feature, MemoryError, Plane,
    };
    pub use tilecl_tile::{
        atomic_add, load, mma_rs, mma_ss, print_fragment, print_tile, store, Col, MmaAB, MmaABt,
        MmaAtB, MmaAtBt, MmaGroup, MmaOp, RegisterFragment, Row, SharedLayout, SharedSubtile,
        SharedTile, SharedVector,
    };
}
