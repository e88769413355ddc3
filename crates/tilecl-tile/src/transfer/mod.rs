//! Cooperative transfers between scratch tiles and register fragments.
//!
//! [load], [store] and [atomic_add] are collective over a converged plane: every lane moves the
//! elements its fragment slots map to, with no synchronization between lanes. The scratch
//! addresses each lane touches depend on the element size, the fragment layout and the features
//! of the device, following [TransferMethod::select]:
//!
//! | size | layout | load                         | store                         | atomic add         |
//! |------|--------|------------------------------|-------------------------------|--------------------|
//! | 1    | row    | matrix, else packed word     | matrix, else packed word      | rejected           |
//! | 1    | col    | manual                       | manual                        | rejected           |
//! | 2    | row    | matrix, else packed word     | matrix, else packed word      | packed word        |
//! | 2    | col    | transposed matrix, else manual | transposed matrix, else manual | manual         |
//! | 4    | row    | paired swap                  | paired swap                   | paired swap        |
//! | 4    | col    | manual                       | manual                        | manual             |
//!
//! Lane `l` addresses, for a base tile at `(16 ti, Cb tj)` of a tile or subtile:
//!
//! - manual: every `(row, col)` its slots map to;
//! - packed word: the word at `(row, col)` of each register, `col` being the first column the
//!   register holds;
//! - paired swap: the 8 bytes at the unswizzled offset `a` of each register, XORed with
//!   `4 ((l % 4) / 2) ^ pattern(a)`, the two halves swapped back for lanes 2 and 3 of every quad;
//! - matrix: the row given by [matrix_row_position], once per base tile.
//!
//! Every method fills the fragment identically, the mapping never depends on the address.
//!
//! The fragment element may differ from the tile element within a width class:
//!
//! ```
//! use tilecl_common::float::f16;
//! use tilecl_runtime::{memory::{ScratchAllocator, ScratchMemory}, Architecture, DeviceProperties, Plane};
//! use tilecl_tile::{load, store, RegisterFragment, SharedLayout, SharedTile};
//!
//! let props = DeviceProperties::new(Architecture::Ampere);
//! let plane = Plane::new(props.clone());
//! let memory = ScratchMemory::new(8192);
//! let mut allocator = ScratchAllocator::new(&memory);
//!
//! let tile = SharedTile::<f16, 16, 32>::new(&mut allocator, &props).unwrap();
//! tile.fill(f16::from_f32(2.0));
//!
//! let mut fragment = RegisterFragment::<f32, 16, 32>::new();
//! load(&plane, &mut fragment, &tile);
//! assert_eq!(fragment.get(3, 17), 2.0);
//!
//! store(&plane, &tile, &fragment);
//! ```
//!
//! but not across width classes:
//!
//! ```compile_fail
//! use tilecl_common::float::e4m3;
//! use tilecl_runtime::{memory::{ScratchAllocator, ScratchMemory}, Architecture, DeviceProperties, Plane};
//! use tilecl_tile::{load, RegisterFragment, SharedTile};
//!
//! let props = DeviceProperties::new(Architecture::Ampere);
//! let memory = ScratchMemory::new(8192);
//! let mut allocator = ScratchAllocator::new(&memory);
//!
//! let tile = SharedTile::<e4m3, 16, 32>::new(&mut allocator, &props).unwrap();
//! let mut fragment = RegisterFragment::<f32, 16, 32>::new();
//! load(&Plane::new(props), &mut fragment, &tile);
//! ```
//!
//! Atomics on 1-byte elements do not exist:
//!
//! ```compile_fail
//! use tilecl_common::float::e4m3;
//! use tilecl_runtime::{memory::{ScratchAllocator, ScratchMemory}, Architecture, DeviceProperties, Plane};
//! use tilecl_tile::{atomic_add, RegisterFragment, SharedTile};
//!
//! let props = DeviceProperties::new(Architecture::Hopper);
//! let memory = ScratchMemory::new(8192);
//! let mut allocator = ScratchAllocator::new(&memory);
//!
//! let tile = SharedTile::<e4m3, 16, 32>::new(&mut allocator, &props).unwrap();
//! let fragment = RegisterFragment::<e4m3, 16, 32>::new();
//! atomic_add(&Plane::new(props), &tile, &fragment);
//! ```
//!
//! and the shapes of the tile and the fragment must agree:
//!
//! ```compile_fail
//! use tilecl_runtime::{memory::{ScratchAllocator, ScratchMemory}, Architecture, DeviceProperties, Plane};
//! use tilecl_tile::{load, RegisterFragment, SharedTile};
//!
//! let props = DeviceProperties::new(Architecture::Ampere);
//! let memory = ScratchMemory::new(8192);
//! let mut allocator = ScratchAllocator::new(&memory);
//!
//! let tile = SharedTile::<f32, 16, 32>::new(&mut allocator, &props).unwrap();
//! let mut fragment = RegisterFragment::<f32, 32, 16>::new();
//! load(&Plane::new(props), &mut fragment, &tile);
//! ```

mod base;
mod method;

pub use base::*;
pub use method::*;
