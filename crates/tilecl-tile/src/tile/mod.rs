//! Tiles and vectors living in scratch memory.

mod layout;
mod shared;
mod subtile;
mod swizzle;
mod vector;

pub use layout::*;
pub use shared::*;
pub use subtile::*;
pub use swizzle::*;
pub use vector::*;
