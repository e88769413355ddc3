#![warn(missing_docs)]

//! Common types shared by the TileCL crates: element types, 8-bit minifloats and the packed
//! register pairs used when moving data between scratch memory and registers.

#[macro_use]
extern crate derive_new;

/// Element traits and type identifiers.
pub mod element;
/// Floating point types not provided by `core` or `half`.
pub mod float;
pub mod pack;

pub use element::{convert, ElemType, Element, Narrow, Wide, WidthClass, WidthKind};
pub use pack::Pair;
