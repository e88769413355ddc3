/// Debug print config module.
pub mod debug;
/// Device selection config module.
pub mod device;
/// Matrix-multiply-accumulate config module.
pub mod mma;
/// Transfer engine config module.
pub mod transfer;

mod base;
mod logger;

pub use base::*;
pub use logger::*;
