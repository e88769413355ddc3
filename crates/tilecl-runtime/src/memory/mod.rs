mod allocator;
mod atomic;
mod scratch;

pub use allocator::*;
pub use atomic::*;
pub use scratch::*;
