mod backend;
mod fence;
mod simulated;

pub use backend::*;
pub use fence::*;
pub use simulated::*;
