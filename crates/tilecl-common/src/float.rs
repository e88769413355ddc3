mod fp8;

pub use fp8::*;
pub use half::{bf16, f16};
