use tilecl_common::{
    float::{bf16, f16},
    Element,
};

/// Elements with a hardware atomic add on scratch memory.
///
/// Only 2- and 4-byte elements have one, so 1-byte elements can't be accumulated atomically.
pub trait AtomicElement: Element {
    /// Sum of two elements, rounded to the element precision.
    fn add(lhs: Self, rhs: Self) -> Self {
        Self::from_f32(lhs.to_f32() + rhs.to_f32())
    }
}

impl AtomicElement for f32 {
    fn add(lhs: Self, rhs: Self) -> Self {
        lhs + rhs
    }
}

impl AtomicElement for f16 {}
impl AtomicElement for bf16 {}
