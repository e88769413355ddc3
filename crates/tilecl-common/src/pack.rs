//! Packed register values.
//!
//! Fragments hold their elements in packed registers: one [`Pair`] for 2- and 4-byte elements
//! (the `half2`/`bfloat162`/`float2` registers of the hardware) and one 32-bit word of four
//! elements for 1-byte elements. Scratch memory is word addressed, so the helpers here also move
//! elements in and out of little-endian 32-bit words.

use crate::element::{convert, Element};

/// Two elements travelling together in one packed register.
#[derive(new, Clone, Copy, Debug, Default, PartialEq)]
pub struct Pair<E> {
    /// First (lower address) element.
    pub x: E,
    /// Second element.
    pub y: E,
}

impl<E: Element> Pair<E> {
    /// Exchange the two halves.
    pub fn swap(self) -> Self {
        Self::new(self.y, self.x)
    }

    /// Conditionally exchange the two halves.
    pub fn swap_if(self, condition: bool) -> Self {
        match condition {
            true => self.swap(),
            false => self,
        }
    }

    /// Convert both halves into another element type.
    pub fn convert<T: Element>(self) -> Pair<T> {
        Pair::new(convert(self.x), convert(self.y))
    }

    /// Pack into the low `2 * SIZE` bytes, `x` first.
    pub fn to_bits(self) -> u64 {
        let shift = 8 * E::SIZE as u32;
        self.x.to_bits() as u64 | ((self.y.to_bits() as u64) << shift)
    }

    /// Unpack from the low `2 * SIZE` bytes, `x` first.
    pub fn from_bits(bits: u64) -> Self {
        let shift = 8 * E::SIZE as u32;
        let mask = (1u64 << shift) - 1;
        Self::new(
            E::from_bits((bits & mask) as u32),
            E::from_bits(((bits >> shift) & mask) as u32),
        )
    }
}

/// Number of `E` held by a 32-bit word.
pub const fn per_word<E: Element>() -> usize {
    4 / E::SIZE
}

/// Extract element `index` of a little-endian word.
pub fn extract<E: Element>(word: u32, index: usize) -> E {
    debug_assert!(E::SIZE < 4 && index < per_word::<E>());
    let shift = 8 * (E::SIZE * index) as u32;
    let mask = (1u32 << (8 * E::SIZE as u32)) - 1;
    E::from_bits((word >> shift) & mask)
}

/// Replace element `index` of a little-endian word.
pub fn insert<E: Element>(word: u32, index: usize, value: E) -> u32 {
    debug_assert!(E::SIZE < 4 && index < per_word::<E>());
    let shift = 8 * (E::SIZE * index) as u32;
    let mask = ((1u32 << (8 * E::SIZE as u32)) - 1) << shift;
    (word & !mask) | ((value.to_bits() << shift) & mask)
}

/// Split a word into its elements, lowest address first. `out` holds [`per_word`] elements.
pub fn unpack_word<E: Element>(word: u32, out: &mut [E]) {
    match E::SIZE {
        4 => out[0] = E::from_bits(word),
        _ => {
            for (index, slot) in out.iter_mut().enumerate() {
                *slot = extract(word, index);
            }
        }
    }
}

/// Inverse of [`unpack_word`].
pub fn pack_word<E: Element>(values: &[E]) -> u32 {
    match E::SIZE {
        4 => values[0].to_bits(),
        _ => values
            .iter()
            .enumerate()
            .fold(0, |word, (index, value)| insert(word, index, *value)),
    }
}
