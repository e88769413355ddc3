use bytemuck::{Pod, Zeroable};
use core::fmt::{Debug, Display, Formatter};

/// A 8-bit floating point type with 4 exponent bits and 3 mantissa bits.
///
/// Follows the `E4M3FN` flavour: no infinities, a single NaN encoding per sign and
/// saturating conversions from wider types.
///
/// [`Minifloat`]: https://en.wikipedia.org/wiki/Minifloat
#[allow(non_camel_case_types)]
#[repr(transparent)]
#[derive(Clone, Copy, Default, Zeroable, Pod, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct e4m3(u8);

/// A 8-bit floating point type with 5 exponent bits and 2 mantissa bits.
///
/// Bit-compatible with the upper byte of an IEEE half, including infinities.
///
/// [`Minifloat`]: https://en.wikipedia.org/wiki/Minifloat
#[allow(non_camel_case_types)]
#[repr(transparent)]
#[derive(Clone, Copy, Default, Zeroable, Pod, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct e5m2(u8);

impl e4m3 {
    /// Maximum representable value
    pub const MAX: f64 = 448.0;
    /// Minimum representable value
    pub const MIN: f64 = -448.0;

    const SATURATED: u8 = 0x7E;
    const NAN: u8 = 0x7F;

    /// Reinterpret raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits of the value.
    pub const fn to_bits(self) -> u8 {
        self.0
    }

    /// Round to nearest even, saturating to [`e4m3::MAX`].
    pub fn from_f32(value: f32) -> Self {
        let sign = if value.is_sign_negative() { 0x80 } else { 0x00 };
        if value.is_nan() {
            return Self(sign | Self::NAN);
        }

        let magnitude = value.abs();
        if magnitude >= Self::MAX as f32 {
            return Self(sign | Self::SATURATED);
        }

        // Subnormals are multiples of 2^-9 below the smallest normal 2^-6.
        if magnitude < exp2i(-6) {
            let units = (magnitude * exp2i(9)).round_ties_even() as u8;
            return Self(sign | units);
        }

        let mut exponent = ((magnitude.to_bits() >> 23) & 0xFF) as i32 - 127;
        let mut mantissa = (magnitude / exp2i(exponent - 3)).round_ties_even() as u32;
        if mantissa == 16 {
            mantissa = 8;
            exponent += 1;
        }

        let biased = (exponent + 7) as u32;
        if biased > 15 || (biased == 15 && mantissa == 15) {
            return Self(sign | Self::SATURATED);
        }

        Self(sign | ((biased << 3) as u8) | ((mantissa - 8) as u8))
    }

    /// Exact widening to `f32`.
    pub fn to_f32(self) -> f32 {
        let sign = if self.0 & 0x80 != 0 { -1.0 } else { 1.0 };
        let exponent = ((self.0 >> 3) & 0x0F) as i32;
        let mantissa = (self.0 & 0x07) as u32;

        if exponent == 0x0F && mantissa == 0x07 {
            return f32::NAN;
        }

        let magnitude = match exponent {
            0 => mantissa as f32 * exp2i(-9),
            _ => (8 + mantissa) as f32 * exp2i(exponent - 10),
        };
        sign * magnitude
    }
}

impl e5m2 {
    /// Maximum representable value
    pub const MAX: f64 = 57344.0;
    /// Minimum representable value
    pub const MIN: f64 = -57344.0;

    const INFINITY: u8 = 0x7C;
    const NAN: u8 = 0x7E;

    /// Reinterpret raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits of the value.
    pub const fn to_bits(self) -> u8 {
        self.0
    }

    /// Round to nearest even, overflowing to infinity.
    pub fn from_f32(value: f32) -> Self {
        let sign = if value.is_sign_negative() { 0x80 } else { 0x00 };
        if value.is_nan() {
            return Self(sign | Self::NAN);
        }

        let magnitude = value.abs();
        if magnitude.is_infinite() {
            return Self(sign | Self::INFINITY);
        }

        // Subnormals are multiples of 2^-16 below the smallest normal 2^-14.
        if magnitude < exp2i(-14) {
            let units = (magnitude * exp2i(16)).round_ties_even() as u8;
            return Self(sign | units);
        }

        let mut exponent = ((magnitude.to_bits() >> 23) & 0xFF) as i32 - 127;
        let mut mantissa = (magnitude / exp2i(exponent - 2)).round_ties_even() as u32;
        if mantissa == 8 {
            mantissa = 4;
            exponent += 1;
        }

        let biased = exponent + 15;
        if biased >= 31 {
            return Self(sign | Self::INFINITY);
        }

        Self(sign | ((biased as u8) << 2) | ((mantissa - 4) as u8))
    }

    /// Exact widening to `f32`.
    pub fn to_f32(self) -> f32 {
        half::f16::from_bits((self.0 as u16) << 8).to_f32()
    }
}

/// `2^exponent` for exponents in the normal `f32` range.
fn exp2i(exponent: i32) -> f32 {
    f32::from_bits(((exponent + 127) as u32) << 23)
}

macro_rules! impl_fmt {
    ($ty:ident) => {
        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
                Display::fmt(&self.to_f32(), f)
            }
        }

        impl Debug for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}({:#04x})", stringify!($ty), self.0)
            }
        }
    };
}

impl_fmt!(e4m3);
impl_fmt!(e5m2);
