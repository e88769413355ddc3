use crate::float::{bf16, e4m3, e5m2, f16};
use core::fmt::{Debug, Display};

/// Identifier of a scalar element type.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ElemType {
    /// 32-bit IEEE float.
    F32,
    /// 16-bit IEEE float.
    F16,
    /// 16-bit brain float.
    BF16,
    /// 8-bit float, 4 exponent bits.
    E4M3,
    /// 8-bit float, 5 exponent bits.
    E5M2,
}

impl ElemType {
    /// Size of the element in bytes.
    pub const fn size(&self) -> usize {
        match self {
            ElemType::F32 => 4,
            ElemType::F16 | ElemType::BF16 => 2,
            ElemType::E4M3 | ElemType::E5M2 => 1,
        }
    }
}

impl Display for ElemType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ElemType::F32 => "f32",
            ElemType::F16 => "f16",
            ElemType::BF16 => "bf16",
            ElemType::E4M3 => "e4m3",
            ElemType::E5M2 => "e5m2",
        };
        f.write_str(name)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Runtime view of a [width class](WidthClass).
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum WidthKind {
    /// 1-byte elements.
    Narrow,
    /// 2- and 4-byte elements.
    Wide,
}

/// Register packing class shared by elements that can be converted into each other while moving
/// between scratch memory and registers.
///
/// Elements of the same class share the base tile shape and the fragment lane mapping, so a
/// tile of one element type can be loaded into a fragment of any other element type of the
/// same class.
pub trait WidthClass: sealed::Sealed + Send + Sync + 'static {
    /// Columns of one base tile.
    const BASE_COLS: usize;
    /// Elements held by one packed fragment register.
    const PACK: usize;
    /// Runtime identifier of the class.
    const KIND: WidthKind;
}

/// Width class of 1-byte elements: 16x32 base tiles, four elements per register.
#[derive(Debug)]
pub struct Narrow;

/// Width class of 2- and 4-byte elements: 16x16 base tiles, one pair per register.
#[derive(Debug)]
pub struct Wide;

impl sealed::Sealed for Narrow {}
impl sealed::Sealed for Wide {}

impl WidthClass for Narrow {
    const BASE_COLS: usize = 32;
    const PACK: usize = 4;
    const KIND: WidthKind = WidthKind::Narrow;
}

impl WidthClass for Wide {
    const BASE_COLS: usize = 16;
    const PACK: usize = 2;
    const KIND: WidthKind = WidthKind::Wide;
}

/// Scalar element that can be stored in scratch memory and held in register fragments.
pub trait Element:
    Copy + Default + PartialEq + Debug + Display + Send + Sync + 'static
{
    /// Type identifier.
    const TYPE: ElemType;
    /// Size in bytes.
    const SIZE: usize = Self::TYPE.size();

    /// Width class of the element.
    type Width: WidthClass;

    /// Round from `f32` into this element.
    fn from_f32(value: f32) -> Self;
    /// Widen to `f32`.
    fn to_f32(self) -> f32;
    /// Raw bits, zero extended.
    fn to_bits(self) -> u32;
    /// Reinterpret the low [`Element::SIZE`] bytes.
    fn from_bits(bits: u32) -> Self;
}

impl Element for f32 {
    const TYPE: ElemType = ElemType::F32;
    type Width = Wide;

    fn from_f32(value: f32) -> Self {
        value
    }

    fn to_f32(self) -> f32 {
        self
    }

    fn to_bits(self) -> u32 {
        f32::to_bits(self)
    }

    fn from_bits(bits: u32) -> Self {
        f32::from_bits(bits)
    }
}

macro_rules! impl_element {
    ($ty:ident, $elem:ident, $width:ident, $bits:ty) => {
        impl Element for $ty {
            const TYPE: ElemType = ElemType::$elem;
            type Width = $width;

            fn from_f32(value: f32) -> Self {
                $ty::from_f32(value)
            }

            fn to_f32(self) -> f32 {
                $ty::to_f32(self)
            }

            fn to_bits(self) -> u32 {
                $ty::to_bits(self) as u32
            }

            fn from_bits(bits: u32) -> Self {
                $ty::from_bits(bits as $bits)
            }
        }
    };
}

impl_element!(f16, F16, Wide, u16);
impl_element!(bf16, BF16, Wide, u16);
impl_element!(e4m3, E4M3, Narrow, u8);
impl_element!(e5m2, E5M2, Narrow, u8);

/// Convert between element types.
///
/// Identical types are copied bit for bit, everything else goes through `f32`, which
/// represents every supported element exactly.
pub fn convert<S: Element, T: Element>(value: S) -> T {
    if S::TYPE == T::TYPE {
        T::from_bits(value.to_bits())
    } else {
        T::from_f32(value.to_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_types() {
        assert_eq!(<f32 as Element>::SIZE, 4);
        assert_eq!(<f16 as Element>::SIZE, 2);
        assert_eq!(<bf16 as Element>::SIZE, 2);
        assert_eq!(<e4m3 as Element>::SIZE, 1);
        assert_eq!(<e5m2 as Element>::SIZE, 1);
    }

    #[test]
    fn convert_same_type_keeps_nan_payload() {
        let value = f16::from_bits(0x7E01);
        let converted: f16 = convert(value);
        assert_eq!(converted.to_bits(), 0x7E01);
    }

    #[test]
    fn convert_narrow_to_narrow() {
        let value = e4m3::from_f32(1.5);
        let converted: e5m2 = convert(value);
        assert_eq!(converted.to_f32(), 1.5);
    }

    #[test]
    fn convert_wide_rounds() {
        let converted: bf16 = convert(1.0f32 + f32::EPSILON);
        assert_eq!(converted.to_f32(), 1.0);
    }
}
