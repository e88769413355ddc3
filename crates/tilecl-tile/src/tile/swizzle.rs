use core::fmt::Display;
use tilecl_runtime::SwizzleGeometry;

/// Rows of a base tile.
pub const BASE_ROWS: usize = 16;

/// Columns of a base tile holding elements of `elem_size` bytes.
pub const fn base_cols(elem_size: usize) -> usize {
    match elem_size {
        1 => 32,
        _ => 16,
    }
}

/// Swizzle period in bytes of a tile `cols` wide holding elements of `elem_size` bytes.
///
/// Fails at compile time when evaluated in a constant for an invalid width.
pub const fn swizzle_bytes(elem_size: usize, cols: usize) -> usize {
    let base = base_cols(elem_size);
    assert!(
        cols > 0 && cols % base == 0,
        "Tile width must be a multiple of the base tile width"
    );

    let quanta = cols / base;
    match elem_size {
        1 | 2 => {
            if quanta % 4 == 0 {
                128
            } else if quanta % 2 == 0 {
                64
            } else {
                32
            }
        }
        4 => {
            if quanta % 2 == 0 {
                128
            } else {
                64
            }
        }
        _ => panic!("Unsupported element size"),
    }
}

/// Swizzle widths supported by the scratch memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwizzleMode {
    /// 32-byte swizzle period.
    B32,
    /// 64-byte swizzle period.
    B64,
    /// 128-byte swizzle period.
    B128,
}

impl SwizzleMode {
    /// Mode of a swizzle period in bytes.
    pub const fn from_bytes(bytes: usize) -> Self {
        match bytes {
            32 => SwizzleMode::B32,
            64 => SwizzleMode::B64,
            128 => SwizzleMode::B128,
            _ => panic!("Unsupported swizzle period"),
        }
    }

    /// Swizzle period in bytes.
    pub const fn bytes(&self) -> usize {
        match self {
            SwizzleMode::B32 => 32,
            SwizzleMode::B64 => 64,
            SwizzleMode::B128 => 128,
        }
    }
}

impl Display for SwizzleMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}B", self.bytes())
    }
}

/// XOR address permutation spreading the rows of a tile over the memory banks.
///
/// The `bits` bits starting at `base + shift` (the line index) are folded into the bits starting
/// at `base` (the chunk index), so consecutive lines place the same chunk in different banks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Swizzle {
    bits: u32,
    base: u32,
    shift: u32,
}

impl Swizzle {
    /// Swizzle folding `bits` bits, `shift` bits above `base`.
    pub const fn new(bits: u32, base: u32, shift: u32) -> Self {
        Self { bits, base, shift }
    }

    /// Swizzle of a tile with the given mode on a device with the given bank geometry.
    pub const fn from_mode(mode: SwizzleMode, geometry: SwizzleGeometry) -> Self {
        let bits = (mode.bytes() >> geometry.base).trailing_zeros();
        Self::new(bits, geometry.base, geometry.shift)
    }

    /// Number of bytes after which the pattern repeats.
    pub const fn repeats_after(&self) -> u32 {
        1 << (self.bits + self.base + self.shift)
    }

    /// Bits XORed into `addr`.
    pub const fn pattern(&self, addr: u32) -> u32 {
        ((addr % self.repeats_after()) >> (self.base + self.shift)) << self.base
    }

    /// Swizzled address.
    pub const fn apply(&self, addr: u32) -> u32 {
        addr ^ self.pattern(addr)
    }
}
