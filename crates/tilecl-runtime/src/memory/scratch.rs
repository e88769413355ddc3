use alloc::{boxed::Box, vec::Vec};
use core::sync::atomic::{AtomicU32, Ordering};
use tilecl_common::{Element, Pair};

use super::AtomicElement;

/// Lanes taking part in a grouped matrix load or store.
pub const MATRIX_LANES: usize = 32;

/// Software-managed memory shared by the lanes of a block.
///
/// Byte addressed, little-endian, and backed by 32-bit words. Every access is a word atomic so
/// concurrent lanes (or threads) writing neighbouring elements never clobber each other; plain
/// stores of the same element race like they would on the hardware.
#[derive(Debug)]
pub struct ScratchMemory {
    words: Box<[AtomicU32]>,
}

impl ScratchMemory {
    /// Zeroed memory of `size` bytes, rounded up to whole words.
    pub fn new(size: usize) -> Self {
        let words = (0..size.div_ceil(4)).map(|_| AtomicU32::new(0)).collect();
        Self { words }
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.words.len() * 4
    }

    fn word(&self, addr: u32) -> &AtomicU32 {
        debug_assert!(
            (addr as usize) < self.size(),
            "Address {addr:#x} out of scratch memory of {} bytes",
            self.size()
        );
        &self.words[(addr / 4) as usize]
    }

    // Compare-and-swap loop applying `update` to the word holding `addr`, returns the old word.
    fn update<F: Fn(u32) -> u32>(&self, addr: u32, update: F) -> u32 {
        let word = self.word(addr);
        let mut current = word.load(Ordering::Relaxed);
        loop {
            match word.compare_exchange_weak(
                current,
                update(current),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(previous) => return previous,
                Err(actual) => current = actual,
            }
        }
    }

    /// Load the word at `addr`, 4 byte aligned.
    pub fn load_u32(&self, addr: u32) -> u32 {
        debug_assert_eq!(addr % 4, 0, "Misaligned word access at {addr:#x}");
        self.word(addr).load(Ordering::Acquire)
    }

    /// Store the word at `addr`, 4 byte aligned.
    pub fn store_u32(&self, addr: u32, value: u32) {
        debug_assert_eq!(addr % 4, 0, "Misaligned word access at {addr:#x}");
        self.word(addr).store(value, Ordering::Release);
    }

    /// Load the half word at `addr`, 2 byte aligned.
    pub fn load_u16(&self, addr: u32) -> u16 {
        debug_assert_eq!(addr % 2, 0, "Misaligned half word access at {addr:#x}");
        (self.word(addr).load(Ordering::Acquire) >> (8 * (addr % 4))) as u16
    }

    /// Store the half word at `addr`, 2 byte aligned.
    pub fn store_u16(&self, addr: u32, value: u16) {
        debug_assert_eq!(addr % 2, 0, "Misaligned half word access at {addr:#x}");
        let shift = 8 * (addr % 4);
        let mask = 0xFFFF << shift;
        self.update(addr, |word| (word & !mask) | ((value as u32) << shift));
    }

    /// Load the byte at `addr`.
    pub fn load_u8(&self, addr: u32) -> u8 {
        (self.word(addr).load(Ordering::Acquire) >> (8 * (addr % 4))) as u8
    }

    /// Store the byte at `addr`.
    pub fn store_u8(&self, addr: u32, value: u8) {
        let shift = 8 * (addr % 4);
        let mask = 0xFF << shift;
        self.update(addr, |word| (word & !mask) | ((value as u32) << shift));
    }

    /// Load one element.
    pub fn load<E: Element>(&self, addr: u32) -> E {
        match E::SIZE {
            1 => E::from_bits(self.load_u8(addr) as u32),
            2 => E::from_bits(self.load_u16(addr) as u32),
            _ => E::from_bits(self.load_u32(addr)),
        }
    }

    /// Store one element.
    pub fn store<E: Element>(&self, addr: u32, value: E) {
        match E::SIZE {
            1 => self.store_u8(addr, value.to_bits() as u8),
            2 => self.store_u16(addr, value.to_bits() as u16),
            _ => self.store_u32(addr, value.to_bits()),
        }
    }

    /// Atomically add `value` to the element at `addr`, returning the previous value.
    pub fn atomic_add<E: AtomicElement>(&self, addr: u32, value: E) -> E {
        debug_assert_eq!(addr % E::SIZE as u32, 0, "Misaligned atomic at {addr:#x}");
        let shift = 8 * (addr % 4);
        let mask = match E::SIZE {
            4 => u32::MAX,
            _ => ((1u32 << (8 * E::SIZE)) - 1) << shift,
        };

        let previous = self.update(addr, |word| {
            let current = E::from_bits((word & mask) >> shift);
            let sum = E::add(current, value).to_bits();
            (word & !mask) | ((sum << shift) & mask)
        });

        E::from_bits((previous & mask) >> shift)
    }

    /// Atomically add a pair to two adjacent elements.
    ///
    /// A word-aligned pair of 2-byte elements is updated with a single word atomic, everything
    /// else with one atomic per element.
    pub fn atomic_add_pair<E: AtomicElement>(&self, addr: u32, pair: Pair<E>) {
        if E::SIZE == 2 && addr % 4 == 0 {
            self.update(addr, |word| {
                let current = Pair::<E>::from_bits(word as u64);
                Pair::new(E::add(current.x, pair.x), E::add(current.y, pair.y)).to_bits() as u32
            });
        } else {
            self.atomic_add(addr, pair.x);
            self.atomic_add(addr + E::SIZE as u32, pair.y);
        }
    }

    /// Grouped load of four 8x8 matrices of 16-bit values, one row address per lane.
    ///
    /// Lanes `8m..8m + 8` provide the addresses of the eight 16-byte rows of matrix `m`. Lane `l`
    /// receives one word per matrix: row `l / 4`, columns `2 (l % 4)..2 (l % 4) + 2`. When
    /// `transpose` is set the matrices are transposed on the fly, so the word holds column
    /// `l / 4` of rows `2 (l % 4)` and `2 (l % 4) + 1`.
    ///
    /// The same layout moves 8x16 matrices of 8-bit values when not transposed.
    pub fn load_matrix_x4(&self, addrs: &[u32; MATRIX_LANES], transpose: bool) -> Vec<[u32; 4]> {
        (0..MATRIX_LANES)
            .map(|lane| {
                core::array::from_fn(|matrix| match transpose {
                    false => self.load_u32(addrs[8 * matrix + lane / 4] + 4 * (lane % 4) as u32),
                    true => {
                        let (first, second) = transposed_halves(addrs, matrix, lane);
                        self.load_u16(first) as u32 | ((self.load_u16(second) as u32) << 16)
                    }
                })
            })
            .collect()
    }

    /// Grouped store of four 8x8 matrices of 16-bit values, the inverse of
    /// [load_matrix_x4](Self::load_matrix_x4).
    pub fn store_matrix_x4(
        &self,
        addrs: &[u32; MATRIX_LANES],
        values: &[[u32; 4]],
        transpose: bool,
    ) {
        debug_assert_eq!(values.len(), MATRIX_LANES);

        for (lane, words) in values.iter().enumerate() {
            for (matrix, word) in words.iter().enumerate() {
                match transpose {
                    false => {
                        self.store_u32(addrs[8 * matrix + lane / 4] + 4 * (lane % 4) as u32, *word)
                    }
                    true => {
                        let (first, second) = transposed_halves(addrs, matrix, lane);
                        self.store_u16(first, *word as u16);
                        self.store_u16(second, (*word >> 16) as u16);
                    }
                }
            }
        }
    }

    /// Copy of the whole memory as bytes.
    pub fn snapshot(&self) -> Vec<u8> {
        self.words
            .iter()
            .flat_map(|word| word.load(Ordering::Acquire).to_le_bytes())
            .collect()
    }
}

fn transposed_halves(addrs: &[u32; MATRIX_LANES], matrix: usize, lane: usize) -> (u32, u32) {
    let row = 8 * matrix + 2 * (lane % 4);
    let col = 2 * (lane / 4) as u32;
    (addrs[row] + col, addrs[row + 1] + col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecl_common::float::{e4m3, f16};

    #[test]
    fn sub_word_stores_keep_neighbours() {
        let memory = ScratchMemory::new(16);
        memory.store_u32(4, 0xDDCC_BBAA);
        memory.store_u8(5, 0x11);
        memory.store_u16(6, 0x2233);

        assert_eq!(memory.load_u32(4), 0x2233_11AA);
        assert_eq!(memory.load_u8(4), 0xAA);
        assert_eq!(memory.load_u16(6), 0x2233);
    }

    #[test]
    fn typed_access() {
        let memory = ScratchMemory::new(16);
        memory.store(2, f16::from_f32(1.5));
        memory.store(9, e4m3::from_f32(-2.0));
        memory.store(12, 3.25f32);

        assert_eq!(memory.load::<f16>(2).to_f32(), 1.5);
        assert_eq!(memory.load::<e4m3>(9).to_f32(), -2.0);
        assert_eq!(memory.load::<f32>(12), 3.25);
    }

    #[test]
    fn atomic_add_on_half_words() {
        let memory = ScratchMemory::new(8);
        memory.store(0, f16::from_f32(1.0));
        memory.store(2, f16::from_f32(10.0));

        let previous = memory.atomic_add(2, f16::from_f32(0.5));
        memory.atomic_add_pair(0, Pair::new(f16::from_f32(2.0), f16::from_f32(1.0)));

        assert_eq!(previous.to_f32(), 10.0);
        assert_eq!(memory.load::<f16>(0).to_f32(), 3.0);
        assert_eq!(memory.load::<f16>(2).to_f32(), 11.5);
    }

    #[test]
    fn matrix_load_distributes_rows() {
        let memory = ScratchMemory::new(512);
        // Four 8x8 matrices of 16-bit values stored row-major with 16-byte rows, one after the other.
        for index in 0..256u32 {
            memory.store_u16(2 * index, index as u16);
        }
        let addrs: [u32; MATRIX_LANES] = core::array::from_fn(|lane| 16 * lane as u32);

        let words = memory.load_matrix_x4(&addrs, false);
        // Lane 5 holds row 1, columns 2 and 3 of every matrix.
        for matrix in 0..4u32 {
            let first = 64 * matrix + 8 + 2;
            assert_eq!(words[5][matrix as usize], first | ((first + 1) << 16));
        }

        let words = memory.load_matrix_x4(&addrs, true);
        // Transposed, lane 5 holds column 1 of rows 2 and 3.
        for matrix in 0..4u32 {
            let first = 64 * matrix + 16 + 1;
            assert_eq!(words[5][matrix as usize], first | ((first + 8) << 16));
        }
    }

    #[test]
    fn matrix_store_inverts_load() {
        let source = ScratchMemory::new(512);
        for index in 0..128u32 {
            source.store_u32(4 * index, index.wrapping_mul(0x9E37_79B9));
        }
        let addrs: [u32; MATRIX_LANES] = core::array::from_fn(|lane| 16 * lane as u32);

        for transpose in [false, true] {
            let words = source.load_matrix_x4(&addrs, transpose);
            let target = ScratchMemory::new(512);
            target.store_matrix_x4(&addrs, &words, transpose);

            assert_eq!(target.snapshot(), source.snapshot());
        }
    }
}
