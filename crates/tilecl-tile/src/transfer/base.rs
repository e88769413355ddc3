use tilecl_common::{
    convert,
    pack::{pack_word, unpack_word},
    Element, Pair,
};
use tilecl_runtime::{
    memory::{AtomicElement, MATRIX_LANES},
    Plane, PLANE_DIM,
};

use super::{Direction, TransferMethod};
use crate::{
    fragment::{FragmentLayout, RegisterFragment, REGISTERS_PER_BASE_TILE},
    tile::{base_cols, SharedLayout, BASE_ROWS},
};

const LANES: usize = PLANE_DIM as usize;

/// Load a scratch tile into a fragment, converting elements on the way.
///
/// Collective over a converged plane.
pub fn load<S, T, const R: usize, const C: usize, L>(
    plane: &Plane,
    dst: &mut RegisterFragment<T, R, C, L>,
    src: &S,
) where
    S: SharedLayout,
    T: Element<Width = <S::Elem as Element>::Width>,
    L: FragmentLayout,
{
    const { assert!(S::ROWS == R && S::COLS == C, "Tile and fragment shapes differ") };
    debug_assert!(plane.is_converged(), "Load requires a converged plane");

    let method = TransferMethod::select(S::Elem::SIZE, L::LAYOUT, plane.properties(), Direction::Load);
    plane.log_transfer(|| format!("load {R}x{C} {} -> {} {method}", S::Elem::TYPE, T::TYPE));

    match method {
        TransferMethod::Manual => load_manual(dst, src),
        TransferMethod::PackedWord => load_packed(dst, src),
        TransferMethod::PairedSwap => load_paired(dst, src),
        TransferMethod::Matrix { transposed } => load_matrix(dst, src, transposed),
    }
}

/// Store a fragment into a scratch tile, converting elements on the way.
///
/// Collective over a converged plane. Storing what was loaded reproduces the memory exactly.
pub fn store<S, T, const R: usize, const C: usize, L>(
    plane: &Plane,
    dst: &S,
    src: &RegisterFragment<T, R, C, L>,
) where
    S: SharedLayout,
    T: Element<Width = <S::Elem as Element>::Width>,
    L: FragmentLayout,
{
    const { assert!(S::ROWS == R && S::COLS == C, "Tile and fragment shapes differ") };
    debug_assert!(plane.is_converged(), "Store requires a converged plane");

    let method = TransferMethod::select(S::Elem::SIZE, L::LAYOUT, plane.properties(), Direction::Store);
    plane.log_transfer(|| format!("store {R}x{C} {} -> {} {method}", T::TYPE, S::Elem::TYPE));

    match method {
        TransferMethod::Manual => store_manual(dst, src),
        TransferMethod::PackedWord => store_packed(dst, src),
        TransferMethod::PairedSwap => store_paired(dst, src),
        TransferMethod::Matrix { transposed } => store_matrix(dst, src, transposed),
    }
}

/// Atomically add a fragment into a scratch tile.
///
/// Concurrent accumulations into the same tile all land, whatever their interleaving. Only
/// 2- and 4-byte tiles support atomics.
pub fn atomic_add<S, T, const R: usize, const C: usize, L>(
    plane: &Plane,
    dst: &S,
    src: &RegisterFragment<T, R, C, L>,
) where
    S: SharedLayout,
    S::Elem: AtomicElement,
    T: Element<Width = <S::Elem as Element>::Width>,
    L: FragmentLayout,
{
    const { assert!(S::ROWS == R && S::COLS == C, "Tile and fragment shapes differ") };
    debug_assert!(plane.is_converged(), "Atomic add requires a converged plane");

    let method =
        TransferMethod::select(S::Elem::SIZE, L::LAYOUT, plane.properties(), Direction::AtomicAdd);
    plane.log_transfer(|| format!("atomic_add {R}x{C} {} -> {} {method}", T::TYPE, S::Elem::TYPE));

    match method {
        TransferMethod::PackedWord => atomic_add_packed(dst, src),
        TransferMethod::PairedSwap => atomic_add_paired(dst, src),
        TransferMethod::Manual | TransferMethod::Matrix { .. } => atomic_add_manual(dst, src),
    }
}

// Every `(lane, base tile, register)` of a fragment, in storage order.
fn registers<T: Element, const R: usize, const C: usize, L: FragmentLayout>(
) -> impl Iterator<Item = (usize, (usize, usize), usize)> {
    let height = RegisterFragment::<T, R, C, L>::HEIGHT;
    let width = RegisterFragment::<T, R, C, L>::WIDTH;

    (0..LANES).flat_map(move |lane| {
        (0..height * width).flat_map(move |tile| {
            (0..REGISTERS_PER_BASE_TILE)
                .map(move |register| (lane, (tile / width, tile % width), register))
        })
    })
}

fn load_manual<S, T, const R: usize, const C: usize, L>(
    dst: &mut RegisterFragment<T, R, C, L>,
    src: &S,
) where
    S: SharedLayout,
    T: Element,
    L: FragmentLayout,
{
    for lane in 0..LANES {
        for slot in 0..RegisterFragment::<T, R, C, L>::SLOTS {
            let (row, col) = RegisterFragment::<T, R, C, L>::position(lane, slot);
            dst.lane_mut(lane)[slot] = convert(src.get(row, col));
        }
    }
}

fn store_manual<S, T, const R: usize, const C: usize, L>(
    dst: &S,
    src: &RegisterFragment<T, R, C, L>,
) where
    S: SharedLayout,
    T: Element,
    L: FragmentLayout,
{
    for lane in 0..LANES {
        for (slot, value) in src.lane(lane).iter().enumerate() {
            let (row, col) = RegisterFragment::<T, R, C, L>::position(lane, slot);
            dst.set(row, col, convert(*value));
        }
    }
}

fn atomic_add_manual<S, T, const R: usize, const C: usize, L>(
    dst: &S,
    src: &RegisterFragment<T, R, C, L>,
) where
    S: SharedLayout,
    S::Elem: AtomicElement,
    T: Element,
    L: FragmentLayout,
{
    let memory = dst.memory();
    for lane in 0..LANES {
        for (slot, value) in src.lane(lane).iter().enumerate() {
            let (row, col) = RegisterFragment::<T, R, C, L>::position(lane, slot);
            memory.atomic_add::<S::Elem>(dst.address(row, col), convert(*value));
        }
    }
}

// Registers of 1- and 2-byte row-major fragments cover one aligned word of a tile row.
fn load_packed<S, T, const R: usize, const C: usize, L>(
    dst: &mut RegisterFragment<T, R, C, L>,
    src: &S,
) where
    S: SharedLayout,
    T: Element,
    L: FragmentLayout,
{
    let memory = src.memory();
    for (lane, tile, register) in registers::<T, R, C, L>() {
        let (row, col) = RegisterFragment::<T, R, C, L>::register_position(lane, tile, register, 0);
        let word = memory.load_u32(src.address(row, col));
        unpack_register::<S::Elem, T>(word, dst.register_mut(lane, tile, register));
    }
}

fn store_packed<S, T, const R: usize, const C: usize, L>(
    dst: &S,
    src: &RegisterFragment<T, R, C, L>,
) where
    S: SharedLayout,
    T: Element,
    L: FragmentLayout,
{
    let memory = dst.memory();
    for (lane, tile, register) in registers::<T, R, C, L>() {
        let (row, col) = RegisterFragment::<T, R, C, L>::register_position(lane, tile, register, 0);
        let word = pack_register::<S::Elem, T>(src.register(lane, tile, register));
        memory.store_u32(dst.address(row, col), word);
    }
}

fn atomic_add_packed<S, T, const R: usize, const C: usize, L>(
    dst: &S,
    src: &RegisterFragment<T, R, C, L>,
) where
    S: SharedLayout,
    S::Elem: AtomicElement,
    T: Element,
    L: FragmentLayout,
{
    let memory = dst.memory();
    for (lane, tile, register) in registers::<T, R, C, L>() {
        let (row, col) = RegisterFragment::<T, R, C, L>::register_position(lane, tile, register, 0);
        let values = src.register(lane, tile, register);
        let pair = Pair::new(values[0], values[1]).convert::<S::Elem>();
        memory.atomic_add_pair(dst.address(row, col), pair);
    }
}

// Addresses of the two halves of the pair starting at `(row, col)`, and whether they come
// swapped. Lanes 2 and 3 of every quad fold 4 into the swizzle so the quad spreads over both
// halves of a 16-byte chunk.
fn paired_addresses<S: SharedLayout>(
    tile: &S,
    lane: usize,
    row: usize,
    col: usize,
) -> (u32, u32, bool) {
    let addr = tile.base() + tile.linear_offset(row, col);
    let blit = 4 * ((lane % 4) / 2) as u32;
    let swizzle = blit ^ tile.swizzle().pattern(addr);

    (addr ^ swizzle, (addr + 4) ^ swizzle, blit != 0)
}

fn load_paired<S, T, const R: usize, const C: usize, L>(
    dst: &mut RegisterFragment<T, R, C, L>,
    src: &S,
) where
    S: SharedLayout,
    T: Element,
    L: FragmentLayout,
{
    let memory = src.memory();
    for (lane, tile, register) in registers::<T, R, C, L>() {
        let (row, col) = RegisterFragment::<T, R, C, L>::register_position(lane, tile, register, 0);
        let (first, second, swapped) = paired_addresses(src, lane, row, col);

        let pair = Pair::new(memory.load::<S::Elem>(first), memory.load(second))
            .swap_if(swapped)
            .convert::<T>();

        let values = dst.register_mut(lane, tile, register);
        values[0] = pair.x;
        values[1] = pair.y;
    }
}

fn store_paired<S, T, const R: usize, const C: usize, L>(
    dst: &S,
    src: &RegisterFragment<T, R, C, L>,
) where
    S: SharedLayout,
    T: Element,
    L: FragmentLayout,
{
    let memory = dst.memory();
    for (lane, tile, register) in registers::<T, R, C, L>() {
        let (row, col) = RegisterFragment::<T, R, C, L>::register_position(lane, tile, register, 0);
        let (first, second, swapped) = paired_addresses(dst, lane, row, col);

        let values = src.register(lane, tile, register);
        let pair = Pair::new(values[0], values[1])
            .convert::<S::Elem>()
            .swap_if(swapped);

        memory.store(first, pair.x);
        memory.store(second, pair.y);
    }
}

fn atomic_add_paired<S, T, const R: usize, const C: usize, L>(
    dst: &S,
    src: &RegisterFragment<T, R, C, L>,
) where
    S: SharedLayout,
    S::Elem: AtomicElement,
    T: Element,
    L: FragmentLayout,
{
    let memory = dst.memory();
    for (lane, tile, register) in registers::<T, R, C, L>() {
        let (row, col) = RegisterFragment::<T, R, C, L>::register_position(lane, tile, register, 0);
        let (first, second, swapped) = paired_addresses(dst, lane, row, col);

        let values = src.register(lane, tile, register);
        let pair = Pair::new(values[0], values[1])
            .convert::<S::Elem>()
            .swap_if(swapped);

        memory.atomic_add(first, pair.x);
        memory.atomic_add(second, pair.y);
    }
}

/// Position within a base tile of the row `lane` points to in a grouped matrix access.
///
/// Lanes `8m..8m + 8` address the rows of matrix `m`, and matrix `m` lands in register `m` of
/// every lane.
///
/// | elements | transposed | row                         | col                |
/// |----------|------------|-----------------------------|--------------------|
/// | 2 bytes  | no         | `lane % 16`                 | `8 (lane / 16)`    |
/// | 2 bytes  | yes        | `8 (lane / 16) + lane % 8`  | `8 ((lane / 8) % 2)` |
/// | 1 byte   | no         | `lane % 16`                 | `16 (lane / 16)`   |
pub const fn matrix_row_position(elem_size: usize, transposed: bool, lane: usize) -> (usize, usize) {
    match (elem_size, transposed) {
        (1, _) => (lane % 16, 16 * (lane / 16)),
        (_, false) => (lane % 16, 8 * (lane / 16)),
        (_, true) => (8 * (lane / 16) + lane % 8, 8 * ((lane / 8) % 2)),
    }
}

fn matrix_addresses<S: SharedLayout>(
    tile: &S,
    (tile_row, tile_col): (usize, usize),
    transposed: bool,
) -> [u32; MATRIX_LANES] {
    let base_cols = base_cols(S::Elem::SIZE);

    core::array::from_fn(|lane| {
        let (row, col) = matrix_row_position(S::Elem::SIZE, transposed, lane);
        tile.address(tile_row * BASE_ROWS + row, tile_col * base_cols + col)
    })
}

fn load_matrix<S, T, const R: usize, const C: usize, L>(
    dst: &mut RegisterFragment<T, R, C, L>,
    src: &S,
    transposed: bool,
) where
    S: SharedLayout,
    T: Element,
    L: FragmentLayout,
{
    let width = RegisterFragment::<T, R, C, L>::WIDTH;

    for tile in 0..RegisterFragment::<T, R, C, L>::HEIGHT * width {
        let tile = (tile / width, tile % width);
        let addrs = matrix_addresses(src, tile, transposed);
        let words = src.memory().load_matrix_x4(&addrs, transposed);

        for (lane, words) in words.iter().enumerate() {
            for (register, word) in words.iter().enumerate() {
                unpack_register::<S::Elem, T>(*word, dst.register_mut(lane, tile, register));
            }
        }
    }
}

fn store_matrix<S, T, const R: usize, const C: usize, L>(
    dst: &S,
    src: &RegisterFragment<T, R, C, L>,
    transposed: bool,
) where
    S: SharedLayout,
    T: Element,
    L: FragmentLayout,
{
    let width = RegisterFragment::<T, R, C, L>::WIDTH;

    for tile in 0..RegisterFragment::<T, R, C, L>::HEIGHT * width {
        let tile = (tile / width, tile % width);
        let addrs = matrix_addresses(dst, tile, transposed);
        let words: Vec<[u32; 4]> = (0..LANES)
            .map(|lane| {
                core::array::from_fn(|register| {
                    pack_register::<S::Elem, T>(src.register(lane, tile, register))
                })
            })
            .collect();

        dst.memory().store_matrix_x4(&addrs, &words, transposed);
    }
}

// Storage word to register: a pair for 2-byte storage, four elements for 1-byte storage.
fn unpack_register<S: Element, T: Element>(word: u32, register: &mut [T]) {
    match S::SIZE {
        2 => {
            let pair = Pair::<S>::from_bits(word as u64).convert::<T>();
            register[0] = pair.x;
            register[1] = pair.y;
        }
        _ => {
            let mut values = [S::default(); 4];
            unpack_word(word, &mut values);
            for (slot, value) in register.iter_mut().zip(values) {
                *slot = convert(value);
            }
        }
    }
}

fn pack_register<S: Element, T: Element>(register: &[T]) -> u32 {
    match S::SIZE {
        2 => Pair::new(register[0], register[1])
            .convert::<S>()
            .to_bits() as u32,
        _ => {
            let mut values = [S::default(); 4];
            for (value, slot) in values.iter_mut().zip(register) {
                *value = convert(*slot);
            }
            pack_word(&values)
        }
    }
}
