use core::marker::PhantomData;
use tilecl_common::{convert, Element, WidthClass};
use tilecl_runtime::PLANE_DIM;

use super::{base_location, base_position, FragmentLayout, Row, REGISTERS_PER_BASE_TILE};
use crate::tile::BASE_ROWS;

const LANES: usize = PLANE_DIM as usize;

/// `R x C` tile of `E` distributed over the registers of the lanes of a plane.
///
/// Every lane holds `R * C / 32` elements. The mapping from a position to its lane and slot only
/// depends on the position within its base tile, the width class of `E` and the layout `L`,
/// never on where the tile was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterFragment<E: Element, const R: usize, const C: usize, L: FragmentLayout = Row>
{
    values: Vec<E>,
    _layout: PhantomData<L>,
}

impl<E: Element, const R: usize, const C: usize, L: FragmentLayout> RegisterFragment<E, R, C, L> {
    /// Columns of a base tile.
    pub const BASE_COLS: usize = <E::Width as WidthClass>::BASE_COLS;
    /// Base tiles along the rows.
    pub const HEIGHT: usize = R / BASE_ROWS;
    /// Base tiles along the columns.
    pub const WIDTH: usize = C / Self::BASE_COLS;
    /// Elements per packed register.
    pub const PACK: usize = <E::Width as WidthClass>::PACK;
    /// Elements held by each lane.
    pub const SLOTS: usize = {
        assert!(
            R > 0 && R % BASE_ROWS == 0 && C > 0 && C % Self::BASE_COLS == 0,
            "Fragment shape must be a multiple of the base tile"
        );
        R * C / LANES
    };
    /// Packed registers held by each lane.
    pub const REGISTERS: usize = Self::SLOTS / Self::PACK;

    /// Fragment filled with zeros.
    pub fn new() -> Self {
        Self::filled(E::default())
    }

    /// Fragment with every element set to `value`.
    pub fn filled(value: E) -> Self {
        Self {
            values: vec![value; LANES * Self::SLOTS],
            _layout: PhantomData,
        }
    }

    /// Fragment with element `(row, col)` set to `func(row, col)`.
    pub fn from_fn<F: FnMut(usize, usize) -> E>(mut func: F) -> Self {
        let mut fragment = Self::new();
        for row in 0..R {
            for col in 0..C {
                fragment.set(row, col, func(row, col));
            }
        }
        fragment
    }

    /// Fragment holding a row-major slice of `R * C` elements.
    pub fn from_row_major(values: &[E]) -> Self {
        assert_eq!(values.len(), R * C);
        Self::from_fn(|row, col| values[row * C + col])
    }

    /// Lane and slot holding `(row, col)`.
    pub fn locate(row: usize, col: usize) -> (usize, usize) {
        debug_assert!(row < R && col < C, "({row}, {col}) out of a {R}x{C} fragment");
        let tile = (row / BASE_ROWS) * Self::WIDTH + col / Self::BASE_COLS;
        let (lane, register, k) = base_location(
            <E::Width as WidthClass>::KIND,
            L::LAYOUT,
            row % BASE_ROWS,
            col % Self::BASE_COLS,
        );
        (lane, Self::slot(tile, register, k))
    }

    /// Position held by `slot` of `lane`.
    pub fn position(lane: usize, slot: usize) -> (usize, usize) {
        debug_assert!(lane < LANES && slot < Self::SLOTS);
        let k = slot % Self::PACK;
        let register = (slot / Self::PACK) % REGISTERS_PER_BASE_TILE;
        let tile = slot / (Self::PACK * REGISTERS_PER_BASE_TILE);
        let (row, col) =
            base_position(<E::Width as WidthClass>::KIND, L::LAYOUT, lane, register, k);

        (
            (tile / Self::WIDTH) * BASE_ROWS + row,
            (tile % Self::WIDTH) * Self::BASE_COLS + col,
        )
    }

    /// Position of element `k` of a register of base tile `(tile_row, tile_col)`.
    pub fn register_position(
        lane: usize,
        (tile_row, tile_col): (usize, usize),
        register: usize,
        k: usize,
    ) -> (usize, usize) {
        let (row, col) =
            base_position(<E::Width as WidthClass>::KIND, L::LAYOUT, lane, register, k);
        (tile_row * BASE_ROWS + row, tile_col * Self::BASE_COLS + col)
    }

    fn slot(tile: usize, register: usize, k: usize) -> usize {
        (tile * REGISTERS_PER_BASE_TILE + register) * Self::PACK + k
    }

    fn register_range(
        lane: usize,
        (tile_row, tile_col): (usize, usize),
        register: usize,
    ) -> core::ops::Range<usize> {
        let tile = tile_row * Self::WIDTH + tile_col;
        let start = lane * Self::SLOTS + Self::slot(tile, register, 0);
        start..start + Self::PACK
    }

    /// Element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> E {
        let (lane, slot) = Self::locate(row, col);
        self.values[lane * Self::SLOTS + slot]
    }

    /// Set the element at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: E) {
        let (lane, slot) = Self::locate(row, col);
        self.values[lane * Self::SLOTS + slot] = value;
    }

    /// Elements held by `lane`, in slot order.
    pub fn lane(&self, lane: usize) -> &[E] {
        &self.values[lane * Self::SLOTS..(lane + 1) * Self::SLOTS]
    }

    /// Mutable elements held by `lane`, in slot order.
    pub fn lane_mut(&mut self, lane: usize) -> &mut [E] {
        &mut self.values[lane * Self::SLOTS..(lane + 1) * Self::SLOTS]
    }

    /// Packed register of `lane` for base tile `tile`.
    pub fn register(&self, lane: usize, tile: (usize, usize), register: usize) -> &[E] {
        &self.values[Self::register_range(lane, tile, register)]
    }

    /// Mutable packed register of `lane` for base tile `tile`.
    pub fn register_mut(
        &mut self,
        lane: usize,
        tile: (usize, usize),
        register: usize,
    ) -> &mut [E] {
        &mut self.values[Self::register_range(lane, tile, register)]
    }

    /// Set every element to zero.
    pub fn zero(&mut self) {
        self.fill(E::default());
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: E) {
        self.values.fill(value);
    }

    /// Elements in row-major order.
    pub fn to_row_major(&self) -> Vec<E> {
        (0..R * C)
            .map(|index| self.get(index / C, index % C))
            .collect()
    }

    /// Same content distributed with another layout.
    pub fn to_layout<L2: FragmentLayout>(&self) -> RegisterFragment<E, R, C, L2> {
        RegisterFragment::from_fn(|row, col| self.get(row, col))
    }

    /// Same content converted to another element of the same width class, keeping the mapping.
    pub fn convert<T: Element<Width = E::Width>>(&self) -> RegisterFragment<T, R, C, L> {
        RegisterFragment {
            values: self.values.iter().map(|value| convert(*value)).collect(),
            _layout: PhantomData,
        }
    }
}

impl<E: Element, const R: usize, const C: usize, L: FragmentLayout> Default
    for RegisterFragment<E, R, C, L>
{
    fn default() -> Self {
        Self::new()
    }
}
