use core::marker::PhantomData;
use tilecl_common::Element;
use tilecl_runtime::{
    memory::{ScratchAllocator, ScratchMemory},
    DeviceProperties, MemoryError,
};

/// Contiguous vector of `LEN` elements in scratch memory, without swizzling.
///
/// The allocation is padded to the device vector alignment so following tiles and vectors stay
/// aligned. The padding is never addressed.
#[derive(Debug, Clone, Copy)]
pub struct SharedVector<'a, E: Element, const LEN: usize> {
    memory: &'a ScratchMemory,
    base: u32,
    _elem: PhantomData<E>,
}

impl<'a, E: Element, const LEN: usize> SharedVector<'a, E, LEN> {
    /// Number of elements reserved on a device, padding included.
    pub fn alloc_len(props: &DeviceProperties) -> usize {
        let quantum = props.vector_alignment;
        (LEN * E::SIZE).div_ceil(quantum) * quantum / E::SIZE
    }

    /// Allocate a vector aligned to the device vector alignment.
    pub fn new(
        allocator: &mut ScratchAllocator<'a>,
        props: &DeviceProperties,
    ) -> Result<Self, MemoryError> {
        let size = Self::alloc_len(props) * E::SIZE;
        let base = allocator.allocate(size, props.vector_alignment)?;

        Ok(Self {
            memory: allocator.memory(),
            base,
            _elem: PhantomData,
        })
    }

    /// Base address.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Byte address of element `index`.
    pub fn address(&self, index: usize) -> u32 {
        debug_assert!(index < LEN, "Index {index} out of a vector of {LEN}");
        self.base + (index * E::SIZE) as u32
    }

    /// Read element `index`.
    pub fn get(&self, index: usize) -> E {
        self.memory.load(self.address(index))
    }

    /// Write element `index`.
    pub fn set(&self, index: usize, value: E) {
        self.memory.store(self.address(index), value)
    }

    /// Set every element to `value`.
    pub fn fill(&self, value: E) {
        for index in 0..LEN {
            self.set(index, value);
        }
    }

    /// Write `LEN` elements.
    pub fn copy_from_slice(&self, values: &[E]) {
        assert_eq!(values.len(), LEN);
        for (index, value) in values.iter().enumerate() {
            self.set(index, *value);
        }
    }

    /// Read the whole vector.
    pub fn to_vec(&self) -> Vec<E> {
        (0..LEN).map(|index| self.get(index)).collect()
    }
}
