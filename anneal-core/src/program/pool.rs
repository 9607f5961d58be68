//! Fixed-capacity node arenas
//!
//! Pools hand out slots without heap allocation. Slots are never freed
//! individually; `reset` reclaims every slot at once and bumps the pool
//! generation so handles from the previous program stop resolving.

use core::fmt;
use core::marker::PhantomData;

use heapless::Vec;

/// Pool allocation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PoolError {
    /// Every slot is in use
    Exhausted,
}

/// Handle to a slot in a [`Pool`]
///
/// Carries the pool generation it was issued under.
pub struct Handle<T> {
    index: u8,
    generation: u16,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u8, generation: u16) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index within the pool
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}@{})", self.index, self.generation)
    }
}

#[cfg(feature = "defmt")]
impl<T> defmt::Format for Handle<T> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Handle({}@{})", self.index, self.generation)
    }
}

/// Arena of up to `N` values of `T`
#[derive(Debug, Clone)]
pub struct Pool<T, const N: usize> {
    slots: Vec<T, N>,
    generation: u16,
}

impl<T, const N: usize> Pool<T, N> {
    /// Create an empty pool
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            generation: 0,
        }
    }

    /// Place a value in the next free slot
    pub fn alloc(&mut self, value: T) -> Result<Handle<T>, PoolError> {
        let index = self.slots.len();
        if index > u8::MAX as usize {
            return Err(PoolError::Exhausted);
        }
        self.slots.push(value).map_err(|_| PoolError::Exhausted)?;
        Ok(Handle::new(index as u8, self.generation))
    }

    /// Resolve a handle issued by the current generation
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if handle.generation != self.generation {
            return None;
        }
        self.slots.get(handle.index())
    }

    /// Resolve a handle issued by the current generation, mutably
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if handle.generation != self.generation {
            return None;
        }
        self.slots.get_mut(handle.index())
    }

    /// Reclaim all slots and invalidate every outstanding handle
    pub fn reset(&mut self) {
        self.slots.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Slots in use
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if no slot is in use
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total number of slots
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for Pool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
