//! Fixed-size instance pool
//!
//! Slots are addressed by [`Handle`]s carrying a generation counter, so a
//! handle kept after `release` is rejected instead of reaching whichever
//! instance reuses the slot.

use crate::error::{Error, Result};

/// Reference to an acquired pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Handle {
    index: u8,
    generation: u16,
}

impl Handle {
    pub const fn new(index: u8, generation: u16) -> Self {
        Self { index, generation }
    }

    /// Slot index
    pub const fn index(&self) -> usize {
        self.index as usize
    }

    /// Non-zero identifier for logs and host APIs
    pub const fn id(&self) -> u8 {
        self.index + 1
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u16,
    item: Option<T>,
}

/// Arena of at most `N` instances
#[derive(Debug)]
pub struct Pool<T, const N: usize> {
    slots: [Slot<T>; N],
}

impl<T, const N: usize> Default for Pool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Pool<T, N> {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| Slot {
                generation: 0,
                item: None,
            }),
        }
    }

    /// Place an instance built from its handle in a free slot
    ///
    /// Returns `None` when the pool is full.
    pub fn acquire_with(&mut self, build: impl FnOnce(Handle) -> T) -> Option<Handle> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.item.is_none())?;
        let handle = Handle::new(u8::try_from(index).ok()?, slot.generation);
        slot.item = Some(build(handle));
        Some(handle)
    }

    /// Free a slot, returning its instance
    pub fn release(&mut self, handle: Handle) -> Result<T> {
        let slot = self.slot_mut(handle)?;
        let item = slot.item.take().ok_or(Error::UnknownOrInactiveHandle)?;
        slot.generation = slot.generation.wrapping_add(1);
        Ok(item)
    }

    pub fn get(&self, handle: Handle) -> Result<&T> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.item.as_ref())
            .ok_or(Error::UnknownOrInactiveHandle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T> {
        self.slot_mut(handle)?
            .item
            .as_mut()
            .ok_or(Error::UnknownOrInactiveHandle)
    }

    fn slot_mut(&mut self, handle: Handle) -> Result<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation)
            .ok_or(Error::UnknownOrInactiveHandle)
    }

    /// Number of acquired slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.item.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == N
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_until_full() {
        let mut pool: Pool<u32, 2> = Pool::new();
        let a = pool.acquire_with(|_| 10).unwrap();
        let b = pool.acquire_with(|h| h.id() as u32).unwrap();
        assert_eq!(pool.acquire_with(|_| 30), None);
        assert!(pool.is_full());

        assert_eq!(a.id(), 1);
        assert_eq!(pool.get(a), Ok(&10));
        assert_eq!(pool.get(b), Ok(&2));
    }

    #[test]
    fn test_release_invalidates_handle() {
        let mut pool: Pool<u32, 1> = Pool::new();
        let first = pool.acquire_with(|_| 1).unwrap();
        assert_eq!(pool.release(first), Ok(1));
        assert_eq!(pool.release(first), Err(Error::UnknownOrInactiveHandle));

        let second = pool.acquire_with(|_| 2).unwrap();
        assert_eq!(second.index(), first.index());
        assert_ne!(second, first);
        assert_eq!(pool.get(first), Err(Error::UnknownOrInactiveHandle));
        assert_eq!(pool.get_mut(second).map(|v| *v), Ok(2));
    }

    #[test]
    fn test_unknown_handle() {
        let mut pool: Pool<u32, 2> = Pool::new();
        let bogus = Handle::new(5, 0);
        assert_eq!(pool.get(bogus), Err(Error::UnknownOrInactiveHandle));
        assert_eq!(pool.release(Handle::new(0, 0)), Err(Error::UnknownOrInactiveHandle));
        assert!(pool.is_empty());
    }
}
