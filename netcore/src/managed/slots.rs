use alloc::vec::Vec;

/// A fixed capacity arena with generation checked keys.
///
/// Every element is addressed by a [`Key`] that stays valid until the element is removed. Using
/// the key afterwards fails, even when the slot has been reused by another element in the
/// meantime.
///
/// ```
/// # use netcore::managed::Slots;
/// let mut slots = Slots::new(2);
/// let key = slots.insert(42).unwrap();
/// assert_eq!(slots.get(key).copied(), Some(42));
/// assert_eq!(slots.remove(key), Some(42));
/// assert_eq!(slots.get(key), None);
/// ```
///
/// [`Key`]: struct.Key.html
#[derive(Debug, Clone)]
pub struct Slots<T> {
    slots: Vec<Slot<T>>,
    len: usize,
}

/// A key into `Slots`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    idx: usize,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    /// Bumped whenever the element is removed.
    generation: u32,
    value: Option<T>,
}

impl<T> Slots<T> {
    /// Create an empty arena with room for `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot { generation: 0, value: None });
        Slots { slots, len: 0 }
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// If no element is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of elements.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// If another insertion would fail.
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Store a value in a free slot.
    ///
    /// Returns the value back when the arena is full.
    pub fn insert(&mut self, value: T) -> Result<Key, T> {
        let idx = match self.slots.iter().position(|slot| slot.value.is_none()) {
            Some(idx) => idx,
            None => return Err(value),
        };

        let slot = &mut self.slots[idx];
        slot.value = Some(value);
        self.len += 1;
        Ok(Key { idx, generation: slot.generation })
    }

    /// Retrieve a value by key.
    pub fn get(&self, key: Key) -> Option<&T> {
        let slot = self.slots.get(key.idx)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Retrieve a mutable value by key.
    pub fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        let slot = self.slots.get_mut(key.idx)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Remove an element, invalidating its key.
    pub fn remove(&mut self, key: Key) -> Option<T> {
        let slot = self.slots.get_mut(key.idx)?;
        if slot.generation != key.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.len -= 1;
        Some(value)
    }

    /// Find the key of the first element matching a predicate.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<Key> {
        self.iter()
            .find(|(_, value)| pred(value))
            .map(|(key, _)| key)
    }

    /// Iterate over all stored elements with their keys.
    pub fn iter(&self) -> impl Iterator<Item=(Key, &T)> + '_ {
        self.slots.iter()
            .enumerate()
            .filter_map(|(idx, slot)| {
                let key = Key { idx, generation: slot.generation };
                slot.value.as_ref().map(|value| (key, value))
            })
    }

    /// Iterate mutably over all stored elements with their keys.
    pub fn iter_mut(&mut self) -> impl Iterator<Item=(Key, &mut T)> + '_ {
        self.slots.iter_mut()
            .enumerate()
            .filter_map(|(idx, slot)| {
                let key = Key { idx, generation: slot.generation };
                slot.value.as_mut().map(|value| (key, value))
            })
    }

    /// Remove all elements for which the predicate returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        for slot in self.slots.iter_mut() {
            let remove = match &mut slot.value {
                Some(value) => !keep(value),
                None => false,
            };
            if remove {
                slot.value = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.len -= 1;
            }
        }
    }
}
