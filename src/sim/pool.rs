//! Slot arena for transient entities
//!
//! Instances are allocated once and recycled through a free-list. Handles
//! carry a generation so a stale handle can never release (or read) the
//! instance that later reused its slot.
//!
//! Growth policy: `acquire` on an exhausted pool allocates one more slot.

/// Something that can live in a [`Pool`]
pub trait Poolable: Default {
    /// Restore the exact state of a freshly allocated instance
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Generational reference to a pooled instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Slot index (stable for the life of the pool)
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    item: T,
    generation: u32,
    active: bool,
}

/// Pre-allocated, growable set of reusable instances
#[derive(Debug, Clone)]
pub struct Pool<T: Poolable> {
    slots: Vec<Slot<T>>,
    /// Inactive slot indices (LIFO)
    free: Vec<u32>,
    /// Active slot indices in acquisition order
    active: Vec<u32>,
}

impl<T: Poolable> Default for Pool<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T: Poolable> Pool<T> {
    /// Pre-allocate `capacity` inactive instances
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot {
            item: T::default(),
            generation: 0,
            active: false,
        });
        // Reverse so the lowest index is handed out first
        let free = (0..capacity as u32).rev().collect();
        Self {
            slots,
            free,
            active: Vec::with_capacity(capacity),
        }
    }

    /// Take an inactive instance (growing the pool if none is left)
    pub fn acquire(&mut self) -> (Handle, &mut T) {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    item: T::default(),
                    generation: 0,
                    active: false,
                });
                log::debug!("Pool grew to {} instances", self.slots.len());
                index
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.active = true;
        self.active.push(index);

        (
            Handle {
                index,
                generation: slot.generation,
            },
            &mut slot.item,
        )
    }

    /// Return an instance to the pool. Returns false (and does nothing) if the
    /// handle is stale or already released.
    pub fn release(&mut self, handle: Handle) -> bool {
        if !self.is_active(handle) {
            return false;
        }
        if let Some(pos) = self.active.iter().position(|&i| i == handle.index) {
            self.active.remove(pos);
        }
        self.deactivate(handle.index);
        true
    }

    /// Return every active instance to the pool
    pub fn release_all(&mut self) {
        let active = std::mem::take(&mut self.active);
        for &index in &active {
            self.deactivate(index);
        }
        // Keep the allocation of the active list
        self.active = active;
        self.active.clear();
    }

    fn deactivate(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.active = false;
        slot.item.reset();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
    }

    /// Whether `handle` still refers to a live instance
    pub fn is_active(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|s| s.active && s.generation == handle.generation)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.active && s.generation == handle.generation)
            .map(|s| &s.item)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.active && s.generation == handle.generation)
            .map(|s| &mut s.item)
    }

    /// Active instances in acquisition order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.active.iter().map(move |&index| {
            let slot = &self.slots[index as usize];
            (
                Handle {
                    index,
                    generation: slot.generation,
                },
                &slot.item,
            )
        })
    }

    /// Active instances in acquisition order (items only)
    pub fn active(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(_, item)| item)
    }

    /// First active instance matching `pred`
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<Handle> {
        self.iter().find(|(_, item)| pred(item)).map(|(h, _)| h)
    }

    /// Visit every active instance mutably, releasing those for which `keep`
    /// returns false. Survivors keep their relative order.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        let mut i = 0;
        while i < self.active.len() {
            let index = self.active[i];
            if keep(&mut self.slots[index as usize].item) {
                i += 1;
            } else {
                self.active.remove(i);
                self.deactivate(index);
            }
        }
    }

    /// Number of active instances
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of inactive instances ready for reuse
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Total instances ever allocated
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }
}
