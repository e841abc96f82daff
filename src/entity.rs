use std;
use fnv::FnvHashSet;

/// Stable identifier for a scene node; never reused while the node lives
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct Handle {
    _value: u32,
}

impl Handle {
    fn new(index: u32) -> Handle {
        Handle {
            _value: index,
        }
    }

    pub fn get_index(self) -> u32 {
        self._value
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, out: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(out, "#{}", self._value)
    }
}

/// Allocates handles. Indices increase monotonically (wrapping),
/// skipping any that are still alive.
pub struct Manager {
    data:  FnvHashSet<Handle>,
    index: u32,
}

impl Manager {
    pub fn new(hint: usize) -> Manager {
        let mut data = FnvHashSet::default();
        data.reserve(hint);

        Manager {
            data,
            index: 0,
        }
    }

    pub fn add(&mut self) -> Handle {
        if self.data.len() == u32::max_value() as usize {
            panic!("Out of space for new scene nodes!");
        }

        // If a handle is still alive, skip
        while self.check(Handle::new(self.index)) {
            self.index = self.index.wrapping_add(1);
        }

        let handle = Handle::new(self.index);
        self.data.insert(handle);

        // Offset for next time
        self.index = self.index.wrapping_add(1);

        trace!("allocated node handle {}", handle);

        handle
    }

    pub fn check(&self, handle: Handle) -> bool {
        self.data.contains(&handle)
    }

    /// Idempotent; returns whether the handle was alive
    pub fn remove(&mut self, handle: Handle) -> bool {
        let removed = self.data.remove(&handle);

        if removed {
            trace!("released node handle {}", handle);
        }

        removed
    }

    pub fn count(&self) -> usize {
        self.data.len()
    }
}
