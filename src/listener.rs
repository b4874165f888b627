use std::collections::BTreeMap;

/// Data listener
pub type Listener = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// Listener handle
///
/// Handles are issued from a monotonic counter and stay valid until the
/// listener they refer to is removed, regardless of other removals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl core::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered set of listeners
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    listeners: BTreeMap<ListenerId, Listener>,
}

impl core::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_set().entries(self.listeners.keys()).finish()
    }
}

impl Listeners {
    /// Add listener and get its handle
    pub fn insert(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    /// Remove listener (returns false when handle is unknown)
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Invoke every listener in registration order
    pub fn notify(&mut self, data: &[u8]) {
        for listener in self.listeners.values_mut() {
            listener(data);
        }
    }
}
