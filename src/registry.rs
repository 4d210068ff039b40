use std::collections::HashMap;

/// Registration handle. Never reused within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Key(u64);

struct Entry<S> {
    key: Key,
    sink: S,
    // Used only for entries still present when the registry is dropped.
    close: fn(S),
}

/// Unordered sink storage with O(1) removal by [Key].
///
/// Removal swaps the last entry into the freed slot, so iteration order
/// changes over time.
///
/// Removed sinks are handed back to the caller. Sinks still registered when
/// the registry is dropped are passed to the `close` given at insertion.
pub(crate) struct Registry<S> {
    entries: Vec<Entry<S>>,
    // key -> index in `entries`
    positions: HashMap<Key, usize>,
    next_key: u64,
}

impl<S> Default for Registry<S> {
    #[inline]
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
            next_key: 0,
        }
    }
}

impl<S> Registry<S> {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Linear scan.
    #[inline]
    pub fn any(&self, mut f: impl FnMut(&S) -> bool) -> bool {
        self.entries.iter().any(|entry| f(&entry.sink))
    }

    pub fn insert(&mut self, sink: S, close: fn(S)) -> Key {
        let key = Key(self.next_key);
        self.next_key += 1;

        self.positions.insert(key, self.entries.len());
        self.entries.push(Entry { key, sink, close });
        key
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&S> {
        self.entries.get(index).map(|entry| &entry.sink)
    }

    #[inline]
    pub fn key_at(&self, index: usize) -> Key {
        self.entries[index].key
    }

    pub fn remove(&mut self, key: Key) -> Option<S> {
        let index = self.positions.get(&key).copied()?;
        Some(self.swap_remove(index))
    }

    /// Removes the entry at `index`, moving the last entry in its place.
    pub fn swap_remove(&mut self, index: usize) -> S {
        let Entry { key, sink, .. } = self.entries.swap_remove(index);
        self.positions.remove(&key);
        if let Some(moved) = self.entries.get(index) {
            self.positions.insert(moved.key, index);
        }
        sink
    }

    pub fn drain(&mut self) -> impl Iterator<Item = S> + '_ {
        self.positions.clear();
        self.entries.drain(..).map(|entry| entry.sink)
    }
}

impl<S> Drop for Registry<S> {
    fn drop(&mut self) {
        for Entry { sink, close, .. } in self.entries.drain(..) {
            close(sink);
        }
    }
}
