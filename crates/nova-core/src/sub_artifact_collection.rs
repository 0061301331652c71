//! Ordered, id-keyed collection of sub-artifacts

use crate::error::NovaError;
use indexmap::IndexMap;
use parking_lot::RwLock;

/// Anything with a stable integer id
pub trait Keyed {
    fn key(&self) -> i32;
}

impl<T: Keyed + ?Sized> Keyed for std::sync::Arc<T> {
    fn key(&self) -> i32 {
        (**self).key()
    }
}

/// Sub-artifacts of one artifact, in insertion order.
///
/// [`initialise`](Self::initialise) replaces the whole contents atomically:
/// readers see either the old set or the new one, never a mix.
#[derive(Debug)]
pub struct SubArtifactCollection<T> {
    items: RwLock<IndexMap<i32, T>>,
}

impl<T> Default for SubArtifactCollection<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(IndexMap::new()),
        }
    }
}

impl<T: Keyed + Clone> SubArtifactCollection<T> {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `items`
    ///
    /// # Errors
    /// `NovaError::DuplicateId` when two items share an id; the current
    /// contents are left untouched
    pub fn initialise(&self, items: impl IntoIterator<Item = T>) -> Result<(), NovaError> {
        let mut fresh = IndexMap::new();
        for item in items {
            let key = item.key();
            if fresh.insert(key, item).is_some() {
                return Err(NovaError::DuplicateId(key));
            }
        }
        *self.items.write() = fresh;
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: i32) -> Option<T> {
        self.items.read().get(&id).cloned()
    }

    /// Snapshot in insertion order
    #[must_use]
    pub fn list(&self) -> Vec<T> {
        self.items.read().values().cloned().collect()
    }

    /// Append one item
    ///
    /// # Errors
    /// `NovaError::DuplicateId` if the id is taken
    pub fn add(&self, item: T) -> Result<(), NovaError> {
        let mut items = self.items.write();
        let key = item.key();
        if items.contains_key(&key) {
            return Err(NovaError::DuplicateId(key));
        }
        items.insert(key, item);
        Ok(())
    }

    /// Remove by id, keeping the order of the rest
    pub fn remove(&self, id: i32) -> Option<T> {
        self.items.write().shift_remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: i32) -> bool {
        self.items.read().contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}
