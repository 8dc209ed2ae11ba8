//! Persistent key/value store
//!
//! Backends report failures through [`KeyValueStore::Error`]; the
//! [`PersistentStore`] wrapper swallows them so that a disabled or full
//! storage area never interrupts a preference change.
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::rc::Rc;

/// Trait for abstracting device-local key/value persistence.
/// Platform-specific implementations should provide this.
pub trait KeyValueStore {
    type Error: std::error::Error + 'static;

    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    fn remove(&mut self, key: &str) -> Result<(), Self::Error>;
}

/// Infallible facade over a [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct PersistentStore<S> {
    backend: S,
}

impl<S: KeyValueStore> PersistentStore<S> {
    pub const fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Read a value. A failed read is logged and returned so the caller can
    /// keep what it already holds instead of treating the key as unset.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the read fails.
    pub fn get(&self, key: &str) -> Result<Option<String>, S::Error> {
        self.backend
            .get(key)
            .inspect_err(|err| log::warn!("storage read of {key} failed: {err}"))
    }

    pub fn set(&mut self, key: &str, value: &str) {
        if let Err(err) = self.backend.set(key, value) {
            log::warn!("storage write of {key} failed: {err}");
        }
    }

    pub fn remove(&mut self, key: &str) {
        if let Err(err) = self.backend.remove(key) {
            log::warn!("storage delete of {key} failed: {err}");
        }
    }

    pub fn remove_all<K: AsRef<str>>(&mut self, keys: impl IntoIterator<Item = K>) {
        for key in keys {
            self.remove(key.as_ref());
        }
    }

    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.backend
    }
}

/// In-process backend. Clones share the same underlying map, which lets a
/// test keep a handle on what the engine persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing entries.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::default();
        store.entries.borrow_mut().extend(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        store
    }

    #[must_use]
    pub fn read(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn delete(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    /// Wipe everything, as a user clearing site data would.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.read(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    struct DisabledStore;

    impl KeyValueStore for DisabledStore {
        type Error = StoreError;

        fn get(&self, _key: &str) -> Result<Option<String>, Self::Error> {
            Err(StoreError::Unavailable)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), Self::Error> {
            Err(StoreError::Unavailable)
        }

        fn remove(&mut self, _key: &str) -> Result<(), Self::Error> {
            Err(StoreError::Unavailable)
        }
    }

    #[test]
    fn clones_share_entries() {
        let memory = MemoryStore::new();
        let mut store = PersistentStore::new(memory.clone());
        store.set("a11y.zoom", "2");
        assert_eq!(memory.read("a11y.zoom").as_deref(), Some("2"));
        store.remove_all(["a11y.zoom", "a11y.never-set"]);
        assert!(memory.is_empty());
    }

    #[test]
    fn disabled_backend_fails_silently() {
        let mut store = PersistentStore::new(DisabledStore);
        store.set("a11y.zoom", "2");
        store.remove("a11y.zoom");
        assert!(store.get("a11y.zoom").is_err());

        let mut memory = PersistentStore::new(MemoryStore::new());
        assert_eq!(memory.get("a11y.zoom"), Ok(None));
        memory.set("a11y.zoom", "1");
        assert_eq!(memory.get("a11y.zoom"), Ok(Some("1".to_string())));
    }
}
