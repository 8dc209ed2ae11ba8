//! `localStorage` backend for the preference store.
use ally_engine::{KeyValueStore, StoreError};
use web_sys::Storage;

use crate::dom::{self, js_error_message};

/// Browser-local persistence. A missing or blocked storage area (private
/// mode, sandboxed iframes) reports [`StoreError::Unavailable`] on every call.
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    #[must_use]
    pub fn open() -> Self {
        let storage = dom::local_storage()
            .inspect_err(|err| log::warn!("preferences will not persist: {err}"))
            .ok();
        Self { storage }
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.storage.is_some()
    }

    fn storage(&self) -> Result<&Storage, StoreError> {
        self.storage.as_ref().ok_or(StoreError::Unavailable)
    }
}

impl KeyValueStore for LocalStorageStore {
    type Error = StoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        self.storage()?
            .get_item(key)
            .map_err(|err| StoreError::Rejected {
                op: "read",
                key: key.to_string(),
                reason: js_error_message(&err),
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| StoreError::Rejected {
                op: "write",
                key: key.to_string(),
                reason: js_error_message(&err),
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
        self.storage()?
            .remove_item(key)
            .map_err(|err| StoreError::Rejected {
                op: "delete",
                key: key.to_string(),
                reason: js_error_message(&err),
            })
    }
}
