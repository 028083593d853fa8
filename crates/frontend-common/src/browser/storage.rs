//! `localStorage` / `sessionStorage` adapter

use super::describe_js;
use carenest_core::{KeyValueStore, StoreError};
use web_sys::Storage;

/// Which web storage area to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Local,
    Session,
}

/// Web storage resolved on every call, so a storage area disabled by the
/// browser surfaces as [`StoreError::Unavailable`] instead of a panic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebStorage {
    area: StorageArea,
}

impl WebStorage {
    pub const fn local() -> Self {
        Self {
            area: StorageArea::Local,
        }
    }

    pub const fn session() -> Self {
        Self {
            area: StorageArea::Session,
        }
    }

    pub const fn area(&self) -> StorageArea {
        self.area
    }

    fn storage(&self) -> Result<Storage, StoreError> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".to_string()))?;
        let storage = match self.area {
            StorageArea::Local => window.local_storage(),
            StorageArea::Session => window.session_storage(),
        };
        storage
            .map_err(|e| StoreError::Unavailable(describe_js(&e)))?
            .ok_or_else(|| StoreError::Unavailable(format!("{:?} storage disabled", self.area)))
    }
}

impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StoreError::Operation(describe_js(&e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Operation(describe_js(&e)))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StoreError::Operation(describe_js(&e)))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.storage()?
            .clear()
            .map_err(|e| StoreError::Operation(describe_js(&e)))
    }

    fn len(&self) -> Result<usize, StoreError> {
        self.storage()?
            .length()
            .map(|len| len as usize)
            .map_err(|e| StoreError::Operation(describe_js(&e)))
    }
}
