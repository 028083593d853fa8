//! Browser-persisted state behind injectable traits
//!
//! Local storage, session storage and cookies are all reached through these
//! traits so session recovery can be exercised without a browser.

use std::cell::RefCell;
use std::collections::BTreeMap;

/// Expiry used to delete a cookie
pub const COOKIE_EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Errors from a key/value store or cookie jar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage operation failed: {0}")]
    Operation(String),
}

/// A string key/value area such as `localStorage` or `sessionStorage`
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    /// Remove every entry
    fn clear(&self) -> Result<(), StoreError>;
    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Cookies reachable by the current document
pub trait CookieJar {
    /// Names of every visible cookie
    fn names(&self) -> Result<Vec<String>, StoreError>;
    /// Rewrite the cookie with a past expiry and root path
    fn expire(&self, name: &str) -> Result<(), StoreError>;
}

/// Cookie names from a `document.cookie` style string (`a=1; b=2`)
#[must_use]
pub fn parse_cookie_names(raw: &str) -> Vec<String> {
    raw.split(';')
        .filter_map(|pair| {
            let name = pair.split('=').next().unwrap_or_default().trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Assignment string that expires `name` at the root path
#[must_use]
pub fn expired_cookie(name: &str) -> String {
    format!("{name}=;expires={COOKIE_EPOCH};path=/")
}

/// In-memory key/value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RefCell::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.entries.borrow_mut().clear();
        Ok(())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.borrow().len())
    }
}

/// In-memory cookie jar keeping the raw assignment strings it was given
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: RefCell<BTreeMap<String, String>>,
    writes: RefCell<Vec<String>>,
}

impl MemoryCookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: &str, value: &str) {
        self.cookies
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    /// Every assignment written through [`CookieJar::expire`]
    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }
}

impl CookieJar for MemoryCookieJar {
    fn names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.cookies.borrow().keys().cloned().collect())
    }

    fn expire(&self, name: &str) -> Result<(), StoreError> {
        self.writes.borrow_mut().push(expired_cookie(name));
        self.cookies.borrow_mut().remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_names_are_trimmed_and_skip_blanks() {
        assert_eq!(
            parse_cookie_names("sb-access=abc; theme=dark;  ;flag"),
            vec!["sb-access", "theme", "flag"]
        );
        assert!(parse_cookie_names("").is_empty());
    }

    #[test]
    fn cookie_values_with_equals_keep_the_name() {
        assert_eq!(parse_cookie_names("token=a=b=c"), vec!["token"]);
    }

    #[test]
    fn expired_cookie_uses_root_path() {
        assert_eq!(
            expired_cookie("sb-refresh"),
            "sb-refresh=;expires=Thu, 01 Jan 1970 00:00:00 GMT;path=/"
        );
    }

    #[test]
    fn memory_store_clear_removes_everything() {
        let store = MemoryStore::with_entries([("a", "1"), ("b", "2")]);
        assert_eq!(store.len().unwrap(), 2);
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
        // Clearing an empty store is fine.
        store.clear().unwrap();
    }

    #[test]
    fn memory_jar_records_expiry_writes() {
        let jar = MemoryCookieJar::new();
        jar.insert("session", "x");
        jar.expire("session").unwrap();
        assert!(jar.names().unwrap().is_empty());
        assert_eq!(jar.writes(), vec![expired_cookie("session")]);
    }
}
