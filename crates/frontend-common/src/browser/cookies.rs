//! `document.cookie` adapter

use super::describe_js;
use carenest_core::storage::{expired_cookie, parse_cookie_names};
use carenest_core::{CookieJar, StoreError};
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

/// Cookies visible to the current document
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentCookies;

impl DocumentCookies {
    fn document() -> Result<HtmlDocument, StoreError> {
        web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| StoreError::Unavailable("no document".to_string()))?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| StoreError::Unavailable("document is not an HTML document".to_string()))
    }
}

impl CookieJar for DocumentCookies {
    fn names(&self) -> Result<Vec<String>, StoreError> {
        let raw = Self::document()?
            .cookie()
            .map_err(|e| StoreError::Operation(describe_js(&e)))?;
        Ok(parse_cookie_names(&raw))
    }

    fn expire(&self, name: &str) -> Result<(), StoreError> {
        Self::document()?
            .set_cookie(&expired_cookie(name))
            .map_err(|e| StoreError::Operation(describe_js(&e)))
    }
}
