#![cfg(target_arch = "wasm32")]

use carenest_core::{CookieJar, KeyValueStore};
use carenest_frontend_common::browser::{DocumentCookies, WebStorage};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn web_storage_clear_empties_the_area() {
    let storage = WebStorage::session();
    storage.set("carenest.test", "1").unwrap();
    assert_eq!(storage.get("carenest.test").unwrap().as_deref(), Some("1"));

    storage.clear().unwrap();
    assert!(storage.is_empty().unwrap());
}

#[wasm_bindgen_test]
fn expired_cookies_disappear_from_the_document() {
    let jar = DocumentCookies;
    let document = web_sys::window()
        .and_then(|w| w.document())
        .unwrap()
        .dyn_into::<web_sys::HtmlDocument>()
        .unwrap();
    document.set_cookie("carenest_probe=1;path=/").unwrap();
    assert!(jar.names().unwrap().iter().any(|n| n == "carenest_probe"));

    jar.expire("carenest_probe").unwrap();
    assert!(!jar.names().unwrap().iter().any(|n| n == "carenest_probe"));
}
