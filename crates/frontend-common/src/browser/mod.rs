//! Browser implementations of the core storage and navigation traits

mod cookies;
mod navigation;
mod storage;

pub use cookies::DocumentCookies;
pub use navigation::BrowserNavigator;
pub use storage::{StorageArea, WebStorage};

/// Current time as a unix timestamp (seconds)
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Render a `JsValue` error for logs and error variants
pub(crate) fn describe_js(value: &wasm_bindgen::JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Spawner running tasks on the browser's event loop
pub fn local_spawner() -> carenest_core::Spawner {
    std::rc::Rc::new(|task: futures::future::LocalBoxFuture<'static, ()>| {
        wasm_bindgen_futures::spawn_local(task);
    })
}
