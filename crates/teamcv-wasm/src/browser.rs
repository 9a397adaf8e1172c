//! Browser-backed implementations of the core persistence and time seams

use chrono::{DateTime, Utc};
use teamcv_core::{Clock, KeyValueStorage, StorageError};
use wasm_bindgen::JsValue;

/// `window.localStorage`
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// `None` when there is no window or storage is disabled (e.g. private mode)
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

/// Best-effort `name: message` of a thrown JS value
fn describe(err: &JsValue) -> (String, String) {
    let field = |name: &str| {
        js_sys::Reflect::get(err, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    };
    (field("name"), field("message"))
}

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(|err| {
            let (_, message) = describe(&err);
            StorageError::Unavailable(message)
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(|err| match describe(&err) {
            (name, _) if name == "QuotaExceededError" => StorageError::QuotaExceeded(key.to_string()),
            (name, message) => StorageError::Backend(format!("{}: {}", name, message)),
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(|err| {
            let (name, message) = describe(&err);
            StorageError::Backend(format!("{}: {}", name, message))
        })
    }
}

/// `Date.now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }
}
