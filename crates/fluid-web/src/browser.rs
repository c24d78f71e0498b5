//! Browser-backed implementations of the engine's host seams.

use fluid_engine::{SensorTransport, Storage, StorageError};
use wasm_bindgen::JsValue;

/// Persists text blobs in `window.localStorage`, one item per key.
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

impl LocalStorage {
    /// Bind to the page's local storage. A page without one (private mode,
    /// sandboxed iframe) still boots; every read and write reports `Unavailable`.
    pub fn new() -> Self {
        let inner = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if inner.is_none() {
            log::warn!("localStorage is not available; nothing will be persisted");
        }
        Self { inner }
    }

    fn store(&self) -> Result<&web_sys::Storage, StorageError> {
        self.inner
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("no localStorage".to_string()))
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for LocalStorage {
    fn read(&self, key: &str) -> Result<String, StorageError> {
        match self.store()?.get_item(key) {
            Ok(Some(contents)) => Ok(contents),
            Ok(None) => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(StorageError::Unavailable(describe(&e))),
        }
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<(), StorageError> {
        self.store()?
            .set_item(key, contents)
            .map_err(|e| StorageError::Unavailable(describe(&e)))
    }
}

/// Asks the page to poll the serial device by calling a JS function.
///
/// The page owns the actual Web Serial port; replies come back through
/// `fluid_sensor_payload`.
pub struct JsSensorRequest {
    callback: js_sys::Function,
}

impl JsSensorRequest {
    pub fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }
}

impl SensorTransport for JsSensorRequest {
    fn request_reading(&mut self) {
        if let Err(e) = self.callback.call0(&JsValue::NULL) {
            log::warn!("Sensor request callback failed: {}", describe(&e));
        }
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
