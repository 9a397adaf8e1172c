mod api;
mod browser;

pub use api::{ExportTicket, JsApiError, ResumeApp};
pub use browser::{JsClock, LocalStorage};

use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
