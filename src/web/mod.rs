//! Browser implementations of the host traits.
//!
//! Only compiled with the `browser` feature, for `wasm32-unknown-unknown`.
//! Values cross the JS boundary as JSON (`JSON.stringify`/`JSON.parse`), which
//! matches what structured clone preserves for the plain objects the bridge
//! protocol uses.

mod bindings;
mod events;
mod fetch;
mod page;
mod widget;

use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::JsValue;

use crate::host::{Host, HostError, parse_stringified};

pub use bindings::JsCustomerProfilesClient;
pub use events::WindowMessages;
pub use fetch::BrowserFetch;
pub use page::BrowserPage;
pub use widget::{DocumentWidgets, IframeWidget};

/// Host collaborators backed by the current window and document.
///
/// # Errors
///
/// Returns [`HostError::Unavailable`] outside a window context (e.g. in a
/// worker).
pub fn browser_host() -> Result<Host, HostError> {
    let window = web_sys::window().ok_or(HostError::Unavailable("window"))?;
    let document = window.document().ok_or(HostError::Unavailable("document"))?;

    Ok(Host {
        page: Rc::new(BrowserPage::new(window.clone())),
        fetch: Rc::new(BrowserFetch::new(window.clone())),
        messages: Rc::new(WindowMessages::new(window.clone())),
        widgets: Rc::new(DocumentWidgets::new(window, document)),
    })
}

/// Route `log` records to the console and report panics there.
///
/// Returns `false` if a logger was already installed.
pub fn init_logging() -> bool {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).is_ok()
}

pub(crate) fn to_js(value: &Value) -> Result<JsValue, HostError> {
    js_sys::JSON::parse(&value.to_string()).map_err(js_error)
}

/// `value` as JSON.
///
/// # Errors
///
/// Returns [`HostError::NotJson`] when `JSON.stringify` throws (cycles,
/// `BigInt`) or yields `undefined` (functions, symbols, `undefined`).
pub(crate) fn from_js(value: &JsValue) -> Result<Value, HostError> {
    let text = js_sys::JSON::stringify(value).map_err(|e| HostError::NotJson(js_text(&e)))?;
    parse_stringified(text.as_string().as_deref())
}

pub(crate) fn js_error(err: JsValue) -> HostError {
    HostError::Js(js_text(&err))
}

fn js_text(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| js_sys::JSON::stringify(err).ok().and_then(|s| s.as_string()))
        .unwrap_or_else(|| format!("{err:?}"))
}
