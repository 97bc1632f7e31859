//! Page location and locally injected test credentials.

use js_sys::Reflect;
use wasm_bindgen::JsValue;
use web_sys::Window;

use crate::config::LocalCredentials;
use crate::host::PageContext;

const TOKEN_REGION_GLOBAL: &str = "tokenRegion";
const TOKEN_VALUE_GLOBAL: &str = "tokenValue";

pub struct BrowserPage {
    window: Window,
}

impl BrowserPage {
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    fn global_string(&self, key: &str) -> Option<String> {
        Reflect::get(self.window.as_ref(), &JsValue::from_str(key))
            .ok()?
            .as_string()
            .filter(|s| !s.is_empty())
    }
}

impl PageContext for BrowserPage {
    fn location_href(&self) -> Option<String> {
        self.window.location().href().ok()
    }

    /// `window.tokenRegion` and `window.tokenValue`, when both are set.
    fn local_credentials(&self) -> Option<LocalCredentials> {
        let region = self.global_string(TOKEN_REGION_GLOBAL)?;
        let token = self.global_string(TOKEN_VALUE_GLOBAL)?;
        Some(LocalCredentials::new(region, token))
    }
}
