//! Network calls from the page.
//!
//! When the Streams library is on the page it installs `connect.fetch`, which
//! already knows how to talk to the instance; that is preferred. Otherwise the
//! request goes out through `gloo-net`.

use gloo_net::http::Request;
use js_sys::{Function, Object, Promise, Reflect};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{RequestCredentials, Window};

use super::from_js;
use crate::consts::CONNECT_GLOBAL;
use crate::host::{CredentialsMode, Fetch, FetchFailure, HttpRequest};

pub struct BrowserFetch {
    window: Window,
}

impl BrowserFetch {
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    /// `window.connect.fetch`, if the Streams library installed it.
    fn connect_fetch(&self) -> Option<Function> {
        let connect = Reflect::get(self.window.as_ref(), &JsValue::from_str(CONNECT_GLOBAL)).ok()?;
        if !connect.is_object() {
            return None;
        }
        Reflect::get(&connect, &JsValue::from_str("fetch"))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }
}

#[async_trait::async_trait(?Send)]
impl Fetch for BrowserFetch {
    async fn fetch(&self, request: HttpRequest) -> Result<Value, FetchFailure> {
        match self.connect_fetch() {
            Some(fetch) => fetch_with_connect(&fetch, request).await,
            None => fetch_with_gloo(request).await,
        }
    }
}

/// `connect.fetch` resolves with the parsed body and rejects with the
/// `Response` for non-2xx statuses.
async fn fetch_with_connect(fetch: &Function, request: HttpRequest) -> Result<Value, FetchFailure> {
    let headers = Object::new();
    for (name, value) in &request.headers {
        set(&headers, name, &JsValue::from_str(value))?;
    }

    let options = Object::new();
    set(&options, "method", &JsValue::from_str("post"))?;
    set(&options, "body", &JsValue::from_str(&request.body))?;
    set(&options, "headers", &headers)?;
    if request.credentials == CredentialsMode::Include {
        set(&options, "credentials", &JsValue::from_str("include"))?;
    }

    let promise = fetch
        .call2(&JsValue::NULL, &JsValue::from_str(&request.url), &options)
        .map_err(|e| failure_from_js(&e))?
        .dyn_into::<Promise>()
        .map_err(|v| failure_from_js(&v))?;

    match JsFuture::from(promise).await {
        Ok(body) => Ok(from_js(&body).unwrap_or(Value::Null)),
        Err(e) => Err(failure_from_js(&e)),
    }
}

async fn fetch_with_gloo(request: HttpRequest) -> Result<Value, FetchFailure> {
    let mut builder = Request::post(&request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    if request.credentials == CredentialsMode::Include {
        builder = builder.credentials(RequestCredentials::Include);
    }

    let resp = builder
        .body(request.body)
        .map_err(network_failure)?
        .send()
        .await
        .map_err(network_failure)?;
    if !resp.ok() {
        return Err(FetchFailure {
            status: resp.status(),
            status_text: resp.status_text(),
        });
    }
    resp.json::<Value>().await.map_err(network_failure)
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), FetchFailure> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| failure_from_js(&e))
}

/// Status and status text of a rejected `connect.fetch`, or status `0` when
/// the rejection is not a response.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn failure_from_js(err: &JsValue) -> FetchFailure {
    let status = Reflect::get(err, &JsValue::from_str("status"))
        .ok()
        .and_then(|v| v.as_f64())
        .filter(|s| (0.0..=f64::from(u16::MAX)).contains(s))
        .map_or(0, |s| s as u16);
    let status_text = Reflect::get(err, &JsValue::from_str("statusText"))
        .ok()
        .and_then(|v| v.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| "Network error".to_owned());
    FetchFailure { status, status_text }
}

fn network_failure(err: gloo_net::Error) -> FetchFailure {
    FetchFailure {
        status: 0,
        status_text: err.to_string(),
    }
}
