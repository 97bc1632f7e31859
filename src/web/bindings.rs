//! JavaScript export of the client.
//!
//! ```js
//! const client = new CustomerProfilesClient("https://example.my.connect.aws/");
//! const resp = await client.searchProfiles({ DomainName: "d", KeyName: "k", Values: ["v"] });
//! ```
//!
//! The class is also installed as `connect.CustomerProfilesClient` when the
//! module starts, so pages can keep writing `new connect.CustomerProfilesClient(url)`.
//!
//! Direct calls resolve with the parsed response body; widget calls resolve
//! with `{status, statusText, data}`. Failed calls reject with
//! `{status, statusText, data}`; configuration and browser failures reject
//! with an `Error` whose `name` is the error code.

use std::rc::Rc;

use bridge::ApiResponse;
use js_sys::{Function, Object, Promise, Reflect};
use serde_json::Value;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen_futures::future_to_promise;

use super::{browser_host, from_js, init_logging, to_js};
use crate::client::CustomerProfilesClient;
use crate::consts::{CONNECT_GLOBAL, GLOBAL_CLASS_NAME};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::operation::Operation;

#[wasm_bindgen(js_name = CustomerProfilesClient)]
pub struct JsCustomerProfilesClient {
    inner: Rc<CustomerProfilesClient>,
}

#[wasm_bindgen(js_class = CustomerProfilesClient)]
impl JsCustomerProfilesClient {
    /// # Errors
    ///
    /// Rejects construction for an instance URL without a host, or outside a
    /// window context.
    #[wasm_bindgen(constructor)]
    pub fn new(
        instance_url: String,
        instance_api_endpoint_url: Option<String>,
        force_direct: Option<bool>,
    ) -> Result<JsCustomerProfilesClient, JsValue> {
        let mut config = ClientConfig::new(instance_url).with_force_direct(force_direct.unwrap_or(false));
        config.instance_api_endpoint_url = instance_api_endpoint_url;
        Self::build(&config)
    }

    /// Build from an options object:
    /// `{instanceUrl, instanceApiEndpointUrl?, forceDirect?, forceWidget?, localCredentials?}`.
    ///
    /// # Errors
    ///
    /// Rejects malformed options and conflicting overrides.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(options: JsValue) -> Result<JsCustomerProfilesClient, JsValue> {
        let options = from_js(&options).map_err(|e| error_to_js(&Error::ConfigParse(e.to_string())))?;
        let config = ClientConfig::from_json(&options.to_string()).map_err(|e| error_to_js(&e))?;
        Self::build(&config)
    }

    #[wasm_bindgen(getter, js_name = instanceUrl)]
    pub fn instance_url(&self) -> String {
        self.inner.instance_url().to_owned()
    }

    #[wasm_bindgen(getter, js_name = instanceApiEndpointUrl)]
    pub fn instance_api_endpoint_url(&self) -> String {
        self.inner.api_endpoint_url().to_owned()
    }

    #[wasm_bindgen(js_name = listAccountIntegrations)]
    pub fn list_account_integrations(&self, params: JsValue) -> Promise {
        self.call(Operation::ListAccountIntegrations, &params)
    }

    #[wasm_bindgen(js_name = createProfile)]
    pub fn create_profile(&self, params: JsValue) -> Promise {
        self.call(Operation::CreateProfile, &params)
    }

    #[wasm_bindgen(js_name = updateProfile)]
    pub fn update_profile(&self, params: JsValue) -> Promise {
        self.call(Operation::UpdateProfile, &params)
    }

    #[wasm_bindgen(js_name = searchProfiles)]
    pub fn search_profiles(&self, params: JsValue) -> Promise {
        self.call(Operation::SearchProfiles, &params)
    }

    #[wasm_bindgen(js_name = listProfileObjects)]
    pub fn list_profile_objects(&self, params: JsValue) -> Promise {
        self.call(Operation::ListProfileObjects, &params)
    }

    #[wasm_bindgen(js_name = addProfileKey)]
    pub fn add_profile_key(&self, params: JsValue) -> Promise {
        self.call(Operation::AddProfileKey, &params)
    }
}

impl JsCustomerProfilesClient {
    fn build(config: &ClientConfig) -> Result<Self, JsValue> {
        init_logging();
        let host = browser_host().map_err(|e| error_to_js(&Error::Host(e)))?;
        let client = CustomerProfilesClient::new(config, &host).map_err(|e| error_to_js(&e))?;
        Ok(Self { inner: Rc::new(client) })
    }

    fn call(&self, operation: Operation, params: &JsValue) -> Promise {
        let client = Rc::clone(&self.inner);
        let params = if params.is_undefined() || params.is_null() {
            None
        } else {
            match from_js(params) {
                Ok(params) => Some(params),
                Err(e) => return Promise::reject(&error_to_js(&Error::Host(e))),
            }
        };
        future_to_promise(async move {
            match client.call(operation, params).await {
                Ok(resp) => to_js(&client.settled_value(resp)).map_err(|e| error_to_js(&Error::Host(e))),
                Err(e) => Err(error_to_js(&e)),
            }
        })
    }
}

/// Module start: console logging plus the `connect.CustomerProfilesClient`
/// global.
///
/// # Errors
///
/// Fails outside a window context or when `window.connect` cannot be written.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    init_logging();
    install_global()
}

/// Body of the factory that builds the installed constructor.
const GLOBAL_CLASS_SOURCE: &str = "function CustomerProfilesClient(instanceUrl, instanceApiEndpointUrl, forceDirect) { \
    return construct(instanceUrl, instanceApiEndpointUrl, forceDirect); } \
    CustomerProfilesClient.fromConfig = fromConfig; \
    return CustomerProfilesClient;";

/// Get or create `window.connect` and set `CustomerProfilesClient` on it.
///
/// The installed value is a plain constructor function that returns the
/// wasm-backed instance, so both `new` and `fromConfig` work on it.
fn install_global() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;
    let key = JsValue::from_str(CONNECT_GLOBAL);
    let mut connect = Reflect::get(window.as_ref(), &key)?;
    if !connect.is_object() {
        connect = Object::new().into();
        Reflect::set(window.as_ref(), &key, &connect)?;
    }

    let construct = Closure::wrap(Box::new(
        |instance_url: String, endpoint: Option<String>, force_direct: Option<bool>| {
            JsCustomerProfilesClient::new(instance_url, endpoint, force_direct).map(JsValue::from)
        },
    ) as Box<dyn Fn(String, Option<String>, Option<bool>) -> Result<JsValue, JsValue>>)
    .into_js_value();
    let from_config = Closure::wrap(Box::new(|options: JsValue| {
        JsCustomerProfilesClient::from_config(options).map(JsValue::from)
    }) as Box<dyn Fn(JsValue) -> Result<JsValue, JsValue>>)
    .into_js_value();

    let factory = Function::new_with_args("construct, fromConfig", GLOBAL_CLASS_SOURCE);
    let class = factory.call2(&JsValue::NULL, &construct, &from_config)?;
    Reflect::set(&connect, &JsValue::from_str(GLOBAL_CLASS_NAME), &class)?;
    log::debug!("customer profiles: installed {CONNECT_GLOBAL}.{GLOBAL_CLASS_NAME}");
    Ok(())
}

fn response_to_js(resp: &ApiResponse) -> Result<JsValue, JsValue> {
    let value = serde_json::to_value(resp).unwrap_or(Value::Null);
    to_js(&value).map_err(|e| error_to_js(&Error::Host(e)))
}

fn error_to_js(err: &Error) -> JsValue {
    if let Some(resp) = err.response() {
        if let Ok(value) = response_to_js(resp) {
            return value;
        }
    }
    let js_err = js_sys::Error::new(&err.to_string());
    js_err.set_name(err.error_code());
    js_err.into()
}
