//! Direct communication with the agent-app endpoint.
//!
//! Used on the connect domain, where the endpoint accepts the page's own
//! cookies. Constructing a [`DirectComms`] also attaches a page `message`
//! listener so frames on other domains can relay calls through this one.

use std::rc::Rc;

use bridge::{ApiResponse, BridgeMessage};
use futures::FutureExt;
use serde_json::Value;

use crate::config::{ClientConfig, LocalCredentials};
use crate::consts::CALL_SOURCE_HEADER;
use crate::error::Error;
use crate::host::{
    CredentialsMode, Fetch, Host, HttpRequest, IncomingMessage, MessageHandler, PageContext,
    Subscription,
};
use crate::operation::{Operation, target_header};

use super::{ApiComms, CommsKind};

/// Where local test credentials come from: the options first, then the page.
///
/// The page is consulted on every call since test harnesses set the globals
/// after the client is built.
pub struct CredentialSource {
    configured: Option<LocalCredentials>,
    page: Rc<dyn PageContext>,
}

impl CredentialSource {
    #[must_use]
    pub fn new(configured: Option<LocalCredentials>, page: Rc<dyn PageContext>) -> Self {
        Self { configured, page }
    }

    #[must_use]
    pub fn resolve(&self) -> Option<LocalCredentials> {
        self.configured
            .clone()
            .or_else(|| self.page.local_credentials())
    }
}

pub struct DirectComms {
    instance_url: String,
    api_endpoint_url: String,
    fetch: Rc<dyn Fetch>,
    credentials: Rc<CredentialSource>,
    relay: Option<Subscription>,
}

impl DirectComms {
    /// Build the transport and start serving relayed calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Host`] if the page listener cannot be attached.
    pub fn new(config: &ClientConfig, host: &Host) -> Result<Self, Error> {
        let fetch = Rc::clone(&host.fetch);
        let credentials = Rc::new(CredentialSource::new(
            config.local_credentials.clone(),
            Rc::clone(&host.page),
        ));
        let relay = host
            .messages
            .subscribe(relay_handler(Rc::clone(&fetch), Rc::clone(&credentials)))?;

        Ok(Self {
            instance_url: config.instance_url.clone(),
            api_endpoint_url: config.api_endpoint_url(),
            fetch,
            credentials,
            relay: Some(relay),
        })
    }

    /// Whether relayed calls from other frames are still being served.
    #[must_use]
    pub fn is_relaying(&self) -> bool {
        self.relay.is_some()
    }

    /// Stop serving relayed calls. Direct calls keep working.
    pub fn stop_relay(&mut self) {
        if let Some(relay) = self.relay.take() {
            relay.cancel();
        }
    }
}

#[async_trait::async_trait(?Send)]
impl ApiComms for DirectComms {
    fn kind(&self) -> CommsKind {
        CommsKind::Direct
    }

    fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn api_endpoint_url(&self) -> &str {
        &self.api_endpoint_url
    }

    async fn api_call(&self, operation: Operation, params: Option<Value>) -> Result<ApiResponse, Error> {
        let request = build_request(
            &self.api_endpoint_url,
            operation.as_str(),
            params.as_ref(),
            self.credentials.resolve().as_ref(),
        );
        call_endpoint(self.fetch.as_ref(), request).await.map_err(Error::Api)
    }
}

/// Build the POST for `method` against `endpoint_url`.
///
/// With local credentials the request carries `x-amz-bearer` and leaves
/// cookies at the browser default; otherwise cookies are included.
#[must_use]
pub fn build_request(
    endpoint_url: &str,
    method: &str,
    params: Option<&Value>,
    credentials: Option<&LocalCredentials>,
) -> HttpRequest {
    let body = match params {
        None | Some(Value::Null) => "{}".to_owned(),
        Some(params) => params.to_string(),
    };

    let mut headers = vec![
        ("Accept", "application/json".to_owned()),
        ("Content-Type", "application/json".to_owned()),
        ("x-amazon-call-source", CALL_SOURCE_HEADER.to_owned()),
        ("x-amz-target", target_header(method)),
    ];

    let credentials = match credentials {
        Some(creds) => {
            headers.push(("x-amz-bearer", creds.bearer()));
            CredentialsMode::Default
        }
        None => CredentialsMode::Include,
    };

    HttpRequest {
        url: endpoint_url.to_owned(),
        headers,
        body,
        credentials,
    }
}

/// Run `request`, shaping both outcomes as [`ApiResponse`]s.
///
/// # Errors
///
/// Returns the failure's status and status text with an empty body.
pub async fn call_endpoint(fetch: &dyn Fetch, request: HttpRequest) -> Result<ApiResponse, ApiResponse> {
    match fetch.fetch(request).await {
        Ok(data) => Ok(ApiResponse::ok(data)),
        Err(failure) => Err(ApiResponse::failure(failure.status, failure.status_text)),
    }
}

fn relay_handler(fetch: Rc<dyn Fetch>, credentials: Rc<CredentialSource>) -> MessageHandler {
    Rc::new(move |message: IncomingMessage| {
        serve_relayed_call(Rc::clone(&fetch), Rc::clone(&credentials), message).boxed_local()
    })
}

/// Serve one call relayed from another frame and post the outcome back on
/// the first transferred port.
///
/// Messages without this client's `source`/`event_type` are ignored.
pub async fn serve_relayed_call(
    fetch: Rc<dyn Fetch>,
    credentials: Rc<CredentialSource>,
    message: IncomingMessage,
) {
    let data = match bridge::decode_request(&message.data) {
        Ok(Some(data)) => data,
        Ok(None) => return,
        Err(e) => {
            log::warn!("customer profiles: dropping relayed call: {e}");
            return;
        }
    };
    let Some(port) = message.ports.first() else {
        log::warn!("customer profiles: relayed {} call has no reply port", data.method);
        return;
    };

    let request = build_request(
        &data.url,
        &data.method,
        data.params.as_ref(),
        credentials.resolve().as_ref(),
    );
    let response = match call_endpoint(fetch.as_ref(), request).await {
        Ok(resp) | Err(resp) => resp,
    };

    if let Err(e) = port.post(&BridgeMessage::response(response)) {
        log::warn!("customer profiles: failed to reply to relayed {} call: {e}", data.method);
    }
}

#[cfg(test)]
#[path = "direct_test.rs"]
mod tests;
