//! Host collaborators the client calls through.
//!
//! DESIGN
//! ======
//! Everything the SDK needs from the page (location, fetch, `message`
//! events, DOM lookups, the Streams app host, iframe channels) sits behind a
//! narrow trait here. The browser implementations live in `web`; tests plug
//! in in-memory fakes. All of it is single-threaded, so futures are `!Send`
//! and shared state uses `Rc`.

use std::rc::Rc;

use bridge::BridgeMessage;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::config::LocalCredentials;

// =============================================================================
// ERRORS
// =============================================================================

/// Failure reported by a host collaborator.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A global the SDK relies on is missing from the page.
    #[error("{0} is not available on this page")]
    Unavailable(&'static str),

    /// A browser API call threw.
    #[error("browser call failed: {0}")]
    Js(String),

    /// The reply port was dropped before a reply arrived.
    #[error("reply port closed before a reply arrived")]
    PortClosed,

    /// A value handed over from the page has no JSON form.
    #[error("value cannot be sent as JSON: {0}")]
    NotJson(String),
}

/// Parse the output of `JSON.stringify`.
///
/// `None` stands for stringify returning `undefined`, which it does for
/// functions, symbols and a missing argument.
///
/// # Errors
///
/// Returns [`HostError::NotJson`] when there is no text or it does not parse.
pub fn parse_stringified(text: Option<&str>) -> Result<Value, HostError> {
    let text = text.ok_or_else(|| HostError::NotJson("stringify produced undefined".to_owned()))?;
    serde_json::from_str(text).map_err(|e| HostError::NotJson(e.to_string()))
}

/// Status and status text of a failed fetch.
///
/// Network errors that never produced a response use status `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub status: u16,
    pub status_text: String,
}

// =============================================================================
// PAGE
// =============================================================================

/// Ambient facts about the current page.
pub trait PageContext {
    /// `window.location.href`, if readable.
    fn location_href(&self) -> Option<String>;

    /// Region/token pair injected into the page for local testing.
    fn local_credentials(&self) -> Option<LocalCredentials>;
}

// =============================================================================
// FETCH
// =============================================================================

/// Whether the browser attaches cookies to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsMode {
    /// `credentials: "include"`.
    Include,
    /// Browser default (`same-origin`); used when a bearer header is sent.
    Default,
}

/// A fully built outbound POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
    pub credentials: CredentialsMode,
}

impl HttpRequest {
    /// First value of header `name`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The network function. Resolves with the parsed JSON body on success.
#[async_trait::async_trait(?Send)]
pub trait Fetch {
    /// Perform `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchFailure`] carrying the response status for non-2xx
    /// responses and status `0` for network errors.
    async fn fetch(&self, request: HttpRequest) -> Result<Value, FetchFailure>;
}

// =============================================================================
// PAGE MESSAGES
// =============================================================================

/// A transferred `MessagePort` a reply can be posted to.
pub trait ReplyPort {
    /// Post `message` through the port.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Js`] if `postMessage` throws.
    fn post(&self, message: &BridgeMessage) -> Result<(), HostError>;
}

/// A `message` event delivered to the page.
pub struct IncomingMessage {
    /// `event.data` as JSON.
    pub data: Value,
    /// `event.ports`, in transfer order.
    pub ports: Vec<Rc<dyn ReplyPort>>,
}

/// Callback run for each page message; the host drives the returned future.
pub type MessageHandler = Rc<dyn Fn(IncomingMessage) -> LocalBoxFuture<'static, ()>>;

/// Source of page-level `message` events.
pub trait MessageEvents {
    /// Register `handler` until the returned subscription is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the listener cannot be attached.
    fn subscribe(&self, handler: MessageHandler) -> Result<Subscription, HostError>;
}

/// An attached listener. Dropping it detaches the listener.
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    #[must_use]
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self { teardown: Some(Box::new(teardown)) }
    }

    /// Detach now instead of at drop.
    pub fn cancel(mut self) {
        self.run_teardown();
    }

    fn run_teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_teardown();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.teardown.is_some())
            .finish()
    }
}

// =============================================================================
// WIDGET
// =============================================================================

/// Arguments to the Streams app host's `initApp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInit {
    pub name: String,
    pub container_id: String,
    pub url: String,
    pub style: String,
}

/// The document and app host the widget iframe lives in.
pub trait WidgetHost {
    /// The iframe with id `frame_id`, if present.
    fn find_frame(&self, frame_id: &str) -> Option<Rc<dyn WidgetFrame>>;

    /// Whether a `div` with id `container_id` exists.
    fn has_container(&self, container_id: &str) -> bool;

    /// Create a `div` with id `container_id` and append it to the body.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the document has no body or the DOM call throws.
    fn create_container(&self, container_id: &str) -> Result<(), HostError>;

    /// Ask the app host to mount the widget app into its container.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Unavailable`] if no app host is installed.
    fn init_app(&self, init: &AppInit) -> Result<(), HostError>;
}

/// Receiver for the single reply of a channel exchange (`event.data`).
pub type Reply = oneshot::Receiver<Value>;

/// A widget iframe.
pub trait WidgetFrame {
    /// The iframe's `src`, used as the `postMessage` target origin.
    fn src(&self) -> String;

    /// Run `callback` every time the iframe fires `load`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the listener cannot be attached.
    fn on_load(&self, callback: Box<dyn Fn()>) -> Result<(), HostError>;

    /// Open a fresh channel, post `message` with one port transferred, and
    /// resolve with the first message received on the other port.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the channel cannot be created or posting throws.
    fn exchange(&self, message: &BridgeMessage, target_origin: &str) -> Result<Reply, HostError>;
}

// =============================================================================
// BUNDLE
// =============================================================================

/// The collaborators a client is built against.
#[derive(Clone)]
pub struct Host {
    pub page: Rc<dyn PageContext>,
    pub fetch: Rc<dyn Fetch>,
    pub messages: Rc<dyn MessageEvents>,
    pub widgets: Rc<dyn WidgetHost>,
}

#[cfg(test)]
#[path = "host_test.rs"]
mod tests;
