//! Communication through the hidden CustomerProfiles widget.
//!
//! Pages outside the connect domain cannot reach the agent-app endpoint, so
//! each call is handed to a hidden iframe that runs this same client on the
//! connect domain (as [`DirectComms`](super::DirectComms)) and relays it.
//!
//! Lifecycle: locate the iframe; if it is missing, mount it through the app
//! host and wait for `load`. Calls made before `load` fire are rejected with
//! the not-ready response, never queued.

use std::cell::Cell;
use std::rc::Rc;

use bridge::{ApiData, ApiResponse, BridgeMessage};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::consts::{CLIENT_NAME, WIDGET_CONTAINER_ID, WIDGET_FRAME_ID, WIDGET_HIDDEN_STYLE};
use crate::error::Error;
use crate::host::{AppInit, Host, HostError, WidgetFrame, WidgetHost};
use crate::operation::Operation;
use crate::urls::widget_url;

use super::{ApiComms, CommsKind};

/// The widget iframe plus its readiness flag.
#[derive(Clone)]
pub struct Widget {
    frame: Rc<dyn WidgetFrame>,
    ready: Rc<Cell<bool>>,
}

impl Widget {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }
}

/// Find the widget iframe, mounting it through the app host if needed.
///
/// An iframe that is already in the document is assumed loaded, since its
/// `load` event may have fired before we got here. Returns `None` when the
/// widget could not be mounted; the failure is logged.
pub fn mount_widget(instance_url: &str, widgets: &dyn WidgetHost) -> Option<Widget> {
    if let Some(frame) = widgets.find_frame(WIDGET_FRAME_ID) {
        return Some(Widget { frame, ready: Rc::new(Cell::new(true)) });
    }

    if let Err(e) = create_widget(instance_url, widgets) {
        log::warn!("customer profiles: could not mount widget: {e}");
        return None;
    }

    let Some(frame) = widgets.find_frame(WIDGET_FRAME_ID) else {
        log::warn!("customer profiles: widget iframe missing after initApp");
        return None;
    };

    let ready = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ready);
    let listener = frame.on_load(Box::new(move || {
        if !flag.replace(true) {
            log::info!("customer profiles: client ready for use");
        }
    }));
    if let Err(e) = listener {
        log::warn!("customer profiles: cannot watch widget load: {e}");
    }

    Some(Widget { frame, ready })
}

fn create_widget(instance_url: &str, widgets: &dyn WidgetHost) -> Result<(), HostError> {
    if !widgets.has_container(WIDGET_CONTAINER_ID) {
        log::info!("customer profiles: creating container div for widget");
        widgets.create_container(WIDGET_CONTAINER_ID)?;
    }
    widgets.init_app(&AppInit {
        name: CLIENT_NAME.to_owned(),
        container_id: WIDGET_CONTAINER_ID.to_owned(),
        url: widget_url(instance_url),
        style: WIDGET_HIDDEN_STYLE.to_owned(),
    })
}

pub struct WidgetComms {
    instance_url: String,
    api_endpoint_url: String,
    widget: Option<Widget>,
}

impl WidgetComms {
    /// Build the transport, locating or mounting the widget iframe.
    #[must_use]
    pub fn new(config: &ClientConfig, host: &Host) -> Self {
        let widget = mount_widget(&config.instance_url, host.widgets.as_ref());
        Self {
            instance_url: config.instance_url.clone(),
            api_endpoint_url: config.api_endpoint_url(),
            widget,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.widget.as_ref().is_some_and(Widget::is_ready)
    }

    #[must_use]
    pub fn widget(&self) -> Option<&Widget> {
        self.widget.as_ref()
    }
}

#[async_trait::async_trait(?Send)]
impl ApiComms for WidgetComms {
    fn kind(&self) -> CommsKind {
        CommsKind::Widget
    }

    fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn api_endpoint_url(&self) -> &str {
        &self.api_endpoint_url
    }

    async fn api_call(&self, operation: Operation, params: Option<Value>) -> Result<ApiResponse, Error> {
        let Some(widget) = self.widget.as_ref().filter(|w| w.is_ready()) else {
            return Err(Error::Api(ApiResponse::not_ready()));
        };
        call_via_widget(widget.frame.as_ref(), &self.api_endpoint_url, operation.as_str(), params).await
    }
}

/// Relay one call through `frame` and wait for its reply.
///
/// # Errors
///
/// Returns [`Error::Api`] carrying the reply when its status is not 200,
/// [`Error::Host`] when the channel cannot be opened or the port closes
/// unanswered, and [`Error::Bridge`] for a reply without `api_response`.
pub async fn call_via_widget(
    frame: &dyn WidgetFrame,
    api_endpoint_url: &str,
    method: &str,
    params: Option<Value>,
) -> Result<ApiResponse, Error> {
    let message = BridgeMessage::request(ApiData {
        url: api_endpoint_url.to_owned(),
        method: method.to_owned(),
        params,
    });

    let reply = frame.exchange(&message, &frame.src())?;
    let data = reply.await.map_err(|_| HostError::PortClosed)?;
    let response = bridge::decode_response(&data)?;

    if response.is_success() {
        Ok(response)
    } else {
        Err(Error::Api(response))
    }
}

#[cfg(test)]
#[path = "widget_test.rs"]
mod tests;
