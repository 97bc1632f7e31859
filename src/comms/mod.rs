//! API communication strategies.
//!
//! DESIGN
//! ======
//! The agent-app endpoint does not answer cross-origin requests, so a page on
//! a third-party domain cannot call it directly. Two strategies cover both
//! cases behind [`ApiComms`]:
//!
//! - [`DirectComms`] posts to the endpoint from the current page. It also
//!   serves calls relayed from other frames, which is what the hidden widget
//!   does on the connect domain.
//! - [`WidgetComms`] hands each call to that hidden widget over a
//!   `MessageChannel` and waits for its reply.
//!
//! [`build_comms`] picks one per client, once.

pub mod direct;
pub mod widget;

use bridge::ApiResponse;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::host::{Host, PageContext};
use crate::operation::Operation;
use crate::urls::is_connect_domain;

pub use direct::DirectComms;
pub use widget::WidgetComms;

/// Which strategy a client uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsKind {
    Direct,
    Widget,
}

/// A transport able to perform one API call.
#[async_trait::async_trait(?Send)]
pub trait ApiComms {
    fn kind(&self) -> CommsKind;

    fn instance_url(&self) -> &str;

    fn api_endpoint_url(&self) -> &str;

    /// Perform `operation` with `params`, passed through verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] with the failing status (or the synthetic
    /// not-ready response), or a host/bridge error for channel failures.
    async fn api_call(&self, operation: Operation, params: Option<Value>) -> Result<ApiResponse, Error>;
}

/// Decide which strategy `config` calls for on the current page.
///
/// # Errors
///
/// Returns [`Error::ConflictingOverrides`] if both overrides are set and
/// [`Error::InvalidUrl`] if the instance URL has no host.
pub fn select_kind(config: &ClientConfig, page: &dyn PageContext) -> Result<CommsKind, Error> {
    if let Some(kind) = config.forced_kind()? {
        return Ok(kind);
    }
    let href = page.location_href();
    if is_connect_domain(&config.instance_url, href.as_deref())? {
        Ok(CommsKind::Direct)
    } else {
        Ok(CommsKind::Widget)
    }
}

/// Build the strategy `config` calls for.
///
/// # Errors
///
/// See [`select_kind`]; also fails if the direct transport cannot attach its
/// message listener.
pub fn build_comms(config: &ClientConfig, host: &Host) -> Result<Box<dyn ApiComms>, Error> {
    let kind = select_kind(config, host.page.as_ref())?;
    log::debug!("customer profiles: using {kind:?} api communication");
    Ok(match kind {
        CommsKind::Direct => Box::new(DirectComms::new(config, host)?),
        CommsKind::Widget => Box::new(WidgetComms::new(config, host)),
    })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
