//! Cross-frame message model for relayed CustomerProfiles API calls.
//!
//! This crate owns the wire shape exchanged over `postMessage` between a
//! third-party agent-app and the hidden widget frame hosted on the connect
//! domain. Both sides of the iframe boundary depend on it, so the constants
//! and field names here are the protocol.
//!
//! A request travels as `{source, event_type, api_data}` together with a
//! transferred `MessagePort`; the reply comes back on that port as
//! `{source, event_type, api_response}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Value of the `source` field on every bridge message.
pub const CLIENT_NAME: &str = "AmazonConnectCustomerProfilesClient";

/// Value of the `event_type` field on every bridge message.
pub const API_EVENT_TYPE: &str = "CustomerProfilesApiCall";

/// Status carried by a successful [`ApiResponse`].
pub const STATUS_OK: u16 = 200;

/// Status of the synthetic response returned before the widget is ready.
pub const STATUS_NOT_READY: u16 = 500;

/// Error returned when a message carries the bridge identifiers but not the
/// payload its direction requires.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The message matched `source`/`event_type` but lacked the payload field.
    #[error("bridge message is missing `{0}`")]
    MissingPayload(&'static str),
    /// The payload field was present but did not have the expected shape.
    #[error("malformed bridge payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The API call a caller asks the widget frame to perform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiData {
    /// Endpoint the receiving side should POST to.
    pub url: String,
    /// Operation name, e.g. `"createProfile"`.
    pub method: String,
    /// Operation parameters, forwarded verbatim.
    #[serde(default)]
    pub params: Option<Value>,
}

/// Outcome of an API call as seen by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// `0` when the sender had no status (a network failure on its side).
    #[serde(default)]
    pub status: u16,
    #[serde(rename = "statusText", default)]
    pub status_text: String,
    #[serde(default = "empty_object")]
    pub data: Value,
}

impl ApiResponse {
    /// Successful response wrapping the backend's JSON result.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            status: STATUS_OK,
            status_text: "OK".to_owned(),
            data,
        }
    }

    /// Failed response; the body is always an empty object.
    #[must_use]
    pub fn failure(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            data: empty_object(),
        }
    }

    /// Synthetic response for calls issued before the widget frame loaded.
    #[must_use]
    pub fn not_ready() -> Self {
        Self::failure(STATUS_NOT_READY, "Client not ready")
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// A single message crossing the frame boundary, in either direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BridgeMessage {
    pub source: String,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_data: Option<ApiData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_response: Option<ApiResponse>,
}

impl BridgeMessage {
    /// Request message asking the receiving frame to perform `data`.
    #[must_use]
    pub fn request(data: ApiData) -> Self {
        Self {
            source: CLIENT_NAME.to_owned(),
            event_type: API_EVENT_TYPE.to_owned(),
            api_data: Some(data),
            api_response: None,
        }
    }

    /// Reply message carrying the outcome of a relayed call.
    #[must_use]
    pub fn response(response: ApiResponse) -> Self {
        Self {
            source: CLIENT_NAME.to_owned(),
            event_type: API_EVENT_TYPE.to_owned(),
            api_data: None,
            api_response: Some(response),
        }
    }

    /// Render the message as a JSON value ready to hand to `postMessage`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        // Serializing plain strings, integers and `Value`s cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Whether a raw message carries this client's `source` and `event_type`.
///
/// Anything else posted to the page (other SDKs, browser extensions) must be
/// left alone, so this is the only check applied before touching the payload.
#[must_use]
pub fn is_api_event(data: &Value) -> bool {
    data.get("source").and_then(Value::as_str) == Some(CLIENT_NAME)
        && data.get("event_type").and_then(Value::as_str) == Some(API_EVENT_TYPE)
}

/// Extract the requested call from an incoming page message.
///
/// Returns `Ok(None)` for foreign messages.
///
/// # Errors
///
/// Returns [`BridgeError`] when the identifiers match but `api_data` is
/// missing or malformed.
pub fn decode_request(data: &Value) -> Result<Option<ApiData>, BridgeError> {
    if !is_api_event(data) {
        return Ok(None);
    }
    let raw = data
        .get("api_data")
        .ok_or(BridgeError::MissingPayload("api_data"))?;
    Ok(Some(serde_json::from_value(raw.clone())?))
}

/// Extract the call outcome from a reply received on a message port.
///
/// Replies arrive on a dedicated port, so the identifiers are not checked.
///
/// # Errors
///
/// Returns [`BridgeError`] when `api_response` is missing or malformed.
pub fn decode_response(data: &Value) -> Result<ApiResponse, BridgeError> {
    let raw = data
        .get("api_response")
        .ok_or(BridgeError::MissingPayload("api_response"))?;
    Ok(serde_json::from_value(raw.clone())?)
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
