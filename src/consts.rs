//! Fixed identifiers shared with the contact-center backend and the Streams
//! app host.

pub use bridge::{API_EVENT_TYPE, CLIENT_NAME};

/// Value of the `x-amazon-call-source` header.
pub const CALL_SOURCE_HEADER: &str = "agent-app";

/// Prefix of the `x-amz-target` header; the operation name is appended.
pub const OPERATION_TARGET_PREFIX: &str = "AgentAppService.CustomerProfiles.";

/// Path of the CustomerProfiles widget app under the instance URL.
pub const WIDGET_APP_PATH: &str = "customerprofiles-v2";

/// Path of the agent-app API endpoint under the instance URL.
pub const AGENT_APP_API_PATH: &str = "agent-app/api";

/// Id of the `div` the widget iframe is mounted into.
pub const WIDGET_CONTAINER_ID: &str = "customerprofiles-container";

/// Id the app host gives the widget iframe. Matches the client name.
pub const WIDGET_FRAME_ID: &str = CLIENT_NAME;

/// Inline style that keeps the widget iframe out of sight.
pub const WIDGET_HIDDEN_STYLE: &str = "display: none";

/// Page global the client class is installed on.
pub const CONNECT_GLOBAL: &str = "connect";

/// Property of [`CONNECT_GLOBAL`] holding the client class.
pub const GLOBAL_CLASS_NAME: &str = "CustomerProfilesClient";
