//! The CustomerProfiles client handed to agent-apps.

use bridge::ApiResponse;
use serde_json::Value;

use crate::comms::{ApiComms, CommsKind, build_comms};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::host::Host;
use crate::operation::Operation;

/// Client for the CustomerProfiles agent-app API.
///
/// Each method forwards its parameters verbatim and returns whatever the
/// selected transport produced.
pub struct CustomerProfilesClient {
    comms: Box<dyn ApiComms>,
}

impl CustomerProfilesClient {
    /// Build a client, choosing direct or widget communication for the page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingOverrides`] if both overrides are set,
    /// [`Error::InvalidUrl`] for an instance URL without a host, and
    /// [`Error::Host`] if the relay listener cannot be attached.
    pub fn new(config: &ClientConfig, host: &Host) -> Result<Self, Error> {
        Ok(Self { comms: build_comms(config, host)? })
    }

    /// Build a client around an existing transport.
    #[must_use]
    pub fn with_comms(comms: Box<dyn ApiComms>) -> Self {
        Self { comms }
    }

    #[must_use]
    pub fn comms_kind(&self) -> CommsKind {
        self.comms.kind()
    }

    #[must_use]
    pub fn instance_url(&self) -> &str {
        self.comms.instance_url()
    }

    #[must_use]
    pub fn api_endpoint_url(&self) -> &str {
        self.comms.api_endpoint_url()
    }

    /// What a successful call settles with on the JavaScript side.
    ///
    /// Direct calls hand back the parsed body, as `connect.fetch` does.
    /// Widget calls hand back the whole `{status, statusText, data}` reply.
    #[must_use]
    pub fn settled_value(&self, response: ApiResponse) -> Value {
        match self.comms_kind() {
            CommsKind::Direct => response.data,
            CommsKind::Widget => serde_json::to_value(response).unwrap_or(Value::Null),
        }
    }

    /// Run `operation` through the selected transport.
    ///
    /// # Errors
    ///
    /// Propagates the transport's error unchanged.
    pub async fn call(&self, operation: Operation, params: Option<Value>) -> Result<ApiResponse, Error> {
        self.comms.api_call(operation, params).await
    }

    /// # Errors
    ///
    /// Propagates the transport's error unchanged.
    pub async fn list_account_integrations(&self, params: Option<Value>) -> Result<ApiResponse, Error> {
        self.call(Operation::ListAccountIntegrations, params).await
    }

    /// # Errors
    ///
    /// Propagates the transport's error unchanged.
    pub async fn create_profile(&self, params: Option<Value>) -> Result<ApiResponse, Error> {
        self.call(Operation::CreateProfile, params).await
    }

    /// # Errors
    ///
    /// Propagates the transport's error unchanged.
    pub async fn update_profile(&self, params: Option<Value>) -> Result<ApiResponse, Error> {
        self.call(Operation::UpdateProfile, params).await
    }

    /// # Errors
    ///
    /// Propagates the transport's error unchanged.
    pub async fn search_profiles(&self, params: Option<Value>) -> Result<ApiResponse, Error> {
        self.call(Operation::SearchProfiles, params).await
    }

    /// # Errors
    ///
    /// Propagates the transport's error unchanged.
    pub async fn list_profile_objects(&self, params: Option<Value>) -> Result<ApiResponse, Error> {
        self.call(Operation::ListProfileObjects, params).await
    }

    /// # Errors
    ///
    /// Propagates the transport's error unchanged.
    pub async fn add_profile_key(&self, params: Option<Value>) -> Result<ApiResponse, Error> {
        self.call(Operation::AddProfileKey, params).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
