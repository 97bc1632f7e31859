//! Client options.
//!
//! In the browser there is no environment to read, so the options are an
//! object handed to the constructor. Field names follow the JavaScript
//! convention (`instanceUrl`, `forceDirect`, ...) so the same object can be
//! passed straight through from a page script.

use serde::Deserialize;

use crate::comms::CommsKind;
use crate::error::Error;
use crate::urls::agent_app_api_url;

/// Region/token pair used instead of ambient cookies when testing locally.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocalCredentials {
    pub region: String,
    pub token: String,
}

impl LocalCredentials {
    #[must_use]
    pub fn new(region: impl Into<String>, token: impl Into<String>) -> Self {
        Self { region: region.into(), token: token.into() }
    }

    /// Value of the `x-amz-bearer` header: `{"<region>":"<token>"}`.
    #[must_use]
    pub fn bearer(&self) -> String {
        let mut map = serde_json::Map::new();
        map.insert(self.region.clone(), serde_json::Value::String(self.token.clone()));
        serde_json::Value::Object(map).to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Origin of the contact-center instance, e.g. `https://x.my.connect.aws/`.
    pub instance_url: String,
    /// Explicit API endpoint; derived from `instance_url` when absent.
    #[serde(default)]
    pub instance_api_endpoint_url: Option<String>,
    #[serde(default)]
    pub force_direct: bool,
    #[serde(default)]
    pub force_widget: bool,
    /// Overrides credentials found on the page.
    #[serde(default)]
    pub local_credentials: Option<LocalCredentials>,
}

impl ClientConfig {
    #[must_use]
    pub fn new(instance_url: impl Into<String>) -> Self {
        Self { instance_url: instance_url.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_api_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.instance_api_endpoint_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_force_direct(mut self, force: bool) -> Self {
        self.force_direct = force;
        self
    }

    #[must_use]
    pub fn with_force_widget(mut self, force: bool) -> Self {
        self.force_widget = force;
        self
    }

    #[must_use]
    pub fn with_local_credentials(mut self, credentials: LocalCredentials) -> Self {
        self.local_credentials = Some(credentials);
        self
    }

    /// Parse options from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] for malformed JSON or a missing
    /// `instanceUrl`.
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        serde_json::from_str(raw).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Endpoint the direct transport posts to.
    #[must_use]
    pub fn api_endpoint_url(&self) -> String {
        self.instance_api_endpoint_url
            .clone()
            .unwrap_or_else(|| agent_app_api_url(&self.instance_url))
    }

    /// The transport forced by the override flags, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingOverrides`] when both flags are set.
    pub fn forced_kind(&self) -> Result<Option<CommsKind>, Error> {
        match (self.force_direct, self.force_widget) {
            (true, true) => Err(Error::ConflictingOverrides),
            (true, false) => Ok(Some(CommsKind::Direct)),
            (false, true) => Ok(Some(CommsKind::Widget)),
            (false, false) => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
