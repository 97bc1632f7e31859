//! The CustomerProfiles operations exposed to agent-apps.

use std::fmt;

use crate::consts::OPERATION_TARGET_PREFIX;

/// One of the six operations the agent-app API accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    ListAccountIntegrations,
    CreateProfile,
    UpdateProfile,
    SearchProfiles,
    ListProfileObjects,
    AddProfileKey,
}

impl Operation {
    pub const ALL: [Self; 6] = [
        Self::ListAccountIntegrations,
        Self::CreateProfile,
        Self::UpdateProfile,
        Self::SearchProfiles,
        Self::ListProfileObjects,
        Self::AddProfileKey,
    ];

    /// Wire name of the operation, e.g. `"createProfile"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListAccountIntegrations => "listAccountIntegrations",
            Self::CreateProfile => "createProfile",
            Self::UpdateProfile => "updateProfile",
            Self::SearchProfiles => "searchProfiles",
            Self::ListProfileObjects => "listProfileObjects",
            Self::AddProfileKey => "addProfileKey",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the `x-amz-target` header for a method name.
///
/// Takes a raw name because relayed calls forward whatever the caller sent.
#[must_use]
pub fn target_header(method: &str) -> String {
    format!("{OPERATION_TARGET_PREFIX}{method}")
}

#[cfg(test)]
#[path = "operation_test.rs"]
mod tests;
