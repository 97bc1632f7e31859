//! URL helpers: domain comparison and the endpoints derived from an
//! instance URL.

use url::Url;

use crate::consts::{AGENT_APP_API_PATH, WIDGET_APP_PATH};
use crate::error::Error;

/// Host of an absolute URL, parsed the way the browser's `URL` does.
///
/// IPv6 hosts keep their brackets. Returns `None` for relative URLs and
/// URLs without a host.
#[must_use]
pub fn hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().filter(|h| !h.is_empty()).map(str::to_owned)
}

/// Lowercased hostname with a leading `www.` removed.
#[must_use]
pub fn url_domain(url: &str) -> Option<String> {
    let host = hostname(url)?.to_ascii_lowercase();
    Some(match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_owned(),
        None => host,
    })
}

/// Whether the page at `page_url` is served from the instance's own domain.
///
/// A page whose location is unknown never counts as the connect domain.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if `instance_url` has no host.
pub fn is_connect_domain(instance_url: &str, page_url: Option<&str>) -> Result<bool, Error> {
    let instance =
        url_domain(instance_url).ok_or_else(|| Error::InvalidUrl(instance_url.to_owned()))?;
    Ok(page_url.and_then(url_domain).is_some_and(|page| page == instance))
}

/// URL of the CustomerProfiles widget app, e.g. `https://x/customerprofiles-v2`.
#[must_use]
pub fn widget_url(instance_url: &str) -> String {
    join(instance_url, WIDGET_APP_PATH)
}

/// Default agent-app API endpoint, e.g. `https://x/agent-app/api`.
#[must_use]
pub fn agent_app_api_url(instance_url: &str) -> String {
    join(instance_url, AGENT_APP_API_PATH)
}

fn join(base: &str, path: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
#[path = "urls_test.rs"]
mod tests;
