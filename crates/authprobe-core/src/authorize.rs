use crate::config::{AuthMode, RunConfig};
use crate::error::{ProbeError, Result};
use url::Url;

/// Path the provider redirects back to. The full redirect URI (including the
/// port) must match a value registered in the provider dashboard exactly.
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Default callback port. Changing it silently would break the registered
/// redirect URI, so overrides are explicit (`--port`).
pub const DEFAULT_CALLBACK_PORT: u16 = 12456;

pub fn redirect_uri(port: u16) -> String {
    format!("http://localhost:{port}{CALLBACK_PATH}")
}

/// Build the provider authorization URL for one run. All parameters go
/// through typed URL setters; nothing is string-spliced.
pub fn authorize_url(config: &RunConfig, redirect_uri: &str, state: &str) -> Result<Url> {
    let mut url = Url::parse(&config.environment_url).map_err(|e| {
        ProbeError::Validation(format!(
            "environment url '{}' cannot be parsed: {e}",
            config.environment_url
        ))
    })?;
    url.set_path("/oauth/authorize");

    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("state", state)
        .append_pair("mode", config.mode.as_str());

    if config.mode == AuthMode::ModularSso {
        if let Some(org) = &config.organization_id {
            url.query_pairs_mut().append_pair("organization_id", org);
        }
    }

    Ok(url)
}
