use crate::error::{ProbeError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variables consulted when the matching argument is absent.
pub const ENV_ENVIRONMENT_URL: &str = "AUTHPROBE_ENVIRONMENT_URL";
pub const ENV_CLIENT_ID: &str = "AUTHPROBE_CLIENT_ID";

/// Client ids issued by the platform carry this prefix. A mismatch is worth
/// flagging but prefixes have changed before, so it is a warning, not an error.
pub const CLIENT_ID_PREFIX: &str = "skc_";

// ---------------------------------------------------------------------------
// AuthMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// The identity platform manages the full user/session lifecycle.
    FullStackAuth,
    /// The application keeps its own sessions and delegates only federation;
    /// flows must name the organization to route to.
    ModularSso,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::FullStackAuth => "fsa",
            AuthMode::ModularSso => "sso",
        }
    }

    /// Human-facing name, used in prompts and reports.
    pub fn label(&self) -> &'static str {
        match self {
            AuthMode::FullStackAuth => "Full Stack Auth",
            AuthMode::ModularSso => "Modular SSO",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fsa" => Ok(AuthMode::FullStackAuth),
            "sso" => Ok(AuthMode::ModularSso),
            other => Err(ProbeError::Validation(format!(
                "invalid mode '{other}': expected 'fsa' or 'sso'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigWarning
// ---------------------------------------------------------------------------

/// Non-fatal finding about a config value. The run continues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub message: String,
}

// ---------------------------------------------------------------------------
// RunConfig
// ---------------------------------------------------------------------------

/// Validated configuration for one dry-run invocation. Constructed once,
/// immutable thereafter; nothing here is ever persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub environment_url: String,
    pub client_id: String,
    pub mode: AuthMode,
    pub organization_id: Option<String>,
}

impl RunConfig {
    /// Build a config, enforcing the mode/organization invariant: an
    /// organization id is present exactly when the mode is Modular SSO.
    pub fn new(
        environment_url: impl Into<String>,
        client_id: impl Into<String>,
        mode: AuthMode,
        organization_id: Option<String>,
    ) -> Result<Self> {
        let environment_url = environment_url.into().trim().to_string();
        let client_id = client_id.into().trim().to_string();

        let url_shape = Regex::new(r"^https?://").expect("static pattern compiles");
        if !url_shape.is_match(&environment_url) {
            return Err(ProbeError::Validation(format!(
                "environment url '{environment_url}' is not an http(s) URL"
            )));
        }
        if client_id.is_empty() {
            return Err(ProbeError::Validation("client id cannot be empty".into()));
        }

        let organization_id = organization_id
            .map(|org| org.trim().to_string())
            .filter(|org| !org.is_empty());

        match (mode, &organization_id) {
            (AuthMode::ModularSso, None) => {
                return Err(ProbeError::Validation(
                    "organization id required for sso mode".into(),
                ));
            }
            (AuthMode::FullStackAuth, Some(org)) => {
                return Err(ProbeError::Validation(format!(
                    "organization id '{org}' is only valid in sso mode"
                )));
            }
            _ => {}
        }

        Ok(Self {
            environment_url,
            client_id,
            mode,
            organization_id,
        })
    }

    /// Non-fatal findings to surface before the flow starts.
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if !self.client_id.starts_with(CLIENT_ID_PREFIX) {
            warnings.push(ConfigWarning {
                message: format!(
                    "client id '{}' does not start with '{CLIENT_ID_PREFIX}' — double-check it \
                     against the dashboard if the flow fails",
                    self.client_id
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fsa_without_org_is_valid() {
        let cfg = RunConfig::new(
            "https://env-abc123.example.com",
            "skc_test",
            AuthMode::FullStackAuth,
            None,
        )
        .unwrap();
        assert_eq!(cfg.mode, AuthMode::FullStackAuth);
        assert!(cfg.organization_id.is_none());
    }

    #[test]
    fn sso_requires_org() {
        let err = RunConfig::new(
            "https://env-abc123.example.com",
            "skc_test",
            AuthMode::ModularSso,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ProbeError::Validation(_)));
        assert!(err
            .to_string()
            .contains("organization id required for sso mode"));
    }

    #[test]
    fn sso_rejects_empty_org() {
        let err = RunConfig::new(
            "https://env-abc123.example.com",
            "skc_test",
            AuthMode::ModularSso,
            Some("  ".into()),
        )
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("organization id required for sso mode"));
    }

    #[test]
    fn fsa_rejects_org() {
        let err = RunConfig::new(
            "https://env-abc123.example.com",
            "skc_test",
            AuthMode::FullStackAuth,
            Some("org_123".into()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("only valid in sso mode"));
    }

    #[test]
    fn sso_with_org_is_valid() {
        let cfg = RunConfig::new(
            "https://env-abc123.example.com",
            "skc_test",
            AuthMode::ModularSso,
            Some("org_123".into()),
        )
        .unwrap();
        assert_eq!(cfg.organization_id.as_deref(), Some("org_123"));
    }

    #[test]
    fn rejects_non_http_url() {
        for bad in ["ftp://env.example.com", "env.example.com", "", "https:/x"] {
            let err =
                RunConfig::new(bad, "skc_test", AuthMode::FullStackAuth, None).unwrap_err();
            assert!(
                err.to_string().contains("is not an http(s) URL"),
                "expected URL rejection for {bad:?}, got: {err}"
            );
        }
    }

    #[test]
    fn error_names_the_offending_url() {
        let err = RunConfig::new(
            "nota-url",
            "skc_test",
            AuthMode::FullStackAuth,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("nota-url"));
    }

    #[test]
    fn plain_http_is_accepted() {
        // Local mock environments are served over plain http.
        RunConfig::new("http://127.0.0.1:9999", "skc_test", AuthMode::FullStackAuth, None)
            .unwrap();
    }

    #[test]
    fn client_id_prefix_mismatch_warns_but_constructs() {
        let cfg = RunConfig::new(
            "https://env-abc123.example.com",
            "legacy_client",
            AuthMode::FullStackAuth,
            None,
        )
        .unwrap();
        let warnings = cfg.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("legacy_client"));
    }

    #[test]
    fn expected_prefix_produces_no_warnings() {
        let cfg = RunConfig::new(
            "https://env-abc123.example.com",
            "skc_test",
            AuthMode::FullStackAuth,
            None,
        )
        .unwrap();
        assert!(cfg.warnings().is_empty());
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("fsa".parse::<AuthMode>().unwrap(), AuthMode::FullStackAuth);
        assert_eq!("SSO".parse::<AuthMode>().unwrap(), AuthMode::ModularSso);
        assert!("saml".parse::<AuthMode>().is_err());
    }
}
