use crate::error::{ProbeError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// TokenSet
// ---------------------------------------------------------------------------

/// Tokens returned by the provider token endpoint. Held in memory for the
/// lifetime of the report only — never written to disk, never logged.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Short display-safe preview of a secret: enough to recognize, not enough
/// to replay.
pub fn token_preview(token: &str) -> String {
    let head: String = token.chars().take(8).collect();
    format!("{head}… ({} chars)", token.chars().count())
}

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
}

impl UserProfile {
    /// Pull the standard display claims out of an ID-token claim set.
    pub fn from_claims(claims: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            claims
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let name = text("name").or_else(|| match (text("given_name"), text("family_name")) {
            (Some(given), Some(family)) => Some(format!("{given} {family}")),
            (Some(given), None) => Some(given),
            (None, Some(family)) => Some(family),
            (None, None) => None,
        });

        Self {
            name,
            email: text("email"),
            picture: text("picture"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.picture.is_none()
    }
}

// ---------------------------------------------------------------------------
// FlowStatus / CallbackResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FlowStatus {
    Success,
    UserCancelled,
    ProviderError {
        code: String,
        description: Option<String>,
    },
    NetworkError {
        detail: String,
    },
    Timeout {
        waited_secs: u64,
    },
}

/// Outcome of one loopback exchange. Exactly one of these is produced per
/// run; tokens and profile are present iff the status is `Success`.
#[derive(Debug, Clone)]
pub struct CallbackResult {
    pub status: FlowStatus,
    pub profile: Option<UserProfile>,
    pub raw_claims: Map<String, Value>,
    pub tokens: Option<TokenSet>,
}

impl CallbackResult {
    pub fn success(tokens: TokenSet, raw_claims: Map<String, Value>) -> Self {
        let profile = UserProfile::from_claims(&raw_claims);
        Self {
            status: FlowStatus::Success,
            profile: Some(profile),
            raw_claims,
            tokens: Some(tokens),
        }
    }

    pub fn provider_error(code: impl Into<String>, description: Option<String>) -> Self {
        Self::failed(FlowStatus::ProviderError {
            code: code.into(),
            description,
        })
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::failed(FlowStatus::NetworkError {
            detail: detail.into(),
        })
    }

    pub fn timeout(waited_secs: u64) -> Self {
        Self::failed(FlowStatus::Timeout { waited_secs })
    }

    pub fn cancelled() -> Self {
        Self::failed(FlowStatus::UserCancelled)
    }

    fn failed(status: FlowStatus) -> Self {
        Self {
            status,
            profile: None,
            raw_claims: Map::new(),
            tokens: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, FlowStatus::Success)
    }
}

// ---------------------------------------------------------------------------
// ID-token claims
// ---------------------------------------------------------------------------

/// Decode the payload segment of an ID token into its claim set.
///
/// No signature verification happens here: the token came over TLS from the
/// endpoint we called, and the claims are rendered for diagnostic display
/// only, never trusted for authorization.
pub fn decode_id_token_claims(id_token: &str) -> Result<Map<String, Value>> {
    let mut segments = id_token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) if segments.next().is_none() => payload,
        _ => {
            return Err(ProbeError::Validation(
                "id token is not a three-segment JWT".into(),
            ))
        }
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|e| {
        ProbeError::Validation(format!("id token payload is not base64url: {e}"))
    })?;

    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(map) => Ok(map),
        _ => Err(ProbeError::Validation(
            "id token payload is not a JSON object".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode_jwt(claims: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn decodes_claims_from_payload_segment() {
        let jwt = encode_jwt(&json!({
            "sub": "usr_1",
            "email": "kim@example.com",
            "name": "Kim Doe",
        }));
        let claims = decode_id_token_claims(&jwt).unwrap();
        assert_eq!(claims["email"], "kim@example.com");
        assert_eq!(claims["sub"], "usr_1");
    }

    #[test]
    fn rejects_non_jwt_input() {
        assert!(decode_id_token_claims("not-a-jwt").is_err());
        assert!(decode_id_token_claims("a.b").is_err());
        assert!(decode_id_token_claims("a.b.c.d").is_err());
    }

    #[test]
    fn rejects_non_object_payload() {
        let payload = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        assert!(decode_id_token_claims(&format!("h.{payload}.s")).is_err());
    }

    #[test]
    fn profile_prefers_name_claim() {
        let jwt = encode_jwt(&json!({
            "name": "Kim Doe",
            "given_name": "Kim",
            "family_name": "Doe",
            "email": "kim@example.com",
            "picture": "https://img.example.com/kim.png",
        }));
        let claims = decode_id_token_claims(&jwt).unwrap();
        let profile = UserProfile::from_claims(&claims);
        assert_eq!(profile.name.as_deref(), Some("Kim Doe"));
        assert_eq!(profile.email.as_deref(), Some("kim@example.com"));
        assert_eq!(
            profile.picture.as_deref(),
            Some("https://img.example.com/kim.png")
        );
    }

    #[test]
    fn profile_assembles_name_from_parts() {
        let claims = serde_json::from_value::<Map<String, Value>>(json!({
            "given_name": "Kim",
            "family_name": "Doe",
        }))
        .unwrap();
        let profile = UserProfile::from_claims(&claims);
        assert_eq!(profile.name.as_deref(), Some("Kim Doe"));
    }

    #[test]
    fn profile_from_empty_claims_is_empty() {
        assert!(UserProfile::from_claims(&Map::new()).is_empty());
    }

    #[test]
    fn success_result_carries_profile_and_tokens() {
        let claims = serde_json::from_value::<Map<String, Value>>(json!({
            "email": "kim@example.com",
        }))
        .unwrap();
        let tokens = TokenSet {
            access_token: "at_secret".into(),
            refresh_token: None,
            id_token: None,
            expires_in: Some(3600),
        };
        let result = CallbackResult::success(tokens, claims);
        assert!(result.is_success());
        assert_eq!(
            result.profile.as_ref().unwrap().email.as_deref(),
            Some("kim@example.com")
        );
        assert!(result.tokens.is_some());
    }

    #[test]
    fn failure_results_carry_no_tokens() {
        let result = CallbackResult::provider_error("access_denied", Some("User declined".into()));
        assert!(!result.is_success());
        assert!(result.tokens.is_none());
        assert!(result.profile.is_none());
        assert!(result.raw_claims.is_empty());
    }

    #[test]
    fn token_preview_truncates_and_counts() {
        let preview = token_preview("skc_at_0123456789abcdef");
        assert!(preview.starts_with("skc_at_0…"));
        assert!(preview.contains("23 chars"));
        assert!(!preview.contains("9abcdef"));
    }
}
