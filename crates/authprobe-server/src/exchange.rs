use authprobe_core::config::RunConfig;
use authprobe_core::result::TokenSet;
use serde::Deserialize;
use std::time::Duration;

/// Budget for the token-endpoint call. Deliberately separate from (and much
/// shorter than) the callback wait: a slow token endpoint is a different
/// failure than a user who never finished the browser step.
pub const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Token exchange outcome, already classified for reporting. Transport
/// failures and provider rejections have different root causes and must
/// never be conflated.
#[derive(Debug)]
pub enum ExchangeOutcome {
    Tokens(TokenSet),
    Provider {
        code: String,
        description: Option<String>,
    },
    Network {
        detail: String,
    },
}

/// Standard OAuth error body shape from the token endpoint.
#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

pub fn token_endpoint(environment_url: &str) -> String {
    format!("{}/oauth/token", environment_url.trim_end_matches('/'))
}

/// Redeem the authorization code at the provider's token endpoint.
pub async fn exchange_code(
    config: &RunConfig,
    redirect_uri: &str,
    code: &str,
) -> ExchangeOutcome {
    let endpoint = token_endpoint(&config.environment_url);
    tracing::debug!("exchanging authorization code at {endpoint}");

    let client = match reqwest::Client::builder().timeout(EXCHANGE_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            return ExchangeOutcome::Network {
                detail: format!("could not build HTTP client: {e}"),
            }
        }
    };

    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("client_id", config.client_id.as_str()),
    ];

    let response = match client.post(&endpoint).form(&form).send().await {
        Ok(response) => response,
        Err(e) => {
            let detail = if e.is_timeout() {
                format!("token endpoint {endpoint} did not answer within {}s", EXCHANGE_TIMEOUT.as_secs())
            } else {
                format!("could not reach token endpoint {endpoint}: {e}")
            };
            return ExchangeOutcome::Network { detail };
        }
    };

    let status = response.status();
    if status.is_success() {
        return match response.json::<TokenSet>().await {
            Ok(tokens) => ExchangeOutcome::Tokens(tokens),
            Err(e) => ExchangeOutcome::Network {
                detail: format!("token endpoint returned an unparseable body: {e}"),
            },
        };
    }

    // Non-2xx: prefer the structured OAuth error; fall back to the status.
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<OAuthErrorBody>(&body) {
        Ok(err) => ExchangeOutcome::Provider {
            code: err.error,
            description: err.error_description,
        },
        Err(_) => ExchangeOutcome::Provider {
            code: format!("http_{}", status.as_u16()),
            description: (!body.is_empty()).then(|| truncate(&body, 200)),
        },
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
