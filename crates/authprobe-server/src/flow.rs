use crate::exchange::{self, ExchangeOutcome};
use crate::state::AppState;
use crate::CallbackParams;
use authprobe_core::authorize;
use authprobe_core::config::RunConfig;
use authprobe_core::error::{ProbeError, Result};
use authprobe_core::result::{decode_id_token_claims, CallbackResult};
use rand::{distributions::Alphanumeric, Rng};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Knobs for one flow run. The port default matches the redirect URI
/// convention registered with the provider.
#[derive(Debug, Clone)]
pub struct FlowOptions {
    pub port: u16,
    pub open_browser: bool,
    pub callback_timeout: Duration,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            port: authorize::DEFAULT_CALLBACK_PORT,
            open_browser: true,
            callback_timeout: Duration::from_secs(120),
        }
    }
}

/// Execute one complete authorization-code flow and return exactly one
/// `CallbackResult`. Re-running performs a fully independent flow — fresh
/// state token, fresh code, no caching.
pub async fn run_flow(config: &RunConfig, opts: &FlowOptions) -> Result<CallbackResult> {
    let listener = TcpListener::bind(("127.0.0.1", opts.port))
        .await
        .map_err(|e| {
            ProbeError::Preflight(format!(
                "failed to bind callback port {}: {e} — stop the process holding it or pass \
                 --port with the provider-registered alternative",
                opts.port
            ))
        })?;
    run_flow_on(config, listener, opts).await
}

/// Run the flow on a pre-bound listener, so callers (and tests) can use an
/// OS-assigned port. The listener and its serve task are torn down before
/// this returns on every path: success, provider error, timeout, interrupt.
pub async fn run_flow_on(
    config: &RunConfig,
    listener: TcpListener,
    opts: &FlowOptions,
) -> Result<CallbackResult> {
    let port = listener.local_addr()?.port();
    let redirect_uri = authorize::redirect_uri(port);
    let state_token = new_state_token();
    let auth_url = authorize::authorize_url(config, &redirect_uri, &state_token)?;

    let (app_state, callback_rx) = AppState::new();
    let app = crate::build_router(app_state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });
    tracing::info!("callback listener bound on http://localhost:{port}");

    println!("Authorization URL:\n  {auth_url}\n");
    if opts.open_browser {
        match open::that(auth_url.as_str()) {
            Ok(()) => println!("Opened the system browser — complete the sign-in there."),
            Err(e) => {
                tracing::warn!("browser launch failed: {e}");
                println!("Could not open a browser automatically; paste the URL above into one.");
            }
        }
    } else {
        println!("Open the URL above in a browser to continue.");
    }
    println!(
        "Waiting up to {}s for the callback on {redirect_uri} ...",
        opts.callback_timeout.as_secs()
    );

    let outcome = wait_for_callback(callback_rx, opts.callback_timeout).await;

    // Release the port lease before doing anything else: the single
    // authoritative callback (if any) has been consumed, and every return
    // below must leave the port free.
    let _ = shutdown_tx.send(());
    if let Ok(Err(e)) = server.await {
        tracing::warn!("callback listener shut down uncleanly: {e}");
    }

    let params = match outcome {
        WaitOutcome::Callback(params) => params,
        WaitOutcome::TimedOut => {
            return Ok(CallbackResult::timeout(opts.callback_timeout.as_secs()))
        }
        WaitOutcome::Interrupted => return Ok(CallbackResult::cancelled()),
        WaitOutcome::ListenerGone => {
            return Ok(CallbackResult::network(
                "callback listener closed before a callback arrived",
            ))
        }
    };

    // The exchange is the last suspension point; keep it interruptible too.
    let result = tokio::select! {
        result = complete_flow(config, &redirect_uri, &state_token, params) => result,
        _ = tokio::signal::ctrl_c() => CallbackResult::cancelled(),
    };
    Ok(result)
}

enum WaitOutcome {
    Callback(CallbackParams),
    TimedOut,
    Interrupted,
    ListenerGone,
}

async fn wait_for_callback(
    rx: oneshot::Receiver<CallbackParams>,
    timeout: Duration,
) -> WaitOutcome {
    tokio::select! {
        received = rx => match received {
            Ok(params) => WaitOutcome::Callback(params),
            Err(_) => WaitOutcome::ListenerGone,
        },
        _ = tokio::time::sleep(timeout) => WaitOutcome::TimedOut,
        _ = tokio::signal::ctrl_c() => WaitOutcome::Interrupted,
    }
}

/// Classify the received callback and, when it carries a code, redeem it.
/// Order matters: an explicit provider error wins, then state hygiene, then
/// the code itself.
async fn complete_flow(
    config: &RunConfig,
    redirect_uri: &str,
    state_token: &str,
    params: CallbackParams,
) -> CallbackResult {
    if let Some(error) = params.error {
        return CallbackResult::provider_error(error, params.error_description);
    }

    if params.state.as_deref() != Some(state_token) {
        return CallbackResult::provider_error(
            "state_mismatch",
            Some("the callback did not echo this run's state token".into()),
        );
    }

    let Some(code) = params.code else {
        return CallbackResult::provider_error(
            "missing_code",
            Some("the callback carried neither a code nor an error".into()),
        );
    };

    match exchange::exchange_code(config, redirect_uri, &code).await {
        ExchangeOutcome::Tokens(tokens) => {
            let claims = match tokens.id_token.as_deref() {
                Some(jwt) => match decode_id_token_claims(jwt) {
                    Ok(claims) => claims,
                    Err(e) => {
                        tracing::warn!("id token claims could not be decoded: {e}");
                        serde_json::Map::new()
                    }
                },
                None => serde_json::Map::new(),
            };
            CallbackResult::success(tokens, claims)
        }
        ExchangeOutcome::Provider { code, description } => {
            CallbackResult::provider_error(code, description)
        }
        ExchangeOutcome::Network { detail } => CallbackResult::network(detail),
    }
}

fn new_state_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
