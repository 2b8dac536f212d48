pub mod exchange;
pub mod flow;
pub mod state;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use state::AppState;
use tower_http::trace::TraceLayer;

/// Query parameters the provider sends to the redirect URI. Everything is
/// optional at the wire level; classification happens in the flow driver.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

const PAGE_SUCCESS: &str = "<!DOCTYPE html><html><head><title>authprobe</title></head>\
    <body style=\"font-family:sans-serif;padding:2rem\">\
    <h1>Sign-in received</h1><p>You can close this window and return to the terminal.</p>\
    </body></html>";

const PAGE_FAILURE: &str = "<!DOCTYPE html><html><head><title>authprobe</title></head>\
    <body style=\"font-family:sans-serif;padding:2rem\">\
    <h1>Authorization failed</h1><p>The provider reported an error. Details are in the \
    terminal.</p></body></html>";

const PAGE_ALREADY_HANDLED: &str = "<!DOCTYPE html><html><head><title>authprobe</title></head>\
    <body style=\"font-family:sans-serif;padding:2rem\">\
    <h1>Already handled</h1><p>This run has already received its callback.</p>\
    </body></html>";

/// Build the one-shot callback router. Exposed separately from the flow
/// driver so tests can drive it without a socket.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(authprobe_core::authorize::CALLBACK_PATH, get(receive_callback))
        .fallback(ignore_request)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn receive_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    let Some(tx) = state.take_sender() else {
        // Latch already consumed — a refresh or a duplicate redirect.
        return Html(PAGE_ALREADY_HANDLED);
    };

    let failed = params.error.is_some();
    // The receiver only disappears if the flow already gave up (timeout or
    // interrupt); the browser still deserves a page either way.
    let _ = tx.send(params);

    if failed {
        Html(PAGE_FAILURE)
    } else {
        Html(PAGE_SUCCESS)
    }
}

/// Browsers probe for /favicon.ico and the like; answer minimally and leave
/// the latch alone.
async fn ignore_request() -> StatusCode {
    StatusCode::NOT_FOUND
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
