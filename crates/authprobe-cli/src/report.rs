use crate::output;
use authprobe_core::remedy;
use authprobe_core::result::{token_preview, CallbackResult, FlowStatus};
use serde_json::{json, Value};

/// Result Reporter: render the flow outcome. Failure messages always carry
/// the failing stage, the specific condition, and one remediation step.
pub fn render(result: &CallbackResult, json_mode: bool) -> anyhow::Result<()> {
    if json_mode {
        return output::print_json(&display_json(result));
    }

    match &result.status {
        FlowStatus::Success => render_success(result),
        FlowStatus::ProviderError { code, description } => {
            println!("[authorization flow] provider returned '{code}'");
            if let Some(description) = description {
                println!("  {description}");
            }
            match remedy::remediation_for(code) {
                Some(fix) => println!("  fix: {fix}"),
                None => println!(
                    "  fix: look this code up in the provider dashboard's request logs"
                ),
            }
        }
        FlowStatus::NetworkError { detail } => {
            println!("[authorization flow] network failure: {detail}");
            println!("  fix: check the environment URL and your connectivity, then re-run");
        }
        FlowStatus::Timeout { waited_secs } => {
            println!(
                "[authorization flow] no callback arrived within {waited_secs}s — the \
                 browser sign-in was never completed"
            );
            println!("  fix: re-run and finish the browser step, or raise --timeout");
        }
        FlowStatus::UserCancelled => {
            println!("[authorization flow] cancelled before the callback arrived");
        }
    }
    Ok(())
}

fn render_success(result: &CallbackResult) {
    println!("Authentication succeeded.");

    if let Some(profile) = result.profile.as_ref().filter(|p| !p.is_empty()) {
        println!("\nProfile");
        let mut pairs = Vec::new();
        if let Some(name) = &profile.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(email) = &profile.email {
            pairs.push(("email", email.clone()));
        }
        if let Some(picture) = &profile.picture {
            pairs.push(("picture", picture.clone()));
        }
        output::print_kv(&pairs);
    }

    if !result.raw_claims.is_empty() {
        println!("\nID token claims");
        let rows = result
            .raw_claims
            .iter()
            .map(|(claim, value)| vec![claim.clone(), display_value(value)])
            .collect();
        output::print_table(&["CLAIM", "VALUE"], rows);
    }

    // Tokens are shown as recognizable previews only; full values stay in
    // memory and are never written anywhere.
    if let Some(tokens) = &result.tokens {
        println!("\nTokens");
        let mut pairs = vec![("access_token", token_preview(&tokens.access_token))];
        pairs.push((
            "refresh_token",
            tokens
                .refresh_token
                .as_deref()
                .map(token_preview)
                .unwrap_or_else(|| "(not returned)".into()),
        ));
        pairs.push((
            "id_token",
            match &tokens.id_token {
                Some(_) => format!("present ({} claims)", result.raw_claims.len()),
                None => "(not returned)".into(),
            },
        ));
        pairs.push((
            "expires_in",
            tokens
                .expires_in
                .map(|s| format!("{s}s"))
                .unwrap_or_else(|| "(not reported)".into()),
        ));
        output::print_kv(&pairs);
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Machine-readable shape for --json. Token secrets appear as previews
/// only, keeping piped output free of replayable credentials.
fn display_json(result: &CallbackResult) -> Value {
    let tokens = result.tokens.as_ref().map(|t| {
        json!({
            "access_token_preview": token_preview(&t.access_token),
            "refresh_token_present": t.refresh_token.is_some(),
            "id_token_present": t.id_token.is_some(),
            "expires_in": t.expires_in,
        })
    });
    json!({
        "status": &result.status,
        "profile": &result.profile,
        "claims": &result.raw_claims,
        "tokens": tokens,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
