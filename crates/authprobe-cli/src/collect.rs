use crate::prompt::Prompter;
use authprobe_core::config::{self, AuthMode, RunConfig};
use authprobe_core::error::{ProbeError, Result};

/// Field values after clap and environment resolution, before prompting.
pub struct RawInput {
    pub mode: Option<String>,
    pub environment_url: Option<String>,
    pub client_id: Option<String>,
    pub organization_id: Option<String>,
}

/// Input Collector: turn raw fields into a validated `RunConfig`, prompting
/// only in interactive mode (no mode argument given). Terminal I/O is the
/// only side effect; nothing network-facing happens here.
pub fn gather(raw: RawInput, prompter: &mut dyn Prompter) -> Result<RunConfig> {
    let interactive = raw.mode.is_none();

    let mode = match &raw.mode {
        Some(given) => given.parse::<AuthMode>()?,
        None => {
            let options = [
                AuthMode::FullStackAuth.label(),
                AuthMode::ModularSso.label(),
            ];
            match prompter.choice("Auth mode", &options, 0)? {
                0 => AuthMode::FullStackAuth,
                _ => AuthMode::ModularSso,
            }
        }
    };

    let environment_url = required(
        raw.environment_url,
        "environment url",
        "Environment URL (https://...)",
        config::ENV_ENVIRONMENT_URL,
        interactive,
        prompter,
    )?;
    let client_id = required(
        raw.client_id,
        "client id",
        "Client id",
        config::ENV_CLIENT_ID,
        interactive,
        prompter,
    )?;

    // Only prompt for the organization when the mode calls for it; the
    // RunConfig constructor is the single place that judges presence.
    let organization_id = match (mode, raw.organization_id) {
        (AuthMode::ModularSso, None) if interactive => {
            Some(prompter.input("Organization id", None)?)
        }
        (_, given) => given,
    };

    let config = RunConfig::new(environment_url, client_id, mode, organization_id)?;
    for warning in config.warnings() {
        eprintln!("warning: {}", warning.message);
    }
    Ok(config)
}

fn required(
    value: Option<String>,
    name: &str,
    prompt_label: &str,
    env_var: &str,
    interactive: bool,
    prompter: &mut dyn Prompter,
) -> Result<String> {
    if let Some(given) = value {
        let trimmed = given.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
    if !interactive {
        return Err(ProbeError::Validation(format!(
            "{name} is required: pass it as an argument or set {env_var}"
        )));
    }
    let entered = prompter.input(prompt_label, None)?;
    let entered = entered.trim();
    if entered.is_empty() {
        return Err(ProbeError::Validation(format!("{name} cannot be empty")));
    }
    Ok(entered.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
