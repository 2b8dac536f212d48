mod collect;
mod output;
mod preflight;
mod prompt;
mod report;

use authprobe_core::authorize::DEFAULT_CALLBACK_PORT;
use authprobe_server::flow::{self, FlowOptions};
use clap::Parser;
use std::io::IsTerminal;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "authprobe",
    about = "Dry-run an OAuth loopback flow against a live identity environment",
    version
)]
struct Cli {
    /// Auth mode: 'fsa' (Full Stack Auth) or 'sso' (Modular SSO); omit to run interactively
    mode: Option<String>,

    /// Environment base URL, e.g. https://env-abc123.example.com
    #[arg(env = "AUTHPROBE_ENVIRONMENT_URL")]
    environment_url: Option<String>,

    /// OAuth client id issued for the environment
    #[arg(env = "AUTHPROBE_CLIENT_ID")]
    client_id: Option<String>,

    /// Organization id (required for sso mode)
    organization_id: Option<String>,

    /// Callback port; must match the redirect URI registered with the provider
    #[arg(long, default_value_t = DEFAULT_CALLBACK_PORT)]
    port: u16,

    /// Seconds to wait for the authorization callback
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Don't open a browser; print the authorization URL instead
    #[arg(long)]
    no_open: bool,

    /// Output the result as JSON (token values redacted to previews)
    #[arg(long, short = 'j')]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    if cli.mode.is_none() && !std::io::stdin().is_terminal() {
        anyhow::bail!(
            "interactive mode requires a terminal; pass <mode> <environment_url> \
             <client_id> [organization_id] instead"
        );
    }

    let mut prompter = prompt::TermPrompter;

    let config = collect::gather(
        collect::RawInput {
            mode: cli.mode,
            environment_url: cli.environment_url,
            client_id: cli.client_id,
            organization_id: cli.organization_id,
        },
        &mut prompter,
    )?;

    preflight::check(cli.port, cli.no_open, &mut prompter)?;

    let opts = FlowOptions {
        port: cli.port,
        open_browser: !cli.no_open,
        callback_timeout: Duration::from_secs(cli.timeout),
    };

    // The driver owns a runtime only for the networked stage; collection and
    // preflight stay synchronous and prompt-driven.
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(flow::run_flow(&config, &opts))?;

    report::render(&result, cli.json)?;
    Ok(if result.is_success() { 0 } else { 1 })
}
