use crate::prompt::Prompter;
use authprobe_core::error::{ProbeError, Result};
use std::net::TcpListener;

/// Preflight Checker: verify the environment can support a loopback flow
/// before anything networked starts. Each check runs once; no retries.
pub fn check(port: u16, no_open: bool, prompter: &mut dyn Prompter) -> Result<()> {
    if !no_open {
        check_browser_launcher()?;
    }
    check_port(port, prompter)
}

/// The one external program this tool still shells out to is the platform
/// browser opener. Missing it is fatal unless the user opted into manual
/// URL handling with --no-open.
fn check_browser_launcher() -> Result<()> {
    let candidates = browser_launcher_candidates();
    if candidates.iter().any(|c| which::which(c).is_ok()) {
        return Ok(());
    }
    Err(ProbeError::Preflight(format!(
        "no browser launcher found on PATH (looked for: {}) — install your platform's \
         opener (e.g. the xdg-utils package on Linux) or re-run with --no-open and open \
         the printed URL manually",
        candidates.join(", ")
    )))
}

fn browser_launcher_candidates() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &["open"]
    } else if cfg!(windows) {
        &["rundll32", "cmd"]
    } else {
        &["xdg-open", "gio", "wslview"]
    }
}

/// Probe the callback port by binding and immediately releasing it. When it
/// is busy the user decides: the tool never auto-selects another port,
/// because the redirect URI registered with the provider pins this one.
fn check_port(port: u16, prompter: &mut dyn Prompter) -> Result<()> {
    match TcpListener::bind(("127.0.0.1", port)) {
        Ok(probe) => {
            drop(probe);
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "warning: callback port {port} is already in use ({e}); the redirect \
                 cannot be received while another process holds it"
            );
            let proceed = prompter.confirm(
                &format!("Port {port} is busy — continue anyway?"),
                false,
            )?;
            if proceed {
                Ok(())
            } else {
                Err(ProbeError::Preflight(format!(
                    "callback port {port} is in use — stop the process holding it \
                     (try `lsof -i :{port}`) or pass --port with an alternative that is \
                     registered with the provider"
                )))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
