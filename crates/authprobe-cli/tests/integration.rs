use assert_cmd::Command;
use predicates::prelude::*;

/// Build a command with the credential env vars cleared so the host
/// environment can't leak into argument-resolution tests.
fn authprobe() -> Command {
    let mut cmd = Command::cargo_bin("authprobe").unwrap();
    cmd.env_remove("AUTHPROBE_ENVIRONMENT_URL");
    cmd.env_remove("AUTHPROBE_CLIENT_ID");
    cmd
}

#[test]
fn sso_without_organization_fails_validation() {
    authprobe()
        .args(["sso", "https://env-abc123.example.com", "skc_test"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "organization id required for sso mode",
        ));
}

#[test]
fn fsa_with_organization_is_rejected() {
    authprobe()
        .args([
            "fsa",
            "https://env-abc123.example.com",
            "skc_test",
            "org_123",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("only valid in sso mode"));
}

#[test]
fn invalid_environment_url_fails_before_any_flow() {
    authprobe()
        .args(["fsa", "env.example.com", "skc_test"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("is not an http(s) URL"))
        .stderr(predicate::str::contains("env.example.com"));
}

#[test]
fn unknown_mode_is_rejected() {
    authprobe()
        .args(["saml", "https://env-abc123.example.com", "skc_test"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid mode 'saml'"));
}

#[test]
fn missing_client_id_names_the_env_var() {
    authprobe()
        .args(["fsa", "https://env-abc123.example.com"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("client id is required"))
        .stderr(predicate::str::contains("AUTHPROBE_CLIENT_ID"));
}

#[test]
fn credentials_fall_back_to_env_vars() {
    // Both values come from the environment; the bad URL proves they were read.
    authprobe()
        .arg("fsa")
        .env("AUTHPROBE_ENVIRONMENT_URL", "not-a-url")
        .env("AUTHPROBE_CLIENT_ID", "skc_test")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not-a-url"));
}

#[test]
fn interactive_mode_requires_a_terminal() {
    // No args and a piped stdin: refuse rather than hang on a prompt.
    authprobe()
        .write_stdin("")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("interactive mode requires a terminal"));
}

#[test]
fn help_documents_the_surface() {
    authprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-open"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("ORGANIZATION_ID"));
}
