/// Static knowledge base mapping provider error codes to one concrete
/// remediation step. Codes not listed here fall back to a generic hint in
/// the reporter.
pub fn remediation_for(code: &str) -> Option<&'static str> {
    match code {
        "access_denied" => Some(
            "the user or provider declined the request — re-run and approve the consent \
             screen, or check the app's allowed grant types in the dashboard",
        ),
        "redirect_uri_mismatch" | "invalid_redirect_uri" => Some(
            "register http://localhost:<port>/auth/callback (with the exact port this tool \
             uses) as an allowed redirect URI in the provider dashboard",
        ),
        "invalid_client" | "unauthorized_client" | "invalid_client_id" => Some(
            "check the client id and environment URL against the credentials shown in the \
             provider dashboard",
        ),
        "invalid_grant" => Some(
            "the authorization code was rejected — codes are single-use and short-lived, \
             so re-run the flow and complete the browser step promptly",
        ),
        "invalid_scope" => Some(
            "the requested scopes are not enabled for this client — adjust the client's \
             scope configuration in the dashboard",
        ),
        "organization_not_found" | "invalid_organization" => Some(
            "check the organization id against the organizations configured in the \
             provider dashboard",
        ),
        "state_mismatch" => Some(
            "the callback did not echo this run's state token — re-run the flow and \
             complete it in the freshly opened browser tab, not an old one",
        ),
        "missing_code" => Some(
            "the provider redirected back without a code or an error — check that the \
             authorization endpoint and mode are configured for the authorization-code flow",
        ),
        "server_error" | "temporarily_unavailable" => Some(
            "the provider reported an internal failure — retry later or check the \
             provider's status page",
        ),
        _ => None,
    }
}
