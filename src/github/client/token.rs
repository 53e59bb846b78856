//! Personal access token lookup.
//!
//! An explicit `--token` always wins; otherwise [`TOKEN_ENV_VARS`] are consulted in order and the first
//! non-empty one is used. No token at all means unauthenticated (and heavily rate-limited) access.

use log::debug;

/// Environment variables holding a GitHub token, by priority.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GHCTL_TOKEN", "GITHUB_TOKEN"];

/// Resolves the token from the process environment.
pub fn resolve_token(explicit: Option<&str>) -> Option<String> {
    resolve_token_with(explicit, |name| std::env::var(name).ok())
}

/// Resolves the token using `lookup` in place of the process environment.
pub fn resolve_token_with<L>(explicit: Option<&str>, lookup: L) -> Option<String>
where
    L: Fn(&str) -> Option<String>,
{
    if let Some(token) = non_empty(explicit.map(str::to_string)) {
        debug!("Using GitHub token given through the command line.");
        return Some(token);
    }

    TOKEN_ENV_VARS.iter().find_map(|name| {
        let token = non_empty(lookup(name));
        if token.is_some() {
            debug!("Using GitHub token from [{}].", name);
        }
        token
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn ghctl_token_takes_precedence_over_github_token() {
        let vars = env(&[("GHCTL_TOKEN", "ghctl"), ("GITHUB_TOKEN", "github")]);
        let token = resolve_token_with(None, |name| vars.get(name).cloned());

        assert_eq!(token.as_deref(), Some("ghctl"));
    }

    #[test]
    fn empty_variables_are_skipped() {
        let vars = env(&[("GHCTL_TOKEN", "  "), ("GITHUB_TOKEN", "github")]);
        let token = resolve_token_with(None, |name| vars.get(name).cloned());

        assert_eq!(token.as_deref(), Some("github"));
    }

    #[test]
    fn explicit_token_wins_over_environment() {
        let vars = env(&[("GHCTL_TOKEN", "ghctl")]);
        let token = resolve_token_with(Some("flag"), |name| vars.get(name).cloned());

        assert_eq!(token.as_deref(), Some("flag"));
    }

    #[test]
    fn missing_token_means_anonymous_access() {
        assert_eq!(resolve_token_with(Some(""), |_| None), None);
    }
}
