// ──────────────────────────────────────────────
// Endpoint and model validators
// ──────────────────────────────────────────────

use std::sync::LazyLock;

use regex::Regex;

use super::RemoteError;

const MAX_MODEL_NAME_LEN: usize = 128;

/// Validate the advisor base URL.
///
/// https is accepted for any host. Plain http is accepted only for
/// loopback hosts (`localhost`, `127.0.0.1`, `[::1]`) so questionnaires
/// never cross the network unencrypted.
pub fn validate_base_url(url: &str) -> Result<(), RemoteError> {
    let (secure, after_scheme) = if let Some(rest) = url.strip_prefix("https://") {
        (true, rest)
    } else if let Some(rest) = url.strip_prefix("http://") {
        (false, rest)
    } else {
        return Err(RemoteError::InvalidUrl(url.to_string()));
    };

    let authority = after_scheme.split(['/', '?', '#']).next().unwrap_or("");
    if authority.contains('@') {
        return Err(RemoteError::InvalidUrl(url.to_string()));
    }

    // IPv6 bracket notation: [::1]:8080
    let host = if let Some(bracketed) = authority.strip_prefix('[') {
        match bracketed.split_once(']') {
            Some((host, _)) => host,
            None => return Err(RemoteError::InvalidUrl(url.to_string())),
        }
    } else {
        authority.split(':').next().unwrap_or("")
    };

    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(RemoteError::InvalidUrl(url.to_string()));
    }

    if secure || is_loopback(host) {
        Ok(())
    } else {
        Err(RemoteError::InsecureEndpoint(host.to_string()))
    }
}

fn is_loopback(host: &str) -> bool {
    matches!(host.to_ascii_lowercase().as_str(), "localhost" | "127.0.0.1" | "::1")
}

/// Validate a model identifier before it is placed in a request body.
///
/// Accepts names like `gpt-4o-2024-08-06`, `ft:gpt-4o-mini:org:abc123` and
/// `namespace/model:tag`. At most one `/`; every segment starts alphanumeric.
pub fn validate_model_name(name: &str) -> Result<(), RemoteError> {
    static MODEL_NAME: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._:-]*(/[a-zA-Z0-9][a-zA-Z0-9._:-]*)?$")
            .expect("static regex")
    });

    if name.len() > MAX_MODEL_NAME_LEN || !MODEL_NAME.is_match(name) {
        return Err(RemoteError::InvalidModelName(name.to_string()));
    }
    Ok(())
}
