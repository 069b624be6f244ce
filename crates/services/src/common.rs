use regex::Regex;
use std::sync::LazyLock;

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s)]+").expect("valid URL regex"));
static IP_PORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}:\d+\b").expect("valid IP:port regex")
});
static IP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").expect("valid IP regex")
});

/// Strip infrastructure details (URLs, IP addresses) from a provider error
/// before it is logged at info level or shown to a client.
pub fn sanitize_error_message(error: &str) -> String {
    let sanitized = URL_REGEX.replace_all(error, "[URL_REDACTED]");
    let sanitized = IP_PORT_REGEX.replace_all(&sanitized, "[IP_REDACTED]");
    let sanitized = IP_REGEX.replace_all(&sanitized, "[IP_REDACTED]");

    sanitized.replace(
        "error sending request for url",
        "provider connection failed",
    )
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
