use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>?").expect("tag pattern is valid"));
static OCTET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("octet pattern is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("whitespace pattern is valid"));

/// Clean a single-line text field from a request.
///
/// Strips tags and percent-encoded octets, collapses runs of whitespace and
/// line breaks into single spaces, and trims the result.
pub fn sanitize_text_field(input: &str) -> String {
    let stripped = TAG.replace_all(input, "");
    let stripped = OCTET.replace_all(&stripped, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}
