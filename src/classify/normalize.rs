// Text normalization applied before every rule check.
//
// Lowercases and collapses whitespace runs to a single space. Runs at the
// start or end are collapsed too, but never trimmed away: the rule checks
// are substring searches, so a leading space changes nothing downstream.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Any run of whitespace. regex-lite's `\s` is ASCII-only, so the Unicode
/// space separators (NBSP shows up a lot in Reddit markdown) are listed
/// explicitly.
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\s\x{1C}-\x{1F}\x{85}\x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}]+",
    )
    .expect("whitespace pattern is valid")
});

/// Canonicalize text for substring matching.
///
/// Empty input gives an empty string. Total and idempotent.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let lower = text.to_lowercase();
    WHITESPACE_RUN.replace_all(&lower, " ").into_owned()
}
