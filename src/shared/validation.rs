use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters that are replaced when storing an uploaded file's original name
    /// - Kept: ASCII letters, digits, '.', '-', '_'
    /// - Replaced: spaces, path separators, quotes, non-ASCII
    pub static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]+").unwrap();
}

/// Maximum length kept from a client supplied filename
const MAX_FILENAME_LENGTH: usize = 120;

/// Make a client supplied filename safe to store and display.
///
/// Directory components are dropped, unsafe runs become a single '_', and the
/// result is never empty.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(base, "_");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        return "unnamed".to_string();
    }

    trimmed.chars().take(MAX_FILENAME_LENGTH).collect()
}
