use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;

const MAX_FILE_NAME_CHARS: usize = 100;
const DOWNLOAD_NAME_SOURCE_CHARS: usize = 50;
const FALLBACK_FILE_NAME: &str = "audio";

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.-]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Make `name` safe to use as a download file name.
///
/// Keeps word characters, whitespace, periods and hyphens, turns each
/// whitespace run into a single underscore and caps the result at 100
/// characters. Falls back to `audio` when nothing is left.
pub fn sanitize_filename(name: &str) -> String {
    let stripped = DISALLOWED.replace_all(name, "");
    let collapsed = WHITESPACE.replace_all(&stripped, "_");
    let truncated: String = collapsed.chars().take(MAX_FILE_NAME_CHARS).collect();

    if truncated.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        truncated
    }
}

/// `<sanitized text prefix>_<YYYYmmdd_HHMMSS>.mp3`
pub fn download_file_name(text: &str, generated_at: DateTime<Local>) -> String {
    let prefix: String = text.chars().take(DOWNLOAD_NAME_SOURCE_CHARS).collect();
    format!(
        "{}_{}.mp3",
        sanitize_filename(prefix.trim()),
        generated_at.format("%Y%m%d_%H%M%S")
    )
}
