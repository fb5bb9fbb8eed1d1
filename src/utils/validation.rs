//! Input validation and normalisation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of characters that are not allowed in a slug
static SLUG_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// `#rgb` or `#rrggbb`
pub static HEX_COLOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());

const MAX_SLUG_LEN: usize = 50;

/// Derive a URL-safe slug from a display name
///
/// Lowercases, collapses every non-alphanumeric run into `-`, trims leading and
/// trailing dashes and caps the result at 50 characters.
pub fn slugify(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let dashed = SLUG_SEPARATOR_REGEX.replace_all(&lowered, "-");
    let trimmed = dashed.trim_matches('-');
    trimmed.chars().take(MAX_SLUG_LEN).collect()
}

/// Trim, drop empties, dedupe and sort a permission list
pub fn normalize_permissions<I, S>(permissions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = permissions
        .into_iter()
        .map(|p| p.as_ref().trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

/// Case-insensitive email comparison
pub fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
