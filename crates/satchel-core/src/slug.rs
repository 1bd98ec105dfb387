use std::sync::LazyLock;

use regex::Regex;

use crate::error::ToolsError;

static NON_SLUG_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static slug pattern is valid"));

/// Convert `input` into a URL-safe slug.
///
/// The input is lowercased, every run of characters outside `[a-z0-9]` becomes
/// a single `-`, and leading/trailing hyphens are trimmed. Non-Latin scripts
/// therefore disappear entirely.
pub fn slugify(input: &str) -> Result<String, ToolsError> {
    if input.is_empty() {
        return Err(ToolsError::EmptyString);
    }

    let lowered = input.to_lowercase();
    let slug = NON_SLUG_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string();

    if slug.is_empty() {
        return Err(ToolsError::EmptyAfterNormalization);
    }

    Ok(slug)
}
