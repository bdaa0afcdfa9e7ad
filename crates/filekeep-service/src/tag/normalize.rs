//! Canonical comparison form of tag strings.
//!
//! Two raw tags denote the same tag iff their normalized forms are equal.
//! Stored tags keep the spelling the user typed; normalization is only ever
//! used for comparison and grouping.

use filekeep_core::error::AppError;
use filekeep_core::result::AppResult;

/// Maximum length of a tag, in characters.
pub const MAX_TAG_LENGTH: usize = 64;

/// Comparison key of a tag: trimmed and lowercased.
pub fn normalize(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Whether two raw tags denote the same tag.
pub fn same_tag(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Whether `tags` carries a tag equal to `tag` under normalization.
pub fn contains_tag(tags: &[String], tag: &str) -> bool {
    let key = normalize(tag);
    tags.iter().any(|t| normalize(t) == key)
}

/// Validate a user-supplied tag and return the spelling to store.
pub fn clean(tag: &str) -> AppResult<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Tag cannot be empty"));
    }
    if trimmed.chars().count() > MAX_TAG_LENGTH {
        return Err(AppError::validation(format!(
            "Tag cannot exceed {MAX_TAG_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Drop blank tags and later spellings of an already present tag.
pub fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty() && seen.insert(normalize(t)))
        .map(str::to_string)
        .collect()
}
