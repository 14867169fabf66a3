//! Helpers for model output that wraps structured payloads in markdown.

/// Strip a markdown code fence wrapping a JSON or YAML payload.
///
/// Handles `` ```json ``, `` ```yaml ``, bare `` ``` `` and stray fences the model leaves
/// on only one side.
#[must_use]
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed.strip_suffix("```").unwrap_or(trimmed).trim();
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    match inner.split_once('\n') {
        Some((lang, rest)) if !lang.trim().contains(char::is_whitespace) => rest.trim(),
        _ => inner.trim(),
    }
}
