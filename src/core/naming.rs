//! core::naming
//!
//! Filename conventions for submitted solutions.
//!
//! Submissions are named `<number>_<title_words>.<ext>`, for example
//! `0001_two_sum.py`. The extension names the language and the title part
//! is the problem slug with underscores.

/// The language of a submission, taken from its extension.
///
/// # Example
///
/// ```
/// use leetpush::core::naming::language_of;
///
/// assert_eq!(language_of("0001_two_sum.py"), Some("py"));
/// assert_eq!(language_of("Makefile"), None);
/// ```
pub fn language_of(filename: &str) -> Option<&str> {
    let base = filename.rsplit('/').next().unwrap_or(filename);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// The problem slug for a submission filename.
///
/// Drops everything up to the first `_`, removes the extension, replaces
/// underscores with hyphens and lowercases.
///
/// # Example
///
/// ```
/// use leetpush::core::naming::problem_slug;
///
/// assert_eq!(problem_slug("0001_two_sum.py"), "two-sum");
/// assert_eq!(problem_slug("Valid_Parentheses.rs"), "parentheses");
/// ```
pub fn problem_slug(filename: &str) -> String {
    let base = filename.rsplit('/').next().unwrap_or(filename);
    let rest = base.split_once('_').map(|(_, rest)| rest).unwrap_or(base);
    let stem = rest.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(rest);
    stem.replace('_', "-").to_lowercase()
}
