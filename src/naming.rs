//! Slug derivation for lesson and assignment directory names.
//!
//! Every generated directory is named after a human-readable title:
//!
//! - `"Turtle Spiral"` → `turtle-spiral/`
//! - `"Flaming Ninja Star!"` → `flaming-ninja-star/`
//! - `"Lesson 2: Loops"` → `lesson-2-loops/`
//!
//! The same slug is used for the output directory and for the sidebar path,
//! so both always agree on where a page lives.

const MAX_SLUG_LEN: usize = 80;

/// Derive a URL-safe directory name from a title.
///
/// - Lowercases ASCII letters
/// - Replaces every other non-alphanumeric character with a dash
/// - Collapses consecutive dashes into one
/// - Strips leading and trailing dashes
/// - Truncates to `MAX_SLUG_LEN` characters (breaks at last dash before limit)
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut prev_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }

    let trimmed = slug.trim_end_matches('-');

    if trimmed.len() <= MAX_SLUG_LEN {
        trimmed.to_string()
    } else {
        let truncated = &trimmed[..MAX_SLUG_LEN];
        match truncated.rfind('-') {
            Some(pos) => truncated[..pos].to_string(),
            None => truncated.to_string(),
        }
    }
}
