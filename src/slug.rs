//! Slug derivation and validation.

/// Lowercase, collapse every run of characters outside `[a-z0-9]` into a single `-`,
/// and trim leading/trailing dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// A usable external identifier: at least three characters of `[a-z0-9-]`.
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() >= 3
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// The supplied slug if non-blank, otherwise one derived from `source`.
pub fn resolve(supplied: Option<&str>, source: &str) -> String {
    match supplied.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slug.to_string(),
        None => slugify(source),
    }
}
