//! Output filename stems for event pages.
//!
//! `"Spring Gala!!"` → `spring-gala`. Lower-case the title, collapse every run
//! of characters outside `[a-z0-9]` into a single `-`, then drop one leading
//! and one trailing `-`. Non-ASCII letters count as separators.
//!
//! Records without a title use their raw id unchanged. Slugs are not made
//! unique: two records with the same slug write the same file and the later
//! one wins.

/// Slug for a record with the given title and id.
pub fn slugify(title: Option<&str>, id: &str) -> String {
    match title {
        Some(t) if !t.is_empty() => slug_from_title(t),
        _ => id.to_string(),
    }
}

fn slug_from_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_separator = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_separator = false;
        } else if !in_separator {
            slug.push('-');
            in_separator = true;
        }
    }
    let slug = slug.strip_prefix('-').unwrap_or(&slug);
    let slug = slug.strip_suffix('-').unwrap_or(slug);
    slug.to_string()
}
