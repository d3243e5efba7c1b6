//! Slug derivation.
//!
//! A slug is the URL-safe, lowercased, hyphenated form of a title. Videos
//! recompute theirs from the title on every save; categories and speakers
//! carry a caller-chosen slug that only has to be well-formed.

use unicode_normalization::UnicodeNormalization;

/// Convert arbitrary text into a slug.
///
/// Accented characters are decomposed and reduced to their ASCII base,
/// anything that is not a word character, whitespace or hyphen is dropped,
/// and runs of whitespace/hyphens collapse into a single `-`. Leading and
/// trailing `-`/`_` are trimmed.
///
/// ```
/// use richard::domain::slugify;
///
/// assert_eq!(slugify("Python 3: What's New?"), "python-3-whats-new");
/// assert_eq!(slugify("  Café -- Déjà vu "), "cafe-deja-vu");
/// ```
pub fn slugify(value: &str) -> String {
    let ascii: String = value.nfkd().filter(char::is_ascii).collect();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for c in ascii.chars() {
        if is_separator(c) {
            pending_separator = true;
            continue;
        }
        if !(c.is_ascii_alphanumeric() || c == '_') {
            continue;
        }
        if pending_separator && !slug.is_empty() {
            slug.push('-');
        }
        pending_separator = false;
        slug.push(c.to_ascii_lowercase());
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Check that a caller-supplied slug only uses `[-a-zA-Z0-9_]` and is non-empty.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// Python-style `\s` in ASCII also matches vertical tab.
fn is_separator(c: char) -> bool {
    c == '-' || c.is_ascii_whitespace() || c == '\x0b'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic_title() {
        assert_eq!(slugify("Introduction to Rust"), "introduction-to-rust");
        assert_eq!(slugify("PyCon 2012"), "pycon-2012");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("what's (new) in 3.3?"), "whats-new-in-33");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("a  -  b"), "a-b");
        assert_eq!(slugify("tabs\tand\nnewlines"), "tabs-and-newlines");
        assert_eq!(slugify("--leading and trailing--"), "leading-and-trailing");
    }

    #[test]
    fn test_slugify_trims_edge_hyphens_and_underscores() {
        assert_eq!(slugify("-hello-"), "hello");
        assert_eq!(slugify("__init__"), "init");
        assert_eq!(slugify("- _ -"), "");
    }

    #[test]
    fn test_slugify_transliterates_accents() {
        assert_eq!(slugify("Déjà Vu"), "deja-vu");
        assert_eq!(slugify("Straße"), "strae");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_slugify_keeps_underscores_inside() {
        assert_eq!(slugify("snake_case talk"), "snake_case-talk");
        assert_eq!(slugify("_private_"), "private");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        for title in [
            "Introduction to Rust",
            "  Café -- Déjà vu ",
            "a _ b",
            "_-weird-_",
            "",
        ] {
            let once = slugify(title);
            assert_eq!(slugify(&once), once, "not idempotent for {:?}", title);
        }
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("pycon-2012"));
        assert!(is_valid_slug("Under_Score"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("has space"));
        assert!(!is_valid_slug("café"));
    }
}
