//! Slug derivation
//!
//! Turns document titles and heading text into URL-safe identifiers. The
//! mapping is lossy and case-insensitive: anything outside `[a-z0-9]` is
//! collapsed into a single `-` and apostrophes are dropped so that
//! contractions stay in one word.

use regex::Regex;
use std::sync::OnceLock;

fn separators() -> Option<&'static Regex> {
    static SEPARATORS: OnceLock<Option<Regex>> = OnceLock::new();
    SEPARATORS
        .get_or_init(|| match Regex::new(r"[^a-z0-9]+") {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::error!(error = %e, "Slug separator pattern failed to compile");
                None
            }
        })
        .as_ref()
}

/// Character-level equivalent of the separator pattern
fn join_words(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_lowercase() && !c.is_ascii_digit())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Derive a slug from free text, e.g. `"Hello World!"` -> `"hello-world"`
pub fn slugify(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .collect();

    match separators() {
        Some(re) => re.replace_all(&lowered, "-").trim_matches('-').to_string(),
        None => join_words(&lowered),
    }
}

/// Whether `title` derives to `slug`, ignoring case on the requested side
pub fn matches(title: &str, slug: &str) -> bool {
    slugify(title) == slug.to_lowercase()
}
