//! URL and text canonicalization plus content fingerprinting.
//!
//! Comparison and hashing both run over canonicalized input so that trivial
//! formatting differences (case, punctuation, whitespace, query strings) do
//! not defeat duplicate detection.

use sha2::{Digest, Sha256};
use url::Url;

/// Strips the query string and fragment from a URL and lowercases the result.
/// Unparseable input falls back to a lowercased copy of the raw string; this
/// function never fails.
pub fn normalize_url(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string().to_lowercase()
        }
        Err(_) => url.trim().to_lowercase(),
    }
}

pub(crate) fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Lowercases text and keeps only CJK characters, ASCII letters, and digits.
/// Deliberately aggressive: punctuation and whitespace distinctions are gone
/// entirely, so reformatting a body does not change its canonical form.
pub fn canonicalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || is_cjk(*c))
        .collect()
}

/// SHA-256 of the canonicalized text, lowercase hex. Equal fingerprints are
/// treated as "same content" for duplicate detection.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonicalize_text(text).as_bytes());
    hex::encode(hasher.finalize())
}
