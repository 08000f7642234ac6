//! Jaccard-style similarity over character sets and keyword profiles.
//!
//! Title comparison works on the SET of individual characters, not tokens.
//! That makes it cheap and language-agnostic for CJK text, at the cost of
//! scoring anagram-like titles as identical. This is intentional behavior,
//! kept for compatibility with how stored articles were matched historically;
//! see the tests pinning it down.

use crate::canonical::{canonicalize_text, is_cjk};
use std::collections::{HashMap, HashSet};

/// Qualifying tokens must be longer than this many characters.
const MIN_TOKEN_CHARS: usize = 2;

/// A keyword profile keeps at most this many tokens.
const MAX_PROFILE_TOKENS: usize = 20;

fn jaccard<T: std::hash::Hash + Eq>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Jaccard similarity between the character sets of two canonicalized strings.
/// Symmetric, and always within [0, 1].
pub fn char_similarity(a: &str, b: &str) -> f64 {
    let set_a: HashSet<char> = canonicalize_text(a).chars().collect();
    let set_b: HashSet<char> = canonicalize_text(b).chars().collect();
    jaccard(&set_a, &set_b)
}

#[derive(PartialEq, Clone, Copy)]
enum RunKind {
    Cjk,
    Latin,
}

/// Extracts the highest-frequency qualifying tokens from case-folded text.
///
/// Tokens are maximal runs of CJK characters or maximal runs of ASCII letters;
/// everything else (whitespace, punctuation, digits) acts as a separator.
/// Runs of two characters or fewer are dropped. The top 20 tokens by
/// descending frequency are returned, ties broken by first appearance in the
/// text.
pub fn extract_keyword_profile(text: &str) -> Vec<String> {
    let folded = text.to_lowercase();

    fn flush(run: &mut String, tokens: &mut Vec<String>) {
        if run.chars().count() > MIN_TOKEN_CHARS {
            tokens.push(std::mem::take(run));
        } else {
            run.clear();
        }
    }

    let mut tokens: Vec<String> = Vec::new();
    let mut run = String::new();
    let mut run_kind: Option<RunKind> = None;

    for c in folded.chars() {
        let kind = if is_cjk(c) {
            Some(RunKind::Cjk)
        } else if c.is_ascii_alphabetic() {
            Some(RunKind::Latin)
        } else {
            None
        };
        if kind != run_kind {
            flush(&mut run, &mut tokens);
            run_kind = kind;
        }
        if kind.is_some() {
            run.push(c);
        }
    }
    flush(&mut run, &mut tokens);

    // Count frequencies, remembering where each token first appeared.
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (pos, token) in tokens.into_iter().enumerate() {
        let entry = counts.entry(token).or_insert((0, pos));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(MAX_PROFILE_TOKENS)
        .map(|(token, _)| token)
        .collect()
}

/// Jaccard similarity between two keyword profiles, order ignored.
pub fn profile_similarity(a: &[String], b: &[String]) -> f64 {
    let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();
    jaccard(&set_a, &set_b)
}
