//! Trigram similarity in the style of PostgreSQL's pg_trgm

use std::collections::HashSet;

/// Collect the trigrams of already-normalized text.
///
/// Each word is padded with two leading spaces and one trailing space,
/// so `cat` yields `"  c"`, `" ca"`, `"cat"` and `"at "`.
pub fn trigrams(text: &str) -> HashSet<String> {
    let mut set = HashSet::new();
    for word in text.split_whitespace() {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        for window in padded.windows(3) {
            set.insert(window.iter().collect());
        }
    }
    set
}

/// Jaccard similarity of two trigram sets, in `[0.0, 1.0]`
pub fn similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    shared as f64 / union as f64
}
