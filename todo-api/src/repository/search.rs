//! In-process equivalent of PostgreSQL `simple` full-text matching
//!
//! `to_tsvector('simple', doc) @@ plainto_tsquery('simple', query)` lowercases
//! both sides, splits on anything that is not a letter or digit, and requires
//! every query token to appear in the document. Order and repetition do not
//! matter. A query with no tokens matches nothing.

use std::collections::HashSet;

/// Lowercased alphanumeric tokens of `text`
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Returns true if every token of `query` occurs in `document`
pub fn matches_plain_query(document: &str, query: &str) -> bool {
    let wanted = tokenize(query);
    if wanted.is_empty() {
        return false;
    }
    let have: HashSet<String> = tokenize(document).into_iter().collect();
    wanted.iter().all(|token| have.contains(token))
}
