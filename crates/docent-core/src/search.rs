//! Keyword-frequency relevance scoring over stored document texts.
//!
//! This is deliberately NOT semantic search: the score of a document is the
//! sum, over the whitespace-split query terms, of each term's substring
//! occurrence count in the lower-cased document text. No stemming, no
//! stop-word removal, no word boundaries, and no deduplication of repeated
//! query terms (repeating a term weighs it proportionally). The ranking is
//! reproduced from the original service as-is rather than upgraded.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text::truncate_chars;

/// Snippet length returned with each hit, in characters of original-case text.
pub const SNIPPET_CHARS: usize = 200;

/// One search result: a document id, its relevance score, and a text snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: Uuid,
    pub score: u64,
    pub snippet: String,
}

/// Split a query into lower-cased terms.
///
/// Whitespace-delimited, repeated terms kept. An empty or all-whitespace
/// query yields no terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Score a lower-cased document text against the given terms.
///
/// Substring-count semantics: "cat" matches inside "concatenate".
pub fn score_text(lowered_text: &str, terms: &[String]) -> u64 {
    terms
        .iter()
        .map(|term| lowered_text.matches(term.as_str()).count() as u64)
        .sum()
}

/// First [`SNIPPET_CHARS`] characters of the original-case text.
pub fn snippet(text: &str) -> String {
    truncate_chars(text, SNIPPET_CHARS).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_are_lowercased_and_split() {
        assert_eq!(query_terms("Cats AND Dogs"), vec!["cats", "and", "dogs"]);
    }

    #[test]
    fn empty_query_yields_no_terms() {
        assert!(query_terms("").is_empty());
        assert!(query_terms("   \t\n").is_empty());
    }

    #[test]
    fn repeated_terms_are_kept() {
        assert_eq!(query_terms("cats cats"), vec!["cats", "cats"]);
    }

    #[test]
    fn score_sums_occurrences_per_term() {
        let text = "dogs and cats and dogs";
        assert_eq!(score_text(text, &query_terms("cats dogs")), 3);
    }

    #[test]
    fn repeated_query_term_doubles_weight() {
        let text = "cats are cats";
        assert_eq!(score_text(text, &query_terms("cats")), 2);
        assert_eq!(score_text(text, &query_terms("cats cats")), 4);
    }

    #[test]
    fn scoring_is_substring_not_word_boundary() {
        let text = "concatenate";
        assert_eq!(score_text(text, &query_terms("cat")), 1);
    }

    #[test]
    fn no_match_scores_zero() {
        assert_eq!(score_text("dogs are great", &query_terms("xyz123")), 0);
    }

    #[test]
    fn snippet_keeps_original_case() {
        let text = "The Quick Brown Fox";
        assert_eq!(snippet(text), "The Quick Brown Fox");
    }

    #[test]
    fn snippet_is_capped_at_200_chars() {
        let text = "a".repeat(500);
        assert_eq!(snippet(&text).chars().count(), SNIPPET_CHARS);
    }
}
