//! Character-budget text helpers.
//!
//! The store and orchestrator bound everything they hand to the model (and
//! everything they return in search hits) in *characters*, not bytes, so the
//! cuts here must land on char boundaries to stay valid UTF-8.

/// Truncate `s` to at most `max_chars` characters, on a char boundary.
///
/// Returns the whole string when it is already within budget.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
