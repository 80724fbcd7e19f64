//! Violation aggregation: deduplication and source ordering.

use std::collections::HashSet;

use crate::types::{Span, Violation};

/// Deduplicates on `(rule id, span)` keeping the first occurrence, then
/// orders by line and column. The sort is stable, so violations at the same
/// position keep their dispatch order.
#[must_use]
pub fn aggregate(violations: impl IntoIterator<Item = Violation>) -> Vec<Violation> {
    let mut seen: HashSet<(String, Span)> = HashSet::new();
    let mut out: Vec<Violation> = violations
        .into_iter()
        .filter(|v| seen.insert((v.rule_id.clone(), v.range)))
        .collect();
    out.sort_by_key(|v| (v.range.start_line, v.range.start_col));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rule: &str, line: usize, col: usize, message: &str) -> Violation {
        let offset = line * 100 + col;
        Violation::new(
            rule,
            Span::new((line, col), (line, col + 3), (offset, offset + 3)),
            message,
        )
    }

    #[test]
    fn test_duplicates_keep_first() {
        let out = aggregate(vec![
            at("colors", 1, 1, "first"),
            at("colors", 1, 1, "second"),
            at("icons", 1, 1, "other rule"),
        ]);
        let messages: Vec<_> = out.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "other rule"]);
    }

    #[test]
    fn test_sorted_by_position_stably() {
        let out = aggregate(vec![
            at("b", 3, 1, "c"),
            at("z", 1, 5, "b"),
            at("a", 1, 2, "a1"),
            at("y", 1, 2, "a2"),
        ]);
        let messages: Vec<_> = out.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(messages, vec!["a1", "a2", "b", "c"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(Vec::new()).is_empty());
    }
}
