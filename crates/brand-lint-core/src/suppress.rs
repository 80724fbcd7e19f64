//! Comment-based suppression directives.
//!
//! Supports directives like:
//! ```text
//! // brand-lint: allow(brand-enforce-colors) reason="chart palette"
//! {/* brand-lint: allow(brand-no-inline-styles) */}
//! ```
//!
//! A directive applies to its own line and to the line after it.

use std::collections::HashSet;

use crate::types::Violation;

const MARKER: &str = "brand-lint:";

/// Result of checking for a suppression directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not suppressed.
    Denied,
    /// Rule is suppressed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed suppression directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowDirective {
    /// Rule ids that are allowed; `all` matches every rule.
    pub rules: HashSet<String>,
    /// Optional reason.
    pub reason: Option<String>,
}

impl AllowDirective {
    fn covers(&self, rule_id: &str) -> bool {
        self.rules.contains(rule_id) || self.rules.contains("all")
    }
}

/// Index of the directives in one file, by 1-indexed line.
#[derive(Debug, Clone, Default)]
pub struct Suppressions {
    lines: Vec<Option<AllowDirective>>,
}

impl Suppressions {
    /// Scans `source` for directives.
    #[must_use]
    pub fn scan(source: &str) -> Self {
        Self {
            lines: source.lines().map(parse_allow_directive).collect(),
        }
    }

    /// Whether the file contains no directives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(Option::is_none)
    }

    /// Checks whether `rule_id` is suppressed on `line` (1-indexed).
    #[must_use]
    pub fn check(&self, line: usize, rule_id: &str) -> AllowCheck {
        for check_line in [line.saturating_sub(1), line] {
            if check_line == 0 {
                continue;
            }
            if let Some(Some(directive)) = self.lines.get(check_line - 1) {
                if directive.covers(rule_id) {
                    return AllowCheck::Allowed {
                        reason: directive.reason.clone(),
                    };
                }
            }
        }
        AllowCheck::Denied
    }

    /// Drops suppressed violations. Crash reports are never suppressed.
    #[must_use]
    pub fn filter(&self, violations: Vec<Violation>) -> Vec<Violation> {
        if self.is_empty() {
            return violations;
        }
        violations
            .into_iter()
            .filter(|v| v.crashed || !self.check(v.range.start_line, &v.rule_id).is_allowed())
            .collect()
    }
}

/// Parses a directive from a source line containing a comment.
fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    let marker_at = line.find(MARKER)?;
    let before = &line[..marker_at];
    if !before.contains("//") && !before.contains("/*") {
        return None;
    }

    let directive = line[marker_at + MARKER.len()..].trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()));

    Some(AllowDirective { rules, reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Span;

    #[test]
    fn test_parse_allow_directive() {
        let directive = parse_allow_directive("// brand-lint: allow(brand-enforce-colors)").unwrap();
        assert!(directive.rules.contains("brand-enforce-colors"));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_jsx_comment_with_reason() {
        let directive = parse_allow_directive(
            "  {/* brand-lint: allow(brand-no-inline-styles, brand-enforce-colors) reason=\"animation\" */}",
        )
        .unwrap();
        assert_eq!(directive.rules.len(), 2);
        assert_eq!(directive.reason.as_deref(), Some("animation"));
    }

    #[test]
    fn test_marker_outside_comment_is_ignored() {
        assert!(parse_allow_directive(r#"const s = "brand-lint: allow(all)";"#).is_none());
        assert!(parse_allow_directive("// brand-lint: allow()").is_none());
    }

    #[test]
    fn test_same_and_previous_line() {
        let source = "const a = 1;\n// brand-lint: allow(brand-enforce-colors) reason=\"legacy\"\nconst c = \"#123456\";\nconst d = \"#654321\"; // brand-lint: allow(all)\nconst e = \"#000000\";\n";
        let s = Suppressions::scan(source);

        let check = s.check(3, "brand-enforce-colors");
        assert_eq!(check.reason(), Some("legacy"));
        assert!(!s.check(3, "brand-enforce-icons").is_allowed());
        assert!(s.check(4, "brand-enforce-icons").is_allowed());
        // line 5 is covered by the trailing directive on line 4
        assert!(s.check(5, "brand-enforce-icons").is_allowed());
        assert!(!s.check(1, "brand-enforce-colors").is_allowed());
    }

    #[test]
    fn test_filter_keeps_crash_reports() {
        let source = "// brand-lint: allow(all)\nx\n";
        let span = Span::new((2, 1), (2, 2), (26, 27));
        let s = Suppressions::scan(source);
        let out = s.filter(vec![
            Violation::new("brand-enforce-colors", span, "m"),
            Violation::rule_crashed("brand-enforce-colors", span, "boom"),
        ]);
        assert_eq!(out.len(), 1);
        assert!(out[0].crashed);
    }
}
