//! Autofix generation and application.
//!
//! Rules attach a [`Remedy`] hint to violations they know how to repair.
//! The generator turns the hint into a textual [`Fix`] only when the rule is
//! fixable and the replacement passes a syntactic compatibility check.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::ast::NodeKind;
use crate::classify::replace_embedded_colors;
use crate::policy::BrandPolicy;
use crate::types::{Fix, Violation};

static ACCESSOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*$")
        .unwrap_or_else(|e| unreachable!("invalid accessor regex: {e}"))
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^[A-Za-z][\w-]*=\{.+\}$")
        .unwrap_or_else(|e| unreachable!("invalid attribute regex: {e}"))
});

/// How a violation can be repaired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remedy {
    /// Replace these color values inside the literal with the first brand color.
    SubstituteColor {
        /// Offending color values, as written.
        offending: Vec<String>,
    },
    /// Replace the import's module specifier.
    RewriteImport {
        /// Brand-approved module path.
        canonical: String,
    },
    /// Replace the attribute with `className={accessor(...)}`.
    StyleToClassName {
        /// Styling accessor function.
        accessor: String,
    },
}

/// Derives fixes for one file.
#[derive(Debug, Clone, Copy)]
pub struct AutofixGenerator<'a> {
    policy: &'a BrandPolicy,
    source: &'a str,
}

impl<'a> AutofixGenerator<'a> {
    /// Creates a generator for `source` under `policy`.
    #[must_use]
    pub fn new(policy: &'a BrandPolicy, source: &'a str) -> Self {
        Self { policy, source }
    }

    /// Returns a safe fix for `violation`, or `None`.
    ///
    /// `fixable` is the rule definition's flag; non-fixable rules never
    /// produce fixes even if they attach a remedy.
    #[must_use]
    pub fn fix(&self, violation: &Violation, fixable: bool) -> Option<Fix> {
        if !fixable || violation.crashed {
            return None;
        }
        let remedy = violation.remedy.as_ref()?;
        let range = violation.range;
        let original = self.source.get(range.start_offset..range.end_offset)?;

        let replacement = match remedy {
            Remedy::SubstituteColor { offending } => {
                let primary = self.policy.primary_color()?;
                substitute_colors(original, offending, primary)
            }
            Remedy::RewriteImport { canonical } => rewrite_specifier(original, canonical),
            Remedy::StyleToClassName { accessor } => style_to_class_name(original, accessor),
        }?;

        if replacement == original || !is_compatible(violation.node_kind, original, &replacement) {
            debug!(
                "Dropped fix for {} at {}:{}",
                violation.rule_id, range.start_line, range.start_col
            );
            return None;
        }

        Some(Fix::new(range, replacement))
    }
}

fn substitute_colors(original: &str, offending: &[String], primary: &str) -> Option<String> {
    if offending.is_empty() {
        return None;
    }
    let out = replace_embedded_colors(original, |color| {
        offending
            .iter()
            .any(|o| o == color)
            .then(|| primary.to_string())
    });
    Some(out.into_owned())
}

fn rewrite_specifier(original: &str, canonical: &str) -> Option<String> {
    let quote = original.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    Some(format!("{quote}{canonical}{quote}"))
}

fn style_to_class_name(original: &str, accessor: &str) -> Option<String> {
    if !ACCESSOR.is_match(accessor) {
        return None;
    }
    let (_, value) = original.split_once('=')?;
    let value = value.trim();

    let argument = if let Some(inner) = value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
        inner.trim()
    } else if is_quoted(value) {
        value
    } else {
        return None;
    };

    if argument.is_empty() {
        return None;
    }
    Some(format!("className={{{accessor}({argument})}}"))
}

fn is_quoted(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) => open == close && matches!(open, '"' | '\'' | '`'),
        _ => false,
    }
}

/// Literal-for-literal and attribute-for-attribute check.
fn is_compatible(kind: NodeKind, original: &str, replacement: &str) -> bool {
    match kind {
        kind if kind.is_literal() => {
            let Some(quote) = original.chars().next() else {
                return false;
            };
            if !is_quoted(original) || !is_quoted(replacement) || !replacement.starts_with(quote) {
                return false;
            }
            let inner = &replacement[quote.len_utf8()..replacement.len() - quote.len_utf8()];
            !inner.contains('\n') || quote == '`'
        }
        NodeKind::JsxAttribute => {
            original.contains('=') && ATTRIBUTE.is_match(replacement) && braces_balanced(replacement)
        }
        _ => false,
    }
}

/// Whether `{`/`}` are balanced outside of string literals.
fn braces_balanced(text: &str) -> bool {
    let mut depth: i64 = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in text.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }

    depth == 0 && quote.is_none()
}

/// Result of applying fixes to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedFixes {
    /// Fixed source text.
    pub source: String,
    /// Number of fixes applied.
    pub applied: usize,
    /// Number of fixes skipped because they overlapped an earlier fix.
    pub skipped: usize,
}

/// Applies non-overlapping fixes to `source`.
///
/// Fixes are ordered by start offset; a fix overlapping an already accepted
/// one (or with an invalid range) is skipped. Edits are applied from the end
/// of the file so earlier offsets stay valid.
#[must_use]
pub fn apply_fixes<'f>(source: &str, fixes: impl IntoIterator<Item = &'f Fix>) -> AppliedFixes {
    let mut ordered: Vec<&Fix> = fixes.into_iter().collect();
    ordered.sort_by_key(|f| (f.range.start_offset, f.range.end_offset));

    let mut accepted: Vec<&Fix> = Vec::with_capacity(ordered.len());
    let mut skipped = 0;
    for fix in ordered {
        let valid = source
            .get(fix.range.start_offset..fix.range.end_offset)
            .is_some();
        let overlaps = accepted.last().is_some_and(|prev| {
            prev.range.overlaps(&fix.range) || prev.range.end_offset > fix.range.start_offset
        });
        if valid && !overlaps {
            accepted.push(fix);
        } else {
            skipped += 1;
        }
    }

    let mut out = source.to_string();
    for fix in accepted.iter().rev() {
        out.replace_range(
            fix.range.start_offset..fix.range.end_offset,
            &fix.replacement_text,
        );
    }

    AppliedFixes {
        source: out,
        applied: accepted.len(),
        skipped,
    }
}
