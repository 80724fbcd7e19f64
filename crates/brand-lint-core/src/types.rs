//! Core types for lint violations, fixes and per-file results.

use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ast::NodeKind;
use crate::autofix::Remedy;

/// Severity of a reported violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Developer-facing warning, does not block CI.
    Advisory,
    /// Must be fixed; blocks CI.
    Required,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advisory => write!(f, "advisory"),
            Self::Required => write!(f, "required"),
        }
    }
}

/// Level of a rule as understood by a host linter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    /// Rule is disabled.
    Off,
    /// Rule reports advisory violations.
    Warn,
    /// Rule reports required violations.
    Error,
}

impl RuleLevel {
    /// Severity assigned to violations at this level, `None` when off.
    #[must_use]
    pub fn severity(self) -> Option<Severity> {
        match self {
            Self::Off => None,
            Self::Warn => Some(Severity::Advisory),
            Self::Error => Some(Severity::Required),
        }
    }

    /// Whether the rule runs at all.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }
}

impl std::fmt::Display for RuleLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for RuleLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown rule level `{other}`, expected: off, warn, error")),
        }
    }
}

/// Source range of a node.
///
/// Lines and columns are 1-indexed; offsets are byte offsets into the file.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed, exclusive).
    pub end_col: usize,
    /// Start byte offset.
    pub start_offset: usize,
    /// End byte offset (exclusive).
    pub end_offset: usize,
}

impl Span {
    /// Creates a span from explicit values.
    #[must_use]
    pub fn new(
        (start_line, start_col): (usize, usize),
        (end_line, end_col): (usize, usize),
        (start_offset, end_offset): (usize, usize),
    ) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
            start_offset,
            end_offset,
        }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }

    /// Whether the span covers no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two spans share at least one byte.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_offset < other.end_offset && other.start_offset < self.end_offset
    }
}

/// A textual edit resolving a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    /// Range to replace.
    pub range: Span,
    /// Text inserted in place of the range.
    pub replacement_text: String,
}

impl Fix {
    /// Creates a new fix.
    #[must_use]
    pub fn new(range: Span, replacement_text: impl Into<String>) -> Self {
        Self {
            range,
            replacement_text: replacement_text.into(),
        }
    }
}

/// A lint violation found during dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Id of the rule that reported this violation.
    pub rule_id: String,
    /// Severity, assigned from the effective rule level.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Location of the offending node.
    pub range: Span,
    /// Safe automatic fix, if one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
    /// Kind of the offending node.
    #[serde(skip)]
    pub node_kind: NodeKind,
    /// Remedy hint consumed by the autofix generator.
    #[serde(skip)]
    pub remedy: Option<Remedy>,
    /// Set on the synthetic violation emitted when a rule handler fails.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub crashed: bool,
}

impl Violation {
    /// Creates a new advisory violation.
    #[must_use]
    pub fn new(rule_id: impl Into<String>, range: Span, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity: Severity::Advisory,
            message: message.into(),
            range,
            fix: None,
            node_kind: NodeKind::Other,
            remedy: None,
            crashed: false,
        }
    }

    /// Creates the synthetic violation for a failed rule handler.
    #[must_use]
    pub fn rule_crashed(rule_id: &str, range: Span, reason: &str) -> Self {
        let mut v = Self::new(
            rule_id,
            range,
            format!("Rule '{rule_id}' crashed and was disabled for this file: {reason}"),
        );
        v.crashed = true;
        v
    }

    /// Sets the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Records the kind of the offending node.
    #[must_use]
    pub fn with_node_kind(mut self, kind: NodeKind) -> Self {
        self.node_kind = kind;
        self
    }

    /// Attaches a remedy hint for the autofix generator.
    #[must_use]
    pub fn with_remedy(mut self, remedy: Remedy) -> Self {
        self.remedy = Some(remedy);
        self
    }

    /// Whether a safe fix is attached.
    #[must_use]
    pub fn is_fixable(&self) -> bool {
        self.fix.is_some()
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self, file: &std::path::Path) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} at {}:{}:{}\n",
            self.rule_id,
            file.display(),
            self.range.start_line,
            self.range.start_col,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(fix) = &self.fix {
            let _ = writeln!(output, "  = fix: replace with `{}`", fix.replacement_text);
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.range.start_line, self.range.start_col, self.severity, self.rule_id, self.message
        )
    }
}

/// Converts a Violation to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("[{rule_id}] {message}")]
pub struct ViolationDiagnostic {
    rule_id: String,
    message: String,
    #[help]
    help: Option<String>,
    #[label("{severity}")]
    span: SourceSpan,
    severity: Severity,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            rule_id: v.rule_id.clone(),
            message: v.message.clone(),
            help: v
                .fix
                .as_ref()
                .map(|fix| format!("replace with `{}`", fix.replacement_text)),
            span: SourceSpan::from((v.range.start_offset, v.range.len())),
            severity: v.severity,
        }
    }
}

/// Lint result for a single file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintReport {
    /// File the violations belong to.
    pub path: PathBuf,
    /// Violations in source order.
    pub violations: Vec<Violation>,
}

impl LintReport {
    /// Creates a report for the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, violations: Vec<Violation>) -> Self {
        Self {
            path: path.into(),
            violations,
        }
    }

    /// Returns true if any violation is required.
    #[must_use]
    pub fn has_required(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Required)
    }

    /// Counts `(required, advisory)` violations.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize) {
        let required = self
            .violations
            .iter()
            .filter(|v| v.severity == Severity::Required)
            .count();
        (required, self.violations.len() - required)
    }

    /// Fixes attached to this report's violations, in source order.
    #[must_use]
    pub fn fixes(&self) -> Vec<&Fix> {
        self.violations.iter().filter_map(|v| v.fix.as_ref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn span() -> Span {
        Span::new((3, 15), (3, 24), (40, 49))
    }

    fn make_violation(severity: Severity) -> Violation {
        Violation::new("brand-enforce-colors", span(), "Color \"#1a2b3c\" is not in the brand palette")
            .with_severity(severity)
    }

    #[test]
    fn level_maps_to_severity() {
        assert_eq!(RuleLevel::Off.severity(), None);
        assert_eq!(RuleLevel::Warn.severity(), Some(Severity::Advisory));
        assert_eq!(RuleLevel::Error.severity(), Some(Severity::Required));
    }

    #[test]
    fn level_parses_warning_alias() {
        assert_eq!("warning".parse::<RuleLevel>(), Ok(RuleLevel::Warn));
        assert!("critical".parse::<RuleLevel>().is_err());
    }

    #[test]
    fn span_overlap() {
        let a = Span::new((1, 1), (1, 5), (0, 4));
        let b = Span::new((1, 4), (1, 8), (3, 7));
        let c = Span::new((1, 5), (1, 8), (4, 7));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn violation_serializes_in_camel_case() {
        let v = make_violation(Severity::Required)
            .with_remedy(Remedy::RewriteImport {
                canonical: "@/brand".into(),
            });
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["ruleId"], "brand-enforce-colors");
        assert_eq!(json["severity"], "required");
        assert_eq!(json["range"]["startLine"], 3);
        assert_eq!(json["range"]["endCol"], 24);
        assert!(json.get("fix").is_none());
        assert!(json.get("remedy").is_none());
        assert!(json.get("crashed").is_none());
    }

    #[test]
    fn fix_serializes_replacement_text() {
        let mut v = make_violation(Severity::Advisory);
        v.fix = Some(Fix::new(span(), "\"#0055ff\""));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["fix"]["replacementText"], "\"#0055ff\"");
    }

    #[test]
    fn crashed_violation_is_flagged() {
        let v = Violation::rule_crashed("brand-enforce-icons", span(), "boom");
        assert!(v.crashed);
        assert!(v.message.contains("boom"));
    }

    #[test]
    fn format_includes_location_and_fix() {
        let mut v = make_violation(Severity::Required);
        v.fix = Some(Fix::new(span(), "\"#0055ff\""));
        let formatted = v.format(Path::new("components/Button.tsx"));
        assert!(formatted.starts_with("brand-enforce-colors at components/Button.tsx:3:15"));
        assert!(formatted.contains("required: Color"));
        assert!(formatted.contains("= fix: replace with `\"#0055ff\"`"));
    }

    #[test]
    fn report_counts_by_severity() {
        let report = LintReport::new(
            "a.tsx",
            vec![
                make_violation(Severity::Required),
                make_violation(Severity::Advisory),
                make_violation(Severity::Advisory),
            ],
        );
        assert_eq!(report.count_by_severity(), (1, 2));
        assert!(report.has_required());
    }
}
