//! Rule trait, rule definitions and option schemas.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ast::SyntaxNode;
use crate::context::ValidationContext;
use crate::policy::BrandPolicy;
use crate::types::Violation;

/// Static description of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    /// Unique kebab-case id (e.g. `brand-enforce-colors`).
    pub id: &'static str,
    /// Category used by category overrides (e.g. `design-guardian`).
    pub category: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Whether violations of this rule may carry fixes.
    pub fixable: bool,
    /// Accepted option keys.
    pub schema: OptionSchema,
    /// Node kind names the handler is bound to.
    pub bindings: &'static [&'static str],
}

/// Type of an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// `true` / `false`.
    Bool,
    /// Signed integer.
    Integer,
    /// Single string.
    String,
    /// List of strings.
    StringList,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Integer => write!(f, "integer"),
            Self::String => write!(f, "string"),
            Self::StringList => write!(f, "string list"),
        }
    }
}

/// One accepted option key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionField {
    /// Option key.
    pub key: &'static str,
    /// Expected value type.
    pub kind: OptionKind,
    /// Whether the key must be present.
    pub required: bool,
}

impl OptionField {
    /// An optional field.
    #[must_use]
    pub const fn optional(key: &'static str, kind: OptionKind) -> Self {
        Self {
            key,
            kind,
            required: false,
        }
    }

    /// A required field.
    #[must_use]
    pub const fn required(key: &'static str, kind: OptionKind) -> Self {
        Self {
            key,
            kind,
            required: true,
        }
    }
}

/// Structural description of a rule's options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionSchema {
    /// Accepted fields.
    pub fields: &'static [OptionField],
}

impl OptionSchema {
    /// A schema accepting no options.
    pub const EMPTY: Self = Self { fields: &[] };

    /// Creates a schema from its fields.
    #[must_use]
    pub const fn new(fields: &'static [OptionField]) -> Self {
        Self { fields }
    }

    /// Looks up a field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&OptionField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Validates `options` against this schema.
    ///
    /// # Errors
    ///
    /// Returns the first unknown key, type mismatch or missing required key.
    pub fn validate(&self, options: &RuleOptions) -> Result<(), OptionError> {
        for (key, value) in options.iter() {
            let field = self.field(key).ok_or_else(|| OptionError::UnknownKey {
                key: key.clone(),
            })?;
            if value.kind() != field.kind {
                return Err(OptionError::WrongType {
                    key: key.clone(),
                    expected: field.kind,
                    found: value.kind(),
                });
            }
        }

        if let Some(missing) = self
            .fields
            .iter()
            .find(|f| f.required && options.get(f.key).is_none())
        {
            return Err(OptionError::MissingKey { key: missing.key });
        }

        Ok(())
    }
}

/// Schema violation in rule options.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    /// Key not declared by the schema.
    #[error("unknown option `{key}`")]
    UnknownKey {
        /// Offending key.
        key: String,
    },
    /// Value of the wrong type.
    #[error("option `{key}` expects {expected}, found {found}")]
    WrongType {
        /// Offending key.
        key: String,
        /// Declared type.
        expected: OptionKind,
        /// Supplied type.
        found: OptionKind,
    },
    /// Required key absent.
    #[error("missing required option `{key}`")]
    MissingKey {
        /// Missing key.
        key: &'static str,
    },
}

/// A single option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Boolean.
    Bool(bool),
    /// Integer.
    Integer(i64),
    /// String.
    String(String),
    /// String list.
    StringList(Vec<String>),
}

impl OptionValue {
    /// Type of this value.
    #[must_use]
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::Bool(_) => OptionKind::Bool,
            Self::Integer(_) => OptionKind::Integer,
            Self::String(_) => OptionKind::String,
            Self::StringList(_) => OptionKind::StringList,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(v: Vec<String>) -> Self {
        Self::StringList(v)
    }
}

/// Options a rule was registered with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleOptions(BTreeMap<String, OptionValue>);

impl RuleOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    /// Boolean option.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(OptionValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// String option.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(OptionValue::String(v)) => Some(v),
            _ => None,
        }
    }

    /// String list option; empty when absent.
    #[must_use]
    pub fn get_list(&self, key: &str) -> &[String] {
        match self.0.get(key) {
            Some(OptionValue::StringList(v)) => v,
            _ => &[],
        }
    }

    /// Iterates options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.0.iter()
    }

    /// Whether no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, OptionValue)> for RuleOptions {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Failure of a rule handler. Isolated by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RuleError {
    message: String,
}

impl RuleError {
    /// Creates a rule error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Per-node view handed to a rule handler.
#[derive(Debug)]
pub struct RuleContext<'a> {
    /// Invocation context, including the resolved policy.
    pub validation: &'a ValidationContext,
    /// Options the rule was registered with.
    pub options: &'a RuleOptions,
    /// Ancestors of the current node, root first.
    pub ancestors: &'a [&'a SyntaxNode],
}

impl RuleContext<'_> {
    /// The resolved brand policy.
    #[must_use]
    pub fn policy(&self) -> &BrandPolicy {
        &self.validation.policy
    }

    /// Formats a message for the current mode.
    #[must_use]
    pub fn message(&self, base: impl Into<String>) -> String {
        self.validation.message(base)
    }

    /// Closest ancestor, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&SyntaxNode> {
        self.ancestors.last().copied()
    }

    /// Whether any ancestor satisfies `pred`.
    pub fn has_ancestor(&self, pred: impl Fn(&SyntaxNode) -> bool) -> bool {
        self.ancestors.iter().any(|&n| pred(n))
    }
}

/// A brand lint rule.
///
/// Rules are registered once at startup and shared across threads. The
/// dispatcher calls [`Rule::check`] for every node whose kind appears in
/// the definition's bindings.
///
/// # Example
///
/// ```ignore
/// use brand_lint_core::{Rule, RuleContext, RuleDefinition, RuleError, SyntaxNode, Violation};
///
/// pub struct NoRedText;
///
/// impl Rule for NoRedText {
///     fn definition(&self) -> RuleDefinition {
///         RuleDefinition {
///             id: "no-red-text",
///             category: "design-guardian",
///             description: "Disallows the literal `red`",
///             fixable: false,
///             schema: OptionSchema::EMPTY,
///             bindings: &["StringLiteral"],
///         }
///     }
///
///     fn check(&self, node: &SyntaxNode, cx: &RuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
///         Ok(match node.value.as_deref() {
///             Some("red") => vec![Violation::new("no-red-text", node.span, cx.message("No red"))],
///             _ => vec![],
///         })
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the static definition of this rule.
    fn definition(&self) -> RuleDefinition;

    /// Checks one node bound to this rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the handler cannot evaluate the node. The
    /// dispatcher converts it into a "rule crashed" violation.
    fn check(&self, node: &SyntaxNode, cx: &RuleContext<'_>) -> Result<Vec<Violation>, RuleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: OptionSchema = OptionSchema::new(&[
        OptionField::optional("ignore_values", OptionKind::StringList),
        OptionField::optional("strict", OptionKind::Bool),
        OptionField::required("accessor", OptionKind::String),
    ]);

    #[test]
    fn valid_options_pass() {
        let options = RuleOptions::new()
            .with("accessor", "cx")
            .with("ignore_values", vec!["#fff".to_string()]);
        assert_eq!(SCHEMA.validate(&options), Ok(()));
        assert_eq!(options.get_str("accessor"), Some("cx"));
        assert_eq!(options.get_list("ignore_values"), ["#fff".to_string()]);
        assert!(options.get_list("other").is_empty());
    }

    #[test]
    fn unknown_key_rejected() {
        let options = RuleOptions::new().with("accessor", "cx").with("colour", true);
        assert_eq!(
            SCHEMA.validate(&options),
            Err(OptionError::UnknownKey {
                key: "colour".into()
            })
        );
    }

    #[test]
    fn wrong_type_rejected() {
        let options = RuleOptions::new().with("accessor", "cx").with("strict", "yes");
        let err = SCHEMA.validate(&options).unwrap_err();
        assert_eq!(err.to_string(), "option `strict` expects bool, found string");
    }

    #[test]
    fn missing_required_key_rejected() {
        assert_eq!(
            SCHEMA.validate(&RuleOptions::new()),
            Err(OptionError::MissingKey { key: "accessor" })
        );
    }

    #[test]
    fn options_deserialize_untagged() {
        let options: RuleOptions = toml::from_str(
            r##"
ignore_values = ["#fff"]
strict = true
accessor = "cx"
depth = 3
"##,
        )
        .unwrap();
        assert_eq!(options.get_bool("strict"), Some(true));
        assert_eq!(options.get("depth"), Some(&OptionValue::Integer(3)));
        assert_eq!(options.get_list("ignore_values").len(), 1);
    }
}
