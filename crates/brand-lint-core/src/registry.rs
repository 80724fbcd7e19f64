//! Rule registry.
//!
//! Rules are validated when they are registered. Once built the registry is
//! immutable and is shared read-only (usually behind an `Arc`).

use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::ast::NodeKind;
use crate::rule::{OptionError, Rule, RuleDefinition, RuleOptions};

/// Errors raised while registering or looking up rules.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A rule with the same id is already registered.
    #[error("rule `{id}` is already registered")]
    Duplicate {
        /// Colliding id.
        id: String,
    },

    /// A rule binds to a node type the engine does not produce.
    #[error("rule `{rule}` binds to unknown node type `{node_type}`")]
    UnknownNodeType {
        /// Rule id.
        rule: String,
        /// Offending binding.
        node_type: String,
    },

    /// Options failed schema validation.
    #[error("invalid options for rule `{rule}`: {source}")]
    InvalidOptions {
        /// Rule id.
        rule: String,
        /// Schema violation.
        #[source]
        source: OptionError,
    },

    /// No rule with this id.
    #[error("rule `{id}` not found")]
    NotFound {
        /// Requested id.
        id: String,
    },
}

/// A validated rule with its options.
#[derive(Clone)]
pub struct RegisteredRule {
    rule: Arc<dyn Rule>,
    definition: RuleDefinition,
    kinds: Vec<NodeKind>,
    options: RuleOptions,
}

impl std::fmt::Debug for RegisteredRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredRule")
            .field("id", &self.definition.id)
            .field("kinds", &self.kinds)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl RegisteredRule {
    /// Rule id.
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.definition.id
    }

    /// Static definition.
    #[must_use]
    pub fn definition(&self) -> &RuleDefinition {
        &self.definition
    }

    /// The rule implementation.
    #[must_use]
    pub fn rule(&self) -> &dyn Rule {
        self.rule.as_ref()
    }

    /// Node kinds the handler is bound to.
    #[must_use]
    pub fn kinds(&self) -> &[NodeKind] {
        &self.kinds
    }

    /// Whether the handler is bound to `kind`.
    #[must_use]
    pub fn binds(&self, kind: NodeKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Validated options.
    #[must_use]
    pub fn options(&self) -> &RuleOptions {
        &self.options
    }
}

/// Builder collecting rules at startup.
#[derive(Debug, Default)]
pub struct RuleRegistryBuilder {
    entries: Vec<RegisteredRule>,
    ids: HashSet<&'static str>,
}

impl RuleRegistryBuilder {
    /// Registers a rule with no options.
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate id or an unknown node-type binding.
    pub fn register(self, rule: impl Rule + 'static) -> Result<Self, RegistryError> {
        self.register_with_options(rule, RuleOptions::new())
    }

    /// Registers a rule with options validated against its schema.
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate id, an unknown node-type binding,
    /// or options rejected by the schema.
    pub fn register_with_options(
        self,
        rule: impl Rule + 'static,
        options: RuleOptions,
    ) -> Result<Self, RegistryError> {
        self.register_arc(Arc::new(rule), options)
    }

    /// Registers a shared rule instance.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register_with_options`].
    pub fn register_arc(
        mut self,
        rule: Arc<dyn Rule>,
        options: RuleOptions,
    ) -> Result<Self, RegistryError> {
        let definition = rule.definition();
        let id = definition.id;

        if self.ids.contains(id) {
            return Err(RegistryError::Duplicate { id: id.to_string() });
        }

        let kinds = definition
            .bindings
            .iter()
            .map(|name| {
                NodeKind::from_binding(name).ok_or_else(|| RegistryError::UnknownNodeType {
                    rule: id.to_string(),
                    node_type: (*name).to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        definition
            .schema
            .validate(&options)
            .map_err(|source| RegistryError::InvalidOptions {
                rule: id.to_string(),
                source,
            })?;

        debug!("Registered rule {id} bound to {kinds:?}");
        self.ids.insert(id);
        self.entries.push(RegisteredRule {
            rule,
            definition,
            kinds,
            options,
        });
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> RuleRegistry {
        RuleRegistry {
            entries: self.entries,
        }
    }
}

/// Immutable catalog of rules in registration order.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    entries: Vec<RegisteredRule>,
}

impl RuleRegistry {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::default()
    }

    /// Looks up a rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for unknown ids.
    pub fn lookup(&self, id: &str) -> Result<&RegisteredRule, RegistryError> {
        self.entries
            .iter()
            .find(|e| e.id() == id)
            .ok_or_else(|| RegistryError::NotFound { id: id.to_string() })
    }

    /// Whether a rule with this id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id() == id)
    }

    /// Iterates rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredRule> {
        self.entries.iter()
    }

    /// Rule ids in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        self.entries.iter().map(RegisteredRule::id).collect()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxNode;
    use crate::rule::{OptionField, OptionKind, OptionSchema, RuleContext, RuleError};
    use crate::types::Violation;

    struct TestRule {
        id: &'static str,
        bindings: &'static [&'static str],
    }

    impl Rule for TestRule {
        fn definition(&self) -> RuleDefinition {
            RuleDefinition {
                id: self.id,
                category: "test",
                description: "A test rule",
                fixable: false,
                schema: OptionSchema::new(const { &[OptionField::optional("limit", OptionKind::Integer)] }),
                bindings: self.bindings,
            }
        }

        fn check(&self, _node: &SyntaxNode, _cx: &RuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
            Ok(vec![])
        }
    }

    fn rule(id: &'static str) -> TestRule {
        TestRule {
            id,
            bindings: &["StringLiteral", "JsxAttribute"],
        }
    }

    #[test]
    fn test_registration_order_is_kept() {
        let registry = RuleRegistry::builder()
            .register(rule("b"))
            .and_then(|b| b.register(rule("a")))
            .and_then(|b| b.register(rule("c")))
            .unwrap()
            .build();
        assert_eq!(registry.ids(), vec!["b", "a", "c"]);
        assert!(registry.lookup("a").unwrap().binds(NodeKind::JsxAttribute));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = RuleRegistry::builder()
            .register(rule("a"))
            .and_then(|b| b.register(rule("a")))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { id } if id == "a"));
    }

    #[test]
    fn test_unknown_binding_rejected() {
        let err = RuleRegistry::builder()
            .register(TestRule {
                id: "a",
                bindings: &["StringLiteral", "JSXOpeningElement"],
            })
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "rule `a` binds to unknown node type `JSXOpeningElement`"
        );
    }

    #[test]
    fn test_invalid_options_rejected() {
        let err = RuleRegistry::builder()
            .register_with_options(rule("a"), RuleOptions::new().with("limit", "ten"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidOptions { .. }));
    }

    #[test]
    fn test_lookup_unknown_id() {
        let registry = RuleRegistry::builder().build();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.lookup("missing"),
            Err(RegistryError::NotFound { .. })
        ));
    }
}
