//! Single-pass AST dispatch with per-rule fault isolation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

use crate::ast::{NodeKind, SyntaxNode, SyntaxTree};
use crate::context::ValidationContext;
use crate::registry::RegisteredRule;
use crate::rule::RuleContext;
use crate::types::Violation;

/// Walks `tree` once and runs every bound rule on every node.
///
/// Traversal is pre-order and iterative. For each node the active rules run
/// in the order given. A rule whose handler errors or panics contributes a
/// single crash violation and is skipped for the rest of the file.
#[must_use]
pub fn run(
    tree: &SyntaxTree,
    context: &ValidationContext,
    active: &[&RegisteredRule],
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut disabled = vec![false; active.len()];
    let mut ancestors: Vec<&SyntaxNode> = Vec::new();
    let mut stack: Vec<(&SyntaxNode, usize)> = vec![(&tree.root, 0)];

    while let Some((node, depth)) = stack.pop() {
        ancestors.truncate(depth);

        for (index, entry) in active.iter().enumerate() {
            if disabled[index] || !entry.binds(node.kind) {
                continue;
            }

            let cx = RuleContext {
                validation: context,
                options: entry.options(),
                ancestors: &ancestors,
            };

            match catch_unwind(AssertUnwindSafe(|| entry.rule().check(node, &cx))) {
                Ok(Ok(found)) => violations.extend(found.into_iter().map(|v| {
                    if v.node_kind == NodeKind::Other {
                        v.with_node_kind(node.kind)
                    } else {
                        v
                    }
                })),
                Ok(Err(e)) => {
                    warn!("Rule {} failed on {}: {e}", entry.id(), context.path().display());
                    disabled[index] = true;
                    violations.push(
                        Violation::rule_crashed(entry.id(), node.span, &e.to_string())
                            .with_node_kind(node.kind),
                    );
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    warn!("Rule {} panicked on {}: {reason}", entry.id(), context.path().display());
                    disabled[index] = true;
                    violations.push(
                        Violation::rule_crashed(entry.id(), node.span, &reason)
                            .with_node_kind(node.kind),
                    );
                }
            }
        }

        ancestors.push(node);
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    debug!(
        "Dispatched {} rules over {} nodes in {}: {} violations",
        active.len(),
        tree.node_count(),
        context.path().display(),
        violations.len()
    );
    violations
}

/// Renders a panic payload caught by `catch_unwind`.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TenantId;
    use crate::policy::BrandPolicy;
    use crate::registry::RuleRegistry;
    use crate::rule::{OptionSchema, Rule, RuleDefinition, RuleError};
    use crate::severity::Mode;
    use crate::types::Span;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Reports every string literal, recording how deep it was.
    struct EveryLiteral;

    impl Rule for EveryLiteral {
        fn definition(&self) -> RuleDefinition {
            RuleDefinition {
                id: "every-literal",
                category: "test",
                description: "",
                fixable: false,
                schema: OptionSchema::EMPTY,
                bindings: &["StringLiteral"],
            }
        }

        fn check(&self, node: &SyntaxNode, cx: &RuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
            Ok(vec![Violation::new(
                "every-literal",
                node.span,
                format!("{} at depth {}", node.text, cx.ancestors.len()),
            )])
        }
    }

    /// Fails on the first attribute it sees.
    struct Crashing {
        calls: Arc<AtomicUsize>,
        panic: bool,
    }

    impl Rule for Crashing {
        fn definition(&self) -> RuleDefinition {
            RuleDefinition {
                id: "crashing",
                category: "test",
                description: "",
                fixable: false,
                schema: OptionSchema::EMPTY,
                bindings: &["JsxAttribute", "StringLiteral"],
            }
        }

        fn check(&self, _node: &SyntaxNode, _cx: &RuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.panic {
                panic!("handler bug");
            }
            Err(RuleError::new("cannot evaluate"))
        }
    }

    fn span(line: usize) -> Span {
        Span::new((line, 1), (line, 5), (line * 10, line * 10 + 4))
    }

    fn tree() -> SyntaxTree {
        let attr = |line: usize| {
            SyntaxNode::new(NodeKind::JsxAttribute, span(line), "a=\"x\"").with_child(
                SyntaxNode::new(NodeKind::StringLiteral, span(line), format!("\"s{line}\"")),
            )
        };
        let root = SyntaxNode::new(NodeKind::Program, span(1), "")
            .with_child(attr(1))
            .with_child(attr(2))
            .with_child(SyntaxNode::new(NodeKind::StringLiteral, span(3), "\"s3\""));
        SyntaxTree::new(root, "")
    }

    fn context() -> ValidationContext {
        ValidationContext::new(
            Arc::new(BrandPolicy::default()),
            TenantId::default_tenant(),
            "a.tsx",
            Mode::Advisory,
        )
    }

    #[test]
    fn visits_in_pre_order_with_ancestors() {
        let registry = RuleRegistry::builder().register(EveryLiteral).unwrap().build();
        let active: Vec<_> = registry.iter().collect();
        let messages: Vec<_> = run(&tree(), &context(), &active)
            .into_iter()
            .map(|v| v.message)
            .collect();
        assert_eq!(
            messages,
            vec!["\"s1\" at depth 2", "\"s2\" at depth 2", "\"s3\" at depth 1"]
        );
    }

    #[test]
    fn dispatch_is_deterministic() {
        let registry = RuleRegistry::builder().register(EveryLiteral).unwrap().build();
        let active: Vec<_> = registry.iter().collect();
        let first = run(&tree(), &context(), &active);
        let second = run(&tree(), &context(), &active);
        assert_eq!(first, second);
    }

    #[test]
    fn crashing_rule_is_isolated_and_disabled() {
        for panic in [false, true] {
            let calls = Arc::new(AtomicUsize::new(0));
            let registry = RuleRegistry::builder()
                .register(Crashing {
                    calls: Arc::clone(&calls),
                    panic,
                })
                .and_then(|b| b.register(EveryLiteral))
                .unwrap()
                .build();
            let active: Vec<_> = registry.iter().collect();

            let violations = run(&tree(), &context(), &active);

            assert_eq!(calls.load(Ordering::SeqCst), 1);
            let crashed: Vec<_> = violations.iter().filter(|v| v.crashed).collect();
            assert_eq!(crashed.len(), 1);
            assert_eq!(crashed[0].rule_id, "crashing");
            assert_eq!(crashed[0].node_kind, NodeKind::JsxAttribute);
            assert_eq!(
                violations.iter().filter(|v| v.rule_id == "every-literal").count(),
                3
            );
        }
    }

    #[test]
    fn panic_payloads_are_rendered() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
