//! Helpers shared by rule unit tests.

use brand_lint_core::{
    BrandPolicy, Mode, NodeKind, Rule, RuleContext, RuleOptions, Span, SyntaxNode, TenantId,
    ValidationContext, Violation,
};
use std::sync::Arc;

/// Runs `rule` on `node` with the given ancestors, policy and options.
pub fn run(
    rule: &dyn Rule,
    node: &SyntaxNode,
    ancestors: &[&SyntaxNode],
    policy: BrandPolicy,
    options: &RuleOptions,
) -> Vec<Violation> {
    let validation = ValidationContext::new(
        Arc::new(policy),
        TenantId::default_tenant(),
        "test.tsx",
        Mode::Advisory,
    );
    let cx = RuleContext {
        validation: &validation,
        options,
        ancestors,
    };
    rule.check(node, &cx).unwrap()
}

/// A double-quoted string literal node.
pub fn string(value: &str) -> SyntaxNode {
    SyntaxNode::new(NodeKind::StringLiteral, Span::default(), format!("\"{value}\"")).with_value(value)
}

/// `import ... from "<specifier>"` with the given imported identifiers.
pub fn import(specifier: &str, names: &[&str]) -> SyntaxNode {
    let mut node = SyntaxNode::new(
        NodeKind::ImportDeclaration,
        Span::default(),
        format!("import {{ {} }} from \"{specifier}\";", names.join(", ")),
    )
    .with_value(specifier);
    for name in names {
        node = node.with_child(
            SyntaxNode::new(NodeKind::Other, Span::default(), "").with_child(
                SyntaxNode::new(NodeKind::Identifier, Span::default(), *name).with_name(*name),
            ),
        );
    }
    node.with_child(string(specifier))
}

/// JSX attribute `name=<value>`; string values also set the node value.
pub fn attribute(name: &str, value: &str) -> SyntaxNode {
    let node = SyntaxNode::new(NodeKind::JsxAttribute, Span::default(), format!("{name}={value}"))
        .with_name(name);
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => node.with_value(inner).with_child(string(inner)),
        None => node,
    }
}

/// Policy with a small palette and font list.
pub fn acme() -> BrandPolicy {
    BrandPolicy {
        name: "Acme".into(),
        colors: vec!["#0055ff".into(), "#111111".into()],
        fonts: vec!["Inter".into()],
        icon_packages: vec!["lucide-react".into()],
        ..BrandPolicy::default()
    }
}
