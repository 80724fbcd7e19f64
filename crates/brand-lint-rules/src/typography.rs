//! Rule enforcing the brand font allowlist.
//!
//! # Checks
//!
//! - font imports (`@fontsource/*`, `next/font/*`, Google Fonts URLs, font files)
//! - `fontFamily` / `font-family` properties in style objects
//!
//! # Configuration
//!
//! - `hook_path`: module that replaces rejected font imports
//!   (defaults to the brand's typography module)
//!
//! # Fix
//!
//! Rejected font imports are rewritten to the typography module. Font
//! family values are reported without a fix.

use brand_lint_core::classify::{
    font_families, font_source, is_brand_font, is_brand_font_file, FontSource,
};
use brand_lint_core::{
    NodeKind, OptionField, OptionKind, OptionSchema, Remedy, Rule, RuleContext, RuleDefinition,
    RuleError, SyntaxNode, Violation,
};

/// Rule id for brand-enforce-typography.
pub const ID: &str = "brand-enforce-typography";

const SCHEMA: OptionSchema =
    OptionSchema::new(&[OptionField::optional("hook_path", OptionKind::String)]);

const FONT_PROPERTIES: &[&str] = &["fontFamily", "font-family"];

/// Flags fonts outside the brand allowlist.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrandEnforceTypography;

impl BrandEnforceTypography {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check_import(&self, node: &SyntaxNode, cx: &RuleContext<'_>) -> Option<Violation> {
        let specifier = node.value.as_deref()?;
        let source = font_source(specifier)?;
        let policy = cx.policy();

        let allowed = match &source {
            FontSource::Package(family) => is_brand_font(family, policy, false),
            FontSource::File(stem) => is_brand_font_file(stem, policy),
            FontSource::Loader => {
                let families = imported_names(node);
                !families.is_empty()
                    && families.iter().all(|f| is_brand_font(f, policy, false))
            }
        };
        if allowed {
            return None;
        }

        let canonical = cx
            .options
            .get_str("hook_path")
            .unwrap_or(&policy.modules.typography);
        let (span, kind) = node
            .child_of_kind(NodeKind::StringLiteral)
            .map_or((node.span, NodeKind::ImportDeclaration), |s| {
                (s.span, NodeKind::StringLiteral)
            });

        Some(
            Violation::new(
                ID,
                span,
                cx.message(format!(
                    "Font import \"{specifier}\" is not in the brand font allowlist"
                )),
            )
            .with_node_kind(kind)
            .with_remedy(Remedy::RewriteImport {
                canonical: canonical.to_string(),
            }),
        )
    }

    fn check_property(&self, node: &SyntaxNode, cx: &RuleContext<'_>) -> Vec<Violation> {
        let Some(name) = node.name.as_deref() else {
            return Vec::new();
        };
        if !FONT_PROPERTIES.contains(&name.trim_matches(['"', '\''])) {
            return Vec::new();
        }
        let Some(value) = node.value.as_deref() else {
            return Vec::new();
        };

        let span = node
            .child_of_kind(NodeKind::StringLiteral)
            .map_or(node.span, |s| s.span);
        font_families(value)
            .into_iter()
            .filter(|family| !is_brand_font(family, cx.policy(), true))
            .map(|family| {
                Violation::new(
                    ID,
                    span,
                    cx.message(format!("Font \"{family}\" is not in the brand font allowlist")),
                )
            })
            .collect()
    }
}

impl Rule for BrandEnforceTypography {
    fn definition(&self) -> RuleDefinition {
        RuleDefinition {
            id: ID,
            category: "design-guardian",
            description: "Fonts must come from the brand font allowlist",
            fixable: true,
            schema: SCHEMA,
            bindings: &["ImportDeclaration", "Property"],
        }
    }

    fn check(&self, node: &SyntaxNode, cx: &RuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        match node.kind {
            NodeKind::ImportDeclaration => Ok(self.check_import(node, cx).into_iter().collect()),
            NodeKind::Property => Ok(self.check_property(node, cx)),
            _ => Ok(Vec::new()),
        }
    }
}

/// Imported binding names; an aliased specifier contributes only its first identifier.
fn imported_names(node: &SyntaxNode) -> Vec<&str> {
    let mut names = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if let Some(ident) = current.child_of_kind(NodeKind::Identifier) {
            if let Some(name) = ident.name.as_deref() {
                names.push(name);
            }
        }
        stack.extend(
            current
                .children
                .iter()
                .filter(|c| c.kind != NodeKind::Identifier),
        );
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{acme, import, run, string};
    use brand_lint_core::{BrandPolicy, RuleOptions, Span};

    fn check(node: &SyntaxNode) -> Vec<Violation> {
        run(&BrandEnforceTypography, node, &[], acme(), &RuleOptions::new())
    }

    fn property(name: &str, value: &str) -> SyntaxNode {
        SyntaxNode::new(
            NodeKind::Property,
            Span::default(),
            format!("{name}: \"{value}\""),
        )
        .with_name(name)
        .with_value(value)
        .with_child(string(value))
    }

    #[test]
    fn test_fontsource_import_rewritten_to_hook() {
        let violations = run(
            &BrandEnforceTypography,
            &import("@fontsource/roboto-mono", &[]),
            &[],
            BrandPolicy::default(),
            &RuleOptions::new(),
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].node_kind, NodeKind::StringLiteral);
        assert_eq!(
            violations[0].remedy,
            Some(Remedy::RewriteImport {
                canonical: "@/brand/hooks/useBrandTypography".into()
            })
        );
        insta::assert_snapshot!(
            violations[0].message,
            @r#"Font import "@fontsource/roboto-mono" is not in the brand font allowlist"#
        );
    }

    #[test]
    fn test_brand_font_imports_pass() {
        assert!(check(&import("@fontsource/inter", &[])).is_empty());
        assert!(check(&import("@fontsource/inter/700.css", &[])).is_empty());
        assert!(check(&import("../assets/Inter-Bold.woff2", &[])).is_empty());
        assert!(check(&import("next/font/google", &["Inter"])).is_empty());
    }

    #[test]
    fn test_loader_with_foreign_family() {
        assert_eq!(check(&import("next/font/google", &["Inter", "Lobster"])).len(), 1);
    }

    #[test]
    fn test_non_font_imports_ignored() {
        assert!(check(&import("react", &["useState"])).is_empty());
    }

    #[test]
    fn test_hook_path_option() {
        let options = RuleOptions::new().with("hook_path", "@acme/type");
        let violations = run(
            &BrandEnforceTypography,
            &import("typeface-lobster", &[]),
            &[],
            acme(),
            &options,
        );
        assert_eq!(
            violations[0].remedy,
            Some(Remedy::RewriteImport {
                canonical: "@acme/type".into()
            })
        );
    }

    #[test]
    fn test_font_family_property() {
        let violations = check(&property("fontFamily", "Lobster, Inter, sans-serif"));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("\"Lobster\""));
        assert!(violations[0].remedy.is_none());

        assert!(check(&property("font-family", "'Inter', system-ui")).is_empty());
        assert!(check(&property("color", "Lobster")).is_empty());
    }

    #[test]
    fn test_system_fonts_can_be_disallowed() {
        let policy = BrandPolicy {
            allow_system_fonts: false,
            ..acme()
        };
        let violations = run(
            &BrandEnforceTypography,
            &property("fontFamily", "Inter, Arial"),
            &[],
            policy,
            &RuleOptions::new(),
        );
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_custom_fonts_escape_hatch() {
        let policy = BrandPolicy {
            allow_custom_fonts: true,
            ..BrandPolicy::default()
        };
        let violations = run(
            &BrandEnforceTypography,
            &import("@fontsource/lobster", &[]),
            &[],
            policy,
            &RuleOptions::new(),
        );
        assert!(violations.is_empty());
    }
}
