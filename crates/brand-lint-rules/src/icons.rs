//! Rule routing icon imports through the brand icon module.
//!
//! Direct imports from icon packages (`react-icons`, `@heroicons/*`, ...)
//! are flagged unless the package is listed by the brand or by the
//! `allowed_packages` option. The fix rewrites the module specifier to the
//! brand icon module.

use brand_lint_core::classify::{is_icon_import, package_name};
use brand_lint_core::{
    NodeKind, OptionField, OptionKind, OptionSchema, Remedy, Rule, RuleContext, RuleDefinition,
    RuleError, SyntaxNode, Violation,
};

/// Rule id for brand-enforce-icons.
pub const ID: &str = "brand-enforce-icons";

const SCHEMA: OptionSchema =
    OptionSchema::new(&[OptionField::optional("allowed_packages", OptionKind::StringList)]);

/// Flags icon imports that bypass the brand icon set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrandEnforceIcons;

impl BrandEnforceIcons {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for BrandEnforceIcons {
    fn definition(&self) -> RuleDefinition {
        RuleDefinition {
            id: ID,
            category: "brand-assets",
            description: "Icons must be imported from the brand icon module",
            fixable: true,
            schema: SCHEMA,
            bindings: &["ImportDeclaration"],
        }
    }

    fn check(&self, node: &SyntaxNode, cx: &RuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let Some(specifier) = node.value.as_deref() else {
            return Ok(Vec::new());
        };
        if !is_icon_import(specifier) {
            return Ok(Vec::new());
        }

        let package = package_name(specifier);
        let policy = cx.policy();
        let allowed = policy
            .icon_packages
            .iter()
            .chain(cx.options.get_list("allowed_packages"))
            .any(|p| p == package || is_within(specifier, p));
        if allowed {
            return Ok(Vec::new());
        }

        let (span, kind) = node
            .child_of_kind(NodeKind::StringLiteral)
            .map_or((node.span, NodeKind::ImportDeclaration), |s| {
                (s.span, NodeKind::StringLiteral)
            });

        Ok(vec![Violation::new(
            ID,
            span,
            cx.message(format!(
                "Icon package \"{package}\" is not approved; import icons from \"{}\"",
                policy.modules.icons
            )),
        )
        .with_node_kind(kind)
        .with_remedy(Remedy::RewriteImport {
            canonical: policy.modules.icons.clone(),
        })])
    }
}

/// Whether `specifier` is `prefix` or a subpath of it.
fn is_within(specifier: &str, prefix: &str) -> bool {
    specifier.strip_prefix(prefix.trim_end_matches('/')).is_some_and(|rest| {
        rest.is_empty() || rest.starts_with('/')
    })
}
