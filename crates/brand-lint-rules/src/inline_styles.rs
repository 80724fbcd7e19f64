//! Rule discouraging inline `style` attributes.
//!
//! # Checks
//!
//! - `style={...}` attributes, unless the brand allows inline styles
//! - with `check_class_names`, arbitrary color values inside `className`
//!   (`bg-[#1a2b3c]`); off by default since the color rule already reports
//!   the literal
//!
//! # Configuration
//!
//! - `accessor`: styling function used by the fix (defaults to the brand's)
//! - `check_class_names`: also inspect class lists
//!
//! # Fix
//!
//! `style={expr}` becomes `className={accessor(expr)}` and a class list
//! literal `className="..."` becomes `className={accessor("...")}`. No fix is
//! offered for `style` when the element already has a class attribute, since
//! JSX would keep only the last of the two.

use brand_lint_core::classify::{embedded_colors, is_color_value};
use brand_lint_core::{
    NodeKind, OptionField, OptionKind, OptionSchema, Remedy, Rule, RuleContext, RuleDefinition, RuleError,
    SyntaxNode, Violation,
};

/// Rule id for brand-no-inline-styles.
pub const ID: &str = "brand-no-inline-styles";

const SCHEMA: OptionSchema = OptionSchema::new(&[
    OptionField::optional("accessor", OptionKind::String),
    OptionField::optional("check_class_names", OptionKind::Bool),
]);

const CLASS_ATTRIBUTES: &[&str] = &["className", "class"];

/// Flags inline styles that bypass the brand styling layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrandNoInlineStyles;

impl BrandNoInlineStyles {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn accessor<'a>(cx: &'a RuleContext<'_>) -> &'a str {
        cx.options
            .get_str("accessor")
            .unwrap_or(&cx.policy().modules.style_accessor)
    }

    fn check_class_name(&self, node: &SyntaxNode, cx: &RuleContext<'_>) -> Option<Violation> {
        let value = node.value.as_deref()?;
        let policy = cx.policy();
        if policy.allow_custom_colors {
            return None;
        }

        let offending: Vec<&str> = if is_color_value(value) {
            vec![value.trim()]
        } else {
            embedded_colors(value)
        }
        .into_iter()
        .filter(|c| !policy.has_color(c))
        .collect();

        let first = offending.first()?;
        Some(
            Violation::new(
                ID,
                node.span,
                cx.message(format!(
                    "Class list hard-codes color \"{first}\"; use a brand token instead"
                )),
            )
            .with_remedy(Remedy::StyleToClassName {
                accessor: Self::accessor(cx).to_string(),
            }),
        )
    }
}

impl Rule for BrandNoInlineStyles {
    fn definition(&self) -> RuleDefinition {
        RuleDefinition {
            id: ID,
            category: "design-guardian",
            description: "Styling must go through the brand styling accessor",
            fixable: true,
            schema: SCHEMA,
            bindings: &["JsxAttribute"],
        }
    }

    fn check(&self, node: &SyntaxNode, cx: &RuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        let Some(name) = node.name.as_deref() else {
            return Ok(Vec::new());
        };
        let policy = cx.policy();

        if name == "style" {
            if policy.allow_inline_styles {
                return Ok(Vec::new());
            }
            let accessor = Self::accessor(cx);
            let violation = Violation::new(
                ID,
                node.span,
                cx.message(format!(
                    "Inline styles are not allowed; use className={{{accessor}(...)}}"
                )),
            );
            if has_class_sibling(cx) {
                return Ok(vec![violation]);
            }
            return Ok(vec![violation.with_remedy(Remedy::StyleToClassName {
                accessor: accessor.to_string(),
            })]);
        }

        if CLASS_ATTRIBUTES.contains(&name)
            && cx.options.get_bool("check_class_names").unwrap_or(false)
        {
            return Ok(self.check_class_name(node, cx).into_iter().collect());
        }

        Ok(Vec::new())
    }
}

/// Whether the element owning the current attribute sets a class attribute.
fn has_class_sibling(cx: &RuleContext<'_>) -> bool {
    cx.parent().is_some_and(|element| {
        element.children.iter().any(|sibling| {
            sibling.kind == NodeKind::JsxAttribute
                && sibling
                    .name
                    .as_deref()
                    .is_some_and(|name| CLASS_ATTRIBUTES.contains(&name))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{acme, attribute, run};
    use brand_lint_core::{BrandPolicy, RuleOptions, Span};

    fn check(node: &SyntaxNode, options: &RuleOptions) -> Vec<Violation> {
        run(&BrandNoInlineStyles, node, &[], BrandPolicy::default(), options)
    }

    #[test]
    fn test_style_attribute_flagged_with_remedy() {
        let violations = check(
            &attribute("style", "{{ color: \"red\" }}"),
            &RuleOptions::new(),
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].remedy,
            Some(Remedy::StyleToClassName {
                accessor: "brandClass".into()
            })
        );
        insta::assert_snapshot!(
            violations[0].message,
            @"Inline styles are not allowed; use className={brandClass(...)}"
        );
    }

    #[test]
    fn test_accessor_option() {
        let options = RuleOptions::new().with("accessor", "tokens.cx");
        let violations = check(&attribute("style", "{styles}"), &options);
        assert_eq!(
            violations[0].remedy,
            Some(Remedy::StyleToClassName {
                accessor: "tokens.cx".into()
            })
        );
    }

    #[test]
    fn test_inline_styles_allowed_by_brand() {
        let policy = BrandPolicy {
            allow_inline_styles: true,
            ..acme()
        };
        let violations = run(
            &BrandNoInlineStyles,
            &attribute("style", "{styles}"),
            &[],
            policy,
            &RuleOptions::new(),
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_class_names_ignored_by_default() {
        assert!(check(&attribute("className", "\"#1a2b3c\""), &RuleOptions::new()).is_empty());
    }

    #[test]
    fn test_class_names_checked_when_enabled() {
        let options = RuleOptions::new().with("check_class_names", true);
        let violations = check(&attribute("className", "\"p-2 bg-[#1a2b3c]\""), &options);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].remedy,
            Some(Remedy::StyleToClassName {
                accessor: "brandClass".into()
            })
        );
        assert!(check(&attribute("className", "\"p-2 bg-blue-500\""), &options).is_empty());
    }

    #[test]
    fn test_style_next_to_class_name_has_no_remedy() {
        let style = attribute("style", "{{ margin: 4 }}");
        let element = SyntaxNode::new(NodeKind::JsxElement, Span::default(), "<div />")
            .with_child(attribute("className", "\"p-2\""))
            .with_child(style.clone());
        let violations = run(
            &BrandNoInlineStyles,
            &style,
            &[&element],
            BrandPolicy::default(),
            &RuleOptions::new(),
        );
        assert_eq!(violations.len(), 1);
        assert!(violations[0].remedy.is_none());

        let lone = SyntaxNode::new(NodeKind::JsxElement, Span::default(), "<div />")
            .with_child(style.clone());
        let violations = run(
            &BrandNoInlineStyles,
            &style,
            &[&lone],
            BrandPolicy::default(),
            &RuleOptions::new(),
        );
        assert!(violations[0].remedy.is_some());
    }

    #[test]
    fn test_other_attributes_ignored() {
        assert!(check(&attribute("id", "\"#main\""), &RuleOptions::new()).is_empty());
    }
}
