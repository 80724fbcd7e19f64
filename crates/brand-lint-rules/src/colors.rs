//! Rule enforcing the brand palette in string and template literals.
//!
//! # Checks
//!
//! - literals that are a color value (`#1a2b3c`, `rgb(...)`, `hsl(...)`)
//! - color values embedded in class lists (`bg-[#1a2b3c]`)
//! - Tailwind color utilities when the brand disallows them
//!
//! # Configuration
//!
//! - `ignore_values`: color values that are always accepted
//!
//! # Fix
//!
//! Offending color values are replaced with the first brand color. No fix
//! is offered when the brand has no palette or a Tailwind utility is at fault.

use brand_lint_core::classify::{embedded_colors, is_color_value, tailwind_color_classes};
use brand_lint_core::{
    NodeKind, OptionField, OptionKind, OptionSchema, Remedy, Rule, RuleContext, RuleDefinition,
    RuleError, SyntaxNode, Violation,
};

/// Rule id for brand-enforce-colors.
pub const ID: &str = "brand-enforce-colors";

const SCHEMA: OptionSchema =
    OptionSchema::new(&[OptionField::optional("ignore_values", OptionKind::StringList)]);

/// Flags colors outside the brand palette.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrandEnforceColors;

impl BrandEnforceColors {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for BrandEnforceColors {
    fn definition(&self) -> RuleDefinition {
        RuleDefinition {
            id: ID,
            category: "design-guardian",
            description: "Colors must come from the brand palette",
            fixable: true,
            schema: SCHEMA,
            bindings: &["StringLiteral", "TemplateLiteral"],
        }
    }

    fn check(&self, node: &SyntaxNode, cx: &RuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
        // Module specifiers are handled by the import rules.
        if cx.has_ancestor(|n| n.kind == NodeKind::ImportDeclaration) {
            return Ok(Vec::new());
        }

        let policy = cx.policy();
        if policy.allow_custom_colors {
            return Ok(Vec::new());
        }

        let value = node.value.as_deref().unwrap_or(&node.text);
        let ignored = cx.options.get_list("ignore_values");
        let accepted = |color: &str| {
            policy.has_color(color) || ignored.iter().any(|i| i.eq_ignore_ascii_case(color))
        };

        let raw: Vec<&str> = if is_color_value(value) {
            vec![value.trim()]
        } else {
            embedded_colors(value)
        };
        let raw: Vec<&str> = raw.into_iter().filter(|c| !accepted(*c)).collect();

        let utilities: Vec<&str> = if policy.allow_tailwind {
            Vec::new()
        } else {
            tailwind_color_classes(value)
                .into_iter()
                .filter(|c| !accepted(*c))
                .collect()
        };

        if raw.is_empty() && utilities.is_empty() {
            return Ok(Vec::new());
        }

        let mut parts = Vec::new();
        if !raw.is_empty() {
            parts.push(format!(
                "{} {} not in the brand palette",
                plural("Color", &raw),
                if raw.len() == 1 { "is" } else { "are" }
            ));
        }
        if !utilities.is_empty() {
            parts.push(format!(
                "Tailwind color {} not allowed by the brand",
                if utilities.len() == 1 {
                    format!("utility \"{}\" is", utilities[0])
                } else {
                    format!("utilities {} are", quoted(&utilities))
                }
            ));
        }

        let mut violation = Violation::new(ID, node.span, cx.message(parts.join("; ")));
        if utilities.is_empty() {
            violation = violation.with_remedy(Remedy::SubstituteColor {
                offending: raw.iter().map(|c| (*c).to_string()).collect(),
            });
        }
        Ok(vec![violation])
    }
}

fn plural(noun: &str, values: &[&str]) -> String {
    if values.len() == 1 {
        format!("{noun} \"{}\"", values[0])
    } else {
        format!("{noun}s {}", quoted(values))
    }
}

fn quoted(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("\"{v}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{acme, attribute, import, run, string};
    use brand_lint_core::{BrandPolicy, RuleOptions};

    fn check(node: &SyntaxNode, policy: BrandPolicy) -> Vec<Violation> {
        run(&BrandEnforceColors, node, &[], policy, &RuleOptions::new())
    }

    #[test]
    fn test_off_palette_hex_in_class_name() {
        let attr = attribute("className", "\"#1a2b3c\"");
        let literal = &attr.children[0];
        let violations = run(
            &BrandEnforceColors,
            literal,
            &[&attr],
            BrandPolicy::default(),
            &RuleOptions::new(),
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule_id, ID);
        insta::assert_snapshot!(violations[0].message, @r##"Color "#1a2b3c" is not in the brand palette"##);
    }

    #[test]
    fn test_tailwind_utility_allowed_by_default() {
        assert!(check(&string("bg-blue-500"), BrandPolicy::default()).is_empty());
    }

    #[test]
    fn test_tailwind_utility_rejected_when_disallowed() {
        let policy = BrandPolicy {
            allow_tailwind: false,
            ..acme()
        };
        let violations = check(&string("p-4 bg-blue-500 text-white"), policy);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("utilities \"bg-blue-500\", \"text-white\""));
        assert!(violations[0].remedy.is_none());
    }

    #[test]
    fn test_palette_colors_pass_case_insensitively() {
        assert!(check(&string("#0055FF"), acme()).is_empty());
        assert!(check(&string("p-2 bg-[#111111]"), acme()).is_empty());
    }

    #[test]
    fn test_embedded_colors_carry_substitution_remedy() {
        let violations = check(&string("bg-[#1a2b3c] border-[#abc]"), acme());
        assert_eq!(
            violations[0].remedy,
            Some(Remedy::SubstituteColor {
                offending: vec!["#1a2b3c".into(), "#abc".into()]
            })
        );
        assert!(violations[0].message.starts_with("Colors \"#1a2b3c\", \"#abc\" are"));
    }

    #[test]
    fn test_ignore_values_option() {
        let options = RuleOptions::new().with("ignore_values", vec!["#FFFFFF".to_string()]);
        assert!(run(&BrandEnforceColors, &string("#ffffff"), &[], acme(), &options).is_empty());
    }

    #[test]
    fn test_custom_colors_escape_hatch() {
        let policy = BrandPolicy {
            allow_custom_colors: true,
            ..BrandPolicy::default()
        };
        assert!(check(&string("rgb(1, 2, 3)"), policy).is_empty());
    }

    #[test]
    fn test_import_specifiers_are_skipped() {
        let decl = import("./theme-#abc", &[]);
        let specifier = decl.children.last().unwrap();
        let violations = run(
            &BrandEnforceColors,
            specifier,
            &[&decl],
            BrandPolicy::default(),
            &RuleOptions::new(),
        );
        assert!(violations.is_empty());
    }
}
