//! Built-in rule sets and registries.

use std::sync::Arc;

use brand_lint_core::{Config, RegistryError, Rule, RuleOptions, RuleRegistry};
use tracing::debug;

use crate::{BrandEnforceColors, BrandEnforceIcons, BrandEnforceTypography, BrandNoInlineStyles};

/// Returns every built-in rule, in registration order.
#[must_use]
pub fn all_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(BrandEnforceColors::new()),
        Arc::new(BrandEnforceTypography::new()),
        Arc::new(BrandEnforceIcons::new()),
        Arc::new(BrandNoInlineStyles::new()),
    ]
}

/// Registry holding every built-in rule with default options.
///
/// # Errors
///
/// Returns an error only if a built-in definition is inconsistent.
pub fn builtin_registry() -> Result<RuleRegistry, RegistryError> {
    with_options(|_| RuleOptions::new())
}

/// Registry holding every built-in rule with options from `config`.
///
/// # Errors
///
/// Returns an error if `config` configures a rule that does not exist or
/// passes options its schema rejects.
pub fn registry_from_config(config: &Config) -> Result<RuleRegistry, RegistryError> {
    let registry = with_options(|id| config.rule_options(id))?;
    if let Some(unknown) = config.rules.keys().find(|id| !registry.contains(id)) {
        return Err(RegistryError::NotFound {
            id: unknown.clone(),
        });
    }
    Ok(registry)
}

fn with_options(options: impl Fn(&str) -> RuleOptions) -> Result<RuleRegistry, RegistryError> {
    let registry = all_rules()
        .into_iter()
        .try_fold(RuleRegistry::builder(), |builder, rule| {
            let id = rule.definition().id;
            builder.register_arc(rule, options(id))
        })?
        .build();
    debug!("Built registry with {} rules", registry.len());
    Ok(registry)
}
