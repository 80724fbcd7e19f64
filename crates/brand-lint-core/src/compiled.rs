//! Host-linter configuration produced by the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::policy::BrandPolicy;
use crate::rule::RuleOptions;
use crate::severity::{EffectiveSeverities, GlobPattern, SeverityCompiler, SeverityError};
use crate::types::RuleLevel;

/// Ids of the built-in brand rules, enabled at `warn` by the fallback configuration.
pub const BUILTIN_RULE_IDS: &[&str] = &[
    "brand-enforce-colors",
    "brand-enforce-typography",
    "brand-enforce-icons",
    "brand-no-inline-styles",
];

/// `[level, options]` pair for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry(pub RuleLevel, pub RuleOptions);

impl RuleEntry {
    /// Rule level.
    #[must_use]
    pub fn level(&self) -> RuleLevel {
        self.0
    }

    /// Rule options.
    #[must_use]
    pub fn options(&self) -> &RuleOptions {
        &self.1
    }
}

/// Levels applied to files matching `files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledOverride {
    /// Glob patterns.
    pub files: Vec<String>,
    /// Rule id → level.
    pub rules: BTreeMap<String, RuleLevel>,
}

/// Severity-resolved, rule-parameterized configuration for a host linter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledConfiguration {
    /// Rule id → `[level, options]`.
    pub rules: BTreeMap<String, RuleEntry>,
    /// Glob-scoped overrides in application order.
    #[serde(default)]
    pub overrides: Vec<CompiledOverride>,
    /// Whether this is the hardcoded fallback.
    #[serde(skip)]
    pub is_fallback: bool,
}

impl CompiledConfiguration {
    /// The hardcoded configuration used when compilation fails.
    ///
    /// Identical for every tenant and independent of any registry.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            rules: BUILTIN_RULE_IDS
                .iter()
                .map(|id| ((*id).to_string(), RuleEntry(RuleLevel::Warn, RuleOptions::new())))
                .collect(),
            overrides: Vec::new(),
            is_fallback: true,
        }
    }

    /// Builds the configuration from a validated profile.
    ///
    /// Unrestricted category overrides are folded into the base levels as
    /// long as no glob-scoped override precedes them; afterwards they are
    /// emitted as `**` overrides so declared order is preserved.
    #[must_use]
    pub fn from_compiler(compiler: &SeverityCompiler<'_>, policy: &BrandPolicy) -> Self {
        let registry = compiler.registry();
        let mut levels = compiler.global_levels(policy);
        let mut overrides = Vec::new();

        for category in &compiler.profile().categories {
            let rules: BTreeMap<String, RuleLevel> = registry
                .iter()
                .filter(|e| e.definition().category == category.category)
                .map(|e| (e.id().to_string(), category.level))
                .collect();
            if rules.is_empty() {
                continue;
            }

            if category.files.is_empty() && overrides.is_empty() {
                levels.extend(rules);
            } else {
                let files = if category.files.is_empty() {
                    vec!["**".to_string()]
                } else {
                    category.files.clone()
                };
                overrides.push(CompiledOverride { files, rules });
            }
        }

        for path_override in &compiler.profile().overrides {
            let rules: BTreeMap<String, RuleLevel> = path_override
                .rules
                .iter()
                .filter(|(id, _)| registry.contains(id))
                .map(|(id, level)| (id.clone(), *level))
                .collect();
            if !rules.is_empty() {
                overrides.push(CompiledOverride {
                    files: path_override.files.clone(),
                    rules,
                });
            }
        }

        let rules = registry
            .iter()
            .map(|entry| {
                let level = levels.get(entry.id()).copied().unwrap_or(RuleLevel::Off);
                (
                    entry.id().to_string(),
                    RuleEntry(level, entry.options().clone()),
                )
            })
            .collect();

        Self {
            rules,
            overrides,
            is_fallback: false,
        }
    }

    /// Base levels, ignoring overrides.
    #[must_use]
    pub fn base_levels(&self) -> EffectiveSeverities {
        EffectiveSeverities::from_levels(
            self.rules
                .iter()
                .map(|(id, entry)| (id.clone(), entry.level()))
                .collect(),
        )
    }

    /// Checks that every override glob compiles and names at least one file.
    ///
    /// # Errors
    ///
    /// Returns the first empty or malformed glob.
    pub fn validate(&self) -> Result<(), SeverityError> {
        for (i, o) in self.overrides.iter().enumerate() {
            let context = format!("overrides[{i}]");
            if o.files.is_empty() {
                return Err(SeverityError::EmptyGlob { context });
            }
            for file in &o.files {
                GlobPattern::new(file, &context)?;
            }
        }
        Ok(())
    }

    /// Serializes to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxNode;
    use crate::registry::RuleRegistry;
    use crate::rule::{OptionField, OptionKind, OptionSchema, Rule, RuleContext, RuleDefinition, RuleError};
    use crate::severity::{Mode, SeverityProfile};
    use crate::types::Violation;

    struct Stub(&'static str, &'static str);

    impl Rule for Stub {
        fn definition(&self) -> RuleDefinition {
            RuleDefinition {
                id: self.0,
                category: self.1,
                description: "",
                fixable: true,
                schema: OptionSchema::new(const { &[OptionField::optional("accessor", OptionKind::String)] }),
                bindings: &["JsxAttribute"],
            }
        }

        fn check(&self, _node: &SyntaxNode, _cx: &RuleContext<'_>) -> Result<Vec<Violation>, RuleError> {
            Ok(vec![])
        }
    }

    fn registry() -> RuleRegistry {
        RuleRegistry::builder()
            .register(Stub("brand-enforce-colors", "design-guardian"))
            .and_then(|b| {
                b.register_with_options(
                    Stub("brand-no-inline-styles", "design-guardian"),
                    RuleOptions::new().with("accessor", "cx"),
                )
            })
            .and_then(|b| b.register(Stub("brand-enforce-icons", "brand-assets")))
            .unwrap()
            .build()
    }

    #[test]
    fn fallback_is_fixed_and_flagged() {
        let fallback = CompiledConfiguration::fallback();
        assert!(fallback.is_fallback);
        assert_eq!(fallback.rules.len(), BUILTIN_RULE_IDS.len());
        assert!(fallback.rules.values().all(|e| e.level() == RuleLevel::Warn));
        assert!(fallback.overrides.is_empty());
        assert_eq!(fallback, CompiledConfiguration::fallback());
        assert!(fallback.validate().is_ok());
    }

    #[test]
    fn fallback_json() {
        insta::assert_snapshot!(CompiledConfiguration::fallback().to_json_pretty().unwrap(), @r#"
        {
          "rules": {
            "brand-enforce-colors": [
              "warn",
              {}
            ],
            "brand-enforce-icons": [
              "warn",
              {}
            ],
            "brand-enforce-typography": [
              "warn",
              {}
            ],
            "brand-no-inline-styles": [
              "warn",
              {}
            ]
          },
          "overrides": []
        }
        "#);
    }

    #[test]
    fn serializes_rules_as_level_options_pairs() {
        let registry = registry();
        let profile = SeverityProfile::new(Mode::Advisory)
            .category("brand-assets", &[], RuleLevel::Error)
            .category("design-guardian", &["components/ui/**"], RuleLevel::Error)
            .path_override(&["legacy/**"], &[("brand-no-inline-styles", RuleLevel::Off), ("unknown", RuleLevel::Off)]);
        let compiler = SeverityCompiler::new(&profile, &registry).unwrap();
        let compiled = CompiledConfiguration::from_compiler(&compiler, &BrandPolicy::default());

        let json = serde_json::to_value(&compiled).unwrap();
        assert_eq!(json["rules"]["brand-enforce-icons"][0], "error");
        assert_eq!(json["rules"]["brand-enforce-colors"][0], "warn");
        assert_eq!(json["rules"]["brand-no-inline-styles"][1]["accessor"], "cx");
        assert_eq!(json["overrides"][0]["files"][0], "components/ui/**");
        assert_eq!(json["overrides"][0]["rules"]["brand-enforce-colors"], "error");
        assert_eq!(json["overrides"][1]["rules"]["brand-no-inline-styles"], "off");
        assert!(json["overrides"][1]["rules"].get("unknown").is_none());
        assert!(json.get("is_fallback").is_none());
        assert!(!compiled.is_fallback);
    }

    #[test]
    fn late_unrestricted_category_becomes_catch_all_override() {
        let registry = registry();
        let profile = SeverityProfile::new(Mode::Advisory)
            .category("design-guardian", &["components/**"], RuleLevel::Error)
            .category("design-guardian", &[], RuleLevel::Off);
        let compiler = SeverityCompiler::new(&profile, &registry).unwrap();
        let compiled = CompiledConfiguration::from_compiler(&compiler, &BrandPolicy::default());
        assert_eq!(compiled.overrides.len(), 2);
        assert_eq!(compiled.overrides[1].files, vec!["**".to_string()]);
    }

    #[test]
    fn validate_rejects_bad_globs() {
        let mut compiled = CompiledConfiguration::fallback();
        compiled.overrides.push(CompiledOverride {
            files: vec!["a/[b".into()],
            rules: BTreeMap::new(),
        });
        assert!(compiled.validate().is_err());
    }
}
