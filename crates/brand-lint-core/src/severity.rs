//! Severity modes and the severity compiler.
//!
//! Effective levels are layered in increasing specificity:
//!
//! 1. the mode default, replaced by an explicit global rule entry; in
//!    brand-aware mode the brand's enforcement toggles come next
//! 2. category overrides, in declared order (optionally glob-restricted)
//! 3. path overrides, in declared order; the last match wins

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::policy::BrandPolicy;
use crate::registry::RuleRegistry;
use crate::types::{RuleLevel, Severity};

/// Enforcement mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Every rule warns.
    #[default]
    Advisory,
    /// Every rule errors.
    Required,
    /// Every rule errors, messages name the brand and the brand's
    /// enforcement toggles apply.
    BrandAware,
}

impl Mode {
    /// Level every rule starts at in this mode.
    #[must_use]
    pub fn default_level(self) -> RuleLevel {
        match self {
            Self::Advisory => RuleLevel::Warn,
            Self::Required | Self::BrandAware => RuleLevel::Error,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Advisory => write!(f, "advisory"),
            Self::Required => write!(f, "required"),
            Self::BrandAware => write!(f, "brand-aware"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "advisory" => Ok(Self::Advisory),
            "required" => Ok(Self::Required),
            "brand-aware" | "brand_aware" => Ok(Self::BrandAware),
            other => Err(format!(
                "unknown mode `{other}`, expected: advisory, required, brand-aware"
            )),
        }
    }
}

/// Errors raised while compiling severities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeverityError {
    /// Empty glob pattern.
    #[error("empty glob pattern in {context}")]
    EmptyGlob {
        /// Where the pattern was declared.
        context: String,
    },

    /// Glob pattern with invalid syntax.
    #[error("invalid glob pattern `{pattern}` in {context}: {reason}")]
    InvalidGlob {
        /// Offending pattern.
        pattern: String,
        /// Where the pattern was declared.
        context: String,
        /// Parser message.
        reason: String,
    },
}

/// A validated glob matched against project-relative paths.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    compiled: glob::Pattern,
}

impl GlobPattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is empty or has invalid glob syntax.
    pub fn new(pattern: &str, context: &str) -> Result<Self, SeverityError> {
        if pattern.trim().is_empty() {
            return Err(SeverityError::EmptyGlob {
                context: context.to_string(),
            });
        }
        let compiled = glob::Pattern::new(pattern).map_err(|e| SeverityError::InvalidGlob {
            pattern: pattern.to_string(),
            context: context.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// Tests whether a relative file path matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let path_str = normalize_path(path);
        if self.compiled.matches(&path_str) {
            return true;
        }
        // `dir/**` also matches anything below `dir/`.
        if let Some(prefix) = self.raw.strip_suffix("/**") {
            let normalized = prefix.trim_end_matches('/');
            if path_str.starts_with(normalized)
                && path_str
                    .as_bytes()
                    .get(normalized.len())
                    .is_some_and(|&b| b == b'/')
            {
                return true;
            }
        }
        false
    }

    /// Returns the pattern as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn normalize_path(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    if let Some(rest) = s.strip_prefix("./") {
        return rest.to_string();
    }
    s
}

fn compile_globs(patterns: &[String], context: &str) -> Result<Vec<GlobPattern>, SeverityError> {
    patterns.iter().map(|p| GlobPattern::new(p, context)).collect()
}

/// Category-wide level, optionally restricted to files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryOverride {
    /// Rule category (e.g. `design-guardian`).
    pub category: String,
    /// Globs restricting the override; empty means every file.
    #[serde(default)]
    pub files: Vec<String>,
    /// Level for every rule in the category.
    pub level: RuleLevel,
}

/// Per-rule levels for files matching globs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathOverride {
    /// Globs selecting files.
    pub files: Vec<String>,
    /// Rule id → level.
    pub rules: BTreeMap<String, RuleLevel>,
}

/// Severity configuration before compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityProfile {
    /// Enforcement mode.
    pub mode: Mode,
    /// Explicit global levels.
    pub rules: BTreeMap<String, RuleLevel>,
    /// Category overrides in declared order.
    pub categories: Vec<CategoryOverride>,
    /// Path overrides, most specific last.
    pub overrides: Vec<PathOverride>,
}

impl SeverityProfile {
    /// Creates an empty profile for `mode`.
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Sets a global rule level.
    #[must_use]
    pub fn rule(mut self, id: impl Into<String>, level: RuleLevel) -> Self {
        self.rules.insert(id.into(), level);
        self
    }

    /// Adds a category override.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>, files: &[&str], level: RuleLevel) -> Self {
        self.categories.push(CategoryOverride {
            category: category.into(),
            files: files.iter().map(|f| (*f).to_string()).collect(),
            level,
        });
        self
    }

    /// Adds a path override.
    #[must_use]
    pub fn path_override(mut self, files: &[&str], rules: &[(&str, RuleLevel)]) -> Self {
        self.overrides.push(PathOverride {
            files: files.iter().map(|f| (*f).to_string()).collect(),
            rules: rules.iter().map(|(id, l)| ((*id).to_string(), *l)).collect(),
        });
        self
    }
}

/// Concrete rule levels for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveSeverities {
    levels: BTreeMap<String, RuleLevel>,
}

impl EffectiveSeverities {
    /// Creates the map from explicit levels.
    #[must_use]
    pub fn from_levels(levels: BTreeMap<String, RuleLevel>) -> Self {
        Self { levels }
    }

    /// Level of `rule_id`; unknown rules are off.
    #[must_use]
    pub fn level(&self, rule_id: &str) -> RuleLevel {
        self.levels.get(rule_id).copied().unwrap_or(RuleLevel::Off)
    }

    /// Severity of `rule_id`, `None` when off.
    #[must_use]
    pub fn severity(&self, rule_id: &str) -> Option<Severity> {
        self.level(rule_id).severity()
    }

    /// Iterates levels in rule-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, RuleLevel)> {
        self.levels.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// A profile whose globs have been validated.
#[derive(Debug)]
pub struct SeverityCompiler<'a> {
    profile: &'a SeverityProfile,
    registry: &'a RuleRegistry,
    categories: Vec<(&'a CategoryOverride, Vec<GlobPattern>)>,
    overrides: Vec<(&'a PathOverride, Vec<GlobPattern>)>,
}

impl<'a> SeverityCompiler<'a> {
    /// Validates `profile` against `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error for empty or malformed globs.
    pub fn new(profile: &'a SeverityProfile, registry: &'a RuleRegistry) -> Result<Self, SeverityError> {
        let categories = profile
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let globs = compile_globs(&c.files, &format!("categories[{i}]"))?;
                Ok((c, globs))
            })
            .collect::<Result<Vec<_>, SeverityError>>()?;

        let overrides = profile
            .overrides
            .iter()
            .enumerate()
            .map(|(i, o)| {
                if o.files.is_empty() {
                    return Err(SeverityError::EmptyGlob {
                        context: format!("overrides[{i}]"),
                    });
                }
                let globs = compile_globs(&o.files, &format!("overrides[{i}]"))?;
                Ok((o, globs))
            })
            .collect::<Result<Vec<_>, SeverityError>>()?;

        for id in profile
            .rules
            .keys()
            .chain(profile.overrides.iter().flat_map(|o| o.rules.keys()))
        {
            if !registry.contains(id) {
                warn!("Severity configuration names unknown rule `{id}`; ignoring it");
            }
        }

        Ok(Self {
            profile,
            registry,
            categories,
            overrides,
        })
    }

    /// Compiles the effective levels for `path` in one step.
    ///
    /// # Errors
    ///
    /// Returns an error for empty or malformed globs.
    pub fn compile(
        profile: &SeverityProfile,
        registry: &RuleRegistry,
        policy: &BrandPolicy,
        path: &Path,
    ) -> Result<EffectiveSeverities, SeverityError> {
        Ok(SeverityCompiler::new(profile, registry)?.effective(policy, path))
    }

    /// Path-independent levels: mode default, explicit entries, brand toggles.
    #[must_use]
    pub fn global_levels(&self, policy: &BrandPolicy) -> BTreeMap<String, RuleLevel> {
        let mode = self.profile.mode;
        self.registry
            .iter()
            .map(|entry| {
                let id = entry.id();
                let mut level = self
                    .profile
                    .rules
                    .get(id)
                    .copied()
                    .unwrap_or_else(|| mode.default_level());
                if mode == Mode::BrandAware {
                    if let Some(toggle) = policy.enforcement.get(id) {
                        level = *toggle;
                    }
                }
                (id.to_string(), level)
            })
            .collect()
    }

    /// Effective levels for `path`.
    #[must_use]
    pub fn effective(&self, policy: &BrandPolicy, path: &Path) -> EffectiveSeverities {
        let mut levels = self.global_levels(policy);

        for (category, globs) in &self.categories {
            if !globs.is_empty() && !globs.iter().any(|g| g.matches(path)) {
                continue;
            }
            for entry in self
                .registry
                .iter()
                .filter(|e| e.definition().category == category.category)
            {
                levels.insert(entry.id().to_string(), category.level);
            }
        }

        for (path_override, globs) in &self.overrides {
            if !globs.iter().any(|g| g.matches(path)) {
                continue;
            }
            for (id, level) in &path_override.rules {
                if let Some(slot) = levels.get_mut(id) {
                    *slot = *level;
                }
            }
        }

        debug!("Effective levels for {}: {levels:?}", path.display());
        EffectiveSeverities { levels }
    }

    /// The registry the profile was validated against.
    #[must_use]
    pub fn registry(&self) -> &'a RuleRegistry {
        self.registry
    }

    /// The profile being compiled.
    #[must_use]
    pub fn profile(&self) -> &'a SeverityProfile {
        self.profile
    }
}
