//! Project configuration file (`brand-lint.toml`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::policy::{BrandPolicy, StaticBrandSource};
use crate::rule::RuleOptions;
use crate::severity::{CategoryOverride, Mode, PathOverride, SeverityProfile};
use crate::types::RuleLevel;

/// Starter configuration written by `brand-lint init`.
pub const STARTER_CONFIG: &str = r##"# brand-lint configuration

# advisory | required | brand-aware
mode = "advisory"

# Tenant whose brand applies. Falls back to $BRAND_LINT_TENANT, $TENANT_ID, then "default".
# tenant = "acme"

[analyzer]
root = "."
exclude = ["**/node_modules/**", "**/dist/**", "**/build/**", "**/.next/**"]
extensions = ["tsx", "jsx", "ts", "js"]

[rules.brand-enforce-colors]
# level = "error"
# ignore_values = ["#ffffff"]

[rules.brand-no-inline-styles]
accessor = "brandClass"

# [[categories]]
# category = "design-guardian"
# files = ["components/ui/**"]
# level = "error"

# [[overrides]]
# files = ["legacy/**"]
# rules = { brand-no-inline-styles = "off" }

[brands.default]
name = "Default"
colors = []
fonts = []
"##;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enforcement mode.
    pub mode: Mode,

    /// Explicit tenant.
    pub tenant: Option<String>,

    /// File discovery settings.
    pub analyzer: AnalyzerConfig,

    /// Per-rule configuration.
    pub rules: BTreeMap<String, RuleConfig>,

    /// Category overrides in declared order.
    pub categories: Vec<CategoryOverride>,

    /// Path overrides, most specific last.
    pub overrides: Vec<PathOverride>,

    /// Brand definitions by tenant id.
    pub brands: BTreeMap<String, BrandPolicy>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Options configured for a rule.
    #[must_use]
    pub fn rule_options(&self, rule_id: &str) -> RuleOptions {
        self.rules
            .get(rule_id)
            .map(|r| r.options.clone())
            .unwrap_or_default()
    }

    /// Severity profile described by this configuration.
    #[must_use]
    pub fn severity_profile(&self) -> SeverityProfile {
        SeverityProfile {
            mode: self.mode,
            rules: self
                .rules
                .iter()
                .filter_map(|(id, r)| r.level.map(|l| (id.clone(), l)))
                .collect(),
            categories: self.categories.clone(),
            overrides: self.overrides.clone(),
        }
    }

    /// Brand source backed by the `[brands.*]` tables.
    #[must_use]
    pub fn brand_source(&self) -> StaticBrandSource {
        StaticBrandSource::new(self.brands.clone())
    }
}

/// File discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Root directory to analyze.
    pub root: PathBuf,

    /// Glob patterns to exclude.
    pub exclude: Vec<String>,

    /// File extensions to lint.
    pub extensions: Vec<String>,

    /// Whether to respect `.gitignore` files.
    pub respect_gitignore: bool,

    /// Maximum number of parallel workers.
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            exclude: vec![
                "**/node_modules/**".to_string(),
                "**/dist/**".to_string(),
                "**/build/**".to_string(),
                "**/.next/**".to_string(),
            ],
            extensions: ["tsx", "jsx", "ts", "js"]
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Global level for this rule.
    #[serde(default)]
    pub level: Option<RuleLevel>,

    /// Rule options, validated against the rule's schema at registration.
    #[serde(flatten)]
    pub options: RuleOptions,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse configuration.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Error message.
        message: String,
    },
}
