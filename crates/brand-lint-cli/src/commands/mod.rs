//! Subcommand implementations.

pub mod check;
pub mod compile;
pub mod init;
pub mod list_rules;
pub mod output;

use anyhow::{Context, Result};
use brand_lint::{Config, Mode, Runner};
use std::path::Path;

use crate::config_resolver::ConfigSource;

/// Command-line overrides shared by `check` and `compile`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Mode from `--mode`.
    pub mode: Option<Mode>,
    /// Tenant from `--tenant`.
    pub tenant: Option<String>,
}

/// Loads the configuration a resolver found, or the defaults.
pub fn load_config(source: &ConfigSource) -> Result<Config> {
    match source {
        ConfigSource::Default => Ok(Config::default()),
        other => {
            // Invariant: non-Default variants always have a path
            let p = other.path().context("resolved config has no path")?;
            if source.is_global() {
                tracing::info!("Using global config: {}", p.display());
            }
            Config::from_file(p).with_context(|| format!("Failed to load config: {}", p.display()))
        }
    }
}

/// Builds a runner rooted at `path` with command-line overrides applied.
pub fn build_runner(path: &Path, source: &ConfigSource, options: &RunOptions) -> Result<Runner> {
    let config = load_config(source)?;

    let mut builder = Runner::builder().root(path).config(config);
    if let Some(mode) = options.mode {
        builder = builder.mode(mode);
    }
    if let Some(tenant) = &options.tenant {
        builder = builder.tenant(tenant.clone());
    }

    builder.build().context("Failed to configure brand-lint")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_source_uses_default_config() {
        let config = load_config(&ConfigSource::Default).unwrap();
        assert_eq!(config.mode, Mode::Advisory);
    }

    #[test]
    fn test_project_config_loaded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("brand-lint.toml");
        fs::write(&path, "mode = \"required\"\ntenant = \"acme\"\n").unwrap();

        let config = load_config(&ConfigSource::Project(path)).unwrap();
        assert_eq!(config.mode, Mode::Required);
        assert_eq!(config.tenant.as_deref(), Some("acme"));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let source = ConfigSource::Explicit(tmp.path().join("missing.toml"));
        let err = load_config(&source).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_command_line_mode_wins() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("brand-lint.toml");
        fs::write(&path, "mode = \"required\"\n").unwrap();

        let options = RunOptions {
            mode: Some(Mode::BrandAware),
            tenant: None,
        };
        let runner = build_runner(tmp.path(), &ConfigSource::Project(path), &options).unwrap();
        assert_eq!(runner.mode(), Mode::BrandAware);
        assert_eq!(runner.root(), tmp.path());
    }
}
