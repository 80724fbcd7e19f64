//! Locates `brand-lint.toml`.
//!
//! Order:
//!
//! 1. `--config PATH`
//! 2. `brand-lint.toml` or `.brand-lint.toml` in the project directory or
//!    the nearest ancestor that has one (monorepo packages share the root file)
//! 3. `$BRAND_LINT_CONFIG_DIR/config.toml`, else `~/.brand-lint/config.toml`
//! 4. built-in defaults

use std::fmt;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the project directory or one of its ancestors.
    Project(PathBuf),
    /// Found in the per-user config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Path of the config file, if one was found.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (--config)", p.display()),
            Self::Project(p) => write!(f, "{}", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Default => write!(f, "built-in defaults"),
        }
    }
}

const PROJECT_CONFIG_NAMES: &[&str] = &["brand-lint.toml", ".brand-lint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Env var overriding the per-user config directory.
pub const CONFIG_DIR_ENV: &str = "BRAND_LINT_CONFIG_DIR";

/// Resolves the configuration for a project directory.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    let source = resolve_inner(project_dir, explicit, global_config_dir());
    tracing::debug!("Configuration: {source}");
    source
}

// Takes the global dir as a parameter so tests don't race on the env var.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = find_project_config(project_dir) {
        return ConfigSource::Project(found);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, ConfigSource::Global)
}

fn find_project_config(project_dir: &Path) -> Option<PathBuf> {
    let start = project_dir
        .canonicalize()
        .unwrap_or_else(|_| project_dir.to_path_buf());

    start.ancestors().find_map(|dir| {
        PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// Per-user config directory: `$BRAND_LINT_CONFIG_DIR`, else `~/.brand-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".brand-lint"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn canonical(dir: &TempDir) -> PathBuf {
        dir.path().canonicalize().unwrap()
    }

    #[test]
    fn test_explicit_wins_and_is_not_checked() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("brand-lint.toml"), "").unwrap();

        let result = resolve_inner(tmp.path(), Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(
            result,
            ConfigSource::Explicit(PathBuf::from("/nonexistent.toml"))
        );
    }

    #[test]
    fn test_project_config_names() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".brand-lint.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(canonical(&tmp).join(".brand-lint.toml"))
        );

        fs::write(tmp.path().join("brand-lint.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(tmp.path(), None, None),
            ConfigSource::Project(canonical(&tmp).join("brand-lint.toml"))
        );
    }

    #[test]
    fn test_nearest_ancestor_config_found() {
        let tmp = TempDir::new().unwrap();
        let package = tmp.path().join("packages").join("web");
        fs::create_dir_all(&package).unwrap();
        fs::write(tmp.path().join("brand-lint.toml"), "").unwrap();

        assert_eq!(
            resolve_inner(&package, None, None),
            ConfigSource::Project(canonical(&tmp).join("brand-lint.toml"))
        );

        fs::write(package.join("brand-lint.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(&package, None, None),
            ConfigSource::Project(package.canonicalize().unwrap().join("brand-lint.toml"))
        );
    }

    #[test]
    fn test_global_fallback() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);

        fs::write(global.path().join("config.toml"), "").unwrap();
        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert!(result.is_global());
        assert_eq!(result.path(), Some(global.path().join("config.toml").as_path()));
    }

    #[test]
    fn test_project_config_shadows_global() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("brand-lint.toml"), "").unwrap();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "").unwrap();

        let result = resolve_inner(project.path(), None, Some(global.path().to_path_buf()));
        assert!(matches!(result, ConfigSource::Project(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ConfigSource::Default.to_string(), "built-in defaults");
        assert!(ConfigSource::Default.path().is_none());
        assert_eq!(
            ConfigSource::Global(PathBuf::from("/etc/bl.toml")).to_string(),
            "/etc/bl.toml (global)"
        );
    }
}
