//! Compile command implementation.

use anyhow::{Context, Result};
use std::path::Path;

use super::RunOptions;
use crate::config_resolver::ConfigSource;

/// File the configuration is compiled for when `--path` is omitted.
const DEFAULT_TARGET: &str = "index.tsx";

/// Runs the compile command.
pub fn run(
    project: &Path,
    source: &ConfigSource,
    options: &RunOptions,
    target: Option<&Path>,
) -> Result<()> {
    println!("{}", render(project, source, options, target)?);
    Ok(())
}

fn render(
    project: &Path,
    source: &ConfigSource,
    options: &RunOptions,
    target: Option<&Path>,
) -> Result<String> {
    let runner = super::build_runner(project, source, options)?;
    let inputs = runner.inputs(target.unwrap_or(Path::new(DEFAULT_TARGET)));

    let compiled = runner.engine().compile_configuration(&inputs);
    if compiled.is_fallback {
        tracing::warn!("Emitting the fallback configuration");
    }

    compiled
        .to_json_pretty()
        .context("Failed to serialize compiled configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use brand_lint::Mode;
    use std::fs;
    use tempfile::TempDir;

    fn compile(config: &str, options: &RunOptions) -> serde_json::Value {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("brand-lint.toml");
        fs::write(&path, config).unwrap();
        let json = render(tmp.path(), &ConfigSource::Project(path), options, None).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_default_config_compiles_all_rules_as_warnings() {
        let value = compile("", &RunOptions::default());
        let rules = value["rules"].as_object().unwrap();
        assert_eq!(rules.len(), 4);
        assert_eq!(value["rules"]["brand-enforce-colors"][0], "warn");
    }

    #[test]
    fn test_mode_option_raises_levels() {
        let options = RunOptions {
            mode: Some(Mode::Required),
            tenant: None,
        };
        let value = compile("", &options);
        assert_eq!(value["rules"]["brand-enforce-icons"][0], "error");
    }

    #[test]
    fn test_category_override_emitted() {
        let value = compile(
            r#"
[[categories]]
category = "design-guardian"
level = "error"
files = ["components/ui/**"]
"#,
            &RunOptions::default(),
        );
        let overrides = value["overrides"].as_array().unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0]["files"][0], "components/ui/**");
    }
}
