//! Init command implementation.

use anyhow::{bail, Context, Result};
use brand_lint::STARTER_CONFIG;
use std::path::{Path, PathBuf};

/// Name of the file written by `init`.
const CONFIG_NAME: &str = "brand-lint.toml";

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = write_config(Path::new("."), force)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to describe your brands and rule levels");
    println!("  2. Run: brand-lint check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, STARTER_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brand_lint::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_writes_parseable_starter_config() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), false).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(Config::parse(&content).is_ok());
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_NAME), "mode = \"required\"\n").unwrap();

        let err = write_config(tmp.path(), false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        write_config(tmp.path(), true).unwrap();
        let content = fs::read_to_string(tmp.path().join(CONFIG_NAME)).unwrap();
        assert_eq!(content, STARTER_CONFIG);
    }
}
