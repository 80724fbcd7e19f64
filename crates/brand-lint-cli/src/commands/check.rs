//! Check command implementation.

use anyhow::{Context, Result};
use std::path::Path;

use super::RunOptions;
use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command.
pub fn run(
    path: &Path,
    source: &ConfigSource,
    options: &RunOptions,
    format: OutputFormat,
    fix: bool,
) -> Result<()> {
    let runner = super::build_runner(path, source, options)?;

    tracing::info!(
        "Checking {} in {} mode with {} rules",
        path.display(),
        runner.mode(),
        runner.engine().registry().len()
    );

    let mut result = runner.run().context("Lint run failed")?;

    if fix {
        let mut applied = 0;
        for report in result.with_violations() {
            match runner.fix_report(report) {
                Ok(fixed) => applied += fixed.applied,
                Err(e) => tracing::warn!("Skipping fixes for {}: {e}", report.path.display()),
            }
        }
        if applied > 0 {
            tracing::info!("Applied {applied} fixes, re-checking");
            result = runner.run().context("Lint run failed after applying fixes")?;
        }
    }

    super::output::print(&result, format, runner.root())?;

    // Exit with error code if there are required violations
    if result.has_required() {
        std::process::exit(1);
    }

    Ok(())
}
