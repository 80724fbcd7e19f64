//! Batch runner: discovers files, lints them in parallel and applies fixes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use brand_lint_core::{
    apply_fixes, AppliedFixes, BrandOverrides, Config, ContextInputs, Engine, GlobPattern,
    LintReport, Mode, PolicyResolver, RegistryError, SeverityError,
};
use brand_lint_rules::registry_from_config;
use brand_lint_ts::{ParseError, SourceParser, TsxParser};
use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while running the linter over a project.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// IO error reading or writing a file.
    #[error("IO error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Directory walk failed.
    #[error("File discovery failed: {0}")]
    Walk(#[from] ignore::Error),

    /// Rule configuration rejected by the registry.
    #[error("Invalid rule configuration: {0}")]
    Registry(#[from] RegistryError),

    /// Malformed exclude pattern.
    #[error("Invalid exclude pattern: {0}")]
    Exclude(#[from] SeverityError),

    /// Source could not be parsed.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// File involved.
        path: PathBuf,
        /// Parser error.
        source: ParseError,
    },

    /// Worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// A file that could not be linted.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    /// File path relative to the root.
    pub path: PathBuf,
    /// Error message.
    pub message: String,
}

/// Outcome of linting a project.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// One report per linted file, sorted by path.
    pub reports: Vec<LintReport>,
    /// Files that could not be read or parsed.
    pub failures: Vec<FileFailure>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl RunResult {
    /// Number of files linted successfully.
    #[must_use]
    pub fn files_checked(&self) -> usize {
        self.reports.len()
    }

    /// Total number of violations.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.reports.iter().map(|r| r.violations.len()).sum()
    }

    /// Counts `(required, advisory)` violations across all files.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize) {
        self.reports
            .iter()
            .map(LintReport::count_by_severity)
            .fold((0, 0), |(r, a), (r2, a2)| (r + r2, a + a2))
    }

    /// Returns true if any required violation remains.
    #[must_use]
    pub fn has_required(&self) -> bool {
        self.reports.iter().any(LintReport::has_required)
    }

    /// Reports that carry at least one violation.
    pub fn with_violations(&self) -> impl Iterator<Item = &LintReport> {
        self.reports.iter().filter(|r| !r.violations.is_empty())
    }
}

/// Builder for configuring a [`Runner`].
#[derive(Debug, Default)]
pub struct RunnerBuilder {
    root: Option<PathBuf>,
    config: Option<Config>,
    mode: Option<Mode>,
    tenant: Option<String>,
    overrides: Option<BrandOverrides>,
}

impl RunnerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory; defaults to `analyzer.root` from the config.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the project configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the configured mode.
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Overrides the configured tenant.
    #[must_use]
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Applies per-invocation brand overrides.
    #[must_use]
    pub fn overrides(mut self, overrides: BrandOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Builds the runner, wiring the registry, resolver and severity profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule configuration or an exclude pattern is invalid.
    pub fn build(self) -> Result<Runner, RunnerError> {
        let config = self.config.unwrap_or_default();

        let registry = registry_from_config(&config)?;
        let resolver = PolicyResolver::new(config.brand_source());
        let engine = Engine::new(
            Arc::new(registry),
            Arc::new(resolver),
            config.severity_profile(),
        );

        let exclude = config
            .analyzer
            .exclude
            .iter()
            .map(|p| GlobPattern::new(p, "analyzer.exclude"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Runner {
            engine,
            root: self.root.unwrap_or_else(|| config.analyzer.root.clone()),
            exclude,
            extensions: config
                .analyzer
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            respect_gitignore: config.analyzer.respect_gitignore,
            parallelism: config.analyzer.parallelism,
            mode: self.mode.unwrap_or(config.mode),
            tenant: self.tenant.or(config.tenant),
            overrides: self.overrides,
        })
    }
}

/// Lints a project tree with the built-in rules.
///
/// Use [`Runner::builder()`] to construct an instance.
#[derive(Debug)]
pub struct Runner {
    engine: Engine,
    root: PathBuf,
    exclude: Vec<GlobPattern>,
    extensions: Vec<String>,
    respect_gitignore: bool,
    parallelism: Option<usize>,
    mode: Mode,
    tenant: Option<String>,
    overrides: Option<BrandOverrides>,
}

impl Runner {
    /// Creates a new builder for configuring a runner.
    #[must_use]
    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::new()
    }

    /// Returns the root directory being linted.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the underlying engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Returns the effective mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Engine inputs for a file path relative to the root.
    #[must_use]
    pub fn inputs(&self, path: &Path) -> ContextInputs {
        let mut inputs = ContextInputs::new(path, self.mode);
        inputs.tenant_id.clone_from(&self.tenant);
        inputs.brand_overrides.clone_from(&self.overrides);
        inputs
    }

    /// Discovers lintable files, returned relative to the root in sorted order.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory walk fails.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>, RunnerError> {
        let mut builder = WalkBuilder::new(&self.root);
        builder.hidden(false).git_ignore(self.respect_gitignore);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let supported = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| self.extensions.iter().any(|e| e == ext));
            if !supported {
                continue;
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();
            if self.exclude.iter().any(|g| g.matches(&relative)) {
                debug!("Excluding: {}", relative.display());
                continue;
            }
            files.push(relative);
        }

        files.sort();
        Ok(files)
    }

    /// Lints in-memory source text as if it lived at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parser cannot produce a tree.
    pub fn lint_source(&self, path: &Path, source: &str) -> Result<LintReport, ParseError> {
        let tree = TsxParser::for_path(path).parse(source)?;
        let violations = self.engine.lint(&tree, &self.inputs(path));
        debug!("{}: {} violations", path.display(), violations.len());
        Ok(LintReport::new(path, violations))
    }

    /// Lints one file, given relative to the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn lint_file(&self, path: &Path) -> Result<LintReport, RunnerError> {
        let source = read(&self.root.join(path))?;
        self.lint_source(path, &source)
            .map_err(|source| RunnerError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Lints every discovered file in parallel.
    ///
    /// Files that cannot be read or parsed are recorded as failures and do
    /// not stop the run.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or the worker pool cannot be built.
    pub fn run(&self) -> Result<RunResult, RunnerError> {
        let started_at = Utc::now();
        info!("Starting lint at {}", self.root.display());

        let files = self.discover_files()?;
        info!("Found {} files to lint", files.len());

        let lint_all = || {
            files
                .par_iter()
                .map(|path| (path, self.lint_file(path)))
                .collect::<Vec<_>>()
        };
        let outcomes = match self.parallelism {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(lint_all),
            None => lint_all(),
        };

        let mut reports = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!("{e}");
                    failures.push(FileFailure {
                        path: path.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let result = RunResult {
            reports,
            failures,
            started_at,
            finished_at: Utc::now(),
        };
        let (required, advisory) = result.count_by_severity();
        info!(
            "Lint complete: {required} required and {advisory} advisory violations in {} files",
            result.files_checked()
        );
        Ok(result)
    }

    /// Applies a report's fixes to `source`, verifying the result still parses.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Syntax`] if the fixed source no longer parses.
    pub fn fix_source(&self, report: &LintReport, source: &str) -> Result<AppliedFixes, ParseError> {
        let fixed = apply_fixes(source, report.fixes());
        if fixed.applied > 0 {
            TsxParser::for_path(&report.path).check_syntax(&fixed.source)?;
        }
        Ok(fixed)
    }

    /// Applies a report's fixes to its file on disk.
    ///
    /// The file is left untouched when the fixed source would not parse.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, written, or re-parsed.
    pub fn fix_report(&self, report: &LintReport) -> Result<AppliedFixes, RunnerError> {
        let full = self.root.join(&report.path);
        let source = read(&full)?;
        let fixed = self
            .fix_source(report, &source)
            .map_err(|source| RunnerError::Parse {
                path: report.path.clone(),
                source,
            })?;

        if fixed.applied > 0 {
            std::fs::write(&full, &fixed.source).map_err(|e| RunnerError::Io {
                path: full.clone(),
                source: e,
            })?;
            info!(
                "Applied {} fixes to {} ({} skipped)",
                fixed.applied,
                report.path.display(),
                fixed.skipped
            );
        }
        Ok(fixed)
    }
}

fn read(path: &Path) -> Result<String, RunnerError> {
    std::fs::read_to_string(path).map_err(|e| RunnerError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let runner = Runner::builder().root("/tmp/project").build().unwrap();
        assert_eq!(runner.root(), Path::new("/tmp/project"));
        assert_eq!(runner.mode(), Mode::Advisory);
        assert_eq!(runner.engine().registry().len(), 4);
    }

    #[test]
    fn test_builder_overrides_config() {
        let config = Config::parse("mode = \"required\"\ntenant = \"acme\"\n").unwrap();
        let runner = Runner::builder()
            .config(config)
            .mode(Mode::BrandAware)
            .build()
            .unwrap();
        assert_eq!(runner.mode(), Mode::BrandAware);
        let inputs = runner.inputs(Path::new("a.tsx"));
        assert_eq!(inputs.tenant_id.as_deref(), Some("acme"));
        assert_eq!(inputs.mode, Mode::BrandAware);
    }

    #[test]
    fn test_invalid_exclude_rejected() {
        let config = Config::parse("[analyzer]\nexclude = [\"a/[b\"]\n").unwrap();
        assert!(matches!(
            Runner::builder().config(config).build(),
            Err(RunnerError::Exclude(_))
        ));
    }

    #[test]
    fn test_unknown_rule_rejected() {
        let config = Config::parse("[rules.not-a-rule]\nlevel = \"warn\"\n").unwrap();
        assert!(matches!(
            Runner::builder().config(config).build(),
            Err(RunnerError::Registry(_))
        ));
    }
}
