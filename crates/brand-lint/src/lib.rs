//! # brand-lint
//!
//! Brand-aware lint rule engine for TSX/JSX design systems.
//!
//! This is the facade crate: it re-exports the engine, the built-in rules
//! and the TSX parser, and adds a [`Runner`] that lints a whole project in
//! parallel.
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use brand_lint::{Config, Runner};
//!
//! let runner = Runner::builder()
//!     .root("./src")
//!     .config(Config::from_file("brand-lint.toml".as_ref())?)
//!     .build()?;
//!
//! let result = runner.run()?;
//! for report in result.with_violations() {
//!     runner.fix_report(report)?;
//! }
//! ```
//!
//! ## Host Linter Integration
//!
//! ```rust,ignore
//! let compiled = runner.engine().compile_configuration(&runner.inputs("src/App.tsx".as_ref()));
//! println!("{}", compiled.to_json_pretty()?);
//! ```
//!
//! ## Suppression Comments
//!
//! ```tsx
//! // brand-lint: allow(brand-enforce-colors) reason="legacy chart palette"
//! const CHART = "#ff00aa";
//! ```

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use brand_lint_core::*;

/// Built-in rules and registries.
pub mod rules {
    pub use brand_lint_rules::*;
}

/// TSX/JSX parser adapter.
pub mod parser {
    pub use brand_lint_ts::*;
}

mod runner;

pub use runner::{FileFailure, RunResult, Runner, RunnerBuilder, RunnerError};
