//! # brand-lint-core
//!
//! Core engine for brand-aware linting of TSX/JSX sources.
//!
//! This crate provides the foundational pieces of the engine:
//!
//! - [`Rule`] trait and [`RuleRegistry`] for schema-validated rules
//! - [`PolicyResolver`] turning a tenant into a [`BrandPolicy`]
//! - [`dispatch`] for single-pass, fault-isolated rule execution
//! - [`SeverityCompiler`] layering mode, category and path levels
//! - [`AutofixGenerator`] and [`apply_fixes`] for safe textual fixes
//! - [`Engine`], the facade combining all of the above
//!
//! The engine consumes a parser-neutral [`SyntaxTree`]; parsing lives in
//! `brand-lint-ts`.
//!
//! ## Example
//!
//! ```ignore
//! use brand_lint_core::{ContextInputs, Engine, Mode, PolicyResolver, RuleRegistry, SeverityProfile};
//! use std::sync::Arc;
//!
//! let registry = RuleRegistry::builder().register(MyRule)?.build();
//! let engine = Engine::new(
//!     Arc::new(registry),
//!     Arc::new(PolicyResolver::without_source()),
//!     SeverityProfile::new(Mode::Advisory),
//! );
//!
//! let violations = engine.lint(&tree, &ContextInputs::new("src/App.tsx", Mode::Advisory));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aggregate;
mod ast;
mod autofix;
pub mod classify;
mod compiled;
mod config;
mod context;
pub mod dispatch;
mod engine;
mod policy;
mod registry;
mod rule;
mod severity;
mod suppress;
mod types;

pub use aggregate::aggregate;
pub use ast::{NodeKind, SyntaxNode, SyntaxTree};
pub use autofix::{apply_fixes, AppliedFixes, AutofixGenerator, Remedy};
pub use compiled::{CompiledConfiguration, CompiledOverride, RuleEntry, BUILTIN_RULE_IDS};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig, STARTER_CONFIG};
pub use context::{
    ContextInputs, ContextMetadata, TenantId, TenantSource, ValidationContext, DEFAULT_TENANT,
    ENVIRONMENT_ENV_VAR, TENANT_ENV_VARS,
};
pub use engine::{Engine, EngineError};
pub use policy::{
    normalize_font, BrandModules, BrandOverrides, BrandPolicy, BrandSource, PolicyError,
    PolicyOrigin, PolicyResolver, ResolvedPolicy, StaticBrandSource,
};
pub use registry::{RegisteredRule, RegistryError, RuleRegistry, RuleRegistryBuilder};
pub use rule::{
    OptionError, OptionField, OptionKind, OptionSchema, OptionValue, Rule, RuleContext,
    RuleDefinition, RuleError, RuleOptions,
};
pub use severity::{
    CategoryOverride, EffectiveSeverities, GlobPattern, Mode, PathOverride, SeverityCompiler,
    SeverityError, SeverityProfile,
};
pub use suppress::{AllowCheck, AllowDirective, Suppressions};
pub use types::{Fix, LintReport, RuleLevel, Severity, Span, Violation, ViolationDiagnostic};
