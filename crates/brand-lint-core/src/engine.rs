//! Engine facade: the only entry point callers need.
//!
//! The engine is wired explicitly from a built registry, a policy resolver
//! and a severity profile. It either compiles a configuration for a host
//! linter or lints a syntax tree directly. Neither path ever fails: internal
//! errors degrade to the hardcoded fallback configuration.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::aggregate::aggregate;
use crate::ast::SyntaxTree;
use crate::autofix::AutofixGenerator;
use crate::compiled::CompiledConfiguration;
use crate::context::{ContextInputs, TenantId, ValidationContext};
use crate::dispatch::{self, panic_message};
use crate::policy::PolicyResolver;
use crate::registry::RuleRegistry;
use crate::severity::{EffectiveSeverities, SeverityCompiler, SeverityError, SeverityProfile};
use crate::suppress::Suppressions;
use crate::types::{Severity, Violation};

/// Set once a lint run has fallen back to the hardcoded levels.
static LINT_FALLBACK_WARNED: AtomicBool = AtomicBool::new(false);

/// Set once configuration compilation has fallen back.
static COMPILE_FALLBACK_LOGGED: AtomicBool = AtomicBool::new(false);

/// True only for the first call on `flag`.
fn first_time(flag: &AtomicBool) -> bool {
    !flag.swap(true, Ordering::Relaxed)
}

/// Errors surfaced by [`Engine::try_compile_configuration`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The severity profile could not be compiled.
    #[error("severity compilation failed: {0}")]
    Severity(#[from] SeverityError),

    /// Compilation panicked.
    #[error("configuration compilation panicked: {0}")]
    Panicked(String),
}

/// Orchestrates policy resolution, severity compilation, dispatch and fixes.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<RuleRegistry>,
    resolver: Arc<PolicyResolver>,
    profile: SeverityProfile,
}

impl Engine {
    /// Creates an engine from its collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<RuleRegistry>,
        resolver: Arc<PolicyResolver>,
        profile: SeverityProfile,
    ) -> Self {
        Self {
            registry,
            resolver,
            profile,
        }
    }

    /// The rule registry.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// The severity profile.
    #[must_use]
    pub fn profile(&self) -> &SeverityProfile {
        &self.profile
    }

    /// Resolves the policy and builds the validation context for `inputs`.
    #[must_use]
    pub fn context(&self, inputs: &ContextInputs) -> ValidationContext {
        let (tenant, origin) = TenantId::derive(inputs.tenant_id.as_deref());
        debug!("Tenant `{tenant}` ({origin:?})");

        let mut policy = self.resolver.resolve(&tenant);
        if let Some(overrides) = inputs.brand_overrides.as_ref().filter(|o| !o.is_empty()) {
            policy = Arc::new(overrides.apply(&policy));
        }

        ValidationContext::new(policy, tenant, inputs.file_path.clone(), inputs.mode)
    }

    /// Compiles the host-linter configuration.
    ///
    /// On any failure, including panics, returns
    /// [`CompiledConfiguration::fallback`]. The first failure in a process is
    /// logged as an error, later ones at debug level.
    #[must_use]
    pub fn compile_configuration(&self, inputs: &ContextInputs) -> CompiledConfiguration {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.try_compile_configuration(inputs)))
            .unwrap_or_else(|payload| Err(EngineError::Panicked(panic_message(payload.as_ref()))));

        match outcome {
            Ok(compiled) => compiled,
            Err(e) => {
                if first_time(&COMPILE_FALLBACK_LOGGED) {
                    error!("{e}; using the fallback configuration");
                } else {
                    debug!("{e}; using the fallback configuration");
                }
                CompiledConfiguration::fallback()
            }
        }
    }

    /// Compiles the host-linter configuration, surfacing failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the severity profile is invalid.
    pub fn try_compile_configuration(
        &self,
        inputs: &ContextInputs,
    ) -> Result<CompiledConfiguration, EngineError> {
        let context = self.context(inputs);
        let profile = self.profile_for(&context);
        let compiler = SeverityCompiler::new(&profile, &self.registry)?;

        let compiled = CompiledConfiguration::from_compiler(&compiler, &context.policy);
        compiled.validate()?;
        debug!(
            "Compiled {} rules and {} overrides for tenant `{}`",
            compiled.rules.len(),
            compiled.overrides.len(),
            context.tenant
        );
        Ok(compiled)
    }

    /// Lints one parsed file and returns its violations in source order.
    #[must_use]
    pub fn lint(&self, tree: &SyntaxTree, inputs: &ContextInputs) -> Vec<Violation> {
        let context = self.context(inputs);
        let severities = self.severities(&context);

        let active: Vec<_> = self
            .registry
            .iter()
            .filter(|entry| severities.level(entry.id()).is_enabled())
            .collect();

        let raw = dispatch::run(tree, &context, &active);
        let raw = Suppressions::scan(&tree.source).filter(raw);

        let generator = AutofixGenerator::new(&context.policy, &tree.source);
        let resolved = raw.into_iter().map(|mut v| {
            v.severity = severities
                .severity(&v.rule_id)
                .unwrap_or(Severity::Advisory);
            let fixable = self
                .registry
                .lookup(&v.rule_id)
                .is_ok_and(|entry| entry.definition().fixable);
            v.fix = generator.fix(&v, fixable);
            v
        });

        aggregate(resolved)
    }

    fn profile_for(&self, context: &ValidationContext) -> SeverityProfile {
        SeverityProfile {
            mode: context.mode,
            ..self.profile.clone()
        }
    }

    fn severities(&self, context: &ValidationContext) -> EffectiveSeverities {
        let profile = self.profile_for(context);
        match SeverityCompiler::compile(&profile, &self.registry, &context.policy, context.path()) {
            Ok(severities) => severities,
            Err(e) => {
                if first_time(&LINT_FALLBACK_WARNED) {
                    warn!("{e}; linting with the fallback configuration");
                }
                CompiledConfiguration::fallback().base_levels()
            }
        }
    }
}
