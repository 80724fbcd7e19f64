//! Per-invocation validation context and tenant derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::policy::{BrandOverrides, BrandPolicy};
use crate::severity::Mode;

/// Tenant used when neither an explicit nor an environment tenant is set.
pub const DEFAULT_TENANT: &str = "default";

/// Environment variables consulted for the tenant id, in order.
pub const TENANT_ENV_VARS: &[&str] = &["BRAND_LINT_TENANT", "TENANT_ID"];

/// Environment variable holding the environment tag.
pub const ENVIRONMENT_ENV_VAR: &str = "BRAND_LINT_ENV";

/// Identifier of the brand/customer a file is validated for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

/// Where a derived tenant id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantSource {
    /// Passed explicitly by the caller or config.
    Explicit,
    /// Read from the named environment variable.
    Environment(&'static str),
    /// Nothing set; the literal default tenant.
    Default,
}

impl TenantId {
    /// Creates a tenant id. Blank ids collapse to the default tenant.
    #[must_use]
    pub fn new(id: &str) -> Self {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            Self::default_tenant()
        } else {
            Self(trimmed.to_string())
        }
    }

    /// The `"default"` tenant.
    #[must_use]
    pub fn default_tenant() -> Self {
        Self(DEFAULT_TENANT.to_string())
    }

    /// Whether this is the `"default"` tenant.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_TENANT
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the tenant: explicit value, then environment, then `"default"`.
    #[must_use]
    pub fn derive(explicit: Option<&str>) -> (Self, TenantSource) {
        derive_with(explicit, |key| std::env::var(key).ok())
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Testable core: accepts the environment lookup to avoid env var races.
fn derive_with(
    explicit: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> (TenantId, TenantSource) {
    if let Some(id) = explicit.filter(|s| !s.trim().is_empty()) {
        return (TenantId::new(id), TenantSource::Explicit);
    }

    for key in TENANT_ENV_VARS {
        if let Some(id) = lookup(key).filter(|s| !s.trim().is_empty()) {
            return (TenantId::new(&id), TenantSource::Environment(key));
        }
    }

    (TenantId::default_tenant(), TenantSource::Default)
}

/// Raw context bundle supplied by the host for one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInputs {
    /// Explicit tenant, if any.
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// File being validated (relative to the project root).
    #[serde(default)]
    pub file_path: PathBuf,
    /// Enforcement mode.
    #[serde(default)]
    pub mode: Mode,
    /// Per-invocation policy adjustments.
    #[serde(default)]
    pub brand_overrides: Option<BrandOverrides>,
}

impl ContextInputs {
    /// Creates inputs for a file in the given mode.
    #[must_use]
    pub fn new(file_path: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            tenant_id: None,
            file_path: file_path.into(),
            mode,
            brand_overrides: None,
        }
    }

    /// Sets the explicit tenant.
    #[must_use]
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant.into());
        self
    }

    /// Sets brand overrides.
    #[must_use]
    pub fn overrides(mut self, overrides: BrandOverrides) -> Self {
        self.brand_overrides = Some(overrides);
        self
    }
}

/// Metadata captured when a context is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMetadata {
    /// Creation time. Never part of violation content.
    pub timestamp: DateTime<Utc>,
    /// Environment tag (e.g. `development`, `ci`).
    pub environment: String,
}

impl ContextMetadata {
    /// Captures the current time and the environment tag.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            timestamp: Utc::now(),
            environment: std::env::var(ENVIRONMENT_ENV_VAR)
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "development".to_string()),
        }
    }
}

/// Everything a rule handler may know about the current invocation.
///
/// Built fresh per file and owned by the invocation that created it.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Resolved brand policy.
    pub policy: Arc<BrandPolicy>,
    /// Tenant the policy was resolved for.
    pub tenant: TenantId,
    /// File being validated.
    pub file_path: PathBuf,
    /// Enforcement mode.
    pub mode: Mode,
    /// Invocation metadata.
    pub metadata: ContextMetadata,
}

impl ValidationContext {
    /// Creates a context and captures its metadata.
    #[must_use]
    pub fn new(
        policy: Arc<BrandPolicy>,
        tenant: TenantId,
        file_path: impl Into<PathBuf>,
        mode: Mode,
    ) -> Self {
        Self {
            policy,
            tenant,
            file_path: file_path.into(),
            mode,
            metadata: ContextMetadata::capture(),
        }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Formats a rule message, naming the brand in brand-aware mode.
    #[must_use]
    pub fn message(&self, base: impl Into<String>) -> String {
        let base = base.into();
        if self.mode == Mode::BrandAware {
            format!("[{}] {base}", self.policy.name)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn explicit_tenant_wins_over_environment() {
        let (tenant, source) = derive_with(Some("acme"), env(&[("BRAND_LINT_TENANT", "globex")]));
        assert_eq!(tenant.as_str(), "acme");
        assert_eq!(source, TenantSource::Explicit);
    }

    #[test]
    fn environment_used_when_no_explicit_tenant() {
        let (tenant, source) = derive_with(None, env(&[("TENANT_ID", "globex")]));
        assert_eq!(tenant.as_str(), "globex");
        assert_eq!(source, TenantSource::Environment("TENANT_ID"));
    }

    #[test]
    fn brand_lint_variable_preferred_over_generic_one() {
        let (tenant, _) = derive_with(
            None,
            env(&[("TENANT_ID", "generic"), ("BRAND_LINT_TENANT", "specific")]),
        );
        assert_eq!(tenant.as_str(), "specific");
    }

    #[test]
    fn blank_values_fall_through_to_default() {
        let (tenant, source) = derive_with(Some("  "), env(&[("BRAND_LINT_TENANT", "")]));
        assert!(tenant.is_default());
        assert_eq!(source, TenantSource::Default);
    }

    #[test]
    fn brand_aware_messages_name_the_brand() {
        let policy = BrandPolicy {
            name: "Acme".into(),
            ..BrandPolicy::default()
        };
        let ctx = ValidationContext::new(
            Arc::new(policy),
            TenantId::new("acme"),
            "a.tsx",
            Mode::BrandAware,
        );
        assert_eq!(ctx.message("Use brand colors"), "[Acme] Use brand colors");

        let plain = ValidationContext {
            mode: Mode::Required,
            ..ctx
        };
        assert_eq!(plain.message("Use brand colors"), "Use brand colors");
    }
}
