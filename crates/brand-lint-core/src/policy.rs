//! Brand policy model and resolution.
//!
//! [`PolicyResolver::resolve`] never fails. Lookup failures degrade to the
//! conservative default policy and are reported with a single warning per
//! process.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::context::TenantId;
use crate::types::RuleLevel;

/// Set once the first resolution failure has been logged.
static FALLBACK_WARNED: AtomicBool = AtomicBool::new(false);

/// Canonical brand-approved module paths used by fixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandModules {
    /// Typography hook module replacing raw font imports.
    pub typography: String,
    /// Icon module replacing third-party icon imports.
    pub icons: String,
    /// Styling accessor function replacing inline styles.
    pub style_accessor: String,
}

impl Default for BrandModules {
    fn default() -> Self {
        Self {
            typography: "@/brand/hooks/useBrandTypography".to_string(),
            icons: "@/brand/icons".to_string(),
            style_accessor: "brandClass".to_string(),
        }
    }
}

/// The resolved set of allowed colors, fonts and component behaviors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandPolicy {
    /// Display name used in brand-aware messages.
    pub name: String,
    /// Allowed color literals, in preference order.
    pub colors: Vec<String>,
    /// Accept Tailwind color utilities such as `bg-blue-500`.
    pub allow_tailwind: bool,
    /// Escape hatch: accept any color.
    pub allow_custom_colors: bool,
    /// Allowed font identifiers.
    pub fonts: Vec<String>,
    /// Accept generic and platform system fonts.
    pub allow_system_fonts: bool,
    /// Escape hatch: accept any font.
    pub allow_custom_fonts: bool,
    /// Icon packages that may be imported directly.
    pub icon_packages: Vec<String>,
    /// Accept `style={...}` attributes.
    pub allow_inline_styles: bool,
    /// Canonical module paths.
    pub modules: BrandModules,
    /// Per-brand rule levels applied in brand-aware mode.
    pub enforcement: BTreeMap<String, RuleLevel>,
}

impl Default for BrandPolicy {
    fn default() -> Self {
        Self::conservative()
    }
}

impl BrandPolicy {
    /// The conservative fallback: no custom colors, Tailwind only, no inline styles.
    #[must_use]
    pub fn conservative() -> Self {
        Self {
            name: "default".to_string(),
            colors: Vec::new(),
            allow_tailwind: true,
            allow_custom_colors: false,
            fonts: Vec::new(),
            allow_system_fonts: true,
            allow_custom_fonts: false,
            icon_packages: Vec::new(),
            allow_inline_styles: false,
            modules: BrandModules::default(),
            enforcement: BTreeMap::new(),
        }
    }

    /// First allowed color, the substitution target for color fixes.
    #[must_use]
    pub fn primary_color(&self) -> Option<&str> {
        self.colors.first().map(String::as_str)
    }

    /// Whether `value` is listed in the palette (hex compared case-insensitively).
    #[must_use]
    pub fn has_color(&self, value: &str) -> bool {
        self.colors.iter().any(|c| c.eq_ignore_ascii_case(value))
    }

    /// Whether `font` is listed, ignoring case, quotes, spaces and dashes.
    #[must_use]
    pub fn has_font(&self, font: &str) -> bool {
        let wanted = normalize_font(font);
        self.fonts.iter().any(|f| normalize_font(f) == wanted)
    }
}

/// Normalizes a font identifier: `"Open Sans"`, `open-sans` and `OpenSans` compare equal.
#[must_use]
pub fn normalize_font(font: &str) -> String {
    font.chars()
        .filter(|c| !matches!(c, '"' | '\'' | ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Partial policy adjustments supplied per invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandOverrides {
    /// Replaces the palette.
    pub colors: Option<Vec<String>>,
    /// Overrides `allow_tailwind`.
    pub allow_tailwind: Option<bool>,
    /// Overrides `allow_custom_colors`.
    pub allow_custom_colors: Option<bool>,
    /// Replaces the font allowlist.
    pub fonts: Option<Vec<String>>,
    /// Overrides `allow_system_fonts`.
    pub allow_system_fonts: Option<bool>,
    /// Overrides `allow_custom_fonts`.
    pub allow_custom_fonts: Option<bool>,
    /// Overrides `allow_inline_styles`.
    pub allow_inline_styles: Option<bool>,
}

impl BrandOverrides {
    /// Returns a copy of `policy` with these overrides layered on top.
    #[must_use]
    pub fn apply(&self, policy: &BrandPolicy) -> BrandPolicy {
        let mut out = policy.clone();
        if let Some(colors) = &self.colors {
            out.colors.clone_from(colors);
        }
        if let Some(fonts) = &self.fonts {
            out.fonts.clone_from(fonts);
        }
        out.allow_tailwind = self.allow_tailwind.unwrap_or(out.allow_tailwind);
        out.allow_custom_colors = self.allow_custom_colors.unwrap_or(out.allow_custom_colors);
        out.allow_system_fonts = self.allow_system_fonts.unwrap_or(out.allow_system_fonts);
        out.allow_custom_fonts = self.allow_custom_fonts.unwrap_or(out.allow_custom_fonts);
        out.allow_inline_styles = self.allow_inline_styles.unwrap_or(out.allow_inline_styles);
        out
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Errors raised by brand sources. Never escape [`PolicyResolver`].
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The brand backend could not be reached or failed.
    #[error("brand source unavailable for tenant `{tenant}`: {message}")]
    Unavailable {
        /// Tenant being loaded.
        tenant: String,
        /// Failure detail.
        message: String,
    },

    /// The brand definition exists but is malformed.
    #[error("malformed brand definition for tenant `{tenant}`: {message}")]
    Malformed {
        /// Tenant being loaded.
        tenant: String,
        /// Failure detail.
        message: String,
    },
}

/// A backend that knows brand definitions.
pub trait BrandSource: Send + Sync {
    /// Loads the policy of `tenant`; `Ok(None)` when the tenant is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn load(&self, tenant: &TenantId) -> Result<Option<BrandPolicy>, PolicyError>;
}

/// In-memory brand source, typically built from `[brands.*]` config tables.
#[derive(Debug, Clone, Default)]
pub struct StaticBrandSource {
    brands: BTreeMap<String, BrandPolicy>,
}

impl StaticBrandSource {
    /// Creates a source from tenant → policy pairs.
    #[must_use]
    pub fn new(brands: BTreeMap<String, BrandPolicy>) -> Self {
        Self { brands }
    }

    /// Adds or replaces a tenant.
    #[must_use]
    pub fn with_brand(mut self, tenant: impl Into<String>, policy: BrandPolicy) -> Self {
        self.brands.insert(tenant.into(), policy);
        self
    }
}

impl BrandSource for StaticBrandSource {
    fn load(&self, tenant: &TenantId) -> Result<Option<BrandPolicy>, PolicyError> {
        Ok(self.brands.get(tenant.as_str()).cloned())
    }
}

/// Which resolution step produced a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyOrigin {
    /// The requested tenant's own policy.
    Tenant,
    /// The `"default"` tenant's policy.
    DefaultTenant,
    /// The hardcoded conservative policy.
    StaticFallback,
}

/// A resolved policy and how it was found.
#[derive(Debug, Clone)]
pub struct ResolvedPolicy {
    /// The policy.
    pub policy: Arc<BrandPolicy>,
    /// Resolution step that produced it.
    pub origin: PolicyOrigin,
}

/// Outcome of loading one tenant, cached for the resolver's lifetime.
#[derive(Debug, Clone)]
enum CacheEntry {
    Found(Arc<BrandPolicy>),
    Missing,
    Failed,
}

/// Resolves tenant policies with caching and a conservative fallback.
///
/// Each distinct tenant is loaded from the source at most once. The cache
/// has no eviction; brand changes take effect on restart.
pub struct PolicyResolver {
    source: Option<Arc<dyn BrandSource>>,
    cache: Mutex<HashMap<TenantId, CacheEntry>>,
    fallback: Arc<BrandPolicy>,
}

impl std::fmt::Debug for PolicyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyResolver")
            .field("has_source", &self.source.is_some())
            .finish_non_exhaustive()
    }
}

impl PolicyResolver {
    /// Creates a resolver backed by `source`.
    #[must_use]
    pub fn new(source: impl BrandSource + 'static) -> Self {
        Self::from_arc(Arc::new(source))
    }

    /// Creates a resolver from a shared source.
    #[must_use]
    pub fn from_arc(source: Arc<dyn BrandSource>) -> Self {
        Self {
            source: Some(source),
            cache: Mutex::new(HashMap::new()),
            fallback: Arc::new(BrandPolicy::conservative()),
        }
    }

    /// Creates a resolver with no brand source; every tenant gets the fallback.
    #[must_use]
    pub fn without_source() -> Self {
        Self {
            source: None,
            cache: Mutex::new(HashMap::new()),
            fallback: Arc::new(BrandPolicy::conservative()),
        }
    }

    /// Resolves the policy for `tenant`. Never fails.
    #[must_use]
    pub fn resolve(&self, tenant: &TenantId) -> Arc<BrandPolicy> {
        self.resolve_with_origin(tenant).policy
    }

    /// Resolves the policy for `tenant`: tenant → `"default"` → static fallback.
    #[must_use]
    pub fn resolve_with_origin(&self, tenant: &TenantId) -> ResolvedPolicy {
        let mut failed = false;

        match self.lookup(tenant) {
            CacheEntry::Found(policy) => {
                return ResolvedPolicy {
                    policy,
                    origin: PolicyOrigin::Tenant,
                }
            }
            CacheEntry::Missing => debug!("No brand defined for tenant `{tenant}`"),
            CacheEntry::Failed => failed = true,
        }

        if !tenant.is_default() {
            match self.lookup(&TenantId::default_tenant()) {
                CacheEntry::Found(policy) => {
                    return ResolvedPolicy {
                        policy,
                        origin: PolicyOrigin::DefaultTenant,
                    }
                }
                CacheEntry::Missing => debug!("No brand defined for the default tenant"),
                CacheEntry::Failed => failed = true,
            }
        }

        if failed && !FALLBACK_WARNED.swap(true, Ordering::Relaxed) {
            warn!("Brand policy lookup failed; using the conservative default policy");
        }

        ResolvedPolicy {
            policy: Arc::clone(&self.fallback),
            origin: PolicyOrigin::StaticFallback,
        }
    }

    /// Number of tenants looked up so far.
    #[must_use]
    pub fn cached_tenants(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lookup(&self, tenant: &TenantId) -> CacheEntry {
        // The lock is held across the load so concurrent callers never
        // load the same tenant twice.
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = cache.get(tenant) {
            return entry.clone();
        }

        let entry = self.load_guarded(tenant);
        cache.insert(tenant.clone(), entry.clone());
        entry
    }

    fn load_guarded(&self, tenant: &TenantId) -> CacheEntry {
        let Some(source) = &self.source else {
            return CacheEntry::Failed;
        };

        match catch_unwind(AssertUnwindSafe(|| source.load(tenant))) {
            Ok(Ok(Some(policy))) => {
                debug!("Loaded brand policy `{}` for tenant `{tenant}`", policy.name);
                CacheEntry::Found(Arc::new(policy))
            }
            Ok(Ok(None)) => CacheEntry::Missing,
            Ok(Err(e)) => {
                debug!("Brand source error: {e}");
                CacheEntry::Failed
            }
            Err(_) => {
                debug!("Brand source panicked while loading tenant `{tenant}`");
                CacheEntry::Failed
            }
        }
    }
}
