//! # brand-lint-rules
//!
//! Built-in brand rules for brand-lint.
//!
//! ## Available Rules
//!
//! | Id | Category | Description |
//! |----|----------|-------------|
//! | `brand-enforce-colors` | design-guardian | Colors must come from the brand palette |
//! | `brand-enforce-typography` | design-guardian | Fonts must come from the brand font allowlist |
//! | `brand-enforce-icons` | brand-assets | Icons must be imported from the brand icon module |
//! | `brand-no-inline-styles` | design-guardian | Styling must go through the brand styling accessor |
//!
//! ## Usage
//!
//! ```ignore
//! use brand_lint_rules::{builtin_registry, registry_from_config};
//!
//! let registry = builtin_registry()?;
//! let registry = registry_from_config(&config)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod colors;
pub mod icons;
pub mod inline_styles;
mod presets;
pub mod typography;

#[cfg(test)]
mod test_support;

pub use colors::BrandEnforceColors;
pub use icons::BrandEnforceIcons;
pub use inline_styles::BrandNoInlineStyles;
pub use presets::{all_rules, builtin_registry, registry_from_config};
pub use typography::BrandEnforceTypography;

/// Re-export core types for convenience.
pub use brand_lint_core::{Rule, Severity, Violation};
