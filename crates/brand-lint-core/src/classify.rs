//! Pattern classifiers for color values, Tailwind utilities, font and icon imports.
//!
//! Everything here is a pure function over strings. Matching is deliberately
//! heuristic: set membership and regular expressions, no color math.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::policy::{normalize_font, BrandPolicy};

static COLOR_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:#(?:[0-9a-f]{6}|[0-9a-f]{3})|rgba?\([^)]*\)|hsla?\([^)]*\))$")
        .unwrap_or_else(|e| unreachable!("invalid color regex: {e}"))
});

static EMBEDDED_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#(?:[0-9a-f]{6}|[0-9a-f]{3})\b|rgba?\([^)]*\)|hsla?\([^)]*\)")
        .unwrap_or_else(|e| unreachable!("invalid embedded color regex: {e}"))
});

static TAILWIND_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    let prefixes = TAILWIND_PREFIXES.join("|");
    let palette = TAILWIND_PALETTE.join("|");
    let pattern = format!(
        r"^(?:[a-z0-9-]+:)*!?(?:{prefixes})-(?:(?:{palette})-(?:50|[1-9]00|950)|white|black|transparent|current|inherit)(?:/\d{{1,3}})?$"
    );
    Regex::new(&pattern).unwrap_or_else(|e| unreachable!("invalid tailwind regex: {e}"))
});

/// Utility prefixes that take a color.
pub const TAILWIND_PREFIXES: &[&str] = &[
    "bg",
    "text",
    "border",
    "border-t",
    "border-r",
    "border-b",
    "border-l",
    "border-x",
    "border-y",
    "ring",
    "ring-offset",
    "fill",
    "stroke",
    "from",
    "via",
    "to",
    "outline",
    "decoration",
    "divide",
    "placeholder",
    "accent",
    "caret",
    "shadow",
];

/// The default Tailwind palette.
pub const TAILWIND_PALETTE: &[&str] = &[
    "slate", "gray", "zinc", "neutral", "stone", "red", "orange", "amber", "yellow", "lime",
    "green", "emerald", "teal", "cyan", "sky", "blue", "indigo", "violet", "purple", "fuchsia",
    "pink", "rose",
];

/// Module path fragments identifying a font import.
pub const FONT_IMPORT_FRAGMENTS: &[&str] = &[
    "@fontsource/",
    "@fontsource-variable/",
    "next/font/",
    "@next/font/",
    "fonts.googleapis.com",
    "typeface-",
    ".woff",
    ".woff2",
    ".ttf",
    ".otf",
];

/// Module path fragments identifying an icon package import.
pub const ICON_IMPORT_FRAGMENTS: &[&str] = &[
    "react-icons",
    "lucide-react",
    "@heroicons/",
    "@fortawesome/",
    "@mui/icons-material",
    "@tabler/icons",
    "phosphor-react",
];

/// Generic families and common platform fonts.
pub const SYSTEM_FONTS: &[&str] = &[
    "system-ui",
    "-apple-system",
    "BlinkMacSystemFont",
    "Segoe UI",
    "Roboto",
    "Helvetica",
    "Helvetica Neue",
    "Arial",
    "Georgia",
    "Times New Roman",
    "Courier",
    "Courier New",
    "Menlo",
    "Monaco",
    "Consolas",
    "sans-serif",
    "serif",
    "monospace",
    "cursive",
    "fantasy",
    "emoji",
    "math",
    "ui-sans-serif",
    "ui-serif",
    "ui-monospace",
    "ui-rounded",
    "inherit",
    "initial",
    "unset",
];

/// Whether the whole literal is a color value.
#[must_use]
pub fn is_color_value(value: &str) -> bool {
    COLOR_VALUE.is_match(value.trim())
}

/// Color values embedded anywhere in `text`, in order of appearance.
#[must_use]
pub fn embedded_colors(text: &str) -> Vec<&str> {
    EMBEDDED_COLOR.find_iter(text).map(|m| m.as_str()).collect()
}

/// Rewrites whole embedded color values for which `replace` returns `Some`.
///
/// Only complete matches are touched, so `#fff` never rewrites the prefix
/// of `#ffffff`.
pub fn replace_embedded_colors<'t>(
    text: &'t str,
    replace: impl Fn(&str) -> Option<String>,
) -> Cow<'t, str> {
    EMBEDDED_COLOR.replace_all(text, |caps: &Captures<'_>| {
        let color = &caps[0];
        replace(color).unwrap_or_else(|| color.to_string())
    })
}

/// Whether a single class token is a Tailwind color utility.
#[must_use]
pub fn is_tailwind_color_class(token: &str) -> bool {
    TAILWIND_COLOR.is_match(token)
}

/// Tailwind color utilities among the whitespace-separated tokens of `classes`.
#[must_use]
pub fn tailwind_color_classes(classes: &str) -> Vec<&str> {
    classes
        .split_whitespace()
        .filter(|t| is_tailwind_color_class(t))
        .collect()
}

/// Whether `value` is an acceptable color under `policy`.
///
/// Accepted when listed in the palette, when Tailwind utilities are allowed
/// and it is one, or when the policy allows custom colors.
#[must_use]
pub fn is_brand_color(value: &str, policy: &BrandPolicy) -> bool {
    policy.allow_custom_colors
        || policy.has_color(value.trim())
        || (policy.allow_tailwind && is_tailwind_color_class(value.trim()))
}

/// Whether the module path refers to a font.
#[must_use]
pub fn is_font_import(path: &str) -> bool {
    FONT_IMPORT_FRAGMENTS.iter().any(|f| path.contains(f))
}

/// Font family named by an import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A font package (`@fontsource/inter`, `typeface-roboto`, Google Fonts URL).
    Package(String),
    /// A font file; the stem usually carries weight or style suffixes.
    File(String),
    /// A loader module (`next/font/google`) whose families are the imported names.
    Loader,
}

/// Derives the font family referenced by a font import path.
#[must_use]
pub fn font_source(path: &str) -> Option<FontSource> {
    if !is_font_import(path) {
        return None;
    }

    for prefix in ["@fontsource-variable/", "@fontsource/"] {
        if let Some(rest) = path.split_once(prefix).map(|(_, r)| r) {
            let family = rest.split('/').next().unwrap_or_default();
            return Some(FontSource::Package(family.to_string()));
        }
    }

    if path.contains("next/font/") {
        return Some(FontSource::Loader);
    }

    if path.contains("fonts.googleapis.com") {
        let family = path
            .split_once("family=")
            .map(|(_, r)| r)
            .and_then(|r| r.split([':', '&']).next())
            .unwrap_or_default()
            .replace('+', " ");
        return Some(FontSource::Package(family));
    }

    if let Some(rest) = path.split_once("typeface-").map(|(_, r)| r) {
        let family = rest.split('/').next().unwrap_or_default();
        return Some(FontSource::Package(family.to_string()));
    }

    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = file.split('.').next().unwrap_or(file);
    Some(FontSource::File(stem.to_string()))
}

/// Whether a font family is acceptable under `policy`.
///
/// System fonts count only when `system_allowed` is set, since they are only
/// meaningful in font-family values, never in imports.
#[must_use]
pub fn is_brand_font(family: &str, policy: &BrandPolicy, system_allowed: bool) -> bool {
    policy.allow_custom_fonts
        || policy.has_font(family)
        || (system_allowed && policy.allow_system_fonts && is_system_font(family))
}

/// Whether a font file stem belongs to an allowed family (`Inter-Bold` → `Inter`).
#[must_use]
pub fn is_brand_font_file(stem: &str, policy: &BrandPolicy) -> bool {
    let stem = normalize_font(stem);
    policy.allow_custom_fonts
        || policy
            .fonts
            .iter()
            .map(|f| normalize_font(f))
            .any(|f| !f.is_empty() && stem.starts_with(&f))
}

/// Whether `family` is a generic or common system font.
#[must_use]
pub fn is_system_font(family: &str) -> bool {
    let wanted = normalize_font(family);
    SYSTEM_FONTS.iter().any(|f| normalize_font(f) == wanted)
}

/// Splits a CSS `font-family` value into its families.
#[must_use]
pub fn font_families(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(|f| f.trim().trim_matches(['"', '\'']).trim())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Whether the module path refers to an icon package.
#[must_use]
pub fn is_icon_import(path: &str) -> bool {
    ICON_IMPORT_FRAGMENTS.iter().any(|f| path.contains(f))
}

/// Package name of a module path (`@heroicons/react/24/solid` → `@heroicons/react`).
#[must_use]
pub fn package_name(path: &str) -> &str {
    let mut parts = path.splitn(3, '/');
    let first = parts.next().unwrap_or_default();
    if first.starts_with('@') {
        match parts.next() {
            Some(second) => &path[..first.len() + 1 + second.len()],
            None => first,
        }
    } else {
        first
    }
}
