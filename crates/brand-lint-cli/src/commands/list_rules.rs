//! List rules command implementation.

use anyhow::{Context, Result};
use brand_lint::rules::builtin_registry;
use brand_lint::RuleRegistry;

/// Runs the list-rules command.
pub fn run() -> Result<()> {
    let registry = builtin_registry().context("Failed to register built-in rules")?;
    print!("{}", render(&registry));
    Ok(())
}

fn render(registry: &RuleRegistry) -> String {
    let mut out = String::from("Available rules:\n\n");
    out.push_str(&format!(
        "{:<28} {:<16} {:<8} Description\n",
        "Rule", "Category", "Fixable"
    ));
    out.push_str(&format!("{}\n", "-".repeat(90)));

    for entry in registry.iter() {
        let definition = entry.definition();
        out.push_str(&format!(
            "{:<28} {:<16} {:<8} {}\n",
            definition.id,
            definition.category,
            if definition.fixable { "yes" } else { "no" },
            definition.description
        ));
    }

    out.push_str("\nConfigure rules in brand-lint.toml, e.g.:\n");
    out.push_str("  [rules.brand-enforce-colors]\n");
    out.push_str("  level = \"error\"\n");
    out
}
