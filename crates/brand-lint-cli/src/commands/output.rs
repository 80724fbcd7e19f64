//! Shared output formatting for lint results.

use anyhow::Result;
use brand_lint::{RunResult, Severity, ViolationDiagnostic};
use miette::NamedSource;
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &RunResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print!("{}", render_compact(result)),
        OutputFormat::Pretty => print_pretty(result, root),
    }
    Ok(())
}

fn print_text(result: &RunResult) {
    for report in &result.reports {
        for violation in &report.violations {
            let severity_indicator = match violation.severity {
                Severity::Required => "\x1b[31mrequired\x1b[0m",
                Severity::Advisory => "\x1b[33madvisory\x1b[0m",
            };

            println!(
                "{} at {}:{}:{}",
                violation.rule_id,
                report.path.display(),
                violation.range.start_line,
                violation.range.start_col,
            );
            println!("  {}: {}", severity_indicator, violation.message);
            if let Some(fix) = &violation.fix {
                println!("  = fix: replace with `{}`", fix.replacement_text);
            }
            println!();
        }
    }

    for failure in &result.failures {
        println!(
            "\x1b[31mfailed\x1b[0m {}: {}",
            failure.path.display(),
            failure.message
        );
    }

    print_summary(result);
}

fn print_summary(result: &RunResult) {
    let (required, advisory) = result.count_by_severity();
    let summary_color = if required > 0 {
        "\x1b[31m"
    } else if advisory > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} required and {} advisory violation(s) in {} file(s)\x1b[0m",
        summary_color,
        required,
        advisory,
        result.files_checked()
    );
}

fn print_json(result: &RunResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn render_compact(result: &RunResult) -> String {
    let mut out = String::new();
    for report in &result.reports {
        for violation in &report.violations {
            out.push_str(&format!(
                "{}:{}:{}: {} [{}] {}\n",
                report.path.display(),
                violation.range.start_line,
                violation.range.start_col,
                violation.severity,
                violation.rule_id,
                violation.message,
            ));
        }
    }
    out
}

fn print_pretty(result: &RunResult, root: &Path) {
    for report in result.with_violations() {
        let source = match std::fs::read_to_string(root.join(&report.path)) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("Cannot read {} for display: {e}", report.path.display());
                continue;
            }
        };
        let name = report.path.display().to_string();

        for violation in &report.violations {
            let diagnostic = miette::Report::new(ViolationDiagnostic::from(violation))
                .with_source_code(NamedSource::new(&name, source.clone()));
            eprintln!("{diagnostic:?}");
        }
    }

    print_summary(result);
}
