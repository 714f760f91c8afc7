//! Output formatting utilities

use crate::application::VariantReport;

/// Format a list of tags for display.
pub fn format_tag_list(tags: &[String]) -> String {
    if tags.is_empty() {
        return "No tags found".to_string();
    }

    let mut output = String::new();
    for tag in tags {
        output.push_str(&format!("#{}\n", tag));
    }

    output
}

/// Format the outcome of a per-tag run.
pub fn format_variant_report(report: &VariantReport) -> String {
    let mut output = String::new();

    for path in &report.succeeded {
        output.push_str(&format!("  {}\n", path.display()));
    }
    for tag in &report.skipped {
        output.push_str(&format!("Skipped #{} (no data)\n", tag));
    }
    for (tag, error) in &report.failures {
        output.push_str(&format!("Failed #{}: {}\n", tag, error));
    }

    if report.failures.is_empty() {
        output.push_str(&format!("{} documents rendered\n", report.succeeded.len()));
    }

    output
}
