//! Plain-text rendering of a diff report

use crate::report::DiffReport;

/// Render `report` for terminal output
#[must_use]
pub fn format_report(report: &DiffReport) -> String {
    let mut out = String::new();

    out.push_str("Schema comparison report\n");
    out.push_str("========================\n\n");
    out.push_str("Versions:\n");
    out.push_str(&format!("  local:  {}\n", report.versions.local));
    out.push_str(&format!("  remote: {}\n\n", report.versions.remote));

    if !report.has_changes {
        out.push_str("No changes detected. Schemas are in sync.\n");
        return out;
    }

    out.push_str(&format!(
        "Changes detected (migration effort: {})\n",
        report.migration_effort.as_str().to_uppercase()
    ));
    if report.breaking {
        out.push_str("BREAKING CHANGES detected!\n");
    }
    out.push('\n');

    let sections = [
        ("Added", '+', &report.changes.added),
        ("Modified", '~', &report.changes.modified),
        ("Removed", '-', &report.changes.removed),
    ];
    for (title, sigil, paths) in sections {
        if paths.is_empty() {
            continue;
        }
        out.push_str(&format!("{title} ({}):\n", paths.len()));
        for path in paths {
            out.push_str(&format!("  {sigil} {path}\n"));
        }
        out.push('\n');
    }

    if !report.enum_removals.is_empty() {
        out.push_str(&format!(
            "Enum entries only present locally ({}, not counted as breaking):\n",
            report.enum_removals.len()
        ));
        for path in &report.enum_removals {
            out.push_str(&format!("  ? {path}\n"));
        }
        out.push('\n');
    }

    out
}
