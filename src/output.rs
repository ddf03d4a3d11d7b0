//! CLI output formatting.
//!
//! Every page is shown by its source path relative to the origin, followed by
//! `→` and its output path relative to the destination. Context such as the
//! template name or a skip reason goes on indented lines underneath.
//!
//! # Output Format
//!
//! ## Render
//!
//! ```text
//! Pages
//! 001 about.json → about.html
//!     Template: page.html
//! 002 index.yml → index.html
//!     Template: home.html
//! 003 shared/menu.yml
//!     Skipped: no template
//!
//! Files
//! 001 public/sitemap.xml
//!
//! Rendered 2 pages, skipped 1, wrote 1 file
//! ```
//!
//! ## Check
//!
//! Same listing from a dry-run plan, ending in
//! `Checked 3 sources: 2 to render, 1 skipped`.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Entries are
//! listed in source path order, whatever order the run used.

use crate::render::{PagePlan, RenderReport};
use crate::suffix::slash_path;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `root` with `/` separators; unchanged if outside it.
fn relative_display(path: &Path, root: &Path) -> String {
    slash_path(path.strip_prefix(root).unwrap_or(path))
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// One listed page: source, optional destination, and its context line.
struct Entry<'a> {
    source: &'a Path,
    destination: Option<&'a Path>,
    detail: String,
}

fn format_entries(mut entries: Vec<Entry<'_>>, origin: &Path, destination: &Path) -> Vec<String> {
    entries.sort_by(|a, b| a.source.cmp(b.source));

    let mut lines = vec!["Pages".to_string()];
    for (i, entry) in entries.iter().enumerate() {
        let source = relative_display(entry.source, origin);
        match entry.destination {
            Some(dest) => lines.push(format!(
                "{} {} \u{2192} {}",
                format_index(i + 1),
                source,
                relative_display(dest, destination)
            )),
            None => lines.push(format!("{} {}", format_index(i + 1), source)),
        }
        lines.push(format!("{}{}", indent(1), entry.detail));
    }
    lines
}

// ============================================================================
// Render output
// ============================================================================

/// Format the result of a render run plus any standalone files written.
pub fn format_render_output(
    report: &RenderReport,
    files: &[PathBuf],
    origin: &Path,
    destination: &Path,
) -> Vec<String> {
    let mut entries: Vec<Entry<'_>> = report
        .rendered
        .iter()
        .map(|page| Entry {
            source: &page.source,
            destination: Some(&page.destination),
            detail: format!("Template: {}", page.template),
        })
        .collect();
    entries.extend(report.skipped.iter().map(|source| Entry {
        source,
        destination: None,
        detail: "Skipped: no template".to_string(),
    }));

    let mut lines = format_entries(entries, origin, destination);

    if !files.is_empty() {
        lines.push(String::new());
        lines.push("Files".to_string());
        for (i, file) in files.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), slash_path(file)));
        }
    }

    lines.push(String::new());
    let mut summary = format!(
        "Rendered {}, skipped {}",
        plural(report.rendered_count(), "page"),
        report.skipped.len()
    );
    if !files.is_empty() {
        summary.push_str(&format!(", wrote {}", plural(files.len(), "file")));
    }
    lines.push(summary);
    lines
}

/// Print render output to stdout.
pub fn print_render_output(report: &RenderReport, files: &[PathBuf], origin: &Path, destination: &Path) {
    for line in format_render_output(report, files, origin, destination) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format a dry-run plan.
pub fn format_check_output(plan: &[PagePlan], origin: &Path, destination: &Path) -> Vec<String> {
    let entries = plan
        .iter()
        .map(|page| match &page.template {
            Some(template) => Entry {
                source: &page.source,
                destination: Some(&page.destination),
                detail: format!("Template: {template}"),
            },
            None => Entry {
                source: &page.source,
                destination: None,
                detail: "Skipped: no template".to_string(),
            },
        })
        .collect();

    let mut lines = format_entries(entries, origin, destination);
    let to_render = plan.iter().filter(|p| p.template.is_some()).count();
    lines.push(String::new());
    lines.push(format!(
        "Checked {}: {} to render, {} skipped",
        plural(plan.len(), "source"),
        to_render,
        plan.len() - to_render
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(plan: &[PagePlan], origin: &Path, destination: &Path) {
    for line in format_check_output(plan, origin, destination) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
