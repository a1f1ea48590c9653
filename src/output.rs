//! CLI output formatting for all stages.
//!
//! # Information-First Display
//!
//! Output reads as a content inventory: the primary line for every entity is
//! its identity (positional index + name), with dates, technologies and file
//! paths as indented context lines underneath.
//!
//! # Output Format
//!
//! ## Fetch
//!
//! ```text
//! Fetched from sanity abc123/production (published)
//! Author
//!     Ada Lovelace
//! Content
//!     2 work entries, 1 education entry, 3 projects, 8 skills
//! Snapshot
//!     .folio-temp/snapshot.json
//!     Fingerprint: 3fa9c1e2d4b7
//! ```
//!
//! ## Check
//!
//! ```text
//! Work (2)
//! 001 Acme (Staff Engineer)
//!     March 2022 – Present
//! Projects (1)
//! 001 Engine [completed]
//!     Rust, maud
//! Skills (3)
//!     Programming: Python, Rust
//!     Machine Learning: PyTorch
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! Assets → style.css, folio.js
//! Copied 4 static files
//! Generated 1 page in dist
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::dates::period_label;
use crate::generate::{ContentSummary, FetchReport, GenerateReport};
use crate::layout::group_by_category;
use crate::types::Snapshot;
use std::time::Duration;

const FINGERPRINT_LEN: usize = 12;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `001 Acme (Staff Engineer)` or `001 Acme`.
fn entity_header(index: usize, name: &str, detail: Option<&str>) -> String {
    match detail.filter(|d| !d.is_empty()) {
        Some(d) => format!("{} {} ({})", format_index(index), name, d),
        None => format!("{} {}", format_index(index), name),
    }
}

/// `1 project`, `3 projects`.
fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Truncate to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..FINGERPRINT_LEN).unwrap_or(fingerprint)
}

fn format_counts(summary: &ContentSummary) -> String {
    [
        plural(summary.work, "work entry", "work entries"),
        plural(summary.education, "education entry", "education entries"),
        plural(summary.projects, "project", "projects"),
        plural(summary.skills, "skill", "skills"),
    ]
    .join(", ")
}

fn format_author(summary: &ContentSummary) -> String {
    match summary.author.as_deref() {
        Some(name) if !name.trim().is_empty() => format!("{}{}", indent(1), name),
        Some(_) => format!("{}(unnamed)", indent(1)),
        None => format!("{}(none, page renders empty)", indent(1)),
    }
}

// ============================================================================
// Fetch
// ============================================================================

pub fn format_fetch_output(report: &FetchReport, perspective: &str) -> Vec<String> {
    vec![
        format!("Fetched from {} ({})", report.source, perspective),
        "Author".to_string(),
        format_author(&report.summary),
        "Content".to_string(),
        format!("{}{}", indent(1), format_counts(&report.summary)),
        "Snapshot".to_string(),
        format!("{}{}", indent(1), report.snapshot_path.display()),
        format!(
            "{}Fingerprint: {}",
            indent(1),
            short_fingerprint(&report.fingerprint)
        ),
    ]
}

pub fn print_fetch_output(report: &FetchReport, perspective: &str) {
    for line in format_fetch_output(report, perspective) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Full content inventory, nothing written.
pub fn format_check_output(snapshot: &Snapshot, source: &str, fingerprint: &str) -> Vec<String> {
    let mut lines = vec![format!("Source: {}", source)];

    lines.push("Author".to_string());
    lines.push(format_author(&ContentSummary::of(snapshot)));
    if let Some(author) = &snapshot.author {
        if let Some(location) = author.location.as_deref().filter(|l| !l.is_empty()) {
            lines.push(format!("{}Location: {}", indent(1), location));
        }
    }

    lines.push(format!("Work ({})", snapshot.work.len()));
    for (i, item) in snapshot.work.iter().enumerate() {
        lines.push(entity_header(i + 1, item.company(), item.title.as_deref()));
        lines.push(format!(
            "{}{}",
            indent(1),
            period_label(item.start_date.as_deref(), item.end_date.as_deref())
        ));
    }

    lines.push(format!("Education ({})", snapshot.education.len()));
    for (i, item) in snapshot.education.iter().enumerate() {
        lines.push(entity_header(i + 1, item.school(), item.degree.as_deref()));
    }

    lines.push(format!("Projects ({})", snapshot.projects.len()));
    for (i, project) in snapshot.projects.iter().enumerate() {
        let header = match project.status() {
            Some(status) => format!("{} {} [{}]", format_index(i + 1), project.title(), status),
            None => entity_header(i + 1, project.title(), None),
        };
        lines.push(header);
        if !project.technologies.is_empty() {
            lines.push(format!(
                "{}{}",
                indent(1),
                truncate(&project.technologies.join(", "), 60)
            ));
        }
    }

    lines.push(format!("Skills ({})", snapshot.skills.len()));
    for (category, skills) in group_by_category(&snapshot.skills) {
        let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
        lines.push(format!("{}{}: {}", indent(1), category.label(), names.join(", ")));
    }

    lines.push(format!("Fingerprint: {}", short_fingerprint(fingerprint)));
    lines
}

pub fn print_check_output(snapshot: &Snapshot, source: &str, fingerprint: &str) {
    for line in format_check_output(snapshot, source, fingerprint) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();
    let (pages, assets): (Vec<&String>, Vec<&String>) =
        report.files.iter().partition(|f| f.ends_with(".html"));

    for page in &pages {
        lines.push(format!("Home \u{2192} {}", page));
    }
    if !assets.is_empty() {
        let names: Vec<&str> = assets.iter().map(|s| s.as_str()).collect();
        lines.push(format!("Assets \u{2192} {}", names.join(", ")));
    }
    if report.assets_copied > 0 {
        lines.push(format!(
            "Copied {}",
            plural(report.assets_copied, "static file", "static files")
        ));
    }
    if report.drafts {
        lines.push("Draft content included, rendered with the draft banner".to_string());
    }
    if report.summary.author.is_none() {
        lines.push("Warning: no author document, the page body is empty".to_string());
    }
    lines.push(format!(
        "Generated {} in {}",
        plural(pages.len(), "page", "pages"),
        report.output_dir.display()
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Serve
// ============================================================================

pub fn format_serve_banner(addr: &str, source: &str, revalidate: Duration) -> Vec<String> {
    let secs = revalidate.as_secs();
    let interval = if secs % 86_400 == 0 {
        plural((secs / 86_400) as usize, "day", "days")
    } else if secs % 3_600 == 0 {
        plural((secs / 3_600) as usize, "hour", "hours")
    } else {
        plural(secs as usize, "second", "seconds")
    };
    vec![
        format!("Serving on http://{}", addr),
        format!("{}Content: {}", indent(1), source),
        format!("{}Revalidate: every {}", indent(1), interval),
        format!("{}Draft mode: /api/draft?sanity-preview-secret=…", indent(1)),
    ]
}

pub fn print_serve_banner(addr: &str, source: &str, revalidate: Duration) {
    for line in format_serve_banner(addr, source, revalidate) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::path::PathBuf;

    #[test]
    fn truncate_short() {
        assert_eq!(truncate("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_long_is_char_safe() {
        let text = "é".repeat(50);
        assert_eq!(truncate(&text, 40), format!("{}...", "é".repeat(40)));
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "project", "projects"), "1 project");
        assert_eq!(plural(0, "project", "projects"), "0 projects");
    }

    #[test]
    fn entity_header_with_and_without_detail() {
        assert_eq!(entity_header(1, "Acme", Some("Engineer")), "001 Acme (Engineer)");
        assert_eq!(entity_header(12, "Acme", None), "012 Acme");
        assert_eq!(entity_header(2, "Acme", Some("")), "002 Acme");
    }

    #[test]
    fn fetch_output_lists_counts_and_snapshot() {
        let snapshot = sample_snapshot();
        let report = FetchReport {
            snapshot_path: PathBuf::from(".folio-temp/snapshot.json"),
            source: "fixture (in memory)".into(),
            fingerprint: "a".repeat(64),
            summary: ContentSummary::of(&snapshot),
        };
        let lines = format_fetch_output(&report, "published");
        assert_eq!(lines[0], "Fetched from fixture (in memory) (published)");
        assert_eq!(lines[2], "    Ada Lovelace");
        assert_eq!(
            lines[4],
            "    2 work entries, 1 education entry, 2 projects, 3 skills"
        );
        assert_eq!(lines[7], format!("    Fingerprint: {}", "a".repeat(12)));
    }

    #[test]
    fn fetch_output_flags_missing_author() {
        let report = FetchReport {
            snapshot_path: PathBuf::from("s.json"),
            source: "x".into(),
            fingerprint: "abc".into(),
            summary: ContentSummary::default(),
        };
        let lines = format_fetch_output(&report, "published");
        assert!(lines[2].contains("none"));
        assert!(lines[7].ends_with("abc"));
    }

    #[test]
    fn check_output_is_an_inventory() {
        let mut snapshot = sample_snapshot();
        snapshot.projects[0].status = Some("completed".into());
        let lines = format_check_output(&snapshot, "fixture", &"f".repeat(64));
        assert!(lines.contains(&"Work (2)".to_string()));
        assert!(lines.contains(&"001 Acme (Engineer)".to_string()));
        assert!(lines.contains(&"    February 2021 – June 2023".to_string()));
        assert!(lines.contains(&"001 Engine [completed]".to_string()));
        assert!(lines.contains(&"002 Loom".to_string()));
        assert!(lines.contains(&"    Programming: Python, Rust".to_string()));
        assert!(lines.contains(&"    Machine Learning: PyTorch".to_string()));
        assert_eq!(lines.last().unwrap(), &format!("Fingerprint: {}", "f".repeat(12)));
    }

    #[test]
    fn generate_output_summarizes_files() {
        let report = GenerateReport {
            output_dir: PathBuf::from("dist"),
            files: vec!["index.html".into(), "style.css".into(), "folio.js".into()],
            assets_copied: 2,
            drafts: false,
            summary: ContentSummary {
                author: Some("Ada".into()),
                ..Default::default()
            },
        };
        let lines = format_generate_output(&report);
        assert_eq!(
            lines,
            vec![
                "Home \u{2192} index.html",
                "Assets \u{2192} style.css, folio.js",
                "Copied 2 static files",
                "Generated 1 page in dist",
            ]
        );
    }

    #[test]
    fn generate_output_warns_without_author() {
        let report = GenerateReport {
            output_dir: PathBuf::from("dist"),
            files: vec!["index.html".into()],
            assets_copied: 0,
            drafts: false,
            summary: ContentSummary::default(),
        };
        let lines = format_generate_output(&report);
        assert!(lines.iter().any(|l| l.starts_with("Warning")));
    }

    #[test]
    fn serve_banner_humanizes_interval() {
        let lines = format_serve_banner("127.0.0.1:3000", "fixture", Duration::from_secs(604_800));
        assert_eq!(lines[0], "Serving on http://127.0.0.1:3000");
        assert_eq!(lines[2], "    Revalidate: every 7 days");
        let lines = format_serve_banner("a", "b", Duration::from_secs(90));
        assert_eq!(lines[2], "    Revalidate: every 90 seconds");
    }
}
