//! CLI output formatting.
//!
//! Every command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O beyond what a [`VariantHandle`] query does.
//!
//! # Output Format
//!
//! ## Sizes
//!
//! ```text
//! Sizes
//! 001 default: 800x600 (crop)
//! 002 1200: 1200xauto (fit)
//! ```
//!
//! ## Regenerate / upload
//!
//! ```text
//! images/dawn.jpg
//!     default → images/dawn_default.jpg (48213 bytes)
//!     1200 → FAILED: Decode error: ...
//! Wrote 1 variant, 1 failed
//! ```
//!
//! ## Show
//!
//! ```text
//! images/dawn.jpg
//!     default → /media/images/dawn_default.jpg
//!         Path: media/images/dawn_default.jpg
//!         Size: 48213 bytes
//! ```
//!
//! ## Delete
//!
//! ```text
//! images/dawn.jpg
//!     removed images/dawn.jpg
//!     absent images/dawn_1200.jpg
//! Removed 1 file, 1 already absent
//! ```

use crate::lifecycle::{DeleteReport, FieldFile, SaveReport, VariantHandle};
use crate::sizes::DirectiveSet;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

pub fn format_directives(directives: Option<&DirectiveSet>) -> Vec<String> {
    let Some(set) = directives else {
        return vec!["No sizes configured".to_string()];
    };
    let mut lines = vec!["Sizes".to_string()];
    for (i, directive) in set.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), directive));
    }
    lines
}

pub fn print_directives(directives: Option<&DirectiveSet>) {
    for line in format_directives(directives) {
        println!("{}", line);
    }
}

pub fn format_save_report(report: &SaveReport) -> Vec<String> {
    let Some(source) = &report.source_key else {
        return vec!["No image stored; nothing to generate".to_string()];
    };
    let mut lines = vec![source.clone()];
    for written in &report.written {
        lines.push(format!(
            "{}{} → {} ({} bytes)",
            indent(1),
            written.name,
            written.key,
            written.bytes
        ));
    }
    for failure in &report.failures {
        lines.push(format!(
            "{}{} → FAILED: {}",
            indent(1),
            failure.name,
            failure.error
        ));
    }
    let mut summary = format!("Wrote {}", plural(report.written.len(), "variant"));
    if !report.failures.is_empty() {
        summary.push_str(&format!(", {} failed", report.failures.len()));
    }
    lines.push(summary);
    lines
}

pub fn print_save_report(report: &SaveReport) {
    for line in format_save_report(report) {
        println!("{}", line);
    }
}

fn handle_lines(handle: &VariantHandle) -> Vec<String> {
    let mut lines = vec![format!("{}{} → {}", indent(1), handle.name(), handle.url())];
    if let Ok(path) = handle.path() {
        lines.push(format!("{}Path: {}", indent(2), path.display()));
    }
    match handle.size() {
        Ok(bytes) => lines.push(format!("{}Size: {} bytes", indent(2), bytes)),
        Err(_) => lines.push(format!("{}Size: missing", indent(2))),
    }
    lines
}

pub fn format_handles(file: &FieldFile) -> Vec<String> {
    let Some(key) = file.key() else {
        return vec!["No image stored".to_string()];
    };
    let mut lines = vec![key.to_string()];
    if file.variants().is_empty() {
        lines.push(format!("{}(no variants)", indent(1)));
    }
    for handle in file.variants() {
        lines.extend(handle_lines(handle));
    }
    lines
}

pub fn print_handles(file: &FieldFile) {
    for line in format_handles(file) {
        println!("{}", line);
    }
}

pub fn format_delete_report(report: &DeleteReport) -> Vec<String> {
    let Some(source) = &report.source_key else {
        return vec!["No image stored; nothing to delete".to_string()];
    };
    let mut lines = vec![source.clone()];
    for key in &report.removed {
        lines.push(format!("{}removed {}", indent(1), key));
    }
    for key in &report.missing {
        lines.push(format!("{}absent {}", indent(1), key));
    }
    lines.push(format!(
        "Removed {}, {} already absent",
        plural(report.removed.len(), "file"),
        report.missing.len()
    ));
    lines
}

pub fn print_delete_report(report: &DeleteReport) {
    for line in format_delete_report(report) {
        println!("{}", line);
    }
}
