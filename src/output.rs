//! CLI output formatting for the `build` and `check` commands.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (lesson, assignment, sidebar entry) is its semantic
//! identity: positional index and title. Filesystem paths are secondary
//! context, shown after `→` or on indented `Source:` lines.
//!
//! # Entity Display Contract
//!
//! Every entity follows a consistent two-level pattern across commands:
//!
//! 1. **Header line**: positional index + title (+ optional assignment count)
//! 2. **Context lines**: indented `Source:`, skip reasons, etc.
//!
//! Shared helpers ([`entity_header`], [`assignment_line`]) enforce this
//! pattern so `check` and `build` show the same entities the same way.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Python Turtle Course
//!     Learn Python by drawing with turtles
//!
//! Lessons
//! 001 Getting Started (2 assignments)
//!     Source: lessons/lesson1.md
//!     001 Hello, World!
//!         Source: hello/
//!     002 (scratch)
//!         Skipped: no assignment manifest
//!
//! Config
//!     Lesson plan: lesson-plan.yaml
//!     Module source: modules
//!     Output: docs/src/lessons
//! ```
//!
//! ## Build
//!
//! ```text
//! Pages
//!     README.md
//!     .vuepress/public/assets/logo.png
//!
//! Lessons
//! 001 Getting Started (1 assignment) → lessons/getting-started/index.md
//!     001 Hello, World! → lessons/getting-started/hello-world/index.md
//!     Skipped scratch: no assignment manifest
//!
//! Sidebar
//! 001 Introduction → /
//! 002 Getting Started → /lessons/getting-started/
//!     001 Hello, World! → /lessons/getting-started/hello-world/
//!
//! Built 1 lesson, 1 assignment (1 skipped)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use std::path::Path;

use crate::config::Project;
use crate::lesson::{INDEX_FILE, Lesson, Resolution, SkipReason};
use crate::render::strip_html_tags;
use crate::site::BuildReport;
use crate::types::SidebarItem;

// ============================================================================
// Shared entity display helpers
// ============================================================================

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

/// Format an entity header: positional index + title, with optional
/// assignment count.
///
/// ```text
/// 001 Loops and Turtles (2 assignments)
/// 002 Introduction
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, plural(n, "assignment")),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Format an assignment line: titled assignments show the title, untitled
/// ones show their plan reference in parens.
///
/// ```text
/// 001 Turtle Spiral     // titled
/// 002 (turtle/draft)    // untitled, the reference IS the identity
/// ```
fn assignment_line(index: usize, title: Option<&str>, reference: &str) -> String {
    match title {
        Some(t) if !t.is_empty() => format!("{} {}", format_index(index), t),
        _ => format!("{} ({})", format_index(index), reference),
    }
}

fn skip_reason(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::NoManifest => "no assignment manifest",
        SkipReason::NoTitle => "no title",
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((byte, _)) => format!("{}...", &text[..byte]),
    }
}

/// Display `path` relative to `base` when it lives under it.
fn relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Tree walker
// ============================================================================

/// A flattened node from walking the sidebar tree.
struct TreeNode<'a> {
    depth: usize,
    position: usize,
    title: &'a str,
    path: Option<&'a str>,
}

/// Walk the sidebar tree, assigning positional indices per sibling level.
/// Returns a flat list of nodes with depth and position for formatting.
fn walk_sidebar(items: &[SidebarItem]) -> Vec<TreeNode<'_>> {
    let mut nodes = Vec::new();
    walk_sidebar_recursive(items, 0, &mut nodes);
    nodes
}

fn walk_sidebar_recursive<'a>(items: &'a [SidebarItem], depth: usize, nodes: &mut Vec<TreeNode<'a>>) {
    for (i, item) in items.iter().enumerate() {
        nodes.push(TreeNode {
            depth,
            position: i + 1,
            title: item.title(),
            path: item.path(),
        });
        walk_sidebar_recursive(item.children(), depth + 1, nodes);
    }
}

// ============================================================================
// Sidebar
// ============================================================================

/// Format a sidebar tree, one line per entry.
pub fn format_sidebar(sidebar: &[SidebarItem]) -> Vec<String> {
    walk_sidebar(sidebar)
        .into_iter()
        .map(|node| {
            let header = entity_header(node.position, node.title, None);
            match node.path {
                Some(path) => format!("{}{} \u{2192} {}", indent(node.depth), header, path),
                None => format!("{}{}", indent(node.depth), header),
            }
        })
        .collect()
}

// ============================================================================
// Check output
// ============================================================================

/// Format `check` output: the resolved lesson plan, nothing written.
pub fn format_check_output(project: &Project, lessons: &[Lesson]) -> Vec<String> {
    let mut lines = Vec::new();
    let root = &project.paths.root;

    if let Some(title) = &project.plan.title {
        lines.push(title.clone());
        if let Some(desc) = &project.plan.description {
            let plain = strip_html_tags(desc);
            let truncated = truncate_desc(plain.trim(), 60);
            if !truncated.is_empty() {
                lines.push(format!("    {}", truncated));
            }
        }
        lines.push(String::new());
    }

    lines.push("Lessons".to_string());
    for (i, lesson) in lessons.iter().enumerate() {
        lines.push(entity_header(i + 1, &lesson.title, Some(lesson.assignments.len())));
        lines.push(format!("    Source: {}", relative(&lesson.text, &project.paths.plan_dir)));

        for (j, asg) in lesson.assignments.iter().enumerate() {
            let title = match &asg.resolution {
                Resolution::Titled(a) => Some(a.title.as_str()),
                _ => None,
            };
            lines.push(format!("    {}", assignment_line(j + 1, title, &asg.reference)));
            match &asg.resolution {
                Resolution::Titled(a) => {
                    lines.push(format!("        Source: {}/", asg.reference));
                    if a.metadata.trinket_text().is_none() {
                        lines.push("        No trinket text, files only".to_string());
                    }
                }
                Resolution::Untitled(_) => {
                    lines.push(format!("        Skipped: {}", skip_reason(SkipReason::NoTitle)));
                }
                Resolution::NoManifest => {
                    lines.push(format!(
                        "        Skipped: {}",
                        skip_reason(SkipReason::NoManifest)
                    ));
                }
            }
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    lines.push(format!(
        "    Lesson plan: {}",
        relative(&project.paths.lesson_plan, root)
    ));
    match &project.paths.module_source {
        Some(m) => lines.push(format!("    Module source: {}", relative(m, root))),
        None => lines.push("    Module source: (unset)".to_string()),
    }
    lines.push(format!(
        "    Output: {}",
        relative(&project.paths.lesson_root, root)
    ));

    lines
}

/// Print check output to stdout.
pub fn print_check_output(project: &Project, lessons: &[Lesson]) {
    for line in format_check_output(project, lessons) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format `build` output: what was written, the sidebar, and a summary.
///
/// Output paths are shown relative to `web_src`.
pub fn format_build_output(report: &BuildReport, web_src: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.pages.is_empty() {
        lines.push("Pages".to_string());
        for page in &report.pages {
            lines.push(format!("    {}", relative(page, web_src)));
        }
        lines.push(String::new());
    }

    lines.push("Lessons".to_string());
    for (i, lesson) in report.lessons.iter().enumerate() {
        let header = entity_header(i + 1, &lesson.title, Some(lesson.assignments.len()));
        lines.push(format!(
            "{} \u{2192} {}",
            header,
            relative(&lesson.dir.join(INDEX_FILE), web_src)
        ));
        for (j, asg) in lesson.assignments.iter().enumerate() {
            let line = assignment_line(j + 1, Some(asg.title.as_str()), &asg.reference);
            match &asg.index {
                Some(index) => lines.push(format!("    {} \u{2192} {}", line, relative(index, web_src))),
                None => lines.push(format!(
                    "    {} \u{2192} {}/ (no page)",
                    line,
                    relative(&asg.dir, web_src)
                )),
            }
        }
        for skipped in &lesson.skipped {
            lines.push(format!(
                "    Skipped {}: {}",
                skipped.reference,
                skip_reason(skipped.reason)
            ));
        }
    }

    lines.push(String::new());
    lines.push("Sidebar".to_string());
    lines.extend(format_sidebar(&report.sidebar));

    if !report.discrepancies.is_empty() {
        lines.push(String::new());
        lines.push("Audit".to_string());
        for d in &report.discrepancies {
            lines.push(format!("    {}", d));
        }
    }

    lines.push(String::new());
    let skipped = report.skipped_count();
    let mut summary = format!(
        "Built {}, {}",
        plural(report.lessons.len(), "lesson"),
        plural(report.assignment_count(), "assignment")
    );
    if skipped > 0 {
        summary.push_str(&format!(" ({} skipped)", skipped));
    }
    lines.push(summary);

    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport, web_src: &Path) {
    for line in format_build_output(report, web_src) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
