//! Shared test utilities for the lessonsite test suite.
//!
//! Provides fixture setup, file listing helpers and sidebar assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let project = load_fixture_project(&tmp);
//! let report = build(&project, &Renderer::new(None).unwrap()).unwrap();
//!
//! assert_sidebar_shape(&report.sidebar, &[
//!     ("Introduction", &[]),
//!     ("Getting Started", &["Hello, World!"]),
//!     ("Loops and Turtles", &["Turtle Spiral", "Flaming Ninja Star"]),
//! ]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::{Project, load_project};
use crate::types::SidebarItem;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/course/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/course");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Load the project rooted at a fixture copy.
pub fn load_fixture_project(tmp: &TempDir) -> Project {
    load_project(tmp.path(), None).unwrap()
}

// =========================================================================
// File listings
// =========================================================================

/// Read a file as text. Panics with the path on failure.
pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

/// Sorted names of the regular files directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    list(dir, |p| p.is_file())
}

/// Sorted names of the directories directly inside `dir`.
pub fn dir_names(dir: &Path) -> Vec<String> {
    list(dir, |p| p.is_dir())
}

fn list(dir: &Path, keep: impl Fn(&Path) -> bool) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot list {}: {e}", dir.display()))
        .map(|e| e.unwrap().path())
        .filter(|p| keep(p))
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

// =========================================================================
// Sidebar assertions
// =========================================================================

/// Titles of the top-level sidebar items, in order.
pub fn sidebar_titles(sidebar: &[SidebarItem]) -> Vec<&str> {
    sidebar.iter().map(SidebarItem::title).collect()
}

/// Assert the sidebar's two-level shape: each top-level title with its
/// children's titles, in order.
pub fn assert_sidebar_shape(sidebar: &[SidebarItem], expected: &[(&str, &[&str])]) {
    let actual: Vec<(&str, Vec<&str>)> = sidebar
        .iter()
        .map(|item| (item.title(), item.children().iter().map(SidebarItem::title).collect()))
        .collect();
    let expected: Vec<(&str, Vec<&str>)> = expected
        .iter()
        .map(|(title, children)| (*title, children.to_vec()))
        .collect();
    assert_eq!(actual, expected, "sidebar shape mismatch");
}
