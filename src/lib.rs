//! # lessonsite
//!
//! A static content generator for course sites. A lesson plan names the
//! lessons in order; each lesson has a markdown text and a list of assignment
//! directories. A build turns that into a site source tree: one directory per
//! lesson, one per titled assignment, assignment pages with embedded code
//! widgets, and a sidebar in the site theme's configuration.
//!
//! # Architecture: One Pass, Plan Order
//!
//! ```text
//! 1. Load      lessonsite.toml + lesson-plan.yaml  →  Project
//! 2. Resolve   lesson texts + .assignment.yaml     →  Lesson / Assignment
//! 3. Write     lessons, assignments, pages         →  <web_src>/lessons/...
//! 4. Sidebar   build results                       →  themeConfig.sidebar
//! ```
//!
//! Resolution reads everything before the first write, so a broken manifest
//! or a missing lesson title fails the run before the output tree is touched.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `lessonsite.toml` loading, stock defaults, merging, validation, resolved paths |
//! | [`plan`] | The lesson plan manifest, lessons in declaration order |
//! | [`metadata`] | `.assignment.yaml` plus classification of an assignment directory |
//! | [`frontmatter`] | YAML front matter splitting and title lookup for lesson texts |
//! | [`lesson`] | Lesson and assignment resolution, materialization into the output tree |
//! | [`render`] | Tera renderer with content pre-rendering, embed helpers and filters |
//! | [`trinket`] | Embed URL encoding and iframe / goal image markup |
//! | [`site`] | Build driver: sidebar, theme configuration, output audit |
//! | [`types`] | Sidebar types shared between the plan, the builder and the CLI |
//! | [`naming`] | Title → directory slug |
//! | [`output`] | CLI output formatting: tree-based display of check and build results |
//!
//! # Design Decisions
//!
//! ## Titles Name Directories
//!
//! Lesson and assignment directories are named by [`naming::slugify`] of their
//! display title, and the sidebar path is built from the same slug. Renaming
//! an assignment's title moves its page; the old directory stays behind and
//! the build's output audit reports it.
//!
//! ## Skips Are States, Not Errors
//!
//! A directory without `.assignment.yaml` is not an assignment, and one
//! without a title is not ready. Both are skipped and logged. An assignment
//! without `trinket.md` still gets its files copied but no page. Everything
//! else that goes wrong (missing files, malformed YAML, template errors)
//! aborts the run.
//!
//! ## Sidebar From Results
//!
//! The sidebar is computed from what the build wrote, not by re-reading the
//! output tree. The tree walk afterwards only audits it.
//!
//! ## Two Template Systems
//!
//! Assignment pages are markdown assembled by Tera so course authors can
//! override `assignment.md` and call helpers from `trinket.md`. The small
//! HTML fragments those helpers emit are built with Maud, which escapes
//! attribute values.

pub mod config;
pub mod frontmatter;
pub mod lesson;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod plan;
pub mod render;
pub mod site;
pub mod trinket;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
