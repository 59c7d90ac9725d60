//! Site build driver.
//!
//! A build runs in one pass, in lesson plan order:
//!
//! 1. Resolve every lesson (front matter titles, assignment manifests).
//! 2. Copy top-level pages and site-wide resources.
//! 3. Materialize each lesson under the lesson root.
//! 4. Compute the sidebar from what was written and store it in the theme
//!    configuration under `themeConfig.sidebar`.
//! 5. Walk the output tree and log any disagreement with the sidebar.
//!
//! Nothing is removed from the output tree, so directories left over from
//! an earlier build show up as audit findings.

use serde_yaml_ng::{Mapping, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Project;
use crate::lesson::{self, LessonError, LessonOutput};
use crate::plan::LessonPlan;
use crate::render::Renderer;
use crate::types::{SidebarEntry, SidebarItem};

/// Theme configuration template looked up next to the lesson plan.
pub const SEED_CONFIG_FILE: &str = "config.yml";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid theme configuration {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
    #[error("Invalid theme configuration {path}: {reason}")]
    ThemeConfig { path: PathBuf, reason: String },
    #[error("Cannot walk output tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Everything a build wrote.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Top-level pages and site-wide resources.
    pub pages: Vec<PathBuf>,
    pub lessons: Vec<LessonOutput>,
    pub sidebar: Vec<SidebarItem>,
    pub theme_config: PathBuf,
    pub discrepancies: Vec<Discrepancy>,
}

impl BuildReport {
    pub fn assignment_count(&self) -> usize {
        self.lessons.iter().map(|l| l.assignments.len()).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.lessons.iter().map(|l| l.skipped.len()).sum()
    }
}

/// Run a full build of `project`.
pub fn build(project: &Project, renderer: &Renderer) -> Result<BuildReport, BuildError> {
    let paths = &project.paths;
    let plan = &project.plan;

    let lessons = lesson::resolve_lessons(plan, &paths.plan_dir, paths.module_source.as_deref())?;
    info!("Building {} lessons into {}", lessons.len(), paths.lesson_root.display());

    let pages = lesson::write_site_pages(plan, &paths.plan_dir, &paths.web_src, &paths.public_assets)?;

    let mut outputs: Vec<LessonOutput> = Vec::with_capacity(lessons.len());
    for lesson in &lessons {
        info!("Writing lesson {}", lesson.title);
        let output = lesson.write_dir(&paths.lesson_root, renderer)?;
        if let Some(prev) = outputs.iter().find(|o| o.slug == output.slug) {
            warn!(
                "Lessons '{}' and '{}' share the directory {}",
                prev.key,
                output.key,
                output.dir.display()
            );
        }
        outputs.push(output);
    }

    let sidebar = make_sidebar(plan, &outputs, &project.config.lesson_subdir);
    update_theme_config(
        &paths.theme_config,
        &paths.plan_dir.join(SEED_CONFIG_FILE),
        plan,
        &sidebar,
    )?;

    let tree = scan_output_tree(&paths.lesson_root)?;
    let discrepancies = audit_sidebar(&sidebar, &tree, &project.config.lesson_subdir);
    for d in &discrepancies {
        warn!("Sidebar audit: {d}");
    }

    Ok(BuildReport {
        pages,
        lessons: outputs,
        sidebar,
        theme_config: paths.theme_config.clone(),
        discrepancies,
    })
}

// ============================================================================
// Sidebar
// ============================================================================

fn lesson_path(lesson_subdir: &str, lesson_slug: &str) -> String {
    format!("/{lesson_subdir}/{lesson_slug}/")
}

fn assignment_path(lesson_subdir: &str, lesson_slug: &str, assignment_slug: &str) -> String {
    format!("/{lesson_subdir}/{lesson_slug}/{assignment_slug}/")
}

/// Build the sidebar: the plan's leading entries, then one entry per lesson
/// with one child per assignment directory written.
///
/// Lessons that share a slug share one entry; its title is the last
/// lesson's and its children are merged, one per directory.
pub fn make_sidebar(plan: &LessonPlan, lessons: &[LessonOutput], lesson_subdir: &str) -> Vec<SidebarItem> {
    let mut entries: Vec<SidebarEntry> = Vec::with_capacity(lessons.len());

    for lesson in lessons {
        let path = lesson_path(lesson_subdir, &lesson.slug);
        let idx = match entries.iter().position(|e| e.path.as_deref() == Some(path.as_str())) {
            Some(idx) => {
                entries[idx].title = lesson.title.clone();
                idx
            }
            None => {
                let mut entry = SidebarEntry::page(&lesson.title, path);
                entry.collapsable = Some(false);
                entries.push(entry);
                entries.len() - 1
            }
        };

        let children = &mut entries[idx].children;
        for asg in &lesson.assignments {
            let child = SidebarItem::Entry(SidebarEntry::page(
                &asg.title,
                assignment_path(lesson_subdir, &lesson.slug, &asg.slug),
            ));
            match children.iter_mut().find(|c| c.path() == child.path()) {
                Some(existing) => *existing = child,
                None => children.push(child),
            }
        }
    }

    plan.sidebar
        .iter()
        .cloned()
        .chain(entries.into_iter().map(SidebarItem::Entry))
        .collect()
}

// ============================================================================
// Theme configuration
// ============================================================================

/// Store `sidebar` as `themeConfig.sidebar` in the theme configuration.
///
/// An existing file keeps every other key. A missing file is seeded from
/// `seed` when that exists (otherwise an empty mapping) and gets the plan's
/// title and description.
pub fn update_theme_config(
    theme_config: &Path,
    seed: &Path,
    plan: &LessonPlan,
    sidebar: &[SidebarItem],
) -> Result<(), BuildError> {
    let mut doc = if theme_config.exists() {
        read_yaml(theme_config)?
    } else {
        let mut doc = if seed.exists() {
            debug!("Seeding {} from {}", theme_config.display(), seed.display());
            read_yaml(seed)?
        } else {
            Value::Mapping(Mapping::new())
        };
        if let Some(root) = doc.as_mapping_mut() {
            if let Some(title) = &plan.title {
                root.insert("title".into(), title.as_str().into());
            }
            if let Some(description) = &plan.description {
                root.insert("description".into(), description.as_str().into());
            }
        }
        if let Some(parent) = theme_config.parent() {
            fs::create_dir_all(parent).map_err(|source| BuildError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        doc
    };

    let invalid = |reason: &str| BuildError::ThemeConfig {
        path: theme_config.to_path_buf(),
        reason: reason.to_string(),
    };
    let sidebar = serde_yaml_ng::to_value(sidebar).map_err(|source| BuildError::Yaml {
        path: theme_config.to_path_buf(),
        source,
    })?;

    if doc.is_null() {
        doc = Value::Mapping(Mapping::new());
    }
    let root = doc
        .as_mapping_mut()
        .ok_or_else(|| invalid("top level is not a mapping"))?;
    match root.get_mut("themeConfig") {
        Some(Value::Mapping(theme)) => {
            theme.insert("sidebar".into(), sidebar);
        }
        Some(Value::Null) | None => {
            let mut theme = Mapping::new();
            theme.insert("sidebar".into(), sidebar);
            root.insert("themeConfig".into(), Value::Mapping(theme));
        }
        Some(_) => return Err(invalid("themeConfig is not a mapping")),
    }

    let text = serde_yaml_ng::to_string(&doc).map_err(|source| BuildError::Yaml {
        path: theme_config.to_path_buf(),
        source,
    })?;
    info!("Updating {}", theme_config.display());
    fs::write(theme_config, text).map_err(|source| BuildError::Io {
        path: theme_config.to_path_buf(),
        source,
    })
}

fn read_yaml(path: &Path) -> Result<Value, BuildError> {
    let content = fs::read_to_string(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }
    serde_yaml_ng::from_str(&content).map_err(|source| BuildError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Output audit
// ============================================================================

/// Lesson directories under the lesson root and the assignment directories
/// inside each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputTree {
    pub lessons: BTreeMap<String, BTreeSet<String>>,
}

/// Walk the lesson root two levels deep, collecting directories only.
///
/// A missing lesson root is an empty tree.
pub fn scan_output_tree(lesson_root: &Path) -> Result<OutputTree, BuildError> {
    let mut tree = OutputTree::default();
    if !lesson_root.is_dir() {
        return Ok(tree);
    }

    for entry in WalkDir::new(lesson_root)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.depth() == 1 {
            tree.lessons.entry(name).or_default();
        } else if let Some(lesson) = entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_string())
        {
            tree.lessons.entry(lesson).or_default().insert(name);
        }
    }
    Ok(tree)
}

/// A sidebar link under the lesson root that disagrees with the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    /// In the sidebar, but no directory was found.
    MissingDirectory(String),
    /// A directory exists that the sidebar does not link to.
    Unlisted(String),
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::MissingDirectory(path) => write!(f, "{path} has no output directory"),
            Discrepancy::Unlisted(path) => write!(f, "{path} exists but is not in the sidebar"),
        }
    }
}

/// Compare sidebar links under `/<lesson_subdir>/` with the output tree.
///
/// Only the first two sidebar levels are considered, matching the tree.
pub fn audit_sidebar(sidebar: &[SidebarItem], tree: &OutputTree, lesson_subdir: &str) -> Vec<Discrepancy> {
    let prefix = format!("/{lesson_subdir}/");
    let linked: BTreeSet<&str> = sidebar
        .iter()
        .flat_map(|item| std::iter::once(item).chain(item.children()))
        .filter_map(SidebarItem::path)
        .filter(|p| p.starts_with(&prefix))
        .collect();

    let mut on_disk: BTreeSet<String> = BTreeSet::new();
    for (lesson, assignments) in &tree.lessons {
        on_disk.insert(lesson_path(lesson_subdir, lesson));
        for asg in assignments {
            on_disk.insert(assignment_path(lesson_subdir, lesson, asg));
        }
    }

    let mut found: Vec<Discrepancy> = linked
        .iter()
        .filter(|p| !on_disk.contains(**p))
        .map(|p| Discrepancy::MissingDirectory(p.to_string()))
        .collect();
    found.extend(
        on_disk
            .iter()
            .filter(|p| !linked.contains(p.as_str()))
            .map(|p| Discrepancy::Unlisted(p.clone())),
    );
    found
}
