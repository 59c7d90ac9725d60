//! Lessons and assignments: resolution and materialization.
//!
//! Resolution reads everything a build needs from disk without writing:
//! each lesson's title from its text's front matter, and each assignment's
//! metadata. An assignment ends up in one of three states:
//!
//! ```text
//! unresolved ──read manifest──┬── NoManifest     (not an assignment, skipped)
//!                             ├── Untitled       (skipped, logged)
//!                             └── Titled         (materialized)
//! ```
//!
//! Materialization writes the output tree:
//!
//! ```text
//! <lesson_root>/
//! └── loops-and-turtles/           # slug of the lesson title
//!     ├── index.md                 # copy of the lesson text
//!     ├── lesson2.png              # declared lesson resources (from assets/)
//!     └── turtle-spiral/           # slug of the assignment title
//!         ├── index.md             # rendered only when trinket.md exists
//!         ├── spiral.py            # every source
//!         └── goal.png             # every resource
//! ```
//!
//! Directories are created if absent and files are overwritten, so a
//! rebuild over an existing tree is safe.

use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::frontmatter::{self, FrontMatterError};
use crate::metadata::{self, AssignmentMetadata, MetadataError};
use crate::naming::slugify;
use crate::plan::{LessonPlan, LessonSpec};
use crate::render::{ASSIGNMENT_TEMPLATE, RenderError, Renderer};

/// File name of every generated page.
pub const INDEX_FILE: &str = "index.md";

/// Directory, next to the lesson plan, holding lesson and site resources.
pub const ASSETS_DIR: &str = "assets";

#[derive(Error, Debug)]
pub enum LessonError {
    #[error("Module source root is not set (use --module-source or MODULE_SOURCE)")]
    ModuleSourceUnset,
    #[error("Assignment directory does not exist: {0}")]
    MissingAssignmentDir(PathBuf),
    #[error("Title '{0}' does not give a usable directory name")]
    EmptySlug(String),
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),
    #[error("Lesson text error: {0}")]
    FrontMatter(#[from] FrontMatterError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Cannot copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ============================================================================
// Assignments
// ============================================================================

/// Outcome of reading an assignment directory.
#[derive(Debug, Clone)]
pub enum Resolution {
    NoManifest,
    Untitled(AssignmentMetadata),
    Titled(Assignment),
}

/// An assignment reference from the lesson plan and what it resolved to.
#[derive(Debug, Clone)]
pub struct AssignmentRef {
    /// The reference as written in the lesson plan.
    pub reference: String,
    pub dir: PathBuf,
    pub resolution: Resolution,
}

/// A titled assignment, ready to materialize.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub title: String,
    pub slug: String,
    pub metadata: AssignmentMetadata,
}

/// What [`Assignment::write_dir`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutput {
    pub reference: String,
    pub title: String,
    pub slug: String,
    pub dir: PathBuf,
    /// The generated page; `None` when the assignment has no trinket text.
    pub index: Option<PathBuf>,
    pub copied: Vec<PathBuf>,
}

impl Assignment {
    /// Read the assignment at `dir`.
    ///
    /// A missing directory is an error; a directory without a manifest or
    /// without a title resolves to a skip state.
    pub fn resolve(dir: &Path) -> Result<Resolution, LessonError> {
        if !dir.is_dir() {
            return Err(LessonError::MissingAssignmentDir(dir.to_path_buf()));
        }
        let Some(metadata) = metadata::read_assignment(dir)? else {
            return Ok(Resolution::NoManifest);
        };
        let Some(title) = metadata.manifest.title().map(str::to_string) else {
            return Ok(Resolution::Untitled(metadata));
        };
        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Resolution::Titled(Assignment {
            slug: slug_for(&title, &dir_name)?,
            title,
            metadata,
        }))
    }

    /// Materialize the assignment under `lesson_dir`.
    ///
    /// Copies every source and resource, then renders `index.md` when a
    /// `trinket` text exists. Sources are copied first because the page
    /// embeds them from the output directory. Without a `trinket` text, an
    /// `index.md` left in the directory by an earlier writer is removed.
    pub fn write_dir(
        &self,
        reference: &str,
        lesson_dir: &Path,
        renderer: &Renderer,
    ) -> Result<AssignmentOutput, LessonError> {
        let dir = lesson_dir.join(&self.slug);
        ensure_dir(&dir)?;

        let mut copied = Vec::new();
        for file in self.metadata.sources.iter().chain(&self.metadata.resources) {
            copied.push(copy_into(file, &dir)?);
        }

        let index = match self.metadata.trinket_text() {
            Some(text_path) => {
                let text = fs::read_to_string(text_path).map_err(|source| LessonError::Io {
                    path: text_path.to_path_buf(),
                    source,
                })?;
                let page = self.render_page(&dir, &text, renderer)?;
                let index = dir.join(INDEX_FILE);
                info!("Writing {}", index.display());
                fs::write(&index, page).map_err(|source| LessonError::Io {
                    path: index.clone(),
                    source,
                })?;
                Some(index)
            }
            None => {
                debug!("No trinket text for '{}', page not generated", self.title);
                let stale = dir.join(INDEX_FILE);
                if stale.is_file() && !copied.contains(&stale) {
                    info!("Removing stale {}", stale.display());
                    fs::remove_file(&stale).map_err(|source| LessonError::Io {
                        path: stale.clone(),
                        source,
                    })?;
                }
                None
            }
        };

        Ok(AssignmentOutput {
            reference: reference.to_string(),
            title: self.title.clone(),
            slug: self.slug.clone(),
            dir,
            index,
            copied,
        })
    }

    /// Render the assignment page with `content` as the page body.
    pub fn render_page(
        &self,
        working_dir: &Path,
        content: &str,
        renderer: &Renderer,
    ) -> Result<String, LessonError> {
        let mut frontmatter = serde_json::Map::new();
        frontmatter.insert("title".into(), self.title.clone().into());

        let sources: Vec<String> = self
            .metadata
            .sources
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .collect();

        let mut context = Context::new();
        context.insert("frontmatter", &frontmatter);
        context.insert("title", &self.title);
        context.insert("working_directory", working_dir);
        context.insert("sources", &sources);
        context.insert("meta", &self.metadata.manifest);
        if let Some(embed) = &self.metadata.manifest.trinket {
            context.insert("embed", embed);
        }
        context.insert("content", content);

        Ok(renderer.render(ASSIGNMENT_TEMPLATE, &context)?)
    }
}

// ============================================================================
// Lessons
// ============================================================================

/// A resolved lesson.
#[derive(Debug, Clone)]
pub struct Lesson {
    pub key: String,
    pub title: String,
    pub slug: String,
    /// Lesson text, copied as the lesson's `index.md`.
    pub text: PathBuf,
    /// Declared resources, resolved under the assets directory.
    pub resources: Vec<PathBuf>,
    pub assignments: Vec<AssignmentRef>,
}

/// An assignment reference that produced no output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAssignment {
    pub reference: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoManifest,
    NoTitle,
}

/// What [`Lesson::write_dir`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonOutput {
    pub key: String,
    pub title: String,
    pub slug: String,
    pub dir: PathBuf,
    /// One entry per assignment directory, in plan order.
    pub assignments: Vec<AssignmentOutput>,
    pub skipped: Vec<SkippedAssignment>,
}

impl Lesson {
    /// Resolve a lesson declared in the plan.
    ///
    /// The lesson text is relative to `plan_dir`; assignment references are
    /// relative to `module_source`, which is only required when the lesson
    /// has assignments.
    pub fn resolve(
        spec: &LessonSpec,
        plan_dir: &Path,
        module_source: Option<&Path>,
    ) -> Result<Lesson, LessonError> {
        let text = plan_dir.join(&spec.text);
        let title = frontmatter::read_title(&text)?;
        let assets = plan_dir.join(ASSETS_DIR);

        let mut assignments = Vec::with_capacity(spec.assignments.len());
        for reference in &spec.assignments {
            let root = module_source.ok_or(LessonError::ModuleSourceUnset)?;
            let dir = root.join(reference);
            let resolution = Assignment::resolve(&dir)?;
            assignments.push(AssignmentRef {
                reference: reference.clone(),
                dir,
                resolution,
            });
        }

        Ok(Lesson {
            key: spec.key.clone(),
            slug: slug_for(&title, &spec.key)?,
            title,
            text,
            resources: spec.resources.iter().map(|r| assets.join(r)).collect(),
            assignments,
        })
    }

    /// Materialize the lesson and its assignments under `root`, in plan
    /// order.
    pub fn write_dir(&self, root: &Path, renderer: &Renderer) -> Result<LessonOutput, LessonError> {
        let dir = root.join(&self.slug);
        ensure_dir(&dir)?;

        copy_file(&self.text, &dir.join(INDEX_FILE))?;
        for res in &self.resources {
            copy_into(res, &dir)?;
        }

        let mut assignments: Vec<AssignmentOutput> = Vec::new();
        let mut skipped = Vec::new();
        for asg in &self.assignments {
            match &asg.resolution {
                Resolution::NoManifest => {
                    info!("Skipping {} because it has no assignment manifest", asg.reference);
                    skipped.push(SkippedAssignment {
                        reference: asg.reference.clone(),
                        reason: SkipReason::NoManifest,
                    });
                }
                Resolution::Untitled(_) => {
                    info!("Skipping {} because it has no title", asg.reference);
                    skipped.push(SkippedAssignment {
                        reference: asg.reference.clone(),
                        reason: SkipReason::NoTitle,
                    });
                }
                Resolution::Titled(assignment) => {
                    debug!("Writing {}", assignment.title);
                    let output = assignment.write_dir(&asg.reference, &dir, renderer)?;
                    match assignments.iter_mut().find(|a| a.slug == output.slug) {
                        Some(existing) => {
                            warn!(
                                "'{}' and '{}' share the directory {}; the later one overwrites it",
                                existing.reference,
                                output.reference,
                                output.dir.display()
                            );
                            *existing = output;
                        }
                        None => assignments.push(output),
                    }
                }
            }
        }

        Ok(LessonOutput {
            key: self.key.clone(),
            title: self.title.clone(),
            slug: self.slug.clone(),
            dir,
            assignments,
            skipped,
        })
    }
}

/// Resolve every lesson of the plan, in declaration order.
pub fn resolve_lessons(
    plan: &LessonPlan,
    plan_dir: &Path,
    module_source: Option<&Path>,
) -> Result<Vec<Lesson>, LessonError> {
    plan.lessons
        .iter()
        .map(|spec| Lesson::resolve(spec, plan_dir, module_source))
        .collect()
}

/// Copy the plan's top-level pages into `web_src` and its site-wide
/// resources from `assets/` into `public_assets`.
pub fn write_site_pages(
    plan: &LessonPlan,
    plan_dir: &Path,
    web_src: &Path,
    public_assets: &Path,
) -> Result<Vec<PathBuf>, LessonError> {
    let mut written = Vec::new();

    for page in &plan.pages {
        let dest = web_src.join(page);
        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }
        copy_file(&plan_dir.join(page), &dest)?;
        written.push(dest);
    }

    if !plan.resources.is_empty() {
        ensure_dir(public_assets)?;
    }
    let assets = plan_dir.join(ASSETS_DIR);
    for resource in &plan.resources {
        let dest = public_assets.join(resource);
        copy_file(&assets.join(resource), &dest)?;
        written.push(dest);
    }

    Ok(written)
}

/// Slug of `title`, or of `fallback` when the title has no usable
/// characters.
fn slug_for(title: &str, fallback: &str) -> Result<String, LessonError> {
    [title, fallback]
        .into_iter()
        .map(slugify)
        .find(|slug| !slug.is_empty())
        .ok_or_else(|| LessonError::EmptySlug(title.to_string()))
}

fn ensure_dir(path: &Path) -> Result<(), LessonError> {
    fs::create_dir_all(path).map_err(|source| LessonError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn copy_file(from: &Path, to: &Path) -> Result<(), LessonError> {
    debug!("Copying {} to {}", from.display(), to.display());
    fs::copy(from, to).map_err(|source| LessonError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Copy `file` into `dir`, keeping its file name.
fn copy_into(file: &Path, dir: &Path) -> Result<PathBuf, LessonError> {
    let name = file
        .file_name()
        .ok_or_else(|| LessonError::Io {
            path: file.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
        })?;
    let dest = dir.join(name);
    copy_file(file, &dest)?;
    Ok(dest)
}
