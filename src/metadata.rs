//! Assignment metadata: the `.assignment.yaml` manifest plus a scan of the
//! assignment directory.
//!
//! ## Manifest
//!
//! ```yaml
//! title: Turtle Spiral        # required for the assignment to be built
//! trinket:                    # optional embed defaults
//!   type: python
//!   width: 100%
//!   height: 600
//! difficulty: easy            # any other key is kept verbatim
//! ```
//!
//! A directory without a manifest is not an assignment; [`read_assignment`]
//! returns `None` for it rather than an error.
//!
//! ## File classification
//!
//! Only the immediate children of the directory are considered. Hidden files
//! are skipped and entries are visited in file-name order.
//!
//! | Extension | Role |
//! |-----------|------|
//! | `.py` | source, copied next to the generated page |
//! | `.md` | text fragment, keyed by file stem (`trinket.md` → `"trinket"`) |
//! | `.png`, `.gif` | resource, copied next to the generated page |
//!
//! Anything else is ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the per-assignment manifest.
pub const MANIFEST_FILE: &str = ".assignment.yaml";

const SOURCE_EXTENSIONS: &[&str] = &["py"];
const TEXT_EXTENSIONS: &[&str] = &["md"];
const RESOURCE_EXTENSIONS: &[&str] = &["png", "gif"];

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error in {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid assignment manifest {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
}

/// Parsed `.assignment.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentManifest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trinket: Option<TrinketOptions>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml_ng::Value>,
}

impl AssignmentManifest {
    /// The trimmed title, if present and non-empty.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Embed widget defaults declared by an assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrinketOptions {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub embed_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<EmbedSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<EmbedSize>,
}

/// An iframe dimension: either a pixel count or a CSS length like `100%`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbedSize {
    Pixels(u32),
    Css(String),
}

impl fmt::Display for EmbedSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedSize::Pixels(n) => write!(f, "{n}"),
            EmbedSize::Css(s) => f.write_str(s),
        }
    }
}

/// Everything known about one assignment directory.
#[derive(Debug, Clone)]
pub struct AssignmentMetadata {
    pub dir: PathBuf,
    pub manifest: AssignmentManifest,
    pub sources: Vec<PathBuf>,
    pub texts: BTreeMap<String, PathBuf>,
    pub resources: Vec<PathBuf>,
}

impl AssignmentMetadata {
    /// The text fragment spliced into the generated page, if any.
    pub fn trinket_text(&self) -> Option<&Path> {
        self.texts.get("trinket").map(PathBuf::as_path)
    }
}

/// Read the manifest and classify the files of an assignment directory.
///
/// Returns `Ok(None)` when the directory has no manifest file.
pub fn read_assignment(dir: &Path) -> Result<Option<AssignmentMetadata>, MetadataError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&manifest_path).map_err(|source| MetadataError::Io {
        path: manifest_path.clone(),
        source,
    })?;
    let manifest = parse_manifest(&content).map_err(|source| MetadataError::Yaml {
        path: manifest_path,
        source,
    })?;

    let mut sources = Vec::new();
    let mut texts = BTreeMap::new();
    let mut resources = Vec::new();

    for path in collect_files(dir)? {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if SOURCE_EXTENSIONS.contains(&ext.as_str()) {
            sources.push(path);
        } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            texts.insert(stem, path);
        } else if RESOURCE_EXTENSIONS.contains(&ext.as_str()) {
            resources.push(path);
        }
    }

    Ok(Some(AssignmentMetadata {
        dir: dir.to_path_buf(),
        manifest,
        sources,
        texts,
        resources,
    }))
}

fn parse_manifest(content: &str) -> Result<AssignmentManifest, serde_yaml_ng::Error> {
    if content.trim().is_empty() {
        return Ok(AssignmentManifest::default());
    }
    serde_yaml_ng::from_str(content)
}

fn collect_files(dir: &Path) -> Result<Vec<PathBuf>, MetadataError> {
    let io_err = |source| MetadataError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let hidden = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(true);
        if path.is_file() && !hidden {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
