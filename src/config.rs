//! Project configuration.
//!
//! A project is a directory holding the lesson plan and, optionally, a
//! `lessonsite.toml` that says where everything else lives. Every setting
//! has a stock default, so most projects need no config file at all.
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! lesson_plan = "lesson-plan.yaml"            # relative to the project root
//! # module_source = "../modules"              # assignment source root
//! web_src = "docs/src"                        # site source directory
//! lesson_subdir = "lessons"                   # generated lessons, under web_src
//! theme_config = ".vuepress/config.yml"       # under web_src
//! public_assets = ".vuepress/public/assets"   # under web_src
//! # templates = "templates"                   # template overrides
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Module Source Root
//!
//! Assignment directories in the lesson plan are relative to the module
//! source root. The CLI passes `--module-source` / `MODULE_SOURCE` in as an
//! override; the library never reads the environment. A project without a
//! module source still loads; resolving the first assignment then fails.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::plan::LessonPlan;

/// Name of the optional project config file.
pub const CONFIG_FILE: &str = "lessonsite.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
    #[error("Invalid lesson '{key}': {source}")]
    Lesson {
        key: String,
        source: serde_yaml_ng::Error,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings loaded from `lessonsite.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Lesson plan manifest, relative to the project root.
    pub lesson_plan: String,
    /// Root of the assignment source directories.
    pub module_source: Option<String>,
    /// Site source directory, relative to the project root.
    pub web_src: String,
    /// Directory under `web_src` that receives generated lessons.
    pub lesson_subdir: String,
    /// Theme configuration file, relative to `web_src`.
    pub theme_config: String,
    /// Public assets directory, relative to `web_src`.
    pub public_assets: String,
    /// Optional template override directory, relative to the project root.
    pub templates: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            lesson_plan: "lesson-plan.yaml".to_string(),
            module_source: None,
            web_src: "docs/src".to_string(),
            lesson_subdir: "lessons".to_string(),
            theme_config: ".vuepress/config.yml".to_string(),
            public_assets: ".vuepress/public/assets".to_string(),
            templates: None,
        }
    }
}

impl ProjectConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("lesson_plan", &self.lesson_plan),
            ("web_src", &self.web_src),
            ("theme_config", &self.theme_config),
            ("public_assets", &self.public_assets),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        let subdir = self.lesson_subdir.trim();
        if subdir.is_empty() || subdir.contains(['/', '\\']) || subdir == "." || subdir == ".." {
            return Err(ConfigError::Validation(
                "lesson_subdir must be a single directory name".into(),
            ));
        }
        Ok(())
    }

    /// Resolve every configured location against the project root.
    ///
    /// `module_source` takes precedence over the configured value.
    pub fn paths(&self, root: &Path, module_source: Option<PathBuf>) -> ProjectPaths {
        let lesson_plan = root.join(&self.lesson_plan);
        let plan_dir = lesson_plan
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        let web_src = root.join(&self.web_src);

        ProjectPaths {
            root: root.to_path_buf(),
            lesson_plan,
            plan_dir,
            module_source: module_source
                .or_else(|| self.module_source.as_ref().map(|m| root.join(m))),
            lesson_root: web_src.join(&self.lesson_subdir),
            theme_config: web_src.join(&self.theme_config),
            public_assets: web_src.join(&self.public_assets),
            templates: self.templates.as_ref().map(|t| root.join(t)),
            web_src,
        }
    }
}

/// Absolute (root-joined) locations used by a build.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub lesson_plan: PathBuf,
    /// Directory of the lesson plan; lesson texts and `assets/` live here.
    pub plan_dir: PathBuf,
    pub module_source: Option<PathBuf>,
    pub web_src: PathBuf,
    /// Output directory for generated lessons.
    pub lesson_root: PathBuf,
    pub theme_config: PathBuf,
    pub public_assets: PathBuf,
    pub templates: Option<PathBuf>,
}

/// Everything a build needs: settings, resolved paths, and the lesson plan.
#[derive(Debug, Clone)]
pub struct Project {
    pub config: ProjectConfig,
    pub paths: ProjectPaths,
    pub plan: LessonPlan,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ProjectConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `lessonsite.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ProjectConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ProjectConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the project settings from `root`.
pub fn load_config(root: &Path) -> Result<ProjectConfig, ConfigError> {
    resolve_config(load_raw_config(root)?)
}

/// Load settings, resolve paths and read the lesson plan.
pub fn load_project(root: &Path, module_source: Option<PathBuf>) -> Result<Project, ConfigError> {
    let config = load_config(root)?;
    let paths = config.paths(root, module_source);
    let plan = LessonPlan::load(&paths.lesson_plan)?;
    Ok(Project {
        config,
        paths,
        plan,
    })
}

/// Returns a fully-commented stock `lessonsite.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# lessonsite configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Lesson plan manifest, relative to this file's directory.
# Lesson texts and the assets/ directory are looked up next to it.
lesson_plan = "lesson-plan.yaml"

# Root directory of the assignment sources. Assignment entries in the
# lesson plan are relative to it. --module-source or the MODULE_SOURCE
# environment variable take precedence.
# module_source = "../modules"

# Site source directory.
web_src = "docs/src"

# Directory under web_src that receives the generated lessons. Also the
# first path segment of every lesson URL in the sidebar.
lesson_subdir = "lessons"

# Theme configuration file (under web_src). Its themeConfig.sidebar field
# is replaced on every build.
theme_config = ".vuepress/config.yml"

# Public assets directory (under web_src) for site-wide resources.
public_assets = ".vuepress/public/assets"

# Directory of template overrides. Files here replace built-in templates
# of the same name (e.g. assignment.md).
# templates = "templates"
"##
}
