//! The lesson plan manifest (`lesson-plan.yaml`).
//!
//! ```yaml
//! title: Python Turtle Course
//! description: Learn Python by drawing
//! pages:                     # copied into the web source root
//!   - README.md
//! resources:                 # copied from assets/ into the public assets dir
//!   - logo.png
//! sidebar:                   # leading sidebar entries, passed through
//!   - title: Introduction
//!     path: /
//! lessons:
//!   lesson1:
//!     text: lessons/lesson1.md          # front matter supplies the title
//!     resources: [lesson1.png]          # from assets/, next to the lesson page
//!     assignments:                      # relative to the module source root
//!       - turtle/spiral
//!       - turtle/ninja_star
//! ```
//!
//! Lessons keep their declaration order.

use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::types::SidebarItem;

/// Parsed lesson plan.
#[derive(Debug, Clone, Default)]
pub struct LessonPlan {
    pub title: Option<String>,
    pub description: Option<String>,
    pub pages: Vec<String>,
    pub resources: Vec<String>,
    pub sidebar: Vec<SidebarItem>,
    pub lessons: Vec<LessonSpec>,
}

/// One lesson as declared in the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonSpec {
    pub key: String,
    pub text: PathBuf,
    pub resources: Vec<String>,
    pub assignments: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    pages: Vec<String>,
    #[serde(default)]
    resources: Vec<String>,
    #[serde(default)]
    sidebar: Vec<SidebarItem>,
    #[serde(default)]
    lessons: Mapping,
}

#[derive(Debug, Deserialize)]
struct RawLesson {
    text: PathBuf,
    #[serde(default)]
    resources: Vec<String>,
    #[serde(default)]
    assignments: Vec<String>,
}

impl LessonPlan {
    /// Parse a plan from YAML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawPlan = serde_yaml_ng::from_str(content)?;

        let mut lessons = Vec::with_capacity(raw.lessons.len());
        for (key, value) in raw.lessons {
            let key = match key {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(ConfigError::Validation(format!(
                        "lesson keys must be strings, found {other:?}"
                    )));
                }
            };
            let lesson: RawLesson =
                serde_yaml_ng::from_value(value).map_err(|source| ConfigError::Lesson {
                    key: key.clone(),
                    source,
                })?;
            lessons.push(LessonSpec {
                key,
                text: lesson.text,
                resources: lesson.resources,
                assignments: lesson.assignments,
            });
        }

        Ok(Self {
            title: raw.title,
            description: raw.description,
            pages: raw.pages,
            resources: raw.resources,
            sidebar: raw.sidebar,
            lessons,
        })
    }

    /// Read and parse a plan file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
title: Python Turtle Course
description: Learn Python by drawing
pages: [README.md]
resources: [logo.png]
sidebar:
  - title: Introduction
    path: /
lessons:
  zeta:
    text: lessons/zeta.md
    assignments: [a, b]
  alpha:
    text: lessons/alpha.md
    resources: [alpha.png]
"#;

    #[test]
    fn parses_top_level_fields() {
        let plan = LessonPlan::parse(PLAN).unwrap();
        assert_eq!(plan.title.as_deref(), Some("Python Turtle Course"));
        assert_eq!(plan.description.as_deref(), Some("Learn Python by drawing"));
        assert_eq!(plan.pages, vec!["README.md"]);
        assert_eq!(plan.resources, vec!["logo.png"]);
        assert_eq!(plan.sidebar.len(), 1);
    }

    #[test]
    fn sidebar_accepts_every_theme_form() {
        let plan = LessonPlan::parse(
            "sidebar:\n  - ['/setup/', 'Setup']\n  - title: 2024\n    path: /2024/\n  - /\n",
        )
        .unwrap();
        assert_eq!(plan.sidebar.len(), 3);
        assert_eq!(plan.sidebar[0].path(), Some("/setup/"));
        assert_eq!(plan.sidebar[1].path(), Some("/2024/"));
        assert_eq!(plan.sidebar[2], SidebarItem::Link("/".into()));
    }

    #[test]
    fn lessons_keep_declaration_order() {
        let plan = LessonPlan::parse(PLAN).unwrap();
        let keys: Vec<&str> = plan.lessons.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(plan.lessons[0].assignments, vec!["a", "b"]);
        assert!(plan.lessons[0].resources.is_empty());
        assert_eq!(plan.lessons[1].resources, vec!["alpha.png"]);
        assert!(plan.lessons[1].assignments.is_empty());
    }

    #[test]
    fn lesson_without_text_names_the_lesson() {
        let err = LessonPlan::parse("lessons:\n  broken:\n    assignments: [a]\n").unwrap_err();
        match err {
            ConfigError::Lesson { key, .. } => assert_eq!(key, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_sections_default() {
        let plan = LessonPlan::parse("title: Bare\n").unwrap();
        assert!(plan.lessons.is_empty());
        assert!(plan.pages.is_empty());
        assert!(plan.sidebar.is_empty());
    }

    #[test]
    fn malformed_yaml_is_error() {
        assert!(matches!(
            LessonPlan::parse("lessons: [unclosed"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
