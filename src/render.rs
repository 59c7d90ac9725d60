//! Page rendering with Tera.
//!
//! The renderer ships the built-in `assignment.md` template (embedded at
//! compile time) and optionally loads a user template directory whose files
//! override built-ins of the same name.
//!
//! ## Content pre-rendering
//!
//! When the context has a string `content` value, it is rendered as a
//! template first, with the same context, and the result replaces it. This is
//! how an assignment's `trinket.md` can call the helper functions below.
//!
//! ## Helpers
//!
//! | Name | Kind | Purpose |
//! |------|------|---------|
//! | `read_code(file=)` | function | raw text of a file |
//! | `trinket(file=, embed_type=, width=, height=)` | function | trinket.io iframe |
//! | `goal_image(file=)` | function | floating goal `<img>` |
//! | `strip_html` | filter | remove `<...>` tags |
//! | `yaml` | filter | serialize a value as YAML |
//!
//! Relative file arguments resolve against the `working_directory` context
//! value. `trinket` defaults come from the `embed` context value.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tera::{Context, Tera, Value};
use thiserror::Error;
use walkdir::WalkDir;

use crate::metadata::TrinketOptions;
use crate::trinket::{self, EmbedParams};

/// Name of the template used for assignment pages.
pub const ASSIGNMENT_TEMPLATE: &str = "assignment.md";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[(
    ASSIGNMENT_TEMPLATE,
    include_str!("../templates/assignment.md"),
)];

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot load template {name}: {source}")]
    Load { name: String, source: tera::Error },
    #[error("Cannot read template directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Failed to render {name}: {source}")]
    Render { name: String, source: tera::Error },
}

#[derive(Debug, Clone)]
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Build a renderer from the built-in templates plus an optional
    /// template directory.
    pub fn new(template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        for (name, body) in BUILTIN_TEMPLATES {
            tera.add_raw_template(name, body)
                .map_err(|source| RenderError::Load {
                    name: name.to_string(),
                    source,
                })?;
        }
        if let Some(dir) = template_dir {
            load_template_dir(&mut tera, dir)?;
        }

        tera.register_filter("strip_html", strip_html);
        tera.register_filter("yaml", to_yaml);

        Ok(Self { tera })
    }

    /// Names of every loaded template, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }

    /// Render the template `name` with `context`.
    pub fn render(&self, name: &str, context: &Context) -> Result<String, RenderError> {
        let mut tera = self.tera.clone();
        register_helpers(&mut tera, context);

        let mut context = context.clone();
        if let Some(content) = context
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_owned)
        {
            let rendered = tera
                .render_str(&content, &context)
                .map_err(|source| RenderError::Render {
                    name: format!("{name} (content)"),
                    source,
                })?;
            context.insert("content", &rendered);
        }

        tera.render(name, &context)
            .map_err(|source| RenderError::Render {
                name: name.to_string(),
                source,
            })
    }
}

fn load_template_dir(tera: &mut Tera, dir: &Path) -> Result<(), RenderError> {
    let mut files: Vec<(PathBuf, Option<String>)> = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((entry.path().to_path_buf(), Some(name)));
    }

    tera.add_template_files(files)
        .map_err(|source| RenderError::Load {
            name: dir.display().to_string(),
            source,
        })
}

/// Register the helper functions bound to this render's context.
fn register_helpers(tera: &mut Tera, context: &Context) {
    let working_dir = context
        .get("working_directory")
        .and_then(Value::as_str)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let defaults = context
        .get("embed")
        .and_then(|v| serde_json::from_value::<TrinketOptions>(v.clone()).ok())
        .map(|opts| EmbedParams::from(&opts))
        .unwrap_or_default();

    let wd = working_dir.clone();
    tera.register_function("read_code", move |args: &HashMap<String, Value>| {
        let file = required_str(args, "read_code", "file")?;
        trinket::read_code(&trinket::resolve_path(&wd, &file))
            .map(Value::String)
            .map_err(tera::Error::msg)
    });

    let wd = working_dir.clone();
    tera.register_function("trinket", move |args: &HashMap<String, Value>| {
        let file = required_str(args, "trinket", "file")?;
        let params = EmbedParams {
            embed_type: optional_str(args, "embed_type")
                .unwrap_or_else(|| defaults.embed_type.clone()),
            width: optional_str(args, "width").unwrap_or_else(|| defaults.width.clone()),
            height: optional_str(args, "height").unwrap_or_else(|| defaults.height.clone()),
        };
        trinket::trinket(&wd, &file, &params)
            .map(Value::String)
            .map_err(tera::Error::msg)
    });

    tera.register_function("goal_image", move |args: &HashMap<String, Value>| {
        let file = required_str(args, "goal_image", "file")?;
        trinket::goal_image(&working_dir, &file)
            .map(Value::String)
            .map_err(tera::Error::msg)
    });
}

fn optional_str(args: &HashMap<String, Value>, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn required_str(args: &HashMap<String, Value>, func: &str, key: &str) -> tera::Result<String> {
    optional_str(args, key)
        .ok_or_else(|| tera::Error::msg(format!("{func} requires a '{key}' argument")))
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
pub(crate) fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

pub(crate) fn strip_html(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::Null => Ok(Value::String(String::new())),
        Value::String(s) => Ok(Value::String(strip_html_tags(s))),
        _ => Err(tera::Error::msg("strip_html filter expects a string")),
    }
}

pub(crate) fn to_yaml(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let empty = match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(_) => false,
    };
    if empty {
        return Ok(Value::String(String::new()));
    }
    serde_yaml_ng::to_string(value)
        .map(Value::String)
        .map_err(tera::Error::msg)
}
