//! Embedded code widgets.
//!
//! Assignment pages show the assignment's program inside a trinket.io
//! iframe. The program text travels in the URL fragment, percent-encoded:
//!
//! ```text
//! https://trinket.io/tools/1.0/jekyll/embed/python#code=import%20turtle%0A...
//! ```
//!
//! Markup is produced with maud so attribute values are escaped.

use maud::html;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::metadata::TrinketOptions;

pub const EMBED_BASE_URL: &str = "https://trinket.io/tools/1.0/jekyll/embed/";
pub const DEFAULT_EMBED_TYPE: &str = "python";
pub const DEFAULT_WIDTH: &str = "300";
pub const DEFAULT_HEIGHT: &str = "500";

/// Everything except unreserved characters and `/` is escaped.
const CODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Goal image not found: {0}")]
    MissingImage(PathBuf),
}

/// Resolved iframe parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedParams {
    pub embed_type: String,
    pub width: String,
    pub height: String,
}

impl Default for EmbedParams {
    fn default() -> Self {
        Self {
            embed_type: DEFAULT_EMBED_TYPE.to_string(),
            width: DEFAULT_WIDTH.to_string(),
            height: DEFAULT_HEIGHT.to_string(),
        }
    }
}

impl From<&TrinketOptions> for EmbedParams {
    fn from(opts: &TrinketOptions) -> Self {
        let base = Self::default();
        Self {
            embed_type: opts.embed_type.clone().unwrap_or(base.embed_type),
            width: opts.width.as_ref().map(|w| w.to_string()).unwrap_or(base.width),
            height: opts.height.as_ref().map(|h| h.to_string()).unwrap_or(base.height),
        }
    }
}

/// Resolve `file` against `working_dir` unless it is already absolute.
pub fn resolve_path(working_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

/// Read a file as text.
pub fn read_code(path: &Path) -> Result<String, EmbedError> {
    fs::read_to_string(path).map_err(|source| EmbedError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Percent-encode program text for the embed URL fragment.
///
/// Surrounding whitespace is dropped before encoding.
pub fn encode_code(code: &str) -> String {
    utf8_percent_encode(code.trim(), CODE).to_string()
}

/// Build the iframe `src` for an embed of `code`.
pub fn iframe_src(code: &str, embed_type: &str) -> String {
    format!("{EMBED_BASE_URL}{embed_type}#code={}", encode_code(code))
}

/// Render the iframe element for an embed of `code`.
pub fn iframe(code: &str, params: &EmbedParams) -> String {
    let src = iframe_src(code, &params.embed_type);
    html! {
        iframe width=(params.width) height=(params.height) src=(src)
            frameborder="0" marginwidth="0" marginheight="0" allowfullscreen {}
    }
    .into_string()
}

/// Render the embed for the program at `file`, relative to `working_dir`.
pub fn trinket(working_dir: &Path, file: &str, params: &EmbedParams) -> Result<String, EmbedError> {
    let code = read_code(&resolve_path(working_dir, file))?;
    Ok(iframe(&code, params))
}

/// Render the floating "Your Goal" image for a file in `working_dir`.
pub fn goal_image(working_dir: &Path, file: &str) -> Result<String, EmbedError> {
    let path = resolve_path(working_dir, file);
    if !path.is_file() {
        return Err(EmbedError::MissingImage(path));
    }
    Ok(html! {
        img src=(file) alt="Your Goal"
            style="float: right; width: 200px; margin-bottom:20px;";
    }
    .into_string())
}
