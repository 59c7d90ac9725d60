//! YAML front matter in markdown files.
//!
//! Lesson texts carry their display title in a leading YAML block:
//!
//! ```text
//! ---
//! title: Loops and Turtles
//! ---
//!
//! # Body starts here
//! ```

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid front matter in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
    #[error("Front matter for {0} does not have a title")]
    MissingTitle(PathBuf),
}

/// Split a markdown document into its front matter block and body.
///
/// Returns `(None, content)` when the document does not open with a `---`
/// fence or the closing fence is missing.
pub fn split(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let body = &rest[offset + line.len()..];
            return (Some(&rest[..offset]), body);
        }
        offset += line.len();
    }
    (None, content)
}

/// Parse the front matter of `content` into `T`.
///
/// A document without front matter parses as an empty mapping.
pub fn parse<T: DeserializeOwned + Default>(content: &str) -> Result<T, serde_yaml_ng::Error> {
    match split(content).0 {
        Some(block) if !block.trim().is_empty() => serde_yaml_ng::from_str(block),
        _ => Ok(T::default()),
    }
}

#[derive(Debug, Default, Deserialize)]
struct TitleOnly {
    title: Option<String>,
}

/// Read a markdown file and return the `title` field of its front matter.
pub fn read_title(path: &Path) -> Result<String, FrontMatterError> {
    let content = fs::read_to_string(path).map_err(|source| FrontMatterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fm: TitleOnly = parse(&content).map_err(|source| FrontMatterError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    fm.title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FrontMatterError::MissingTitle(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn split_extracts_block_and_body() {
        let (fm, body) = split("---\ntitle: Hi\n---\n\n# Body");
        assert_eq!(fm, Some("title: Hi\n"));
        assert_eq!(body, "\n# Body");
    }

    #[test]
    fn split_without_front_matter() {
        let (fm, body) = split("# Just markdown");
        assert!(fm.is_none());
        assert_eq!(body, "# Just markdown");
    }

    #[test]
    fn split_unterminated_block_is_body() {
        let text = "---\ntitle: Hi\n\nno closing fence";
        let (fm, body) = split(text);
        assert!(fm.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn split_handles_crlf() {
        let (fm, body) = split("---\r\ntitle: Hi\r\n---\r\nbody");
        assert_eq!(fm, Some("title: Hi\r\n"));
        assert_eq!(body, "body");
    }

    #[test]
    fn read_title_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lesson.md");
        fs::write(&path, "---\ntitle: Loops and Turtles\nlevel: 1\n---\ntext").unwrap();
        assert_eq!(read_title(&path).unwrap(), "Loops and Turtles");
    }

    #[test]
    fn read_title_missing_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lesson.md");
        fs::write(&path, "---\nlevel: 1\n---\ntext").unwrap();
        assert!(matches!(
            read_title(&path),
            Err(FrontMatterError::MissingTitle(_))
        ));

        fs::write(&path, "# No front matter").unwrap();
        assert!(matches!(
            read_title(&path),
            Err(FrontMatterError::MissingTitle(_))
        ));
    }

    #[test]
    fn read_title_malformed_yaml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lesson.md");
        fs::write(&path, "---\ntitle: [unclosed\n---\n").unwrap();
        assert!(matches!(read_title(&path), Err(FrontMatterError::Yaml { .. })));
    }
}
