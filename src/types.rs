//! Sidebar types shared by the lesson plan, the site builder and the CLI
//! output.
//!
//! These serialize to the shape the site theme expects under
//! `themeConfig.sidebar`:
//!
//! ```yaml
//! - title: Introduction
//!   path: /
//! - title: Loops and Turtles
//!   path: /lessons/loops-and-turtles/
//!   collapsable: false
//!   children:
//!     - title: Turtle Spiral
//!       path: /lessons/loops-and-turtles/turtle-spiral/
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A sidebar item: a bare link path, a titled entry, or any other form the
/// theme accepts (`['/setup/', 'Setup']` pairs, non-string titles), which
/// is carried through as raw YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SidebarItem {
    Link(String),
    Entry(SidebarEntry),
    Other(serde_yaml_ng::Value),
}

impl SidebarItem {
    pub fn title(&self) -> &str {
        match self {
            SidebarItem::Link(path) => path,
            SidebarItem::Entry(entry) => &entry.title,
            SidebarItem::Other(value) => other_field(value, 1, "title").unwrap_or(""),
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            SidebarItem::Link(path) => Some(path),
            SidebarItem::Entry(entry) => entry.path.as_deref(),
            SidebarItem::Other(value) => other_field(value, 0, "path"),
        }
    }

    pub fn children(&self) -> &[SidebarItem] {
        match self {
            SidebarItem::Link(_) | SidebarItem::Other(_) => &[],
            SidebarItem::Entry(entry) => &entry.children,
        }
    }
}

/// String at `index` of a `[path, title]` pair, or under `key` of a mapping.
fn other_field<'a>(value: &'a serde_yaml_ng::Value, index: usize, key: &str) -> Option<&'a str> {
    match value {
        serde_yaml_ng::Value::Sequence(seq) => seq.get(index).and_then(|v| v.as_str()),
        serde_yaml_ng::Value::Mapping(map) => map.get(key).and_then(|v| v.as_str()),
        _ => None,
    }
}

/// Titled sidebar entry. Keys the theme understands beyond these are kept
/// in `extra` so plan-declared entries survive a rewrite unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsable: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SidebarItem>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml_ng::Value>,
}

impl SidebarEntry {
    /// A leaf entry linking to `path`.
    pub fn page(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: Some(path.into()),
            collapsable: None,
            children: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_links_and_entries() {
        let items: Vec<SidebarItem> = serde_yaml_ng::from_str(
            "- /\n- title: Intro\n  path: /intro/\n  sidebarDepth: 2\n",
        )
        .unwrap();
        assert_eq!(items[0], SidebarItem::Link("/".into()));
        match &items[1] {
            SidebarItem::Entry(e) => {
                assert_eq!(e.title, "Intro");
                assert_eq!(e.path.as_deref(), Some("/intro/"));
                assert!(e.extra.contains_key("sidebarDepth"));
            }
            other => panic!("expected entry, got {other:?}"),
        }
    }

    #[test]
    fn keeps_pairs_and_non_string_titles_as_raw_yaml() {
        let items: Vec<SidebarItem> =
            serde_yaml_ng::from_str("- ['/setup/', 'Setup']\n- title: 2024\n  path: /2024/\n")
                .unwrap();
        assert!(matches!(items[0], SidebarItem::Other(_)));
        assert_eq!(items[0].path(), Some("/setup/"));
        assert_eq!(items[0].title(), "Setup");
        assert!(matches!(items[1], SidebarItem::Other(_)));
        assert_eq!(items[1].path(), Some("/2024/"));
        assert_eq!(items[1].title(), "");

        let yaml = serde_yaml_ng::to_string(&items).unwrap();
        let back: serde_yaml_ng::Value = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back[0][1].as_str(), Some("Setup"));
        assert_eq!(back[1]["title"].as_u64(), Some(2024));
    }

    #[test]
    fn serializes_without_empty_fields() {
        let item = SidebarItem::Entry(SidebarEntry::page("Spiral", "/lessons/a/spiral/"));
        let yaml = serde_yaml_ng::to_string(&item).unwrap();
        assert_eq!(yaml, "title: Spiral\npath: /lessons/a/spiral/\n");
    }

    #[test]
    fn accessors() {
        let mut lesson = SidebarEntry::page("Loops", "/lessons/loops/");
        lesson.children.push(SidebarItem::Entry(SidebarEntry::page("A", "/a/")));
        let item = SidebarItem::Entry(lesson);
        assert_eq!(item.title(), "Loops");
        assert_eq!(item.path(), Some("/lessons/loops/"));
        assert_eq!(item.children().len(), 1);
        assert!(SidebarItem::Link("/".into()).children().is_empty());
    }
}
