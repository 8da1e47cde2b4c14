//! TiddlyWiki JSON export source.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::source::{FragmentSource, RawFragment, StoreError};
use crate::tags::parse_tag_list;
use crate::SYSTEM_PREFIX;

const BACKEND: &str = "Json";

/// Tags are a tag list string in TiddlyWiki exports, but an array in some
/// third-party tools.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Tags {
    List(String),
    Array(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct ExportedTiddler {
    title: String,
    #[serde(default)]
    tags: Option<Tags>,
    #[serde(default)]
    text: String,
    #[serde(default, rename = "draft.of")]
    draft_of: Option<String>,
}

/// Reads a JSON array of tiddlers as produced by TiddlyWiki's export.
#[derive(Debug, Clone)]
pub struct JsonExport {
    path: PathBuf,
}

impl JsonExport {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse export content.
    pub fn parse(content: &str) -> Result<Vec<RawFragment>, StoreError> {
        let exported: Vec<ExportedTiddler> = serde_json::from_str(content).map_err(|e| {
            StoreError::invalid(e.to_string())
                .with_source(e)
                .with_backend(BACKEND)
        })?;

        let mut fragments: Vec<RawFragment> = exported
            .into_iter()
            .filter(|t| !t.title.starts_with(SYSTEM_PREFIX) && t.draft_of.is_none())
            .map(|t| RawFragment {
                tags: match t.tags {
                    Some(Tags::List(list)) => parse_tag_list(&list),
                    Some(Tags::Array(array)) => array,
                    None => Vec::new(),
                },
                title: t.title,
                text: t.text.replace("\r\n", "\n"),
            })
            .collect();
        fragments.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(fragments)
    }
}

impl FragmentSource for JsonExport {
    fn load(&self) -> Result<Vec<RawFragment>, StoreError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::io(e, &self.path).with_backend(BACKEND))?;
        let fragments = Self::parse(&content).map_err(|e| e.with_path(&self.path))?;
        tracing::debug!(path = %self.path.display(), count = fragments.len(), "Loaded JSON export");
        Ok(fragments)
    }

    fn describe(&self) -> String {
        format!("JSON export {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::StoreErrorKind;

    #[test]
    fn test_parse_export() {
        let fragments = JsonExport::parse(
            r#"[
                {"title": "Gaul", "tags": "[[Ancient Rome]] :chapter", "text": "Tribes.", "modified": "2015"},
                {"title": "$:/StoryList", "text": ""},
                {"title": "Army", "tags": ["Gaul", "x y"]},
                {"title": "Draft of 'Gaul'", "draft.of": "Gaul", "text": "wip"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            fragments,
            vec![
                RawFragment::new("Army", &["Gaul", "x y"], ""),
                RawFragment::new("Gaul", &["Ancient Rome", ":chapter"], "Tribes."),
            ]
        );
    }

    #[test]
    fn test_parse_invalid() {
        let err = JsonExport::parse("{not json").unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::InvalidFormat);
    }

    #[test]
    fn test_load_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("book.json");
        fs::write(&path, r#"[{"title": "A", "text": "a"}]"#).unwrap();

        let fragments = JsonExport::new(&path).load().unwrap();

        assert_eq!(fragments.len(), 1);
        assert!(JsonExport::new(&path).describe().contains("book.json"));
    }
}
