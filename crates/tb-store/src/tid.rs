//! TiddlyWiki `.tid` file directory source.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::source::{FragmentSource, RawFragment, StoreError, StoreErrorKind};
use crate::tags::parse_tag_list;
use crate::SYSTEM_PREFIX;

const BACKEND: &str = "Tid";

/// Reads every `.tid` file under a directory.
///
/// A `.tid` file is a block of `field: value` header lines, a blank line,
/// then the tiddler text. Only `title` is required.
#[derive(Debug, Clone)]
pub struct TidDirectory {
    dir: PathBuf,
    pattern: String,
}

impl TidDirectory {
    /// Read `**/*.tid` under `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pattern: "**/*.tid".to_owned(),
        }
    }

    /// Use a different glob pattern, relative to the directory.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    fn read_file(path: &Path) -> Result<Option<RawFragment>, StoreError> {
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::io(e, path).with_backend(BACKEND))?;
        parse_tid(&content).map_err(|e| e.with_backend(BACKEND).with_path(path))
    }
}

impl FragmentSource for TidDirectory {
    fn load(&self) -> Result<Vec<RawFragment>, StoreError> {
        if !self.dir.is_dir() {
            return Err(StoreError::new(StoreErrorKind::NotFound)
                .with_backend(BACKEND)
                .with_path(&self.dir));
        }
        let pattern = self.dir.join(&self.pattern);
        let paths = glob::glob(&pattern.to_string_lossy()).map_err(|e| {
            StoreError::invalid("bad file pattern")
                .with_source(e)
                .with_backend(BACKEND)
        })?;

        let mut fragments = Vec::new();
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(path = %e.path().display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if let Some(fragment) = Self::read_file(&path)? {
                fragments.push(fragment);
            }
        }
        fragments.sort_by(|a, b| a.title.cmp(&b.title));
        tracing::debug!(dir = %self.dir.display(), count = fragments.len(), "Loaded tid files");
        Ok(fragments)
    }

    fn describe(&self) -> String {
        format!("tid directory {}", self.dir.display())
    }
}

/// Parse one `.tid` file.
///
/// Returns `None` for system tiddlers and drafts.
fn parse_tid(content: &str) -> Result<Option<RawFragment>, StoreError> {
    let content = content.replace("\r\n", "\n");
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let (header, text) = match content.find("\n\n") {
        Some(pos) => (&content[..pos], &content[pos + 2..]),
        None => (content, ""),
    };

    let mut fields: HashMap<&str, &str> = HashMap::new();
    for line in header.lines() {
        if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.trim(), value.trim());
        }
    }

    let Some(title) = fields.get("title").filter(|t| !t.is_empty()) else {
        return Err(StoreError::invalid("missing title field"));
    };
    if title.starts_with(SYSTEM_PREFIX) || fields.contains_key("draft.of") {
        tracing::debug!(title, "Skipping system or draft tiddler");
        return Ok(None);
    }

    Ok(Some(RawFragment {
        title: (*title).to_owned(),
        tags: fields.get("tags").map(|t| parse_tag_list(t)).unwrap_or_default(),
        text: text.trim_end_matches('\n').to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_parse_tid() {
        let fragment = parse_tid(
            "created: 20150301\ntags: [[Ancient Rome]] :chapter\ntitle: The army\ntype: text/vnd.tiddlywiki\n\nLegions.\n\nCohorts.\n",
        )
        .unwrap()
        .unwrap();

        assert_eq!(fragment.title, "The army");
        assert_eq!(fragment.tags, vec!["Ancient Rome", ":chapter"]);
        assert_eq!(fragment.text, "Legions.\n\nCohorts.");
    }

    #[test]
    fn test_parse_tid_without_body() {
        let fragment = parse_tid("title: Empty").unwrap().unwrap();

        assert_eq!(fragment.text, "");
        assert!(fragment.tags.is_empty());
    }

    #[test]
    fn test_parse_tid_missing_title() {
        let err = parse_tid("tags: a\n\ntext").unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::InvalidFormat);
    }

    #[test]
    fn test_parse_tid_title_with_colon() {
        let fragment = parse_tid("title: fig: the map\n\nx").unwrap().unwrap();

        assert_eq!(fragment.title, "fig: the map");
    }

    #[test]
    fn test_parse_tid_skips_system_and_drafts() {
        assert!(parse_tid("title: $:/StoryList\n\n").unwrap().is_none());
        assert!(
            parse_tid("title: Draft of 'A'\ndraft.of: A\n\n")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_load_sorted_and_recursive() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "b.tid", "title: Beta\n\nb");
        write(temp.path(), "sub/a.tid", "title: Alpha\ntags: Beta\n\na");
        write(temp.path(), "notes.txt", "title: Ignored\n\nx");

        let fragments = TidDirectory::new(temp.path()).load().unwrap();

        let titles: Vec<_> = fragments.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);
        assert_eq!(fragments[0].tags, vec!["Beta"]);
    }

    #[test]
    fn test_load_missing_dir() {
        let temp = tempfile::tempdir().unwrap();

        let err = TidDirectory::new(temp.path().join("nope")).load().unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::NotFound);
    }

    #[test]
    fn test_load_reports_bad_file_path() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "bad.tid", "tags: x\n\nno title");

        let err = TidDirectory::new(temp.path()).load().unwrap_err();

        assert!(err.to_string().starts_with("[Tid] Invalid format: missing title field"));
        assert!(err.path.unwrap().ends_with("bad.tid"));
    }
}
