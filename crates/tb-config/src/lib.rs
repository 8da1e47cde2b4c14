//! Configuration management for TiddlyBook.
//!
//! Parses `tiddlybook.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `book.title`
//! - `book.subtitle`
//! - `book.legal_notice`
//! - `source.path`
//! - `images.dir`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the two-letter language code.
    pub language: Option<String>,
    /// Override the tiddler source (directory of `.tid` files or JSON export).
    pub source: Option<PathBuf>,
    /// Override the title of the root tiddler.
    pub root: Option<String>,
    /// Override the image directory.
    pub image_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tiddlybook.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Book front matter and structure.
    pub book: BookConfig,
    /// Tiddler source (path is a relative string from TOML).
    source: SourceConfigRaw,
    /// Image lookup (path is a relative string from TOML).
    images: ImagesConfigRaw,

    /// Resolved source configuration (set after loading).
    #[serde(skip)]
    pub source_resolved: SourceConfig,
    /// Resolved image directory (set after loading).
    #[serde(skip)]
    pub image_dir: Option<PathBuf>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[book]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Book title.
    pub title: String,
    /// Book subtitle.
    pub subtitle: Option<String>,
    /// Two-letter language code.
    pub language: String,
    /// Source title of the root tiddler. Without it, the tiddler with an
    /// empty title is the root.
    pub root: Option<String>,
    /// Publication date.
    pub pubdate: Option<String>,
    /// Legal notice text.
    pub legal_notice: Option<String>,
    /// Book authors, in display order.
    pub authors: Vec<AuthorConfig>,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: None,
            language: "en".to_owned(),
            root: None,
            pubdate: None,
            legal_notice: None,
            authors: Vec::new(),
        }
    }
}

/// One `[[book.authors]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorConfig {
    /// Given name.
    pub firstname: String,
    /// Family name.
    pub surname: String,
    /// Mail address, `(at)` spelling accepted.
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthorConfig {
    /// Mail address with the `(at)` obfuscation undone.
    ///
    /// ```
    /// # use tb_config::AuthorConfig;
    /// let author = AuthorConfig {
    ///     firstname: "Ada".to_owned(),
    ///     surname: "Lovelace".to_owned(),
    ///     email: Some("ada (at) example.org".to_owned()),
    /// };
    /// assert_eq!(author.email_address().as_deref(), Some("ada@example.org"));
    /// ```
    #[must_use]
    pub fn email_address(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(|mail| mail.replace(" (at) ", "@").replace("(at)", "@"))
    }
}

/// Kind of tiddler source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Directory of `.tid` files.
    Tid,
    /// TiddlyWiki JSON export.
    Json,
}

impl SourceFormat {
    /// Guess the format from a path: a `.json` file is an export, anything
    /// else a tiddler directory.
    #[must_use]
    pub fn infer(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Tid,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SourceConfigRaw {
    path: Option<String>,
    format: Option<SourceFormat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImagesConfigRaw {
    dir: Option<String>,
}

/// Resolved tiddler source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Absolute path to the directory or export file.
    pub path: PathBuf,
    /// Source format, explicit or inferred from `path`.
    pub format: SourceFormat,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tiddlers"),
            format: SourceFormat::Tid,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`book.title`").
        field: String,
        /// Error message (e.g., "${`BOOK_TITLE`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `tiddlybook.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(language) = &settings.language {
            self.book.language.clone_from(language);
        }
        if let Some(source) = &settings.source {
            self.source_resolved = SourceConfig {
                path: source.clone(),
                format: SourceFormat::infer(source),
            };
        }
        if let Some(root) = &settings.root {
            self.book.root = Some(root.clone());
        }
        if let Some(image_dir) = &settings.image_dir {
            self.image_dir = Some(image_dir.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            source_resolved: SourceConfig {
                path: base.join("tiddlers"),
                format: SourceFormat::Tid,
            },
            ..Self::default()
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.book.title, "book.title")?;
        self.validate_language()?;
        self.validate_authors()?;
        if let Some(root) = &self.book.root {
            require_non_empty(root, "book.root")?;
        }
        Ok(())
    }

    fn validate_language(&self) -> Result<(), ConfigError> {
        let code = &self.book.language;
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Validation(format!(
                "book.language must be a two-letter code, got \"{code}\""
            )));
        }
        Ok(())
    }

    fn validate_authors(&self) -> Result<(), ConfigError> {
        for (i, author) in self.book.authors.iter().enumerate() {
            require_non_empty(&author.surname, &format!("book.authors[{i}].surname"))?;
            if let Some(mail) = author.email_address()
                && !mail.contains('@')
            {
                return Err(ConfigError::Validation(format!(
                    "book.authors[{i}].email is not a mail address: {mail}"
                )));
            }
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.book.title = expand::expand_env(&self.book.title, "book.title")?;
        expand::expand_opt(&mut self.book.subtitle, "book.subtitle")?;
        expand::expand_opt(&mut self.book.legal_notice, "book.legal_notice")?;
        expand::expand_opt(&mut self.source.path, "source.path")?;
        expand::expand_opt(&mut self.images.dir, "images.dir")?;
        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let path = config_dir.join(self.source.path.as_deref().unwrap_or("tiddlers"));
        let format = self
            .source
            .format
            .unwrap_or_else(|| SourceFormat::infer(&path));
        self.source_resolved = SourceConfig { path, format };
        self.image_dir = self.images.dir.as_deref().map(|d| config_dir.join(d));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.book.language, "en");
        assert_eq!(config.book.root, None);
        assert_eq!(
            config.source_resolved,
            SourceConfig {
                path: PathBuf::from("/test/tiddlers"),
                format: SourceFormat::Tid,
            }
        );
        assert_eq!(config.image_dir, None);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.book.title, "");
        assert_eq!(config.book.language, "en");
        assert!(config.book.authors.is_empty());
    }

    #[test]
    fn test_parse_book_section() {
        let toml = r#"
[book]
title = "Field Manual"
subtitle = "Second edition"
language = "fr"
root = "Accueil"
pubdate = "2024"
legal_notice = "CC BY-SA"

[[book.authors]]
firstname = "Ada"
surname = "Lovelace"
email = "ada (at) example.org"

[[book.authors]]
firstname = "Alan"
surname = "Turing"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.book.title, "Field Manual");
        assert_eq!(config.book.subtitle.as_deref(), Some("Second edition"));
        assert_eq!(config.book.language, "fr");
        assert_eq!(config.book.root.as_deref(), Some("Accueil"));
        assert_eq!(config.book.authors.len(), 2);
        assert_eq!(
            config.book.authors[0].email_address().as_deref(),
            Some("ada@example.org")
        );
        assert_eq!(config.book.authors[1].email, None);
        config.validate().unwrap();
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[book]
title = "T"

[source]
path = "wiki/export.json"

[images]
dir = "pictures"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.source_resolved,
            SourceConfig {
                path: PathBuf::from("/project/wiki/export.json"),
                format: SourceFormat::Json,
            }
        );
        assert_eq!(config.image_dir, Some(PathBuf::from("/project/pictures")));
    }

    #[test]
    fn test_explicit_format_wins() {
        let toml = r#"
[source]
path = "dump.json"
format = "tid"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/p"));
        assert_eq!(config.source_resolved.format, SourceFormat::Tid);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let toml = r#"
[source]
format = "html"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_requires_title() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("book.title"));
    }

    #[test]
    fn test_validate_language_code() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.book.title = "T".to_owned();
        config.book.language = "eng".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("two-letter"));

        config.book.language = "es".to_owned();
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_author_email() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.book.title = "T".to_owned();
        config.book.authors.push(AuthorConfig {
            firstname: "A".to_owned(),
            surname: "B".to_owned(),
            email: Some("nobody".to_owned()),
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("book.authors[0].email"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            language: Some("es".to_owned()),
            source: Some(PathBuf::from("/data/book.json")),
            root: Some("Start".to_owned()),
            image_dir: Some(PathBuf::from("/data/img")),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.book.language, "es");
        assert_eq!(config.book.root.as_deref(), Some("Start"));
        assert_eq!(config.source_resolved.format, SourceFormat::Json);
        assert_eq!(config.image_dir, Some(PathBuf::from("/data/img")));
    }

    #[test]
    fn test_apply_cli_settings_partial() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings {
            root: Some("Start".to_owned()),
            ..Default::default()
        });
        assert_eq!(config.book.language, "en");
        assert_eq!(config.source_resolved.path, PathBuf::from("/test/tiddlers"));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/tiddlybook.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[book]\ntitle = \"Handbook\"\n\n[source]\npath = \"tids\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.book.title, "Handbook");
        assert_eq!(config.source_resolved.path, dir.path().join("tids"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_from_file_runs_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[book]\nlanguage = \"fr\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
