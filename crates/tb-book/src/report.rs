//! Categorized validation report.

use std::fmt;

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

/// Validation category, in the order categories are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tagging,
    SequentialReading,
    OrphanLink,
    Entity,
    Picture,
}

impl Category {
    /// All categories, in checking order.
    pub const ALL: [Self; 5] = [
        Self::Tagging,
        Self::SequentialReading,
        Self::OrphanLink,
        Self::Entity,
        Self::Picture,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tagging => "Tagging Error",
            Self::SequentialReading => "Sequential Reading Error",
            Self::OrphanLink => "Orphan Link Error",
            Self::Entity => "Entity Error",
            Self::Picture => "Picture Description Error",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks output.
    Fatal,
    /// Reported only.
    Advisory,
}

/// One inconsistency in the document graph.
///
/// Titles are display titles: the root appears under its configured alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Issue {
    /// A fragment outside the book with no tag naming another fragment.
    Untagged { title: String },
    /// A `:kind` tag outside the known vocabulary.
    BadFormatTag { tag: String, titles: Vec<String> },
    /// A tag naming a fragment that does not exist.
    NonexistentTag { tag: String, titles: Vec<String> },
    /// A fragment never reached from the root.
    NotIncluded { title: String },
    /// A fragment listed by a second parent. `first` is `None` when the
    /// fragment is the root.
    RepeatedInclusion {
        title: String,
        first: Option<String>,
        second: String,
    },
    /// An ordering list entry naming no fragment.
    UnknownReference { title: String, parent: String },
    /// An ordering list entry naming an immediate fragment.
    LinkingImmediate { title: String, parent: String },
    /// A fragment not tagged with the parent that includes it.
    MissingParentTag { title: String, parent: String },
    SelfTag { title: String },
    NoRoot,
    /// A link to a fragment that does not exist.
    OrphanLink { target: String, titles: Vec<String> },
    UnsupportedEntity { name: String },
    MissingImageTitle { title: String, file: String },
    MissingImageFile { title: String, file: String },
    /// A `fig:` fragment without an image.
    MissingFigure { title: String },
}

impl Issue {
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::Untagged { .. } | Self::BadFormatTag { .. } | Self::NonexistentTag { .. } => {
                Category::Tagging
            }
            Self::NotIncluded { .. }
            | Self::RepeatedInclusion { .. }
            | Self::UnknownReference { .. }
            | Self::LinkingImmediate { .. }
            | Self::MissingParentTag { .. }
            | Self::SelfTag { .. }
            | Self::NoRoot => Category::SequentialReading,
            Self::OrphanLink { .. } => Category::OrphanLink,
            Self::UnsupportedEntity { .. } => Category::Entity,
            Self::MissingImageTitle { .. }
            | Self::MissingImageFile { .. }
            | Self::MissingFigure { .. } => Category::Picture,
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingParentTag { .. }
            | Self::SelfTag { .. }
            | Self::MissingImageFile { .. }
            | Self::MissingFigure { .. } => Severity::Advisory,
            _ => Severity::Fatal,
        }
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Name the issue is about, used for ordering within a category.
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::Untagged { title }
            | Self::NotIncluded { title }
            | Self::RepeatedInclusion { title, .. }
            | Self::UnknownReference { title, .. }
            | Self::LinkingImmediate { title, .. }
            | Self::MissingParentTag { title, .. }
            | Self::SelfTag { title }
            | Self::MissingImageTitle { title, .. }
            | Self::MissingImageFile { title, .. }
            | Self::MissingFigure { title } => title,
            Self::BadFormatTag { tag, .. } | Self::NonexistentTag { tag, .. } => tag,
            Self::OrphanLink { target, .. } => target,
            Self::UnsupportedEntity { name } => name,
            Self::NoRoot => "",
        }
    }
}

fn quote_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Untagged { title } => write!(f, "tiddler without real tag: \"{title}\""),
            Self::BadFormatTag { tag, titles } => write!(
                f,
                "unknown format tag \"{tag}\" occurs in {}",
                quote_list(titles)
            ),
            Self::NonexistentTag { tag, titles } => write!(
                f,
                "tiddler \"{tag}\" does not exist but is tagged by {}",
                quote_list(titles)
            ),
            Self::NotIncluded { title } => write!(f, "not included: \"{title}\""),
            Self::RepeatedInclusion {
                title,
                first: Some(first),
                second,
            } => write!(
                f,
                "tiddler \"{title}\" included twice, first by \"{first}\" and then by \"{second}\""
            ),
            Self::RepeatedInclusion {
                title,
                first: None,
                second,
            } => write!(
                f,
                "tiddler \"{title}\" is the initial tiddler but is included by \"{second}\""
            ),
            Self::UnknownReference { title, parent } => write!(
                f,
                "unknown tiddler \"{title}\" in sequence of tiddler \"{parent}\""
            ),
            Self::LinkingImmediate { title, parent } => write!(
                f,
                "immediate tiddler \"{title}\" in sequence of tiddler \"{parent}\""
            ),
            Self::MissingParentTag { title, parent } => write!(
                f,
                "missing parent tag: \"{title}\" is not tagged \"{parent}\""
            ),
            Self::SelfTag { title } => write!(f, "tiddler \"{title}\" tags itself"),
            Self::NoRoot => f.write_str("no initial tiddler"),
            Self::OrphanLink { target, titles } => match titles.as_slice() {
                [one] => write!(f, "orphan link \"{target}\" in \"{one}\""),
                many => write!(
                    f,
                    "orphan link \"{target}\" in {} tiddlers: {}",
                    many.len(),
                    quote_list(many)
                ),
            },
            Self::UnsupportedEntity { name } => write!(f, "unsupported entity &{name};"),
            Self::MissingImageTitle { title, file } => write!(
                f,
                "no alt title for picture file \"{file}\" in tiddler \"{title}\""
            ),
            Self::MissingImageFile { title, file } => {
                write!(f, "file not found in tiddler \"{title}\": \"{file}\"")
            }
            Self::MissingFigure { title } => write!(f, "no picture in tiddler \"{title}\""),
        }
    }
}

/// Every issue found in a book, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<Issue>,
}

impl ValidationReport {
    /// Build a report, ordering issues by category, then case-insensitively
    /// by subject.
    #[must_use]
    pub fn new(mut issues: Vec<Issue>) -> Self {
        issues.sort_by_cached_key(|issue| (issue.category(), issue.subject().to_lowercase()));
        Self { issues }
    }

    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.category() == category)
    }

    /// First category, in checking order, holding a fatal issue.
    #[must_use]
    pub fn first_fatal(&self) -> Option<Category> {
        self.issues
            .iter()
            .find(|issue| issue.is_fatal())
            .map(Issue::category)
    }

    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.first_fatal().is_some()
    }

    /// Restrict the report to one category.
    #[must_use]
    pub fn only(&self, category: Category) -> Self {
        Self {
            issues: self.in_category(category).cloned().collect(),
        }
    }
}

#[derive(Serialize)]
struct Entry<'a> {
    category: Category,
    severity: Severity,
    message: String,
    #[serde(flatten)]
    issue: &'a Issue,
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.issues.len()))?;
        for issue in &self.issues {
            seq.serialize_element(&Entry {
                category: issue.category(),
                severity: issue.severity(),
                message: issue.to_string(),
                issue,
            })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_orders_by_category_then_subject() {
        let report = ValidationReport::new(vec![
            Issue::UnsupportedEntity {
                name: "bogus".to_owned(),
            },
            Issue::NotIncluded {
                title: "beta".to_owned(),
            },
            Issue::NotIncluded {
                title: "Alpha".to_owned(),
            },
            Issue::Untagged {
                title: "zeta".to_owned(),
            },
        ]);

        let subjects: Vec<_> = report.issues().iter().map(Issue::subject).collect();
        assert_eq!(subjects, ["zeta", "Alpha", "beta", "bogus"]);
        assert_eq!(report.first_fatal(), Some(Category::Tagging));
    }

    #[test]
    fn test_advisories_are_not_fatal() {
        let report = ValidationReport::new(vec![
            Issue::MissingParentTag {
                title: "B".to_owned(),
                parent: "Home".to_owned(),
            },
            Issue::MissingImageFile {
                title: "B".to_owned(),
                file: "b.png".to_owned(),
            },
        ]);
        assert!(!report.is_empty());
        assert!(!report.has_fatal());
    }

    #[test]
    fn test_missing_image_title_is_fatal() {
        let issue = Issue::MissingImageTitle {
            title: "Map".to_owned(),
            file: "gaul.svg".to_owned(),
        };
        assert_eq!(issue.severity(), Severity::Fatal);
        assert_eq!(issue.category(), Category::Picture);
        assert_eq!(
            issue.to_string(),
            "no alt title for picture file \"gaul.svg\" in tiddler \"Map\""
        );
    }

    #[test]
    fn test_messages() {
        let repeated = Issue::RepeatedInclusion {
            title: "T".to_owned(),
            first: Some("P1".to_owned()),
            second: "P2".to_owned(),
        };
        assert_eq!(
            repeated.to_string(),
            "tiddler \"T\" included twice, first by \"P1\" and then by \"P2\""
        );

        let orphan = Issue::OrphanLink {
            target: "Nowhere".to_owned(),
            titles: vec!["A".to_owned(), "B".to_owned()],
        };
        assert_eq!(
            orphan.to_string(),
            "orphan link \"Nowhere\" in 2 tiddlers: \"A\", \"B\""
        );
    }

    #[test]
    fn test_only_category() {
        let report = ValidationReport::new(vec![
            Issue::NoRoot,
            Issue::MissingFigure {
                title: "fig:map".to_owned(),
            },
        ]);
        let pictures = report.only(Category::Picture);
        assert_eq!(pictures.issues().len(), 1);
        assert!(!pictures.has_fatal());
    }

    #[test]
    fn test_serialize_json() {
        let report = ValidationReport::new(vec![Issue::SelfTag {
            title: "Loop".to_owned(),
        }]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "category": "sequential_reading",
                "severity": "advisory",
                "message": "tiddler \"Loop\" tags itself",
                "issue": "self_tag",
                "title": "Loop",
            }])
        );
    }
}
