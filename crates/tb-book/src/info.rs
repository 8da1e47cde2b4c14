//! Book front matter.

use std::sync::LazyLock;

use quick_xml::escape::{escape, unescape};
use regex::{Captures, Regex};
use serde::Serialize;

use crate::Book;

static LICENSE_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^; *[Ll]icen[cs]e\b").expect("invalid license regex"));

static AUTHORS_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^; *[Aa]uthors?\b").expect("invalid authors regex"));

static DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^: *").expect("invalid definition regex"));

static QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'{2,}").expect("invalid quotes regex"));

static INTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^|\]]+)(?:\|([^\]]+))?\]\]").expect("invalid link regex")
});

static EXTERNAL_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\S+\s+([^\]]+)\]").expect("invalid external link regex"));

static AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" *\(at\) *").expect("invalid at regex"));

static RELEASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\|(\d+\.\d+\.\d+)$").expect("invalid release regex"));

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\|(\d+/\d+/\d+)$").expect("invalid date regex"));

/// Titles of the fragment holding the version history.
const VERSION_TITLES: [&str; 2] = ["Version", "version"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Author {
    pub firstname: String,
    pub surname: String,
    pub email: Option<String>,
}

impl Author {
    #[must_use]
    pub fn new(firstname: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            firstname: firstname.into(),
            surname: surname.into(),
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Title page data of the DocBook `<info>` block. Values are plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookInfo {
    pub title: String,
    pub subtitle: Option<String>,
    pub authors: Vec<Author>,
    pub pubdate: Option<String>,
    pub releaseinfo: Option<String>,
    pub legal_notice: Option<String>,
}

impl BookInfo {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: Author) -> Self {
        self.authors.push(author);
        self
    }

    #[must_use]
    pub fn with_pubdate(mut self, pubdate: impl Into<String>) -> Self {
        self.pubdate = Some(pubdate.into());
        self
    }

    #[must_use]
    pub fn with_legal_notice(mut self, notice: impl Into<String>) -> Self {
        self.legal_notice = Some(notice.into());
        self
    }

    /// Front matter found in the book itself.
    ///
    /// Authors and license come from the root's `;Authors` and `;License`
    /// definitions, the release number and publication date from the first
    /// matching lines of the `Version` table.
    #[must_use]
    pub fn harvest(book: &Book) -> Self {
        let mut info = Self::default();
        if let Some(root) = book.root() {
            info.harvest_root(root.body());
        }
        if let Some(version) = VERSION_TITLES.iter().find_map(|t| book.get(t)) {
            info.releaseinfo = RELEASE
                .captures(version.body())
                .map(|caps| caps[1].to_owned());
            info.pubdate = DATE.captures(version.body()).map(|caps| caps[1].to_owned());
        }
        info
    }

    /// Fill every field left unset with what [`BookInfo::harvest`] finds.
    #[must_use]
    pub fn or_harvested(self, book: &Book) -> Self {
        let found = Self::harvest(book);
        Self {
            title: self.title,
            subtitle: self.subtitle,
            authors: if self.authors.is_empty() {
                found.authors
            } else {
                self.authors
            },
            pubdate: self.pubdate.or(found.pubdate),
            releaseinfo: self.releaseinfo.or(found.releaseinfo),
            legal_notice: self.legal_notice.or(found.legal_notice),
        }
    }

    fn harvest_root(&mut self, body: &str) {
        let mut in_authors = false;
        let mut in_license = false;
        for line in body.lines() {
            if in_license {
                if DEFINITION.is_match(line) {
                    self.legal_notice = Some(plain_text(&DEFINITION.replace(line, "")));
                }
                in_license = false;
            } else if in_authors && DEFINITION.is_match(line) {
                if let Some(author) = parse_author(&DEFINITION.replace(line, "")) {
                    self.authors.push(author);
                }
            } else {
                in_license = LICENSE_TERM.is_match(line);
                in_authors = AUTHORS_TERM.is_match(line);
            }
        }
    }

    /// Append the `<info>` element.
    pub(crate) fn write_docbook(&self, out: &mut String) {
        out.push_str("  <info>\n");
        push_element(out, "    ", "title", Some(&self.title));
        push_element(out, "    ", "subtitle", self.subtitle.as_deref());
        for author in &self.authors {
            out.push_str("    <author>\n      <personname>\n");
            push_element(out, "        ", "firstname", Some(&author.firstname));
            push_element(out, "        ", "surname", Some(&author.surname));
            out.push_str("      </personname>\n");
            if let Some(email) = author.email.as_deref().filter(|e| !e.is_empty()) {
                out.push_str(&format!(
                    "      <affiliation>\n        <address><email>{}</email></address>\n      </affiliation>\n",
                    escape(email)
                ));
            }
            out.push_str("    </author>\n");
        }
        push_element(out, "    ", "pubdate", self.pubdate.as_deref());
        push_element(out, "    ", "releaseinfo", self.releaseinfo.as_deref());
        if let Some(notice) = self.legal_notice.as_deref().filter(|n| !n.trim().is_empty()) {
            out.push_str(&format!(
                "    <legalnotice>\n      <para>{}</para>\n    </legalnotice>\n",
                escape(notice)
            ));
        }
        out.push_str("  </info>\n");
    }
}

fn push_element(out: &mut String, indent: &str, name: &str, text: Option<&str>) {
    if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
        out.push_str(&format!("{indent}<{name}>{}</{name}>\n", escape(text)));
    }
}

/// `First '''Last''' mail` as written in the root's author list.
fn parse_author(line: &str) -> Option<Author> {
    let mut parts = line.split("'''");
    let firstname = plain_text(parts.next()?);
    let surname = plain_text(parts.next()?);
    if surname.is_empty() {
        return None;
    }
    let email = parts
        .next()
        .map(|rest| AT.replace_all(&plain_text(rest), "@").into_owned())
        .filter(|e| !e.is_empty());
    Some(Author {
        firstname,
        surname,
        email,
    })
}

/// Strip wiki markup from harvested text and undo source escaping.
fn plain_text(wiki: &str) -> String {
    let text = QUOTES.replace_all(wiki, "");
    let text = INTERNAL_LINK.replace_all(&text, |caps: &Captures<'_>| {
        caps.get(2)
            .or_else(|| caps.get(1))
            .map_or("", |m| m.as_str())
            .to_owned()
    });
    let text = EXTERNAL_LINK.replace_all(&text, "$1");
    let text = text.trim();
    unescape(text).map_or_else(|_| text.to_owned(), std::borrow::Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tb_markup::Locale;
    use tb_store::RawFragment;

    use super::*;
    use crate::BookOptions;

    fn book(root: &str, version: Option<&str>) -> Book {
        let mut raw = vec![RawFragment::new("Home", &[], root)];
        if let Some(text) = version {
            raw.push(RawFragment::new("Version", &["Home"], text));
        }
        Book::from_fragments(raw, &BookOptions::new(Locale::En).with_root_alias("Home")).unwrap()
    }

    #[test]
    fn test_harvest_authors_and_license() {
        let book = book(
            "Welcome.\n\n;Authors\n:Jean ''Dupont'' jean (at) example.org\n:Ada ''Byron''\n;License\n:[[GPL|https://www.gnu.org/licenses/gpl.html]] & co\n",
            None,
        );

        let info = BookInfo::harvest(&book);

        assert_eq!(
            info.authors,
            vec![
                Author::new("Jean", "Dupont").with_email("jean@example.org"),
                Author::new("Ada", "Byron"),
            ]
        );
        assert_eq!(info.legal_notice.as_deref(), Some("GPL & co"));
    }

    #[test]
    fn test_harvest_version_table() {
        let book = book(
            "root",
            Some("|version|date|h\n|1.2.0|3/4/2015|\n|1.1.0|1/1/2014|\n"),
        );

        let info = BookInfo::harvest(&book);

        assert_eq!(info.releaseinfo.as_deref(), Some("1.2.0"));
        assert_eq!(info.pubdate.as_deref(), Some("3/4/2015"));
    }

    #[test]
    fn test_configured_values_win() {
        let book = book(";Authors\n:Jean ''Dupont''\n", Some("|1.0.0|\n|2/2/2020|\n"));

        let info = BookInfo::new("Manual")
            .with_pubdate("2024")
            .or_harvested(&book);

        assert_eq!(info.title, "Manual");
        assert_eq!(info.pubdate.as_deref(), Some("2024"));
        assert_eq!(info.releaseinfo.as_deref(), Some("1.0.0"));
        assert_eq!(info.authors, vec![Author::new("Jean", "Dupont")]);
    }

    #[test]
    fn test_write_docbook_escapes_and_skips_empty() {
        let info = BookInfo::new("Tom & Jerry")
            .with_author(Author::new("Tom", "Cat").with_email("tom@example.org"));

        let mut out = String::new();
        info.write_docbook(&mut out);

        assert_eq!(
            out,
            "  <info>\n    <title>Tom &amp; Jerry</title>\n    <author>\n      <personname>\n        <firstname>Tom</firstname>\n        <surname>Cat</surname>\n      </personname>\n      <affiliation>\n        <address><email>tom@example.org</email></address>\n      </affiliation>\n    </author>\n  </info>\n"
        );
    }
}
