//! Table model shared by the TiddlyWiki, wiki and DocBook forms.
//!
//! A TiddlyWiki table is a run of `|`-delimited lines. It is parsed into a
//! [`Table`], written out as a wiki `{| ... |}` block, and later parsed back
//! from that block and rendered as a CALS table. Span markers only exist in
//! the TiddlyWiki form:
//!
//! - `>` merges the cell into the next real cell on its right (colspan)
//! - `~` merges the cell into the nearest eligible cell above it (rowspan)

use std::sync::LazyLock;

use regex::Regex;

use crate::MarkupError;

static TITLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|([^|]+)\|c$").expect("invalid title row regex"));

static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|(.+)\|(h?)$").expect("invalid row regex"));

static WIKI_ATTRS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^((?:\s*[a-z]+="[^"]*")+)\s*\|(.*)$"#).expect("invalid cell attributes regex")
});

static WIKI_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([a-z]+)="([^"]*)""#).expect("invalid attribute regex"));

/// Horizontal alignment of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "center" => Some(Self::Center),
            _ => None,
        }
    }

    /// Alignment from the padding around raw cell text.
    fn from_padding(raw: &str) -> Option<Self> {
        match (raw.starts_with(' '), raw.ends_with(' ')) {
            _ if raw.trim().is_empty() => None,
            (true, true) => Some(Self::Center),
            (true, false) => Some(Self::Right),
            (false, true) => Some(Self::Left),
            (false, false) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Content,
    ColspanMarker,
    RowspanMarker,
}

/// A single table cell.
///
/// `colspan` and `rowspan` use 0 for "not set" and 1 for "explicitly single".
/// Marker cells are kept in their row so column indices stay aligned with
/// the source, but they are never rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub align: Option<Align>,
    pub colspan: u32,
    pub rowspan: u32,
    role: Role,
}

impl Cell {
    /// A content cell with no spans.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            align: None,
            colspan: 0,
            rowspan: 0,
            role: Role::Content,
        }
    }

    #[must_use]
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    #[must_use]
    pub fn with_colspan(mut self, colspan: u32) -> Self {
        self.colspan = colspan;
        self
    }

    #[must_use]
    pub fn with_rowspan(mut self, rowspan: u32) -> Self {
        self.rowspan = rowspan;
        self
    }

    fn colspan_marker() -> Self {
        Self {
            colspan: 1,
            role: Role::ColspanMarker,
            ..Self::new("")
        }
    }

    fn rowspan_marker() -> Self {
        Self {
            rowspan: 1,
            role: Role::RowspanMarker,
            ..Self::new("")
        }
    }

    fn from_tiddly(raw: &str) -> Self {
        Self {
            align: Align::from_padding(raw),
            ..Self::new(raw.trim())
        }
    }

    /// Whether the cell is rendered. Span markers are not.
    #[must_use]
    pub fn is_content(&self) -> bool {
        self.role == Role::Content
    }

    fn extend_rowspan(&mut self) {
        if self.rowspan == 0 {
            self.rowspan = 1;
        }
        self.rowspan += 1;
    }

    fn wiki_attributes(&self) -> String {
        let mut attrs = Vec::new();
        if let Some(align) = self.align {
            attrs.push(format!("align=\"{}\"", align.as_str()));
        }
        if self.rowspan > 1 {
            attrs.push(format!("rowspan=\"{}\"", self.rowspan));
        }
        if self.colspan > 1 {
            attrs.push(format!("colspan=\"{}\"", self.colspan));
        }
        attrs.join(" ")
    }

    fn width(&self) -> usize {
        self.colspan.max(1) as usize
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub header: bool,
    pub cells: Vec<Cell>,
}

impl Row {
    /// Cells that are rendered, in order.
    pub fn content_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.is_content())
    }
}

/// A parsed table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub title: Option<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Parse a run of TiddlyWiki table lines.
    ///
    /// `fragment` names the owning fragment in error messages.
    pub fn parse_tiddly(fragment: &str, lines: &[&str]) -> Result<Self, MarkupError> {
        let mut table = Self::default();
        for line in lines {
            if let Some(caps) = TITLE_ROW.captures(line) {
                table.title = Some(caps[1].trim().to_owned());
                continue;
            }
            let Some(caps) = ROW.captures(line) else {
                return Err(MarkupError::MalformedTableRow {
                    title: fragment.to_owned(),
                    line: (*line).to_owned(),
                });
            };
            let header = !caps[2].is_empty();
            let cells = table.parse_tiddly_cells(fragment, line, &caps[1])?;
            table.rows.push(Row { header, cells });
        }
        Ok(table)
    }

    fn parse_tiddly_cells(
        &mut self,
        fragment: &str,
        line: &str,
        inner: &str,
    ) -> Result<Vec<Cell>, MarkupError> {
        let raw_cells = split_cells(inner);
        // Empty cells only hold their column in rows that carry span markers.
        let spanned = raw_cells
            .iter()
            .any(|raw| matches!(*raw, ">" | "&gt;" | "~"));
        let mut cells = Vec::new();
        let mut pending = 0;
        for (col, raw) in raw_cells
            .into_iter()
            .filter(|raw| spanned || !raw.is_empty())
            .enumerate()
        {
            match raw {
                ">" | "&gt;" => {
                    pending += 1;
                    cells.push(Cell::colspan_marker());
                }
                "~" => {
                    if !self.extend_rowspan_above(col) {
                        return Err(MarkupError::DanglingRowspan {
                            title: fragment.to_owned(),
                            line: line.to_owned(),
                        });
                    }
                    cells.push(Cell::rowspan_marker());
                }
                _ => {
                    let mut cell = Cell::from_tiddly(raw);
                    if pending > 0 {
                        cell.colspan = pending + 1;
                        pending = 0;
                    }
                    cells.push(cell);
                }
            }
        }
        if pending > 0 {
            tracing::debug!(fragment, line, "colspan marker at end of row ignored");
        }
        Ok(cells)
    }

    /// Extend the nearest cell above `col` whose rowspan is not pinned to 1.
    fn extend_rowspan_above(&mut self, col: usize) -> bool {
        for row in self.rows.iter_mut().rev() {
            match row.cells.get_mut(col) {
                Some(cell) if cell.rowspan != 1 => {
                    cell.extend_rowspan();
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    /// Parse a wiki `{| ... |}` block.
    pub fn parse_wiki(fragment: &str, block: &str) -> Result<Self, MarkupError> {
        let mut table = Self::default();
        let mut row = Row::default();
        for line in block.lines() {
            let line = line.trim_end_matches('\r');
            if line.starts_with("{|") {
                continue;
            }
            if line.starts_with("|}") || line.starts_with("|-") {
                if !row.cells.is_empty() {
                    table.rows.push(std::mem::take(&mut row));
                }
            } else if let Some(title) = line.strip_prefix("|+") {
                table.title = Some(title.trim().to_owned());
            } else if let Some(rest) = line.strip_prefix('!') {
                if row.cells.is_empty() {
                    row.header = true;
                }
                row.cells.push(parse_wiki_cell(rest));
            } else if let Some(rest) = line.strip_prefix('|') {
                row.cells.push(parse_wiki_cell(rest));
            } else {
                return Err(MarkupError::MalformedTableRow {
                    title: fragment.to_owned(),
                    line: line.to_owned(),
                });
            }
        }
        if !row.cells.is_empty() {
            table.rows.push(row);
        }
        Ok(table)
    }

    /// Number of columns, from the first header row or else the first row.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .find(|r| r.header)
            .or_else(|| self.rows.first())
            .map_or(0, |r| r.content_cells().map(Cell::width).sum())
            .max(1)
    }

    /// Render as a wiki table block, ending with a newline.
    #[must_use]
    pub fn to_wiki(&self) -> String {
        let mut out = String::from("{| class=\"wikitable\"\n");
        if let Some(title) = &self.title {
            out.push_str("|+");
            out.push_str(title);
            out.push('\n');
        }
        for (idx, row) in self.rows.iter().enumerate() {
            if idx > 0 || self.title.is_some() {
                out.push_str("|-\n");
            }
            let marker = if row.header { '!' } else { '|' };
            for cell in row.content_cells() {
                out.push(marker);
                let attrs = cell.wiki_attributes();
                if !attrs.is_empty() {
                    out.push_str(&attrs);
                    out.push('|');
                } else if cell.text.starts_with(['+', '-', '}']) {
                    // keep the line from reading as a title or row marker
                    out.push(' ');
                }
                out.push_str(&cell.text);
                out.push('\n');
            }
        }
        out.push_str("|}\n");
        out
    }

    /// Render as a CALS table.
    ///
    /// Titled tables become `<table>`, untitled ones `<informaltable>`.
    #[must_use]
    pub fn to_docbook(&self) -> String {
        let cols = self.column_count();
        let mut out = match &self.title {
            Some(title) => format!("<table frame=\"all\">\n<title>{title}</title>\n"),
            None => "<informaltable frame=\"all\">\n".to_owned(),
        };
        out.push_str(&format!(
            "<tgroup cols=\"{cols}\" align=\"left\" rowsep=\"1\">\n"
        ));
        for n in 1..=cols {
            out.push_str(&format!("<colspec colnum=\"{n}\" colname=\"c{n}\"/>\n"));
        }

        let (head, body): (Vec<&Row>, Vec<&Row>) = self.rows.iter().partition(|r| r.header);
        let (head, body) = if body.is_empty() {
            (Vec::new(), head)
        } else {
            (head, body)
        };
        let mut occupied = vec![0; cols];
        if !head.is_empty() {
            out.push_str("<thead>\n");
            for row in head {
                out.push_str(&docbook_row(row, &mut occupied));
            }
            out.push_str("</thead>\n");
        }
        out.push_str("<tbody>\n");
        for row in body {
            out.push_str(&docbook_row(row, &mut occupied));
        }
        out.push_str("</tbody>\n</tgroup>\n");
        out.push_str(if self.title.is_some() {
            "</table>\n"
        } else {
            "</informaltable>\n"
        });
        out
    }
}

/// Render one row. `occupied` holds, per column, how many more rows are
/// covered by a vertical span from above.
fn docbook_row(row: &Row, occupied: &mut Vec<u32>) -> String {
    let mut next: Vec<u32> = occupied.iter().map(|n| n.saturating_sub(1)).collect();
    let mut out = String::from("<row>\n");
    let mut col = 0;
    for cell in row.content_cells() {
        while occupied.get(col).is_some_and(|n| *n > 0) {
            col += 1;
        }
        let width = cell.width();
        let mut attrs = String::new();
        if cell.colspan > 1 {
            attrs.push_str(&format!(
                " namest=\"c{}\" nameend=\"c{}\"",
                col + 1,
                col + width
            ));
        }
        if cell.rowspan > 1 {
            attrs.push_str(&format!(
                " morerows=\"{}\" valign=\"middle\"",
                cell.rowspan - 1
            ));
            for slot in next.iter_mut().skip(col).take(width) {
                *slot = cell.rowspan - 1;
            }
        }
        if let Some(align) = cell.align {
            attrs.push_str(&format!(" align=\"{}\"", align.as_str()));
        }
        out.push_str(&format!("<entry{attrs}>{}</entry>\n", cell.text));
        col += width;
    }
    out.push_str("</row>\n");
    *occupied = next;
    out
}

fn parse_wiki_cell(rest: &str) -> Cell {
    let Some(caps) = WIKI_ATTRS.captures(rest) else {
        return Cell::new(rest.trim());
    };
    let mut cell = Cell::new(caps[2].trim());
    for attr in WIKI_ATTR.captures_iter(&caps[1]) {
        match &attr[1] {
            "align" => cell.align = Align::parse(&attr[2]),
            "colspan" => cell.colspan = attr[2].parse().unwrap_or(0),
            "rowspan" => cell.rowspan = attr[2].parse().unwrap_or(0),
            _ => {}
        }
    }
    cell
}

/// Split the inside of a row on `|`, ignoring separators inside `[[...]]`.
fn split_cells(inner: &str) -> Vec<&str> {
    let bytes = inner.as_bytes();
    let mut cells = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' if bytes.get(i + 1) == Some(&b'[') => {
                depth += 1;
                i += 1;
            }
            b']' if depth > 0 && bytes.get(i + 1) == Some(&b']') => {
                depth -= 1;
                i += 1;
            }
            b'|' if depth == 0 => {
                cells.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    cells.push(&inner[start..]);
    cells
}

/// Replace every TiddlyWiki table run in `text` with a wiki table block.
///
/// Existing wiki `{| ... |}` blocks are passed through untouched.
pub fn translate_tiddly_tables(fragment: &str, text: &str) -> Result<String, MarkupError> {
    let mut out: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();
    let mut in_wiki_table = false;

    for line in text.split('\n') {
        if in_wiki_table {
            in_wiki_table = !line.starts_with("|}");
            out.push(line.to_owned());
            continue;
        }
        if line.starts_with('|') {
            run.push(line);
            continue;
        }
        if !run.is_empty() {
            let table = Table::parse_tiddly(fragment, &run)?;
            out.push(table.to_wiki().trim_end_matches('\n').to_owned());
            run.clear();
        }
        in_wiki_table = line.starts_with("{|");
        out.push(line.to_owned());
    }
    if !run.is_empty() {
        let table = Table::parse_tiddly(fragment, &run)?;
        out.push(table.to_wiki());
    }
    Ok(out.join("\n"))
}

/// Replace every wiki `{| ... |}` block in `text` with a CALS table.
pub fn wiki_tables_to_docbook(fragment: &str, text: &str) -> Result<String, MarkupError> {
    let mut out = String::with_capacity(text.len());
    let mut block: Option<String> = None;

    for line in text.split_inclusive('\n') {
        match block.as_mut() {
            Some(buf) => {
                buf.push_str(line);
                if line.starts_with("|}") {
                    let table = Table::parse_wiki(fragment, buf)?;
                    out.push_str(&table.to_docbook());
                    block = None;
                }
            }
            None if line.starts_with("{|") => block = Some(line.to_owned()),
            None => out.push_str(line),
        }
    }
    if let Some(buf) = block {
        tracing::warn!(fragment, "unterminated table");
        let table = Table::parse_wiki(fragment, &buf)?;
        out.push_str(&table.to_docbook());
    }
    Ok(out)
}
