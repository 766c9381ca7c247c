//! Template-preserving cell patcher for `.xlsx` workbooks.
//!
//! A workbook is a zip archive of XML parts. Patching rewrites only the
//! targeted `<c>` elements of one worksheet part and keeps each cell's style
//! index. Every other part is copied through byte for byte, so borders,
//! fonts, merged ranges and formulas of the template survive untouched.

use crate::errors::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fmt,
    io::{Cursor, Read, Write},
    str::FromStr,
    sync::LazyLock,
};
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const CALC_CHAIN_PART: &str = "xl/calcChain.xml";

const MAX_COLUMN: u32 = 16_384;
const MAX_ROW: u32 = 1_048_576;

static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<row\b[^>]*?(?:/>|>.*?</row>)").expect("row pattern"));
static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<c\b[^>]*?(?:/>|>.*?</c>)").expect("cell pattern"));
static SHEET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<sheet\b[^>]*>").expect("sheet pattern"));
static RELATIONSHIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Relationship\b[^>]*>").expect("relationship pattern"));
static CALC_CHAIN_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:Override|Relationship)\b[^>]*calcChain[^>]*/>").expect("calc chain pattern")
});

/// A cell address such as `AD37`. Column and row are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct CellRef {
    /// 1-based column index (`A` = 1)
    pub column: u32,
    /// 1-based row number
    pub row: u32,
}

impl CellRef {
    /// Builds a reference from 1-based column and row.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('$');
        let split = trimmed
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (letters, digits) = trimmed.split_at(split);
        let digits = digits.trim_start_matches('$');

        let column = column_index(letters);
        let row = digits.parse::<u32>().ok().filter(|r| (1..=MAX_ROW).contains(r));
        match (column, row) {
            (Some(column), Some(row)) => Ok(Self { column, row }),
            _ => Err(Error::Config {
                message: format!("'{s}' is not a valid cell address"),
            }),
        }
    }
}

impl TryFrom<String> for CellRef {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.column), self.row)
    }
}

/// A bare column such as `P`, used by line-item listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct ColumnRef(u32);

impl ColumnRef {
    /// The cell of this column on `row`.
    #[must_use]
    pub const fn at(self, row: u32) -> CellRef {
        CellRef::new(self.0, row)
    }
}

impl FromStr for ColumnRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        column_index(s.trim()).map(Self).ok_or_else(|| Error::Config {
            message: format!("'{s}' is not a valid column"),
        })
    }
}

impl TryFrom<String> for ColumnRef {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Converts column letters (`"AD"`) to a 1-based index (`30`).
#[must_use]
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 || !letters.chars().all(|c| c.is_ascii_alphabetic())
    {
        return None;
    }
    let index = letters
        .bytes()
        .fold(0_u32, |acc, b| acc * 26 + u32::from(b.to_ascii_uppercase() - b'A' + 1));
    (index <= MAX_COLUMN).then_some(index)
}

/// Converts a 1-based column index (`30`) to letters (`"AD"`).
#[must_use]
pub fn column_name(mut index: u32) -> String {
    let mut letters = Vec::new();
    while index > 0 {
        let remainder = (index - 1) % 26;
        // remainder < 26, so the cast cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        letters.push(char::from(b'A' + remainder as u8));
        index = (index - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A value written into a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Whole number
    Number(i64),
    /// Text, stored inline
    Text(String),
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
}

/// An `.xlsx` workbook held in memory as its raw parts.
#[derive(Debug, Clone)]
pub struct Workbook {
    parts: Vec<Part>,
}

fn workbook_error(message: impl fmt::Display) -> Error {
    Error::Workbook {
        message: message.to_string(),
    }
}

impl Workbook {
    /// Opens a workbook from its file bytes. The bytes are copied; the caller's
    /// buffer is never modified.
    ///
    /// # Errors
    /// Returns [`Error::Workbook`] if the bytes are not a zip archive or lack
    /// `xl/workbook.xml`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(workbook_error)?;
        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index).map_err(workbook_error)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data).map_err(workbook_error)?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
            });
        }

        if !parts.iter().any(|p| p.name == WORKBOOK_PART) {
            return Err(workbook_error("archive has no xl/workbook.xml"));
        }
        Ok(Self { parts })
    }

    /// Raw bytes of a part, if present.
    #[must_use]
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    fn part_text(&self, name: &str) -> Result<Option<String>> {
        self.part(name)
            .map(|data| {
                String::from_utf8(data.to_vec())
                    .map_err(|_| workbook_error(format!("{name} is not valid UTF-8")))
            })
            .transpose()
    }

    fn required_text(&self, name: &str) -> Result<String> {
        self.part_text(name)?
            .ok_or_else(|| workbook_error(format!("archive has no {name}")))
    }

    fn replace_part(&mut self, name: &str, data: Vec<u8>) {
        if let Some(part) = self.parts.iter_mut().find(|p| p.name == name) {
            part.data = data;
        }
    }

    /// Resolves the archive path of a worksheet by its tab name, or of the
    /// first worksheet when `sheet_name` is `None`.
    ///
    /// # Errors
    /// Returns [`Error::Workbook`] if the sheet or its relationship is missing.
    pub fn sheet_path(&self, sheet_name: Option<&str>) -> Result<String> {
        let workbook_xml = self.required_text(WORKBOOK_PART)?;
        let sheet_tag = SHEET_RE
            .find_iter(&workbook_xml)
            .map(|m| m.as_str())
            .find(|tag| {
                sheet_name.is_none_or(|wanted| {
                    attribute(tag, "name").map(unescape_xml).as_deref() == Some(wanted)
                })
            })
            .ok_or_else(|| match sheet_name {
                Some(name) => workbook_error(format!("workbook has no sheet named '{name}'")),
                None => workbook_error("workbook has no sheets"),
            })?;
        let relationship_id = attribute(sheet_tag, "r:id")
            .ok_or_else(|| workbook_error("sheet entry has no relationship id"))?;

        let rels_xml = self.required_text(WORKBOOK_RELS_PART)?;
        let target = RELATIONSHIP_RE
            .find_iter(&rels_xml)
            .map(|m| m.as_str())
            .find(|tag| attribute(tag, "Id") == Some(relationship_id))
            .and_then(|tag| attribute(tag, "Target"))
            .ok_or_else(|| workbook_error(format!("relationship {relationship_id} not found")))?;

        Ok(target.strip_prefix('/').map_or_else(
            || format!("xl/{}", target.trim_start_matches("./")),
            ToString::to_string,
        ))
    }

    /// Writes values into cells of one worksheet, keeping each existing
    /// cell's style. Missing rows and cells are created in order. When the
    /// same cell appears twice the later value wins.
    ///
    /// # Errors
    /// Returns [`Error::Workbook`] if the worksheet part is missing or malformed.
    pub fn set_cells(&mut self, sheet_path: &str, cells: &[(CellRef, CellValue)]) -> Result<()> {
        if cells.is_empty() {
            return Ok(());
        }
        let mut rows: BTreeMap<u32, BTreeMap<u32, &CellValue>> = BTreeMap::new();
        for (reference, value) in cells {
            rows.entry(reference.row)
                .or_default()
                .insert(reference.column, value);
        }

        let xml = self.required_text(sheet_path)?;
        let patched = patch_sheet_data(&xml, &rows)?;
        self.replace_part(sheet_path, patched.into_bytes());
        Ok(())
    }

    /// Asks spreadsheet applications to recalculate every formula on open, so
    /// template formulas pick up patched values.
    pub fn force_full_recalculation(&mut self) -> Result<()> {
        let xml = self.required_text(WORKBOOK_PART)?;
        let patched = if let Some(start) = xml.find("<calcPr") {
            let end = xml[start..]
                .find('>')
                .map(|i| start + i)
                .ok_or_else(|| workbook_error("unterminated <calcPr>"))?;
            let tag = &xml[start..=end];
            match attribute(tag, "fullCalcOnLoad") {
                Some("1" | "true") => return Ok(()),
                Some(other) => {
                    let fixed = tag.replace(
                        &format!("fullCalcOnLoad=\"{other}\""),
                        "fullCalcOnLoad=\"1\"",
                    );
                    format!("{}{fixed}{}", &xml[..start], &xml[end + 1..])
                }
                None => format!(
                    "{}<calcPr fullCalcOnLoad=\"1\"{}",
                    &xml[..start],
                    &xml[start + "<calcPr".len()..]
                ),
            }
        } else {
            let anchor = ["</definedNames>", "</externalReferences>", "</sheets>"]
                .iter()
                .find_map(|marker| xml.find(marker).map(|i| i + marker.len()))
                .ok_or_else(|| workbook_error("workbook.xml has no <sheets>"))?;
            format!(
                "{}<calcPr fullCalcOnLoad=\"1\"/>{}",
                &xml[..anchor],
                &xml[anchor..]
            )
        };
        self.replace_part(WORKBOOK_PART, patched.into_bytes());
        Ok(())
    }

    /// Removes the cached calculation chain. Spreadsheet applications rebuild
    /// it on load; a stale chain pointing at overwritten formula cells makes
    /// them report the file as damaged.
    pub fn drop_calc_chain(&mut self) -> Result<()> {
        if self.part(CALC_CHAIN_PART).is_none() {
            return Ok(());
        }
        self.parts.retain(|p| p.name != CALC_CHAIN_PART);
        for name in [CONTENT_TYPES_PART, WORKBOOK_RELS_PART] {
            if let Some(text) = self.part_text(name)? {
                let cleaned = CALC_CHAIN_REF_RE.replace_all(&text, "").into_owned();
                self.replace_part(name, cleaned.into_bytes());
            }
        }
        Ok(())
    }

    /// Serializes the workbook into new file bytes.
    ///
    /// # Errors
    /// Returns [`Error::Workbook`] if the archive cannot be written.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for part in &self.parts {
            let method = if part.compression == CompressionMethod::Stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);
            if part.name.ends_with('/') {
                writer
                    .add_directory(part.name.as_str(), options)
                    .map_err(workbook_error)?;
            } else {
                writer
                    .start_file(part.name.as_str(), options)
                    .map_err(workbook_error)?;
                writer.write_all(&part.data).map_err(workbook_error)?;
            }
        }
        let cursor = writer.finish().map_err(workbook_error)?;
        Ok(cursor.into_inner())
    }
}

/// Reads an attribute value from the opening tag of an element.
fn attribute<'a>(element: &'a str, name: &str) -> Option<&'a str> {
    let open = element.find('>').map_or(element, |end| &element[..end]);
    let needle = format!("{name}=");
    let mut from = 0;
    while let Some(offset) = open[from..].find(&needle) {
        let start = from + offset;
        let value_start = start + needle.len();
        let at_boundary = open[..start]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        if at_boundary {
            let quote = open[value_start..].chars().next()?;
            if quote == '"' || quote == '\'' {
                let body = &open[value_start + 1..];
                return body.find(quote).map(|end| &body[..end]);
            }
        }
        from = value_start;
    }
    None
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn render_cell(reference: CellRef, style: Option<&str>, value: &CellValue) -> String {
    let style = style.map(|s| format!(" s=\"{s}\"")).unwrap_or_default();
    match value {
        CellValue::Number(n) => format!("<c r=\"{reference}\"{style}><v>{n}</v></c>"),
        CellValue::Text(text) => format!(
            "<c r=\"{reference}\"{style} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
            escape_xml(text)
        ),
    }
}

fn render_row(row: u32, cells: &BTreeMap<u32, &CellValue>) -> String {
    let mut xml = format!("<row r=\"{row}\">");
    for (&column, value) in cells {
        xml.push_str(&render_cell(CellRef::new(column, row), None, value));
    }
    xml.push_str("</row>");
    xml
}

fn patch_row(row_xml: &str, row: u32, cells: &BTreeMap<u32, &CellValue>) -> String {
    let Some(open_end) = row_xml.find('>') else {
        return row_xml.to_string();
    };
    let (open_tag, body) = if row_xml[..open_end].ends_with('/') {
        (format!("{}>", row_xml[..open_end - 1].trim_end()), "")
    } else {
        let body_end = row_xml.len().saturating_sub("</row>".len()).max(open_end + 1);
        (row_xml[..=open_end].to_string(), &row_xml[open_end + 1..body_end])
    };

    let mut out = open_tag;
    let mut pending = cells.iter().peekable();
    let mut cursor = 0;
    let mut last_column = 0;
    for found in CELL_RE.find_iter(body) {
        let cell_xml = found.as_str();
        let column = attribute(cell_xml, "r")
            .and_then(|r| r.parse::<CellRef>().ok())
            .map_or(last_column + 1, |r| r.column);
        last_column = column;

        out.push_str(&body[cursor..found.start()]);
        cursor = found.end();
        while let Some((&new_column, value)) = pending.next_if(|&(&c, _)| c < column) {
            out.push_str(&render_cell(CellRef::new(new_column, row), None, value));
        }
        if let Some((_, value)) = pending.next_if(|&(&c, _)| c == column) {
            let style = attribute(cell_xml, "s");
            out.push_str(&render_cell(CellRef::new(column, row), style, value));
        } else {
            out.push_str(cell_xml);
        }
    }
    out.push_str(&body[cursor..]);
    for (&new_column, value) in pending {
        out.push_str(&render_cell(CellRef::new(new_column, row), None, value));
    }
    out.push_str("</row>");
    out
}

fn patch_rows(inner: &str, rows: &BTreeMap<u32, BTreeMap<u32, &CellValue>>) -> String {
    let mut out = String::with_capacity(inner.len() + rows.len() * 96);
    let mut pending = rows.iter().peekable();
    let mut cursor = 0;
    let mut last_row = 0;
    for found in ROW_RE.find_iter(inner) {
        let row_xml = found.as_str();
        let number = attribute(row_xml, "r")
            .and_then(|r| r.parse::<u32>().ok())
            .unwrap_or(last_row + 1);
        last_row = number;

        out.push_str(&inner[cursor..found.start()]);
        cursor = found.end();
        while let Some((&new_row, cells)) = pending.next_if(|&(&r, _)| r < number) {
            out.push_str(&render_row(new_row, cells));
        }
        if let Some((_, cells)) = pending.next_if(|&(&r, _)| r == number) {
            out.push_str(&patch_row(row_xml, number, cells));
        } else {
            out.push_str(row_xml);
        }
    }
    out.push_str(&inner[cursor..]);
    for (&new_row, cells) in pending {
        out.push_str(&render_row(new_row, cells));
    }
    out
}

fn patch_sheet_data(xml: &str, rows: &BTreeMap<u32, BTreeMap<u32, &CellValue>>) -> Result<String> {
    let start = xml
        .find("<sheetData")
        .ok_or_else(|| workbook_error("worksheet has no <sheetData>"))?;
    let open_end = xml[start..]
        .find('>')
        .map(|i| start + i)
        .ok_or_else(|| workbook_error("unterminated <sheetData>"))?;

    if xml[..open_end].ends_with('/') {
        return Ok(format!(
            "{}<sheetData>{}</sheetData>{}",
            &xml[..start],
            patch_rows("", rows),
            &xml[open_end + 1..]
        ));
    }

    let inner_start = open_end + 1;
    let inner_end = xml[inner_start..]
        .find("</sheetData>")
        .map(|i| inner_start + i)
        .ok_or_else(|| workbook_error("unterminated <sheetData>"))?;
    Ok(format!(
        "{}{}{}",
        &xml[..inner_start],
        patch_rows(&xml[inner_start..inner_end], rows),
        &xml[inner_end..]
    ))
}
