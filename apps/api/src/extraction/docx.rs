use std::io::{Cursor, Read};
use std::sync::LazyLock;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use regex::Regex;
use tracing::{info, warn};
use zip::ZipArchive;

use crate::extraction::{cascade, plain, StrategyError};

pub const DOCUMENT_ENTRY: &str = "word/document.xml";
pub const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Extracts paragraph and table text from a DOCX package.
///
/// Structurally unsound packages fall back to stripping the raw document markup,
/// and anything that is not an archive at all is decoded as raw text.
pub fn extract(bytes: &[u8]) -> String {
    cascade(
        "docx",
        bytes,
        &[
            ("validated", extract_validated),
            ("raw-markup", extract_raw_markup),
            ("raw-text", plain::extract),
        ],
    )
    .unwrap_or_default()
}

pub fn is_archive(bytes: &[u8]) -> bool {
    ZipArchive::new(Cursor::new(bytes)).is_ok()
}

fn open(bytes: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>, StrategyError> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|e| StrategyError::Archive(e.to_string()))
}

/// Opens the package and checks both manifest entries the format requires.
fn validate(bytes: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>, StrategyError> {
    let archive = open(bytes)?;
    for required in [DOCUMENT_ENTRY, CONTENT_TYPES_ENTRY] {
        if !archive.file_names().any(|name| name == required) {
            return Err(StrategyError::MissingEntry(required));
        }
    }
    Ok(archive)
}

fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &'static str,
) -> Result<Vec<u8>, StrategyError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|_| StrategyError::MissingEntry(name))?;
    let mut content = Vec::new();
    entry
        .read_to_end(&mut content)
        .map_err(|e| StrategyError::Archive(e.to_string()))?;
    Ok(content)
}

fn extract_validated(bytes: &[u8]) -> Result<String, StrategyError> {
    let mut archive = validate(bytes)?;
    let xml = read_entry(&mut archive, DOCUMENT_ENTRY)?;
    let xml = std::str::from_utf8(&xml).map_err(|e| StrategyError::Markup(e.to_string()))?;
    let text = parse_document_xml(xml)?;
    if text.is_empty() {
        warn!("DOCX package is valid but contains no text");
    }
    Ok(text)
}

/// Degraded path: strip every tag from the document entry and collapse whitespace.
fn extract_raw_markup(bytes: &[u8]) -> Result<String, StrategyError> {
    let mut archive = open(bytes)?;
    let raw = read_entry(&mut archive, DOCUMENT_ENTRY)?;
    let markup = plain::decode(&raw);

    let stripped = RE_TAG.replace_all(&markup, " ");
    let text = RE_WHITESPACE.replace_all(&stripped, " ").trim().to_string();
    if text.is_empty() {
        return Err(StrategyError::Empty);
    }
    info!(chars = text.len(), "Recovered text from raw document markup");
    Ok(text)
}

/// Walks `word/document.xml`: body paragraphs first, then table rows with
/// non-empty cells joined by ` | `, blank lines dropped.
fn parse_document_xml(xml: &str) -> Result<String, StrategyError> {
    let mut reader = Reader::from_str(xml);
    let mut body = BodyText::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => body.open(e.local_name().as_ref()),
            Ok(Event::Empty(e)) => body.empty(e.local_name().as_ref()),
            Ok(Event::End(e)) => body.close(e.local_name().as_ref()),
            Ok(Event::Text(e)) if body.in_text_run => {
                let decoded = e.decode().map_err(|e| StrategyError::Markup(e.to_string()))?;
                body.paragraph.push_str(&decoded);
            }
            Ok(Event::GeneralRef(r)) if body.in_text_run => {
                if let Some(resolved) = resolve_reference(&r)? {
                    body.paragraph.push_str(&resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(StrategyError::Markup(e.to_string())),
            _ => {}
        }
    }

    Ok(body.finish())
}

/// `&amp;` and friends arrive as their own events; unknown named entities are dropped.
fn resolve_reference(r: &BytesRef<'_>) -> Result<Option<String>, StrategyError> {
    if let Some(ch) = r
        .resolve_char_ref()
        .map_err(|e| StrategyError::Markup(e.to_string()))?
    {
        return Ok(Some(ch.to_string()));
    }
    let name = r.decode().map_err(|e| StrategyError::Markup(e.to_string()))?;
    Ok(resolve_predefined_entity(&name).map(str::to_string))
}

#[derive(Default)]
struct BodyText {
    table_depth: usize,
    in_text_run: bool,
    paragraph: String,
    paragraphs: Vec<String>,
    cell: String,
    row_cells: Vec<String>,
    table_rows: Vec<String>,
}

impl BodyText {
    fn open(&mut self, name: &[u8]) {
        match name {
            b"tbl" => self.table_depth += 1,
            b"tr" if self.table_depth == 1 => self.row_cells.clear(),
            b"tc" if self.table_depth == 1 => self.cell.clear(),
            b"p" => self.paragraph.clear(),
            b"t" => self.in_text_run = true,
            _ => {}
        }
    }

    fn empty(&mut self, name: &[u8]) {
        match name {
            b"tab" => self.paragraph.push('\t'),
            b"br" | b"cr" => self.paragraph.push('\n'),
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"t" => self.in_text_run = false,
            b"p" => {
                let paragraph = std::mem::take(&mut self.paragraph);
                if self.table_depth == 0 {
                    self.paragraphs.push(paragraph);
                } else {
                    if !self.cell.is_empty() {
                        self.cell.push('\n');
                    }
                    self.cell.push_str(&paragraph);
                }
            }
            b"tc" if self.table_depth == 1 => {
                let cell = std::mem::take(&mut self.cell);
                self.row_cells.push(cell);
            }
            b"tr" if self.table_depth == 1 => {
                let row = self
                    .row_cells
                    .drain(..)
                    .filter(|c| !c.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join(" | ");
                if !row.is_empty() {
                    self.table_rows.push(row);
                }
            }
            b"tbl" => self.table_depth = self.table_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn finish(self) -> String {
        self.paragraphs
            .into_iter()
            .chain(self.table_rows)
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
