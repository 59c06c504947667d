//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{read_date_styles, DateStyles};
use excavator_core::datetime::{excel_serial_to_datetime, iso_to_excel_serial};
use excavator_core::{CellAddress, CellError, CellValue, SharedString, Workbook, Worksheet};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' || chars.peek() != Some(&'x') {
            result.push(c);
            continue;
        }
        chars.next(); // 'x'

        let mut hex = String::with_capacity(4);
        while hex.len() < 4 {
            match chars.peek() {
                Some(&ch) if ch.is_ascii_hexdigit() => {
                    hex.push(ch);
                    chars.next();
                }
                _ => break,
            }
        }

        let decoded = if hex.len() == 4 && chars.peek() == Some(&'_') {
            u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
        } else {
            None
        };

        match decoded {
            Some(ch) => {
                chars.next(); // closing '_'
                result.push(ch);
            }
            None => {
                result.push_str("_x");
                result.push_str(&hex);
            }
        }
    }

    result
}

fn attr_string(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}

/// A `<c>` element collected while its children are read
#[derive(Debug, Default)]
struct PendingCell {
    reference: Option<String>,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    inline: Option<String>,
}

impl PendingCell {
    fn from_element(e: &BytesStart<'_>) -> Self {
        let mut cell = PendingCell::default();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => cell.reference = attr.unescape_value().ok().map(|s| s.to_string()),
                b"t" => cell.cell_type = attr.unescape_value().ok().map(|s| s.to_string()),
                b"s" => {
                    cell.style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok());
                }
                _ => {}
            }
        }
        cell
    }
}

/// Row/column cursor used for cells and rows without an `r` attribute
#[derive(Debug, Default)]
struct Position {
    row: u32,
    next_row: u32,
    next_col: u16,
}

impl Position {
    fn start_row(&mut self, e: &BytesStart<'_>) {
        self.row = attr_string(e, b"r")
            .and_then(|r| r.parse::<u32>().ok())
            .map(|r| r.saturating_sub(1))
            .unwrap_or(self.next_row);
        self.next_row = self.row + 1;
        self.next_col = 0;
    }

    fn place(&mut self, reference: Option<&str>) -> XlsxResult<CellAddress> {
        let addr = match reference {
            Some(r) => CellAddress::parse(r).map_err(|e| {
                XlsxError::Parse(format!("Invalid cell reference '{}': {}", r, e))
            })?,
            None => CellAddress::new(self.row, self.next_col),
        };
        self.next_col = addr.col.saturating_add(1);
        Ok(addr)
    }
}

/// XLSX file reader
///
/// Produces values only: formulas contribute their cached result, and styles
/// are consulted to recognise dates.
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::read(BufReader::new(file), path)
    }

    /// Read a workbook from a reader; `source` is recorded as the workbook path
    pub fn read<R: Read + Seek, P: Into<PathBuf>>(reader: R, source: P) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let date_styles = Self::read_styles(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::new(source);

        for (name, r_id) in &sheet_info {
            let Some(path) = sheet_paths.get(r_id) else {
                log::warn!("sheet '{}' has no worksheet relationship ({}), skipped", name, r_id);
                continue;
            };
            let mut worksheet = Worksheet::new(name.as_str());
            Self::read_worksheet(
                &mut archive,
                path,
                &mut worksheet,
                &shared_strings,
                &date_styles,
            )?;
            log::trace!("read sheet '{}': {} cells", name, worksheet.cell_count());
            workbook.add_worksheet(worksheet)?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<SharedString>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        // Run boundaries may carry significant spaces: text is never trimmed
        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs (<rPh>) repeat text that is not part of the value
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(SharedString::new(""));
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(SharedString::new(decode_excel_escapes(&current)));
                        current.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current.push_str(&e.unescape()?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<DateStyles> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_date_styles(file),
            Err(_) => Ok(DateStyles::default()),
        }
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let name = attr_string(&e, b"name");
                    let r_id = attr_string(&e, b"r:id");
                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_string(&e, b"Id");
                    let target = attr_string(&e, b"Target");
                    let rel_type = attr_string(&e, b"Type");

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ unless absolute
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read the cell values of one worksheet part
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[SharedString],
        date_styles: &DateStyles,
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut position = Position::default();
        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => position.start_row(&e),
                    b"c" => cell = Some(PendingCell::from_element(&e)),
                    b"v" if cell.is_some() => in_value = true,
                    b"is" if cell.is_some() => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" => position.start_row(&e),
                    b"c" => {
                        // Value-less cell: only advances the column cursor
                        let empty = PendingCell::from_element(&e);
                        position.place(empty.reference.as_deref())?;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if let Some(current) = cell.as_mut() {
                        if in_value {
                            current
                                .value
                                .get_or_insert_with(String::new)
                                .push_str(&e.unescape()?);
                        } else if in_inline_text {
                            current
                                .inline
                                .get_or_insert_with(String::new)
                                .push_str(&e.unescape()?);
                        }
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(done) = cell.take() {
                            let addr = position.place(done.reference.as_deref())?;
                            let value = Self::cell_value(&done, shared_strings, date_styles)?;
                            if !value.is_empty() {
                                worksheet.set_cell_value_at(addr.row, addr.col, value)?;
                            }
                        }
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Convert a collected cell into its value
    fn cell_value(
        cell: &PendingCell,
        shared_strings: &[SharedString],
        date_styles: &DateStyles,
    ) -> XlsxResult<CellValue> {
        if cell.cell_type.as_deref() == Some("inlineStr") {
            let text = cell.inline.as_deref().or(cell.value.as_deref()).unwrap_or("");
            return Ok(CellValue::String(decode_excel_escapes(text).into()));
        }

        let Some(raw) = cell.value.as_deref() else {
            return Ok(CellValue::Empty);
        };

        let value = match cell.cell_type.as_deref() {
            Some("s") => {
                let idx: usize = raw.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", raw))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }

            Some("b") => {
                let raw = raw.trim();
                CellValue::Boolean(raw == "1" || raw.eq_ignore_ascii_case("true"))
            }

            Some("e") => CellError::from_code(raw)
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::string(raw)),

            Some("str") => CellValue::String(decode_excel_escapes(raw).into()),

            // ISO 8601 date cells (strict OOXML)
            Some("d") => iso_to_excel_serial(raw)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::string(raw)),

            None | Some("n") => match raw.trim().parse::<f64>() {
                Ok(n) => {
                    let is_date = cell.style.is_some_and(|s| date_styles.is_date(s));
                    if is_date && excel_serial_to_datetime(n).is_some() {
                        CellValue::DateTime(n)
                    } else {
                        CellValue::Number(n)
                    }
                }
                Err(_) => CellValue::string(raw),
            },

            Some(other) => {
                log::debug!("unknown cell type '{}', reading value as text", other);
                CellValue::string(raw)
            }
        };

        Ok(value)
    }
}
