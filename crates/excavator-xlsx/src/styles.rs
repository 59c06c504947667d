//! Date detection from `xl/styles.xml`
//!
//! XLSX stores dates as plain numbers; only the number format attached to a
//! cell's style (`cellXfs` entry) says the number is a date. This module reads
//! just enough of the stylesheet to answer "is style N a date style?".

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use excavator_core::datetime::{is_builtin_date_format, is_date_format_code};

/// Per-`cellXfs` index: whether cells with that style hold dates
#[derive(Debug, Default, Clone)]
pub(crate) struct DateStyles {
    is_date: Vec<bool>,
}

impl DateStyles {
    /// Whether the style at `index` formats numbers as dates
    pub(crate) fn is_date(&self, index: u32) -> bool {
        self.is_date.get(index as usize).copied().unwrap_or(false)
    }
}

fn attr_u32(e: &BytesStart<'_>, key: &[u8]) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().and_then(|s| s.parse().ok()))
}

/// Read `xl/styles.xml` and classify every cell style
pub(crate) fn read_date_styles<R: Read>(reader: R) -> XlsxResult<DateStyles> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut custom_formats: HashMap<u32, String> = HashMap::new();
    let mut xf_format_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" => {
                    let id = attr_u32(&e, b"numFmtId");
                    let code = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"formatCode")
                        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()));
                    if let (Some(id), Some(code)) = (id, code) {
                        custom_formats.insert(id, code);
                    }
                }
                b"cellXfs" => {
                    in_cell_xfs = true;
                }
                b"xf" if in_cell_xfs => {
                    xf_format_ids.push(attr_u32(&e, b"numFmtId").unwrap_or(0));
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"cellXfs" {
                    in_cell_xfs = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let is_date = xf_format_ids
        .into_iter()
        .map(|id| match custom_formats.get(&id) {
            Some(code) => is_date_format_code(code),
            None => is_builtin_date_format(id),
        })
        .collect();

    Ok(DateStyles { is_date })
}
