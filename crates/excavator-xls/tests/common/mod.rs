//! Minimal BIFF8 workbook writer for tests

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use excavator_xls::biff::records;

fn record(out: &mut Vec<u8>, kind: u16, body: &[u8]) {
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&(body.len() as u16).to_le_bytes());
    out.extend_from_slice(body);
}

fn bof(version: u16, kind: u16) -> Vec<u8> {
    let mut body = version.to_le_bytes().to_vec();
    body.extend_from_slice(&kind.to_le_bytes());
    body.extend_from_slice(&[0; 12]);
    body
}

/// 2-byte count, UTF-16 characters
fn unicode(text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut body = (units.len() as u16).to_le_bytes().to_vec();
    body.push(0x01);
    for unit in units {
        body.extend_from_slice(&unit.to_le_bytes());
    }
    body
}

fn cell(row: u16, col: u16, xf: u16) -> Vec<u8> {
    [row, col, xf].iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Integer RK encoding
pub fn rk_int(value: i32) -> u32 {
    ((value << 2) as u32) | 0x02
}

/// Records of one worksheet substream (without BOF/EOF)
pub struct Sheet {
    name: String,
    kind: u8,
    records: Vec<u8>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: records::SHEET_WORKSHEET,
            records: Vec::new(),
        }
    }

    pub fn chart(name: &str) -> Self {
        Self {
            kind: records::SHEET_CHART,
            ..Self::new(name)
        }
    }

    pub fn raw(mut self, kind: u16, body: &[u8]) -> Self {
        record(&mut self.records, kind, body);
        self
    }

    pub fn shared(self, row: u16, col: u16, index: u32) -> Self {
        let mut body = cell(row, col, 0);
        body.extend_from_slice(&index.to_le_bytes());
        self.raw(records::LABELSST, &body)
    }

    pub fn label(self, row: u16, col: u16, text: &str) -> Self {
        let mut body = cell(row, col, 0);
        body.extend(unicode(text));
        self.raw(records::LABEL, &body)
    }

    pub fn number(self, row: u16, col: u16, xf: u16, value: f64) -> Self {
        let mut body = cell(row, col, xf);
        body.extend_from_slice(&value.to_le_bytes());
        self.raw(records::NUMBER, &body)
    }

    pub fn rk(self, row: u16, col: u16, xf: u16, rk: u32) -> Self {
        let mut body = cell(row, col, xf);
        body.extend_from_slice(&rk.to_le_bytes());
        self.raw(records::RK, &body)
    }

    pub fn mulrk(self, row: u16, first_col: u16, values: &[u32]) -> Self {
        let mut body = cell(row, first_col, 0)[..4].to_vec();
        for rk in values {
            body.extend_from_slice(&0u16.to_le_bytes());
            body.extend_from_slice(&rk.to_le_bytes());
        }
        let last_col = first_col + values.len() as u16 - 1;
        body.extend_from_slice(&last_col.to_le_bytes());
        self.raw(records::MULRK, &body)
    }

    pub fn boolerr(self, row: u16, col: u16, value: u8, is_error: bool) -> Self {
        let mut body = cell(row, col, 0);
        body.extend_from_slice(&[value, u8::from(is_error)]);
        self.raw(records::BOOLERR, &body)
    }

    /// FORMULA with an 8-byte cached result and an empty token array
    pub fn formula(self, row: u16, col: u16, xf: u16, result: [u8; 8]) -> Self {
        let mut body = cell(row, col, xf);
        body.extend_from_slice(&result);
        body.extend_from_slice(&[0; 6]);
        body.extend_from_slice(&0u16.to_le_bytes());
        self.raw(records::FORMULA, &body)
    }

    pub fn formula_text(self, row: u16, col: u16, text: &str) -> Self {
        self.formula(row, col, 0, [0x00, 0, 0, 0, 0, 0, 0xFF, 0xFF])
            .raw(records::STRING, &unicode(text))
    }
}

/// Workbook globals plus sheets, serialized into a compound file
pub struct Book {
    version: u16,
    date_1904: bool,
    shared_strings: Vec<String>,
    formats: Vec<(u16, String)>,
    xf_formats: Vec<u16>,
    extra_globals: Vec<(u16, Vec<u8>)>,
    sheets: Vec<Sheet>,
}

impl Book {
    pub fn new() -> Self {
        Self {
            version: records::BIFF8_VERSION,
            date_1904: false,
            shared_strings: Vec::new(),
            formats: Vec::new(),
            xf_formats: vec![0],
            extra_globals: Vec::new(),
            sheets: Vec::new(),
        }
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn date_1904(mut self) -> Self {
        self.date_1904 = true;
        self
    }

    pub fn shared_strings(mut self, strings: &[&str]) -> Self {
        self.shared_strings = strings.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn format(mut self, id: u16, code: &str) -> Self {
        self.formats.push((id, code.to_string()));
        self
    }

    /// Append an XF record with number format `format_id`; XF 0 is the
    /// default, so the first call creates XF 1
    pub fn xf(mut self, format_id: u16) -> Self {
        self.xf_formats.push(format_id);
        self
    }

    pub fn global(mut self, kind: u16, body: &[u8]) -> Self {
        self.extra_globals.push((kind, body.to_vec()));
        self
    }

    pub fn sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// The raw `Workbook` stream
    pub fn stream(&self) -> Vec<u8> {
        let mut out = Vec::new();
        record(&mut out, records::BOF, &bof(self.version, records::BOF_WORKBOOK_GLOBALS));
        for (kind, body) in &self.extra_globals {
            record(&mut out, *kind, body);
        }
        if self.date_1904 {
            record(&mut out, records::DATEMODE, &1u16.to_le_bytes());
        }
        for (id, code) in &self.formats {
            let mut body = id.to_le_bytes().to_vec();
            body.extend(unicode(code));
            record(&mut out, records::FORMAT, &body);
        }
        for format_id in &self.xf_formats {
            let mut body = vec![0, 0];
            body.extend_from_slice(&format_id.to_le_bytes());
            body.extend_from_slice(&[0; 16]);
            record(&mut out, records::XF, &body);
        }
        if !self.shared_strings.is_empty() {
            let count = self.shared_strings.len() as u32;
            let mut body = count.to_le_bytes().to_vec();
            body.extend_from_slice(&count.to_le_bytes());
            for text in &self.shared_strings {
                body.extend(unicode(text));
            }
            record(&mut out, records::SST, &body);
        }

        let mut offset_fields = Vec::new();
        for sheet in &self.sheets {
            let units: Vec<u16> = sheet.name.encode_utf16().collect();
            let mut body = vec![0, 0, 0, 0, 0, sheet.kind, units.len() as u8, 0x01];
            for unit in units {
                body.extend_from_slice(&unit.to_le_bytes());
            }
            offset_fields.push(out.len() + 4);
            record(&mut out, records::BOUNDSHEET, &body);
        }
        record(&mut out, records::EOF, &[]);

        for (sheet, field) in self.sheets.iter().zip(offset_fields) {
            let offset = out.len() as u32;
            out[field..field + 4].copy_from_slice(&offset.to_le_bytes());
            let kind = if sheet.kind == records::SHEET_CHART {
                records::BOF_CHART
            } else {
                records::BOF_WORKSHEET
            };
            record(&mut out, records::BOF, &bof(self.version, kind));
            out.extend_from_slice(&sheet.records);
            record(&mut out, records::EOF, &[]);
        }
        out
    }

    /// The workbook as `.xls` file bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        compound_file(&self.stream())
    }

    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}

/// Wrap a `Workbook` stream in an OLE compound file
pub fn compound_file(stream: &[u8]) -> Vec<u8> {
    let mut compound = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    {
        let mut workbook = compound.create_stream("/Workbook").unwrap();
        workbook.write_all(stream).unwrap();
        workbook.flush().unwrap();
    }
    compound.flush().unwrap();
    compound.into_inner().into_inner()
}
