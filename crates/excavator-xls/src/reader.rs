//! XLS (BIFF8) workbook reader
//!
//! Opens the OLE compound file, reads the `Workbook` stream, collects the
//! globals (shared strings, sheet directory, date formats) and then walks
//! each worksheet substream located through its BOUNDSHEET offset.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use excavator_core::datetime::excel_serial_to_datetime;
use excavator_core::{CellError, CellValue, SharedString, Workbook, Worksheet};

use crate::biff::parser::{read_bytes, read_f64, read_rk, read_u16, read_u32, read_u8};
use crate::biff::strings::{parse_sst, read_short_string, read_unicode_string};
use crate::biff::{self, records, BiffRecord};
use crate::error::{XlsError, XlsResult};
use crate::formats::{self, DateStyles};

/// Days between the 1904 and 1900 date systems' day zero
const DATE_1904_OFFSET: f64 = 1462.0;

/// BOOLERR and FORMULA error bytes
const ERROR_CODES: [(u8, CellError); 8] = [
    (0x00, CellError::Null),
    (0x07, CellError::Div0),
    (0x0F, CellError::Value),
    (0x17, CellError::Ref),
    (0x1D, CellError::Name),
    (0x24, CellError::Num),
    (0x2A, CellError::Na),
    (0x2B, CellError::GettingData),
];

fn cell_error(code: u8) -> CellError {
    ERROR_CODES
        .iter()
        .find(|(byte, _)| *byte == code)
        .map(|(_, error)| *error)
        .unwrap_or(CellError::Value)
}

/// XLS file reader
pub struct XlsReader;

/// One BOUNDSHEET entry
#[derive(Debug)]
struct SheetEntry {
    /// Stream position of the sheet's BOF record
    offset: u32,
    kind: u8,
    name: String,
}

#[derive(Debug, Default)]
struct Globals {
    shared_strings: Vec<SharedString>,
    sheets: Vec<SheetEntry>,
    date_styles: DateStyles,
    date_1904: bool,
}

impl XlsReader {
    /// Read an `.xls` file from disk
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsResult<Workbook> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::read(BufReader::new(file), path)
    }

    /// Read a workbook from a reader; `source` is recorded as the workbook path
    pub fn read<R: Read + Seek, P: Into<PathBuf>>(reader: R, source: P) -> XlsResult<Workbook> {
        let stream = Self::workbook_stream(reader)?;
        let all = biff::read_records(&mut Cursor::new(stream))?;
        let globals = Self::read_globals(&all)?;

        let by_offset: HashMap<u64, usize> = all
            .iter()
            .enumerate()
            .map(|(index, record)| (record.offset, index))
            .collect();

        let mut workbook = Workbook::new(source);
        for entry in &globals.sheets {
            if entry.kind != records::SHEET_WORKSHEET {
                log::debug!("skipping non-worksheet sheet '{}'", entry.name);
                continue;
            }

            let mut worksheet = Worksheet::new(entry.name.as_str());
            match by_offset.get(&u64::from(entry.offset)) {
                Some(&start) => {
                    SheetReader::new(&globals, &mut worksheet).read(&all[start..])?;
                }
                None => log::warn!(
                    "sheet '{}' points at offset {} where no record starts",
                    entry.name,
                    entry.offset
                ),
            }
            workbook.add_worksheet(worksheet)?;
        }

        Ok(workbook)
    }

    fn workbook_stream<R: Read + Seek>(reader: R) -> XlsResult<Vec<u8>> {
        let mut compound = cfb::CompoundFile::open(reader)
            .map_err(|e| XlsError::InvalidFormat(format!("not an OLE compound file ({})", e)))?;

        // "Book" is the BIFF5 name; its BOF version is rejected later
        let name = ["/Workbook", "/Book"]
            .into_iter()
            .find(|name| compound.is_stream(name))
            .ok_or_else(|| XlsError::InvalidFormat("no Workbook stream".into()))?;

        let mut data = Vec::new();
        compound.open_stream(name)?.read_to_end(&mut data)?;
        Ok(data)
    }

    fn read_globals(all: &[BiffRecord]) -> XlsResult<Globals> {
        let bof = all
            .first()
            .filter(|record| record.record_type == records::BOF)
            .ok_or_else(|| XlsError::InvalidFormat("Workbook stream does not start with BOF".into()))?;
        let (version, kind) = biff::parse_bof(&bof.data)?;
        if version != records::BIFF8_VERSION {
            return Err(XlsError::UnsupportedVersion(version));
        }
        if kind != records::BOF_WORKBOOK_GLOBALS {
            return Err(XlsError::InvalidFormat(format!(
                "first substream has type 0x{:04X}, expected workbook globals",
                kind
            )));
        }

        let mut globals = Globals::default();
        let mut custom_formats = HashMap::new();
        let mut xf_formats = Vec::new();

        for record in &all[1..] {
            let data = &record.data;
            match record.record_type {
                records::EOF => break,
                records::FILEPASS => return Err(XlsError::Encrypted),
                records::SST => globals.shared_strings = parse_sst(data, &record.continues)?,
                records::BOUNDSHEET => globals.sheets.push(Self::parse_boundsheet(data)?),
                records::DATEMODE => globals.date_1904 = read_u16(data, &mut 0)? == 1,
                records::FORMAT => match formats::parse_format(data) {
                    Ok((id, code)) => {
                        custom_formats.insert(id, code);
                    }
                    Err(e) => log::warn!("skipping unreadable FORMAT record: {}", e),
                },
                records::XF => xf_formats.push(formats::parse_xf_format(data)?),
                _ => {}
            }
        }

        globals.date_styles = DateStyles::new(&custom_formats, &xf_formats);
        log::trace!(
            "globals: {} sheets, {} shared strings, {} XF records",
            globals.sheets.len(),
            globals.shared_strings.len(),
            xf_formats.len()
        );
        Ok(globals)
    }

    /// BOUNDSHEET: BOF offset(4) + visibility(1) + type(1) + short name
    fn parse_boundsheet(data: &[u8]) -> XlsResult<SheetEntry> {
        let mut offset = 0;
        let sheet_offset = read_u32(data, &mut offset)?;
        let _visibility = read_u8(data, &mut offset)?;
        let kind = read_u8(data, &mut offset)?;
        let name = read_short_string(data, &mut offset)?;
        Ok(SheetEntry {
            offset: sheet_offset,
            kind,
            name,
        })
    }
}

/// Fills one worksheet from its substream
struct SheetReader<'a> {
    globals: &'a Globals,
    worksheet: &'a mut Worksheet,
    /// Cell of a FORMULA whose text result follows in a STRING record
    pending_string: Option<(u32, u16)>,
}

impl<'a> SheetReader<'a> {
    fn new(globals: &'a Globals, worksheet: &'a mut Worksheet) -> Self {
        Self {
            globals,
            worksheet,
            pending_string: None,
        }
    }

    /// Read from the sheet's BOF up to its matching EOF
    fn read(mut self, substream: &[BiffRecord]) -> XlsResult<()> {
        let mut depth = 0usize;
        for record in substream {
            match record.record_type {
                records::BOF => depth += 1,
                records::EOF => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                // Embedded chart substreams carry no cells of this sheet
                _ if depth > 1 => {}
                _ => self.record(record)?,
            }
        }
        Ok(())
    }

    fn record(&mut self, record: &BiffRecord) -> XlsResult<()> {
        let data = &record.data;
        let mut offset = 0;

        match record.record_type {
            records::STRING => {
                if let Some((row, col)) = self.pending_string.take() {
                    let text = read_unicode_string(data, &mut offset, &record.continues)?;
                    self.put(row, col, CellValue::String(text.into()))?;
                }
                return Ok(());
            }
            records::MULRK => return self.mulrk(data),
            records::LABELSST
            | records::LABEL
            | records::RSTRING
            | records::NUMBER
            | records::RK
            | records::BOOLERR
            | records::FORMULA => {}
            _ => return Ok(()),
        }

        let row = u32::from(read_u16(data, &mut offset)?);
        let col = read_u16(data, &mut offset)?;
        let xf = read_u16(data, &mut offset)?;
        self.pending_string = None;

        let value = match record.record_type {
            records::LABELSST => {
                let index = read_u32(data, &mut offset)? as usize;
                match self.globals.shared_strings.get(index) {
                    Some(text) => CellValue::String(text.clone()),
                    None => {
                        log::warn!(
                            "{}: shared string {} out of range at row {}, column {}",
                            self.worksheet.name(),
                            index,
                            row + 1,
                            col + 1
                        );
                        CellValue::Empty
                    }
                }
            }
            records::LABEL | records::RSTRING => {
                let text = read_unicode_string(data, &mut offset, &record.continues)?;
                CellValue::String(text.into())
            }
            records::NUMBER => self.number(xf, read_f64(data, &mut offset)?),
            records::RK => self.number(xf, read_rk(data, &mut offset)?),
            records::BOOLERR => {
                let [value, is_error] = read_bytes::<2>(data, &mut offset)?;
                if is_error != 0 {
                    CellValue::Error(cell_error(value))
                } else {
                    CellValue::Boolean(value != 0)
                }
            }
            _ => self.formula_result(row, col, xf, data, &mut offset)?,
        };

        self.put(row, col, value)
    }

    /// MULRK: row(2) + first col(2) + [xf(2) + rk(4)]* + last col(2)
    fn mulrk(&mut self, data: &[u8]) -> XlsResult<()> {
        let mut offset = 0;
        let row = u32::from(read_u16(data, &mut offset)?);
        let first_col = read_u16(data, &mut offset)?;
        self.pending_string = None;

        let count = data.len().saturating_sub(6) / 6;
        for i in 0..count {
            let xf = read_u16(data, &mut offset)?;
            let value = self.number(xf, read_rk(data, &mut offset)?);
            let col = u16::try_from(i)
                .ok()
                .and_then(|i| first_col.checked_add(i))
                .ok_or_else(|| XlsError::Parse(format!("MULRK on row {} runs past the last column", row + 1)))?;
            self.put(row, col, value)?;
        }
        Ok(())
    }

    /// Cached result of a FORMULA record
    ///
    /// A result whose last two bytes are `0xFFFF` is not a double: byte 0
    /// selects text (in a following STRING record), boolean, error or empty.
    fn formula_result(
        &mut self,
        row: u32,
        col: u16,
        xf: u16,
        data: &[u8],
        offset: &mut usize,
    ) -> XlsResult<CellValue> {
        let result = read_bytes::<8>(data, offset)?;
        if result[6..] != [0xFF, 0xFF] {
            return Ok(self.number(xf, f64::from_le_bytes(result)));
        }

        Ok(match result[0] {
            0x00 => {
                self.pending_string = Some((row, col));
                CellValue::Empty
            }
            0x01 => CellValue::Boolean(result[2] != 0),
            0x02 => CellValue::Error(cell_error(result[2])),
            _ => CellValue::Empty,
        })
    }

    fn number(&self, xf: u16, value: f64) -> CellValue {
        if self.globals.date_styles.is_date(xf) {
            let serial = if self.globals.date_1904 {
                value + DATE_1904_OFFSET
            } else {
                value
            };
            if excel_serial_to_datetime(serial).is_some() {
                return CellValue::DateTime(serial);
            }
        }
        CellValue::Number(value)
    }

    fn put(&mut self, row: u32, col: u16, value: CellValue) -> XlsResult<()> {
        if !value.is_empty() {
            self.worksheet.set_cell_value_at(row, col, value)?;
        }
        Ok(())
    }
}
