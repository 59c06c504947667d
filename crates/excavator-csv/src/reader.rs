//! CSV reader

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvReadOptions;
use excavator_core::{CellValue, Workbook, Worksheet};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a single-sheet workbook named after the file stem
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Workbook> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Sheet1".to_string());

        let worksheet = Self::read(BufReader::new(file), name, options)?;
        let mut workbook = Workbook::new(path);
        workbook.add_worksheet(worksheet)?;
        Ok(workbook)
    }

    /// Read CSV from a reader into a worksheet
    pub fn read<R: Read, S: Into<String>>(
        reader: R,
        sheet_name: S,
        options: &CsvReadOptions,
    ) -> CsvResult<Worksheet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut worksheet = Worksheet::new(sheet_name);

        // Bytes that are not UTF-8 become U+FFFD instead of failing the file
        for (row_idx, result) in csv_reader.byte_records().enumerate() {
            let record = result?;
            let row = u32::try_from(row_idx).unwrap_or(u32::MAX);
            let is_header = options.has_header && row_idx == 0;

            for (col, bytes) in record.iter().enumerate() {
                let field = String::from_utf8_lossy(bytes);
                let field = field.as_ref();
                let value = if options.auto_detect_types && !is_header {
                    Self::detect_type(field)
                } else if field.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::string(field)
                };

                if !value.is_empty() {
                    let col = u16::try_from(col).unwrap_or(u16::MAX);
                    worksheet.set_cell_value_at(row, col, value)?;
                }
            }
        }

        Ok(worksheet)
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(false);
        }

        // Zero-padded codes ("007") stay text
        let digits = trimmed.trim_start_matches(['-', '+']);
        let zero_padded = digits.len() > 1
            && digits.starts_with('0')
            && digits.as_bytes()[1].is_ascii_digit();

        if !zero_padded {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return CellValue::Number(n);
                }
            }
        }

        CellValue::string(field)
    }
}
