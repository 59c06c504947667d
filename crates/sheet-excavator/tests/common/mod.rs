//! XLSX fixtures written to a temporary directory

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;

pub enum Cell {
    Text(&'static str),
    Number(f64),
}

impl From<&'static str> for Cell {
    fn from(s: &'static str) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Number(n as f64)
    }
}

/// A workbook under construction: sheets in tab order, cells by A1 reference
#[derive(Default)]
pub struct Book {
    sheets: Vec<(String, Vec<(String, Cell)>)>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, name: impl Into<String>) -> Self {
        self.sheets.push((name.into(), Vec::new()));
        self
    }

    /// Set a cell on the most recently added sheet
    pub fn cell(mut self, reference: &str, value: impl Into<Cell>) -> Self {
        let (_, cells) = self.sheets.last_mut().expect("add a sheet first");
        cells.push((reference.to_string(), value.into()));
        self
    }

    pub fn write(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();

        let mut workbook = String::from(r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#);
        let mut rels = String::from(r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
        for (i, (name, _)) in self.sheets.iter().enumerate() {
            workbook.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(name),
                i + 1,
                i + 1
            ));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }
        workbook.push_str("</sheets></workbook>");
        rels.push_str("</Relationships>");

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(workbook.as_bytes()).unwrap();
        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();

        for (i, (_, cells)) in self.sheets.iter().enumerate() {
            let mut data = String::new();
            for (reference, cell) in cells {
                match cell {
                    Cell::Text(s) => data.push_str(&format!(
                        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                        reference,
                        escape(s)
                    )),
                    Cell::Number(n) => {
                        data.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n))
                    }
                }
            }
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(
                format!(
                    r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                    data
                )
                .as_bytes(),
            )
            .unwrap();
        }

        zip.finish().unwrap();
        path
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// The field workbook used across the engine tests
///
/// "Generell info" carries the field name and id, `Profil_1`..`Profil_n` one
/// project each in H7, and `Profil_Total` a summary that patterns skip.
pub fn field_book(field: &'static str, profiles: &[&'static str]) -> Book {
    let mut book = Book::new()
        .sheet("Generell info")
        .cell("D7", field)
        .cell("M8", 43718);
    for (i, project) in profiles.iter().enumerate() {
        book = book.sheet(format!("Profil_{}", i + 1));
        if !project.is_empty() {
            book = book.cell("H7", *project);
        }
    }
    book.sheet("Profil_Total").cell("H7", "Total")
}
