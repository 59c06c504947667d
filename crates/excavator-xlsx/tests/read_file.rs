//! Reading workbooks from disk

use std::io::Write;

use excavator_core::CellValue;
use excavator_xlsx::{XlsxError, XlsxReader};
use pretty_assertions::assert_eq;

fn write_workbook(path: &std::path::Path) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

    zip.start_file("xl/workbook.xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Generell info" sheetId="1" r:id="rId1"/><sheet name="Profil_1" sheetId="2" r:id="rId2"/></sheets></workbook>"#).unwrap();

    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#).unwrap();

    zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="7"><c r="D7" t="inlineStr"><is><t>  Snorre  </t></is></c></row><row r="8"><c r="M8"><v>25</v></c></row></sheetData></worksheet>"#).unwrap();

    zip.start_file("xl/worksheets/sheet2.xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="7"><c r="H7" t="inlineStr"><is><t>Well A-12</t></is></c></row></sheetData></worksheet>"#).unwrap();

    zip.finish().unwrap();
}

#[test]
fn read_workbook_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("field.xlsx");
    write_workbook(&path);

    let workbook = XlsxReader::read_file(&path).unwrap();
    assert_eq!(workbook.path(), path.as_path());

    let names: Vec<_> = workbook.sheet_names().collect();
    assert_eq!(names, ["Generell info", "Profil_1"]);

    let general = workbook.worksheet_by_name("Generell info").unwrap();
    assert_eq!(general.value_by_ref("d7").unwrap(), &CellValue::string("Snorre"));
    assert_eq!(general.value_by_ref("M8").unwrap(), &CellValue::Number(25.0));
    assert_eq!(general.value_by_ref("Z100").unwrap(), &CellValue::Empty);

    let profile = workbook.worksheet_by_name("Profil_1").unwrap();
    assert_eq!(
        profile.value_by_ref("H7").unwrap(),
        &CellValue::string("Well A-12")
    );
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = XlsxReader::read_file(dir.path().join("absent.xlsx"));
    assert!(matches!(result, Err(XlsxError::Io(_))));
}

#[test]
fn corrupt_file_is_zip_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.xlsx");
    std::fs::write(&path, b"PK\x03\x04 truncated").unwrap();

    let result = XlsxReader::read_file(&path);
    assert!(matches!(result, Err(XlsxError::Zip(_))));
}
