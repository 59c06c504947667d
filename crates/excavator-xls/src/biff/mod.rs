//! BIFF8 record stream
//!
//! The `Workbook` stream is a flat sequence of records: a 2-byte type, a
//! 2-byte body length and the body. Bodies longer than 8224 bytes spill into
//! CONTINUE records, which are merged into the record they extend. The merge
//! points are kept because strings split across them carry an extra flags
//! byte at each one.

pub mod parser;
pub mod records;
pub mod strings;

use std::io::{ErrorKind, Read, Seek};

use crate::error::{XlsError, XlsResult};

/// One record with its CONTINUE bodies appended
#[derive(Debug, Clone)]
pub struct BiffRecord {
    pub record_type: u16,
    pub data: Vec<u8>,
    /// Offsets into `data` where each CONTINUE body starts
    pub continues: Vec<usize>,
    /// Stream position of the record header; BOUNDSHEET offsets point here
    pub offset: u64,
}

/// Read every record of a stream, merging CONTINUE records into their parent
pub fn read_records<R: Read + Seek>(stream: &mut R) -> XlsResult<Vec<BiffRecord>> {
    let mut records: Vec<BiffRecord> = Vec::new();
    let mut header = [0u8; 4];

    loop {
        let offset = stream.stream_position()?;
        match stream.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(XlsError::Io(e)),
        }

        let record_type = u16::from_le_bytes([header[0], header[1]]);
        let mut body = vec![0u8; usize::from(u16::from_le_bytes([header[2], header[3]]))];
        stream.read_exact(&mut body).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => {
                XlsError::Parse(format!("record 0x{:04X} at {} is truncated", record_type, offset))
            }
            _ => XlsError::Io(e),
        })?;

        match (record_type, records.last_mut()) {
            (records::CONTINUE, Some(parent)) => {
                parent.continues.push(parent.data.len());
                parent.data.extend_from_slice(&body);
            }
            (records::CONTINUE, None) => log::debug!("orphan CONTINUE record at {}", offset),
            _ => records.push(BiffRecord {
                record_type,
                data: body,
                continues: Vec::new(),
                offset,
            }),
        }
    }

    Ok(records)
}

/// BOF body: `(version, substream type)`
pub fn parse_bof(data: &[u8]) -> XlsResult<(u16, u16)> {
    let mut offset = 0;
    let version = parser::read_u16(data, &mut offset)?;
    let kind = parser::read_u16(data, &mut offset)?;
    Ok((version, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn raw(kind: u16, body: &[u8]) -> Vec<u8> {
        let mut out = kind.to_le_bytes().to_vec();
        out.extend_from_slice(&(body.len() as u16).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn test_continue_bodies_are_merged() {
        let mut stream = raw(records::BOF, &[0x00, 0x06, 0x05, 0x00]);
        stream.extend(raw(records::SST, &[1, 2, 3]));
        stream.extend(raw(records::CONTINUE, &[4, 5]));
        stream.extend(raw(records::CONTINUE, &[6]));
        stream.extend(raw(records::EOF, &[]));

        let records = read_records(&mut Cursor::new(stream)).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].record_type, records::SST);
        assert_eq!(records[1].data, [1, 2, 3, 4, 5, 6]);
        assert_eq!(records[1].continues, [3, 5]);
        assert_eq!(records[1].offset, 8);
        assert_eq!(records[2].offset, 8 + 7 + 6 + 5);
    }

    #[test]
    fn test_truncated_record() {
        let mut stream = raw(records::BOF, &[0x00, 0x06, 0x05, 0x00]);
        stream.extend_from_slice(&[0x03, 0x02, 0x0E, 0x00, 0x01]);

        let result = read_records(&mut Cursor::new(stream));
        assert!(matches!(result, Err(XlsError::Parse(_))));
    }

    #[test]
    fn test_parse_bof() {
        assert_eq!(parse_bof(&[0x00, 0x06, 0x10, 0x00]).unwrap(), (0x0600, 0x0010));
        assert!(parse_bof(&[0x00]).is_err());
    }
}
