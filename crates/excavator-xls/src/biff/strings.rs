//! BIFF8 Unicode strings
//!
//! A string is a character count, a flags byte, optional rich-text and
//! phonetic headers, then the characters: one byte each when the high-byte
//! flag is clear, UTF-16LE otherwise. Rich-text runs and phonetic data trail
//! the characters and are skipped.
//!
//! When character data crosses into a CONTINUE body, that body opens with a
//! fresh flags byte, so the width can change mid-string.

use excavator_core::SharedString;

use super::parser::{read_u16, read_u32, read_u8};
use crate::error::{XlsError, XlsResult};

const HIGH_BYTE: u8 = 0x01;
const PHONETIC: u8 = 0x04;
const RICH_TEXT: u8 = 0x08;

/// String with a 1-byte character count (sheet names)
pub fn read_short_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    let count = usize::from(read_u8(data, offset)?);
    read_string_body(data, offset, count, &[])
}

/// String with a 2-byte character count
///
/// `continues` lists the offsets where CONTINUE bodies were merged into
/// `data`; pass an empty slice for records that never span one.
pub fn read_unicode_string(data: &[u8], offset: &mut usize, continues: &[usize]) -> XlsResult<String> {
    let count = usize::from(read_u16(data, offset)?);
    read_string_body(data, offset, count, continues)
}

fn read_string_body(
    data: &[u8],
    offset: &mut usize,
    count: usize,
    continues: &[usize],
) -> XlsResult<String> {
    let flags = read_u8(data, offset)?;
    let runs = if flags & RICH_TEXT != 0 {
        usize::from(read_u16(data, offset)?)
    } else {
        0
    };
    let phonetic = if flags & PHONETIC != 0 {
        read_u32(data, offset)? as usize
    } else {
        0
    };

    let text = read_characters(data, offset, count, flags & HIGH_BYTE != 0, continues)?;
    *offset += runs * 4 + phonetic;
    Ok(text)
}

fn read_characters(
    data: &[u8],
    offset: &mut usize,
    count: usize,
    mut wide: bool,
    continues: &[usize],
) -> XlsResult<String> {
    let mut units: Vec<u16> = Vec::with_capacity(count);

    while units.len() < count {
        if continues.binary_search(offset).is_ok() {
            wide = read_u8(data, offset)? & HIGH_BYTE != 0;
        }

        let segment_end = continues
            .iter()
            .copied()
            .find(|&at| at > *offset)
            .unwrap_or(data.len())
            .min(data.len());
        let width = if wide { 2 } else { 1 };
        let take = (segment_end.saturating_sub(*offset) / width).min(count - units.len());
        if take == 0 {
            return Err(XlsError::Parse(format!(
                "string of {} characters truncated after {}",
                count,
                units.len()
            )));
        }

        let bytes = &data[*offset..*offset + take * width];
        if wide {
            units.extend(bytes.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])));
        } else {
            units.extend(bytes.iter().map(|&b| u16::from(b)));
        }
        *offset += take * width;
    }

    Ok(String::from_utf16_lossy(&units))
}

/// Parse the shared string table
///
/// The body is a total reference count, a unique count, then that many
/// strings. A table that ends early keeps the strings read so far.
pub fn parse_sst(data: &[u8], continues: &[usize]) -> XlsResult<Vec<SharedString>> {
    let mut offset = 0;
    let _references = read_u32(data, &mut offset)?;
    let unique = read_u32(data, &mut offset)? as usize;

    let mut strings = Vec::with_capacity(unique.min(data.len()));
    for i in 0..unique {
        match read_unicode_string(data, &mut offset, continues) {
            Ok(text) => strings.push(SharedString::from(text)),
            Err(e) => {
                log::warn!("shared string table cut short at {}/{}: {}", i, unique, e);
                break;
            }
        }
    }

    Ok(strings)
}
