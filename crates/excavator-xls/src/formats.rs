//! Date detection from FORMAT and XF records
//!
//! Like XLSX, XLS stores dates as plain numbers. Each cell record names an XF
//! (extended format) record, and the XF's number format decides whether the
//! number is a date.

use std::collections::HashMap;

use excavator_core::datetime::{is_builtin_date_format, is_date_format_code};

use crate::biff::parser::read_u16;
use crate::biff::strings::read_unicode_string;
use crate::error::XlsResult;

/// Per-XF index: whether cells with that format hold dates
#[derive(Debug, Default, Clone)]
pub(crate) struct DateStyles {
    is_date: Vec<bool>,
}

impl DateStyles {
    /// Classify XF records by their number format ids
    pub(crate) fn new(custom_formats: &HashMap<u16, String>, xf_formats: &[u16]) -> Self {
        let is_date = xf_formats
            .iter()
            .map(|id| match custom_formats.get(id) {
                Some(code) => is_date_format_code(code),
                None => is_builtin_date_format(u32::from(*id)),
            })
            .collect();
        Self { is_date }
    }

    pub(crate) fn is_date(&self, xf: u16) -> bool {
        self.is_date.get(usize::from(xf)).copied().unwrap_or(false)
    }
}

/// FORMAT body: format id, then the format code
pub(crate) fn parse_format(data: &[u8]) -> XlsResult<(u16, String)> {
    let mut offset = 0;
    let id = read_u16(data, &mut offset)?;
    let code = read_unicode_string(data, &mut offset, &[])?;
    Ok((id, code))
}

/// Number format id of an XF body (font index first, format index second)
pub(crate) fn parse_xf_format(data: &[u8]) -> XlsResult<u16> {
    let mut offset = 2;
    read_u16(data, &mut offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_styles() {
        let custom = HashMap::from([
            (164, "dd.mm.yyyy".to_string()),
            (165, "#,##0\\ \"Sm3\"".to_string()),
        ]);
        let styles = DateStyles::new(&custom, &[0, 14, 164, 165, 22]);

        assert!(!styles.is_date(0));
        assert!(styles.is_date(1));
        assert!(styles.is_date(2));
        assert!(!styles.is_date(3));
        assert!(styles.is_date(4));
        assert!(!styles.is_date(40));
    }

    #[test]
    fn test_parse_records() {
        let format = [0xA4, 0x00, 0x04, 0x00, 0x00, b'y', b'y', b'y', b'y'];
        assert_eq!(parse_format(&format).unwrap(), (164, "yyyy".to_string()));

        let xf = [0x00, 0x00, 0x0E, 0x00, 0x00, 0x00];
        assert_eq!(parse_xf_format(&xf).unwrap(), 14);
        assert!(parse_xf_format(&[0x00, 0x00]).is_err());
    }
}
