//! Reader configuration

/// How a CSV file maps onto a single worksheet
///
/// Record `n` lands in row `n + 1`, field `m` in column `m + 1`.
#[derive(Debug, Clone)]
pub struct CsvReadOptions {
    pub delimiter: u8,
    pub quote: u8,
    /// First record is a header row: it still occupies row 1 but is always
    /// kept as text
    pub has_header: bool,
    /// Read `true`/`false` and plain decimal numbers as typed values
    pub auto_detect_types: bool,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        CsvReadOptions {
            delimiter: b',',
            quote: b'"',
            has_header: false,
            auto_detect_types: true,
        }
    }
}
