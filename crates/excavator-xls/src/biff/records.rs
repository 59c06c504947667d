//! BIFF8 record identifiers used by the reader

// Stream structure
pub const BOF: u16 = 0x0809;
pub const EOF: u16 = 0x000A;
pub const CONTINUE: u16 = 0x003C;

// Workbook globals
pub const FILEPASS: u16 = 0x002F;
pub const DATEMODE: u16 = 0x0022;
pub const BOUNDSHEET: u16 = 0x0085;
pub const SST: u16 = 0x00FC;
pub const FORMAT: u16 = 0x041E;
pub const XF: u16 = 0x00E0;

// Cells
pub const LABELSST: u16 = 0x00FD;
pub const LABEL: u16 = 0x0204;
pub const RSTRING: u16 = 0x00D6;
pub const NUMBER: u16 = 0x0203;
pub const RK: u16 = 0x027E;
pub const MULRK: u16 = 0x00BD;
pub const BOOLERR: u16 = 0x0205;
pub const FORMULA: u16 = 0x0006;
/// Cached text result of the FORMULA record before it
pub const STRING: u16 = 0x0207;

// BOF substream types
pub const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;
pub const BOF_WORKSHEET: u16 = 0x0010;
pub const BOF_CHART: u16 = 0x0020;

pub const BIFF8_VERSION: u16 = 0x0600;

// BOUNDSHEET sheet types
pub const SHEET_WORKSHEET: u8 = 0x00;
pub const SHEET_CHART: u8 = 0x02;
