//! Excel serial dates and date number formats
//!
//! Workbooks store dates as day counts in the 1900 date system. Serial 0 is
//! 1899-12-30, which also absorbs Excel's phantom 1900-02-29 for every date
//! after February 1900.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Largest serial Excel can display (9999-12-31)
const MAX_SERIAL: f64 = 2_958_465.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

const ISO_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Convert an Excel serial number to a calendar date-time
///
/// Fractions are rounded to the nearest second. Returns `None` for negative,
/// non-finite, or out-of-range serials.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial >= MAX_SERIAL + 1.0 {
        return None;
    }

    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.floor();
    let seconds = ((serial - days) * SECONDS_PER_DAY).round() as i64;

    base.checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Format an Excel serial number as `YYYY-MM-DD HH:MM:SS`
pub fn format_excel_serial(serial: f64) -> Option<String> {
    excel_serial_to_datetime(serial).map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Convert an ISO 8601 date or date-time to an Excel serial number
///
/// Accepts `2023-01-01`, `2023-01-01T06:00:00` (optionally with fractional
/// seconds or a trailing `Z`) and the same with a space separator.
pub fn iso_to_excel_serial(text: &str) -> Option<f64> {
    let text = text.trim();
    let text = text.strip_suffix('Z').unwrap_or(text);

    let datetime = ISO_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (datetime - base).num_seconds() as f64;
    let serial = seconds / SECONDS_PER_DAY;
    (0.0..MAX_SERIAL + 1.0).contains(&serial).then_some(serial)
}

/// Built-in number format ids that render dates or times
pub fn is_builtin_date_format(id: u32) -> bool {
    matches!(id, 14..=22 | 27..=36 | 45..=47 | 50..=58)
}

/// Heuristic check of a custom format code for date/time tokens
///
/// Quoted literals, backslash escapes, and bracketed sections (colors,
/// locales, conditions) are ignored; elapsed-time brackets such as `[h]` count
/// as time tokens.
pub fn is_date_format_code(code: &str) -> bool {
    let mut chars = code.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let mut inner = String::new();
                for b in chars.by_ref() {
                    if b == ']' {
                        break;
                    }
                    inner.push(b);
                }
                let inner = inner.to_ascii_lowercase();
                if !inner.is_empty() && inner.chars().all(|b| matches!(b, 'h' | 'm' | 's')) {
                    return true;
                }
            }
            // Section separator: the positive section decides
            ';' => return false,
            _ => {
                if matches!(c.to_ascii_lowercase(), 'd' | 'm' | 'y' | 'h' | 's') {
                    return true;
                }
            }
        }
    }
    false
}
