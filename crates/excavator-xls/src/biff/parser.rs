//! Little-endian field readers over record bodies
//!
//! Each reader takes the body and a cursor, and advances the cursor past the
//! field. Reading past the end is a parse error, never a panic.

use crate::error::{XlsError, XlsResult};

fn take<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> XlsResult<&'a [u8]> {
    let bytes = offset
        .checked_add(len)
        .and_then(|end| data.get(*offset..end))
        .ok_or_else(|| {
            XlsError::Parse(format!(
                "record ends at {} bytes, needed {} more at offset {}",
                data.len(),
                len,
                offset
            ))
        })?;
    *offset += len;
    Ok(bytes)
}

fn take_array<const N: usize>(data: &[u8], offset: &mut usize) -> XlsResult<[u8; N]> {
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(take(data, offset, N)?);
    Ok(bytes)
}

pub fn read_u8(data: &[u8], offset: &mut usize) -> XlsResult<u8> {
    take_array::<1>(data, offset).map(|[b]| b)
}

pub fn read_u16(data: &[u8], offset: &mut usize) -> XlsResult<u16> {
    take_array(data, offset).map(u16::from_le_bytes)
}

pub fn read_u32(data: &[u8], offset: &mut usize) -> XlsResult<u32> {
    take_array(data, offset).map(u32::from_le_bytes)
}

pub fn read_f64(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    take_array(data, offset).map(f64::from_le_bytes)
}

/// Raw bytes of a fixed-size field
pub fn read_bytes<const N: usize>(data: &[u8], offset: &mut usize) -> XlsResult<[u8; N]> {
    take_array(data, offset)
}

/// Decode an RK number
///
/// Bit 0 marks a value scaled by 100. Bit 1 selects a 30-bit signed integer
/// in bits 2..32; otherwise bits 2..32 are the high bits of an IEEE double.
pub fn decode_rk(rk: u32) -> f64 {
    let value = if rk & 0x02 != 0 {
        f64::from((rk as i32) >> 2)
    } else {
        f64::from_bits(u64::from(rk & 0xFFFF_FFFC) << 32)
    };

    if rk & 0x01 != 0 {
        value / 100.0
    } else {
        value
    }
}

pub fn read_rk(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    read_u32(data, offset).map(decode_rk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rk_integers() {
        assert_eq!(decode_rk((1200 << 2) | 0x02), 1200.0);
        assert_eq!(decode_rk(((-5i32 << 2) as u32) | 0x02), -5.0);
        // 12.5 stored as 1250 / 100
        assert_eq!(decode_rk((1250 << 2) | 0x03), 12.5);
        assert_eq!(decode_rk(0x0000_0002), 0.0);
    }

    #[test]
    fn test_rk_doubles() {
        let high = (43718.0_f64.to_bits() >> 32) as u32;
        assert_eq!(decode_rk(high & 0xFFFF_FFFC), 43718.0);
        assert!((decode_rk(0x0000_04EB) - 3.14).abs() < 1e-12);
    }

    #[test]
    fn test_readers_advance() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xFF];
        let mut offset = 0;
        assert_eq!(read_u16(&data, &mut offset).unwrap(), 0x1234);
        assert_eq!(read_u32(&data, &mut offset).unwrap(), 0x1234_5678);
        assert_eq!(read_u8(&data, &mut offset).unwrap(), 0xFF);
        assert_eq!(offset, 7);
    }

    #[test]
    fn test_short_read_is_an_error() {
        let data = 2.5_f64.to_le_bytes();
        let mut offset = 1;
        assert!(matches!(read_f64(&data, &mut offset), Err(XlsError::Parse(_))));
        assert_eq!(offset, 1);

        let mut offset = 0;
        assert_eq!(read_f64(&data, &mut offset).unwrap(), 2.5);
    }
}
