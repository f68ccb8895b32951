//! Unsigned base-128 varints.
//!
//! Each byte carries 7 bits of the value, least significant group first.
//! The high bit is set on every byte except the last.

/// Maximum number of bytes a u64 varint can occupy (ceil(64 / 7))
pub const MAX_VARINT_LEN: usize = 10;

/// Decode a varint from the start of the given bytes.
///
/// Returns the decoded value and the number of bytes consumed, or `None`
/// if the bytes end before the terminating byte, the encoding runs past
/// ten bytes, or the tenth byte overflows 64 bits.
pub fn decode_varint(data: &[u8]) -> Option<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift = 0;

    for (i, &byte) in data.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return None;
        }

        // Only the lowest bit of the tenth byte still fits in a u64
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return None;
        }

        result |= u64::from(byte & 0x7F) << shift;
        shift += 7;

        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }
    }

    None
}

/// Encode a value as a varint, appending to `buf`.
#[cfg(test)]
pub(crate) fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_varint_single_byte() {
        let data = [0x08];
        assert_eq!(decode_varint(&data), Some((8, 1)));
    }

    #[test]
    fn test_decode_varint_multi_byte() {
        let data = [0xAC, 0x02]; // 300
        assert_eq!(decode_varint(&data), Some((300, 2)));
    }

    #[test]
    fn test_decode_varint_ignores_trailing_bytes() {
        let data = [0x05, 0xFF, 0xFF];
        assert_eq!(decode_varint(&data), Some((5, 1)));
    }

    #[test]
    fn test_decode_varint_max() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        assert_eq!(decode_varint(&data), Some((u64::MAX, 10)));
    }

    #[test]
    fn test_decode_varint_overflow() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        assert_eq!(decode_varint(&data), None);

        let too_long = [0x80; 11];
        assert_eq!(decode_varint(&too_long), None);
    }

    #[test]
    fn test_decode_varint_incomplete() {
        assert_eq!(decode_varint(&[]), None);
        assert_eq!(decode_varint(&[0x80]), None);
        assert_eq!(decode_varint(&[0xAC]), None);
    }

    #[test]
    fn test_encode_varint_matches_decode() {
        for value in [0, 1, 127, 128, 300, 16_384, u64::from(u32::MAX), u64::MAX] {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            assert_eq!(decode_varint(&buf), Some((value, buf.len())));
        }
    }
}
