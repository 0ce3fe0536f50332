//! VarNumber and nonNegativeInteger codecs.
//!
//! A VarNumber carries every TLV-TYPE and TLV-LENGTH:
//!
//! ```text
//! value < 253          -> 1 byte:  value
//! value <= 0xFFFF      -> 3 bytes: 0xFD + u16 (big-endian)
//! value <= 0xFFFFFFFF  -> 5 bytes: 0xFE + u32 (big-endian)
//! otherwise            -> 9 bytes: 0xFF + u64 (big-endian)
//! ```
//!
//! A nonNegativeInteger is the TLV-VALUE encoding of unsigned numbers
//! (lifetimes, freshness periods, segment numbers): 1, 2, 4 or 8 bytes,
//! big-endian, shortest form on encode.

use bytes::BufMut;

use crate::error::DecodeError;

/// Longest possible VarNumber encoding.
pub const MAX_VAR_NUMBER_SIZE: usize = 9;

const PREFIX_U16: u8 = 253;
const PREFIX_U32: u8 = 254;
const PREFIX_U64: u8 = 255;

/// Number of bytes `n` occupies as a VarNumber.
pub const fn var_number_size(n: u64) -> usize {
    if n < PREFIX_U16 as u64 {
        1
    } else if n <= 0xFFFF {
        3
    } else if n <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}

/// Encode `n` as a VarNumber into a fresh vector.
pub fn encode_var_number(n: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(var_number_size(n));
    put_var_number(&mut buf, n);
    buf
}

/// Append `n` as a VarNumber to `buf`, returning the number of bytes written.
pub fn put_var_number<B: BufMut>(buf: &mut B, n: u64) -> usize {
    if n < PREFIX_U16 as u64 {
        buf.put_u8(n as u8);
        1
    } else if n <= 0xFFFF {
        buf.put_u8(PREFIX_U16);
        buf.put_u16(n as u16);
        3
    } else if n <= 0xFFFF_FFFF {
        buf.put_u8(PREFIX_U32);
        buf.put_u32(n as u32);
        5
    } else {
        buf.put_u8(PREFIX_U64);
        buf.put_u64(n);
        9
    }
}

/// Decode a VarNumber from the front of `input`.
///
/// Returns the value and the number of bytes consumed. Non-minimal
/// encodings are accepted.
pub fn decode_var_number(input: &[u8]) -> Result<(u64, usize), DecodeError> {
    let first = *input.first().ok_or(DecodeError::Truncated {
        needed: 1,
        available: 0,
    })?;

    let size = match first {
        PREFIX_U16 => 3,
        PREFIX_U32 => 5,
        PREFIX_U64 => 9,
        _ => return Ok((first as u64, 1)),
    };

    if input.len() < size {
        return Err(DecodeError::Truncated {
            needed: size,
            available: input.len(),
        });
    }

    let tail = &input[1..size];
    let value = match size {
        3 => u16::from_be_bytes([tail[0], tail[1]]) as u64,
        5 => u32::from_be_bytes([tail[0], tail[1], tail[2], tail[3]]) as u64,
        _ => u64::from_be_bytes([
            tail[0], tail[1], tail[2], tail[3], tail[4], tail[5], tail[6], tail[7],
        ]),
    };
    Ok((value, size))
}

/// Decode a TLV-TYPE: a VarNumber in `1..=u32::MAX`.
pub fn decode_type(input: &[u8]) -> Result<(u32, usize), DecodeError> {
    let (value, consumed) = decode_var_number(input)?;
    if value == 0 || value > u32::MAX as u64 {
        return Err(DecodeError::IllegalType(value));
    }
    Ok((value as u32, consumed))
}

/// Number of bytes `n` occupies as a nonNegativeInteger.
pub const fn non_negative_integer_size(n: u64) -> usize {
    if n <= 0xFF {
        1
    } else if n <= 0xFFFF {
        2
    } else if n <= 0xFFFF_FFFF {
        4
    } else {
        8
    }
}

/// Append `n` as a shortest-form nonNegativeInteger to `buf`.
pub fn put_non_negative_integer<B: BufMut>(buf: &mut B, n: u64) -> usize {
    match non_negative_integer_size(n) {
        1 => buf.put_u8(n as u8),
        2 => buf.put_u16(n as u16),
        4 => buf.put_u32(n as u32),
        _ => buf.put_u64(n),
    }
    non_negative_integer_size(n)
}

/// Encode `n` as a shortest-form nonNegativeInteger into a fresh vector.
pub fn encode_non_negative_integer(n: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8);
    put_non_negative_integer(&mut buf, n);
    buf
}

/// Decode a nonNegativeInteger occupying exactly `value`.
pub fn decode_non_negative_integer(value: &[u8]) -> Result<u64, DecodeError> {
    match value.len() {
        1 => Ok(value[0] as u64),
        2 => Ok(u16::from_be_bytes([value[0], value[1]]) as u64),
        4 => Ok(u32::from_be_bytes([value[0], value[1], value[2], value[3]]) as u64),
        8 => Ok(u64::from_be_bytes([
            value[0], value[1], value[2], value[3], value[4], value[5], value[6], value[7],
        ])),
        n => Err(DecodeError::NonNegativeIntegerLength(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_var_number_thresholds() {
        assert_eq!(encode_var_number(0), vec![0x00]);
        assert_eq!(encode_var_number(252), vec![0xFC]);
        assert_eq!(encode_var_number(253), vec![0xFD, 0x00, 0xFD]);
        assert_eq!(encode_var_number(0xFFFF), vec![0xFD, 0xFF, 0xFF]);
        assert_eq!(encode_var_number(0x10000), vec![0xFE, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(
            encode_var_number(0xFFFF_FFFF),
            vec![0xFE, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        assert_eq!(
            encode_var_number(0x1_0000_0000),
            vec![0xFF, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(
            decode_var_number(&[]),
            Err(DecodeError::Truncated {
                needed: 1,
                available: 0
            })
        );
        assert_eq!(
            decode_var_number(&[0xFD, 0x01]),
            Err(DecodeError::Truncated {
                needed: 3,
                available: 2
            })
        );
        assert!(decode_var_number(&[0xFF, 0, 0, 0, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_decode_non_minimal_accepted() {
        assert_eq!(decode_var_number(&[0xFD, 0x00, 0x05]), Ok((5, 3)));
    }

    #[test]
    fn test_decode_type_rejects_zero_and_large() {
        assert_eq!(decode_type(&[0x00]), Err(DecodeError::IllegalType(0)));
        let big = encode_var_number(0x1_0000_0000);
        assert_eq!(
            decode_type(&big),
            Err(DecodeError::IllegalType(0x1_0000_0000))
        );
        assert_eq!(decode_type(&[0xFE, 0xFF, 0xFF, 0xFF, 0xFF]), Ok((u32::MAX, 5)));
    }

    #[test]
    fn test_non_negative_integer() {
        assert_eq!(encode_non_negative_integer(0), vec![0x00]);
        assert_eq!(encode_non_negative_integer(255), vec![0xFF]);
        assert_eq!(encode_non_negative_integer(256), vec![0x01, 0x00]);
        assert_eq!(encode_non_negative_integer(4000), vec![0x0F, 0xA0]);
        assert_eq!(encode_non_negative_integer(0x10000).len(), 4);
        assert_eq!(encode_non_negative_integer(u64::MAX).len(), 8);

        assert_eq!(decode_non_negative_integer(&[0x0F, 0xA0]), Ok(4000));
        assert_eq!(
            decode_non_negative_integer(&[0x01, 0x02, 0x03]),
            Err(DecodeError::NonNegativeIntegerLength(3))
        );
        assert_eq!(
            decode_non_negative_integer(&[]),
            Err(DecodeError::NonNegativeIntegerLength(0))
        );
    }

    proptest! {
        #[test]
        fn var_number_roundtrip(n: u64) {
            let encoded = encode_var_number(n);
            prop_assert!(matches!(encoded.len(), 1 | 3 | 5 | 9));
            prop_assert_eq!(encoded.len(), var_number_size(n));
            prop_assert_eq!(decode_var_number(&encoded), Ok((n, encoded.len())));
        }

        #[test]
        fn var_number_ignores_trailing(n: u64, tail in prop::collection::vec(any::<u8>(), 0..8)) {
            let mut encoded = encode_var_number(n);
            let len = encoded.len();
            encoded.extend_from_slice(&tail);
            prop_assert_eq!(decode_var_number(&encoded), Ok((n, len)));
        }

        #[test]
        fn non_negative_integer_roundtrip(n: u64) {
            let encoded = encode_non_negative_integer(n);
            prop_assert_eq!(decode_non_negative_integer(&encoded), Ok(n));
        }
    }
}
