//! Base-128 variable-length integers.
//!
//! Each byte carries seven value bits, least-significant group first. The
//! high bit is a continuation flag: set on every byte except the last.
//! Signed values go through zig-zag mapping first so that small negative
//! numbers stay short.

use super::{ByteSink, ByteSource};
use crate::error::{Error, Result};

/// Varints are at most 10 bytes for a 64-bit value
pub const MAX_VARINT_LEN: usize = 10;

/// Encode `value` into `out`, returning the number of bytes written.
pub fn encode_varint<S: ByteSink + ?Sized>(mut value: u64, out: &mut S) -> Result<usize> {
    let mut written = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        written += 1;
        if value == 0 {
            out.put_u8(byte)?;
            return Ok(written);
        }
        out.put_u8(byte | 0x80)?;
    }
}

/// Decode a varint from `src`.
///
/// Returns the decoded value and the number of bytes consumed.
pub fn decode_varint<S: ByteSource + ?Sized>(src: &mut S) -> Result<(u64, usize)> {
    let start = src.offset();
    let mut result: u64 = 0;

    for i in 0..MAX_VARINT_LEN {
        let byte = src.take_u8()?;

        // The tenth group only has room for the top bit of a u64
        if i == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(Error::overflow(start));
        }

        result |= u64::from(byte & 0x7F) << (7 * i);

        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }

    Err(Error::overflow(start))
}

/// Decode a varint from the front of a plain byte slice.
pub fn decode_varint_slice(data: &[u8]) -> Result<(u64, usize)> {
    let mut reader = super::Reader::new(data);
    decode_varint(&mut reader)
}

/// Number of bytes `value` occupies once encoded
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Map a signed integer onto the unsigned range: 0, -1, 1, -2 ... become 0, 1, 2, 3 ...
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Inverse of [`zigzag_encode`]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{LenCounter, Writer};

    fn round_trip(value: u64) -> u64 {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let mut writer = Writer::new(&mut buf);
        let written = encode_varint(value, &mut writer).unwrap();
        assert_eq!(written, varint_len(value));
        let (decoded, read) = decode_varint_slice(writer.written()).unwrap();
        assert_eq!(read, written);
        decoded
    }

    #[test]
    fn test_decode_varint_single_byte() {
        let (value, len) = decode_varint_slice(&[0x08]).unwrap();
        assert_eq!(value, 8);
        assert_eq!(len, 1);
    }

    #[test]
    fn test_decode_varint_multi_byte() {
        let (value, len) = decode_varint_slice(&[0xAC, 0x02]).unwrap();
        assert_eq!(value, 300);
        assert_eq!(len, 2);
    }

    #[test]
    fn test_decode_varint_max() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        let (value, len) = decode_varint_slice(&data).unwrap();
        assert_eq!(value, u64::MAX);
        assert_eq!(len, 10);
    }

    #[test]
    fn test_boundary_values() {
        for value in [0, 127, 128, u64::from(u32::MAX), i64::MAX as u64, u64::MAX] {
            assert_eq!(round_trip(value), value);
        }
    }

    #[test]
    fn test_encoded_lengths() {
        assert_eq!(varint_len(0), 1);
        assert_eq!(varint_len(127), 1);
        assert_eq!(varint_len(128), 2);
        assert_eq!(varint_len(u64::from(u32::MAX)), 5);
        assert_eq!(varint_len(u64::MAX), 10);

        let mut counter = LenCounter::new();
        assert_eq!(encode_varint(300, &mut counter).unwrap(), 2);
        assert_eq!(counter.len(), 2);
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(3), 6);
        assert_eq!(zigzag_encode(i64::MAX), u64::MAX - 1);
        assert_eq!(zigzag_encode(i64::MIN), u64::MAX);
        for n in [0, -1, 1, 3, -64, 2000, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode(zigzag_encode(n)), n);
        }
        assert_eq!(round_trip(zigzag_encode(-1)), 1);
    }

    #[test]
    fn test_truncated() {
        let err = decode_varint_slice(&[0x80, 0x80]).unwrap_err();
        assert!(matches!(err, Error::Truncated { offset: 2 }));
        assert!(matches!(
            decode_varint_slice(&[]),
            Err(Error::Truncated { offset: 0 })
        ));
    }

    #[test]
    fn test_eleven_groups_overflow() {
        let mut data = [0x80u8; 11];
        data[10] = 0x01;
        assert!(matches!(
            decode_varint_slice(&data),
            Err(Error::Overflow { offset: 0 })
        ));
    }

    #[test]
    fn test_tenth_group_out_of_range() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        assert!(matches!(
            decode_varint_slice(&data),
            Err(Error::Overflow { .. })
        ));
    }

    #[test]
    fn test_encode_into_full_buffer() {
        let mut buf = [0u8; 1];
        let mut writer = Writer::new(&mut buf);
        assert!(matches!(
            encode_varint(300, &mut writer),
            Err(Error::BufferFull { capacity: 1 })
        ));
    }
}
