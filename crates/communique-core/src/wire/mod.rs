//! Low-level TLV wire format.
//!
//! This module implements the byte-level side of the codec: record keys,
//! varints, fixed-width little-endian integers and the cursors that move
//! over caller-provided memory.
//!
//! ## Wire Format Overview
//!
//! Each field is encoded as:
//! - A varint "key" containing the field number and wire type
//!   (`key = (tag << 3) | wire_type`)
//! - The field payload (format depends on wire type)
//!
//! Wire types:
//! - 0: VARINT (sint32, sint64, uint32, uint64, bool)
//! - 1: FIXED64 (never declared by our schemas, only skipped)
//! - 2: LEN (string, bytes), `varint(length) || bytes`
//! - 5: FIXED32, four bytes little-endian
//!
//! Neither cursor ever allocates. A [`Writer`] fails with
//! [`Error::BufferFull`] instead of growing, and a [`Reader`] fails with
//! [`Error::Truncated`] when the input ends early.

mod varint;

use crate::error::{Error, Result};
use crate::MAX_FIELD_NUMBER;
use std::fmt;

pub use varint::{
    decode_varint, decode_varint_slice, encode_varint, varint_len, zigzag_decode, zigzag_encode,
    MAX_VARINT_LEN,
};

/// Wire types understood by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 64-bit fixed-width
    Fixed64 = 1,
    /// Length-delimited (strings, bytes)
    Len = 2,
    /// 32-bit fixed-width
    Fixed32 = 5,
}

impl WireType {
    /// Payload size for fixed-width wire types
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            WireType::Fixed64 => Some(8),
            WireType::Fixed32 => Some(4),
            WireType::Varint | WireType::Len => None,
        }
    }
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::Len),
            5 => Ok(WireType::Fixed32),
            // 3 and 4 are the deprecated group markers
            _ => Err(Error::InvalidWireType { value }),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::Len => "length-delimited",
            WireType::Fixed32 => "fixed32",
        };
        f.write_str(name)
    }
}

/// Pack a field number and wire type into a record key
pub fn encode_key(tag: u32, wire_type: WireType) -> u64 {
    (u64::from(tag) << 3) | wire_type as u64
}

/// Split a record key into field number and wire type
pub fn decode_key(key: u64) -> Result<(u32, WireType)> {
    let wire_type = WireType::try_from((key & 0x07) as u8)?;
    let tag = key >> 3;

    if tag == 0 || tag > u64::from(MAX_FIELD_NUMBER) {
        return Err(Error::InvalidTag { tag });
    }

    Ok((tag as u32, wire_type))
}

/// Destination for encoded bytes
pub trait ByteSink {
    /// Append a single byte
    fn put_u8(&mut self, byte: u8) -> Result<()>;

    /// Append a run of bytes
    fn put_slice(&mut self, data: &[u8]) -> Result<()> {
        for &byte in data {
            self.put_u8(byte)?;
        }
        Ok(())
    }
}

/// Source of bytes to decode
pub trait ByteSource {
    /// Take the next byte
    fn take_u8(&mut self) -> Result<u8>;

    /// Current offset from the start of the input
    fn offset(&self) -> usize;
}

/// Sequential writer over a caller-provided fixed-capacity buffer.
#[derive(Debug)]
pub struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    /// Creates a writer positioned at the start of `buf`
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Total size of the underlying buffer
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of bytes written so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// The bytes written so far
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    /// Consumes the writer and returns the written prefix of the buffer
    pub fn into_written(self) -> &'a [u8] {
        let Writer { buf, pos } = self;
        &buf[..pos]
    }

    /// Rewinds to the start of the buffer
    pub fn clear(&mut self) {
        self.pos = 0;
    }

    /// Write a single byte
    pub fn write_u8(&mut self, byte: u8) -> Result<()> {
        self.write_bytes(&[byte])
    }

    /// Write raw bytes; nothing is written if they do not all fit
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.remaining() {
            return Err(Error::buffer_full(self.capacity()));
        }
        self.buf[self.pos..self.pos + data.len()].copy_from_slice(data);
        self.pos += data.len();
        Ok(())
    }

    /// Write a little-endian u32
    pub fn write_fixed32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write a little-endian u64
    pub fn write_fixed64(&mut self, value: u64) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write a base-128 varint, returning its length
    pub fn write_varint(&mut self, value: u64) -> Result<usize> {
        encode_varint(value, self)
    }

    /// Write a record key
    pub fn write_key(&mut self, tag: u32, wire_type: WireType) -> Result<usize> {
        self.write_varint(encode_key(tag, wire_type))
    }
}

impl ByteSink for Writer<'_> {
    fn put_u8(&mut self, byte: u8) -> Result<()> {
        self.write_u8(byte)
    }

    fn put_slice(&mut self, data: &[u8]) -> Result<()> {
        self.write_bytes(data)
    }
}

/// Sink that only counts bytes, used to size a message before writing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LenCounter {
    len: usize,
}

impl LenCounter {
    /// Creates a counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes counted so far
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing was counted
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl ByteSink for LenCounter {
    fn put_u8(&mut self, _byte: u8) -> Result<()> {
        self.len += 1;
        Ok(())
    }

    fn put_slice(&mut self, data: &[u8]) -> Result<()> {
        self.len += data.len();
        Ok(())
    }
}

/// Sequential reader over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true once every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| Error::truncated(self.data.len()))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Borrow the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::truncated(self.data.len()));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a little-endian u32
    pub fn read_fixed32(&mut self) -> Result<u32> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.read_bytes(4)?);
        Ok(u32::from_le_bytes(raw))
    }

    /// Read a little-endian u64
    pub fn read_fixed64(&mut self) -> Result<u64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.read_bytes(8)?);
        Ok(u64::from_le_bytes(raw))
    }

    /// Read a base-128 varint
    pub fn read_varint(&mut self) -> Result<u64> {
        decode_varint(self).map(|(value, _)| value)
    }

    /// Read a record key
    pub fn read_key(&mut self) -> Result<(u32, WireType)> {
        let key = self.read_varint()?;
        decode_key(key)
    }

    /// Read a length prefix and borrow the payload that follows it
    pub fn read_len_delimited(&mut self) -> Result<&'a [u8]> {
        let offset = self.pos;
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| Error::overflow(offset))?;
        self.read_bytes(len)
    }

    /// Skip over a payload of the given wire type.
    ///
    /// Returns the number of payload bytes consumed.
    pub fn skip(&mut self, wire_type: WireType) -> Result<usize> {
        let start = self.pos;
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Len => {
                self.read_len_delimited()?;
            }
            WireType::Fixed64 | WireType::Fixed32 => {
                let len = wire_type.fixed_len().unwrap_or_default();
                self.read_bytes(len)?;
            }
        }
        Ok(self.pos - start)
    }
}

impl ByteSource for Reader<'_> {
    fn take_u8(&mut self) -> Result<u8> {
        self.read_u8()
    }

    fn offset(&self) -> usize {
        self.pos
    }
}

/// Consume a single record from the data.
///
/// Returns the field number and total bytes consumed (key and payload).
pub fn consume_field(data: &[u8]) -> Result<(u32, usize)> {
    let mut reader = Reader::new(data);
    let (tag, wire_type) = reader.read_key()?;
    reader.skip(wire_type)?;
    Ok((tag, reader.position()))
}
