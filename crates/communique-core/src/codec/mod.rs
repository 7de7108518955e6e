//! Schema-driven message encoding and decoding.
//!
//! ## Encoding
//!
//! [`Codec::encode`] walks the schema in declaration order. Static fields
//! holding their zero value are omitted, so absence on the wire means
//! "default". Streamed fields ask their producer for the total length, write
//! the length prefix, then copy chunks straight into the output.
//!
//! ## Decoding
//!
//! [`Codec::decode_into`] reads records until the input is exhausted, in any
//! tag order. Records with tags the schema does not know are skipped, which
//! lets newer senders talk to older receivers. A record whose wire type
//! disagrees with the schema is rejected.
//!
//! Any error aborts the whole message. Callers discard the output buffer
//! (encode) or the partially populated struct (decode).

mod message;

use crate::error::{Error, Result};
use crate::schema::{FieldDescriptor, FieldKind, Storage};
use crate::stream::{read_stream, write_stream};
use crate::wire::{
    encode_key, encode_varint, zigzag_decode, zigzag_encode, ByteSink, LenCounter, Reader,
    WireType, Writer,
};
use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

pub use message::{unexpected_value, Message, Value};

/// Configuration for the codec
#[derive(Debug, Clone, Default)]
pub struct CodecConfig {
    /// Largest slice handed to a stream consumer at once (0 = whole payload)
    pub max_chunk_size: usize,
    /// Largest message the codec will encode (0 = bounded only by the buffer)
    pub max_message_size: usize,
}

impl CodecConfig {
    /// Creates a new codec config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the largest slice handed to a stream consumer
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.max_chunk_size = size;
        self
    }

    /// Sets the largest message that may be encoded
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }
}

/// Encoder/decoder for [`Message`] types
#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    /// Creates a new codec with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new codec with custom configuration
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode `msg` into `out`, returning the number of bytes written.
    ///
    /// Streamed fields consume their producers.
    pub fn encode<M: Message + ?Sized>(&self, msg: &mut M, out: &mut Writer<'_>) -> Result<usize> {
        let schema = msg.schema();
        debug_assert!(schema.validate().is_ok(), "invalid schema {}", schema.name());

        if self.config.max_message_size > 0 {
            let len = self.encoded_len(msg)?;
            if len > self.config.max_message_size {
                return Err(Error::buffer_full(self.config.max_message_size));
            }
        }

        let start = out.position();

        for field in schema.fields() {
            match field.storage {
                Storage::Static => {
                    let Some(value) = msg.value(field) else {
                        continue;
                    };
                    if value.is_default() {
                        continue;
                    }
                    check_kind(field, &value)?;

                    out.write_key(field.tag, field.wire_type())?;
                    write_value(out, &value)?;
                    trace!("{}.{} = {:?}", schema.name(), field.name, value);
                }
                Storage::Streamed => {
                    let Some(producer) = msg.producer(field) else {
                        trace!("{}.{}: no producer bound", schema.name(), field.name);
                        continue;
                    };
                    let declared = producer
                        .total_len()
                        .ok_or(Error::LengthUnknown { tag: field.tag })?;
                    if declared == 0 {
                        continue;
                    }

                    out.write_key(field.tag, WireType::Len)?;
                    out.write_varint(declared as u64)?;
                    write_stream(out, field.tag, declared, producer)?;
                    trace!("{}.{}: {} streamed bytes", schema.name(), field.name, declared);
                }
            }
        }

        let written = out.position() - start;
        debug!("Encoded {} ({} bytes)", schema.name(), written);
        Ok(written)
    }

    /// Number of bytes [`Codec::encode`] would write for `msg`.
    ///
    /// Producers are asked for their length only; no chunks are consumed.
    pub fn encoded_len<M: Message + ?Sized>(&self, msg: &mut M) -> Result<usize> {
        let schema = msg.schema();
        let mut counter = LenCounter::new();
        let mut streamed = 0usize;

        for field in schema.fields() {
            match field.storage {
                Storage::Static => {
                    let Some(value) = msg.value(field) else {
                        continue;
                    };
                    if value.is_default() {
                        continue;
                    }
                    check_kind(field, &value)?;
                    encode_varint(encode_key(field.tag, field.wire_type()), &mut counter)?;
                    write_value(&mut counter, &value)?;
                }
                Storage::Streamed => {
                    let Some(producer) = msg.producer(field) else {
                        continue;
                    };
                    let declared = producer
                        .total_len()
                        .ok_or(Error::LengthUnknown { tag: field.tag })?;
                    if declared == 0 {
                        continue;
                    }
                    encode_varint(encode_key(field.tag, WireType::Len), &mut counter)?;
                    encode_varint(declared as u64, &mut counter)?;
                    streamed += declared;
                }
            }
        }

        Ok(counter.len() + streamed)
    }

    /// Encode `msg` into the front of `buf`, returning the number of bytes written
    pub fn encode_to_slice<M: Message + ?Sized>(&self, msg: &mut M, buf: &mut [u8]) -> Result<usize> {
        let mut writer = Writer::new(buf);
        self.encode(msg, &mut writer)
    }

    /// Encode `msg` into a freshly allocated, exactly sized buffer
    pub fn encode_to_bytes<M: Message + ?Sized>(&self, msg: &mut M) -> Result<Bytes> {
        let len = self.encoded_len(msg)?;
        let mut buf = BytesMut::zeroed(len);
        let written = {
            let mut writer = Writer::new(&mut buf[..]);
            self.encode(msg, &mut writer)?
        };
        buf.truncate(written);
        Ok(buf.freeze())
    }

    /// Decode `data` into an existing message.
    ///
    /// Static fields absent from `data` keep their current value; streamed
    /// fields are delivered to the consumers bound on `msg`, or skipped when
    /// none is bound.
    pub fn decode_into<M: Message + ?Sized>(&self, msg: &mut M, data: &[u8]) -> Result<()> {
        let schema = msg.schema();
        debug_assert!(schema.validate().is_ok(), "invalid schema {}", schema.name());

        let mut reader = Reader::new(data);

        while !reader.is_empty() {
            let (tag, wire_type) = reader.read_key()?;

            let Some(field) = schema.field(tag) else {
                let skipped = reader.skip(wire_type)?;
                debug!(
                    "{}: skipping unknown field {} ({}, {} bytes)",
                    schema.name(),
                    tag,
                    wire_type,
                    skipped
                );
                continue;
            };

            if wire_type != field.wire_type() {
                return Err(Error::TypeMismatch {
                    tag,
                    expected: field.wire_type(),
                    found: wire_type,
                });
            }

            match field.storage {
                Storage::Static => {
                    let value = read_value(&mut reader, field)?;
                    trace!("{}.{} = {:?}", schema.name(), field.name, value);
                    msg.set_value(field, value)?;
                }
                Storage::Streamed => {
                    let payload = reader.read_len_delimited()?;
                    if field.kind == FieldKind::String && std::str::from_utf8(payload).is_err() {
                        return Err(Error::InvalidUtf8);
                    }

                    match msg.consumer(field) {
                        Some(consumer) => {
                            let calls = read_stream(consumer, payload, self.config.max_chunk_size)?;
                            trace!(
                                "{}.{}: {} bytes in {} chunk(s)",
                                schema.name(),
                                field.name,
                                payload.len(),
                                calls
                            );
                        }
                        None => {
                            trace!("{}.{}: no consumer bound, skipped", schema.name(), field.name);
                        }
                    }
                }
            }
        }

        debug!("Decoded {} ({} bytes)", schema.name(), data.len());
        Ok(())
    }

    /// Decode `data` into a default-initialised message
    pub fn decode<M: Message + Default>(&self, data: &[u8]) -> Result<M> {
        let mut msg = M::default();
        self.decode_into(&mut msg, data)?;
        Ok(msg)
    }
}

fn check_kind(field: &FieldDescriptor, value: &Value<'_>) -> Result<()> {
    if value.kind() != field.kind {
        return Err(unexpected_value(field, value));
    }
    Ok(())
}

fn write_value<S: ByteSink + ?Sized>(out: &mut S, value: &Value<'_>) -> Result<()> {
    match *value {
        Value::SInt32(n) => {
            encode_varint(zigzag_encode(i64::from(n)), out)?;
        }
        Value::SInt64(n) => {
            encode_varint(zigzag_encode(n), out)?;
        }
        Value::UInt32(n) => {
            encode_varint(u64::from(n), out)?;
        }
        Value::UInt64(n) => {
            encode_varint(n, out)?;
        }
        Value::Bool(b) => {
            encode_varint(u64::from(b), out)?;
        }
        Value::Fixed32(n) => out.put_slice(&n.to_le_bytes())?,
        Value::Str(s) => write_len_delimited(out, s.as_bytes())?,
        Value::Bytes(b) => write_len_delimited(out, b)?,
    }
    Ok(())
}

fn write_len_delimited<S: ByteSink + ?Sized>(out: &mut S, data: &[u8]) -> Result<()> {
    encode_varint(data.len() as u64, out)?;
    out.put_slice(data)
}

fn read_value<'a>(reader: &mut Reader<'a>, field: &FieldDescriptor) -> Result<Value<'a>> {
    let offset = reader.position();
    let value = match field.kind {
        FieldKind::SInt32 => {
            let n = zigzag_decode(reader.read_varint()?);
            Value::SInt32(i32::try_from(n).map_err(|_| Error::overflow(offset))?)
        }
        FieldKind::SInt64 => Value::SInt64(zigzag_decode(reader.read_varint()?)),
        FieldKind::UInt32 => Value::UInt32(
            u32::try_from(reader.read_varint()?).map_err(|_| Error::overflow(offset))?,
        ),
        FieldKind::UInt64 => Value::UInt64(reader.read_varint()?),
        FieldKind::Bool => Value::Bool(reader.read_varint()? != 0),
        FieldKind::Fixed32 => Value::Fixed32(reader.read_fixed32()?),
        FieldKind::String => {
            let raw = reader.read_len_delimited()?;
            Value::Str(std::str::from_utf8(raw).map_err(|_| Error::InvalidUtf8)?)
        }
        FieldKind::Bytes => Value::Bytes(reader.read_len_delimited()?),
    };
    Ok(value)
}

/// Encode `msg` into `out` with the default configuration
pub fn encode<M: Message + ?Sized>(msg: &mut M, out: &mut Writer<'_>) -> Result<usize> {
    Codec::new().encode(msg, out)
}

/// Encode `msg` into the front of `buf` with the default configuration
pub fn encode_to_slice<M: Message + ?Sized>(msg: &mut M, buf: &mut [u8]) -> Result<usize> {
    Codec::new().encode_to_slice(msg, buf)
}

/// Encode `msg` into a new [`Bytes`] with the default configuration
pub fn encode_to_bytes<M: Message + ?Sized>(msg: &mut M) -> Result<Bytes> {
    Codec::new().encode_to_bytes(msg)
}

/// Encoded size of `msg`
pub fn encoded_len<M: Message + ?Sized>(msg: &mut M) -> Result<usize> {
    Codec::new().encoded_len(msg)
}

/// Decode `data` into an existing message with the default configuration
pub fn decode_into<M: Message + ?Sized>(msg: &mut M, data: &[u8]) -> Result<()> {
    Codec::new().decode_into(msg, data)
}

/// Decode `data` into a new message with the default configuration
pub fn decode<M: Message + Default>(data: &[u8]) -> Result<M> {
    Codec::new().decode(data)
}
