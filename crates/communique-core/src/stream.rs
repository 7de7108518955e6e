//! Callback adapters for streamed fields.
//!
//! A streamed field never lives inside the message struct. On encode a
//! [`StreamProducer`] hands out chunks that are copied straight into the
//! output; on decode a [`StreamConsumer`] receives the payload, whole or in
//! sequential slices. Chunk memory is only borrowed for the duration of the
//! call that produced or consumed it.
//!
//! Length-delimited records carry their length up front, so a producer must
//! know its total length before the first chunk is written. Producers that
//! cannot tell make the encode fail with [`Error::LengthUnknown`].

use crate::error::{Error, Result};
use crate::wire::ByteSink;
use std::fmt;
use tracing::trace;

/// Scratch space available to an [`FnProducer`] closure per call
pub const FN_PRODUCER_SCRATCH: usize = 32;

/// One piece of a streamed payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Bytes of this chunk
    pub data: &'a [u8],
    /// Whether more chunks follow
    pub more: bool,
}

impl<'a> Chunk<'a> {
    /// A chunk followed by more data
    pub fn partial(data: &'a [u8]) -> Self {
        Self { data, more: true }
    }

    /// The final chunk
    pub fn last(data: &'a [u8]) -> Self {
        Self { data, more: false }
    }
}

/// Source of a streamed field's bytes during encoding
pub trait StreamProducer {
    /// Total number of bytes this producer will emit, if known in advance
    fn total_len(&self) -> Option<usize>;

    /// Produce the next chunk; `more = false` ends the stream
    fn next_chunk(&mut self) -> Result<Chunk<'_>>;
}

/// Sink for a streamed field's bytes during decoding
pub trait StreamConsumer {
    /// Accept the next piece of the payload
    fn consume(&mut self, chunk: &[u8]) -> Result<()>;
}

impl<F> StreamConsumer for F
where
    F: FnMut(&[u8]) -> Result<()>,
{
    fn consume(&mut self, chunk: &[u8]) -> Result<()> {
        self(chunk)
    }
}

/// Binding of a streamed field to the caller's producer or consumer.
///
/// The callback is borrowed, so the caller keeps ownership of whatever
/// state the producer or consumer carries.
#[derive(Default)]
pub enum Callback<'a> {
    /// Nothing bound: the field is omitted on encode and skipped on decode
    #[default]
    Unbound,
    /// Supplies bytes when the message is encoded
    Produce(&'a mut dyn StreamProducer),
    /// Receives bytes when the message is decoded
    Consume(&'a mut dyn StreamConsumer),
}

impl<'a> Callback<'a> {
    /// Binds a producer
    pub fn produce(producer: &'a mut dyn StreamProducer) -> Self {
        Self::Produce(producer)
    }

    /// Binds a consumer
    pub fn consume(consumer: &'a mut dyn StreamConsumer) -> Self {
        Self::Consume(consumer)
    }

    /// Returns true if nothing is bound
    pub fn is_unbound(&self) -> bool {
        matches!(self, Self::Unbound)
    }

    /// The bound producer, if any
    pub fn producer(&mut self) -> Option<&mut dyn StreamProducer> {
        match self {
            Self::Produce(producer) => {
                let producer: &mut dyn StreamProducer = &mut **producer;
                Some(producer)
            }
            _ => None,
        }
    }

    /// The bound consumer, if any
    pub fn consumer(&mut self) -> Option<&mut dyn StreamConsumer> {
        match self {
            Self::Consume(consumer) => {
                let consumer: &mut dyn StreamConsumer = &mut **consumer;
                Some(consumer)
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Callback<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => f.write_str("Unbound"),
            Self::Produce(producer) => f
                .debug_struct("Produce")
                .field("total_len", &producer.total_len())
                .finish(),
            Self::Consume(_) => f.write_str("Consume"),
        }
    }
}

/// Producer over a borrowed slice, optionally split into fixed-size chunks
#[derive(Debug, Clone)]
pub struct SliceProducer<'a> {
    data: &'a [u8],
    pos: usize,
    chunk_size: usize,
}

impl<'a> SliceProducer<'a> {
    /// Emits `data` as a single chunk
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: data.len(),
        }
    }

    /// Emits UTF-8 text as a single chunk
    pub fn from_text(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }

    /// Sets the chunk size (minimum 1)
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Starts over from the first byte
    pub fn reset(&mut self) {
        self.pos = 0;
    }
}

impl StreamProducer for SliceProducer<'_> {
    fn total_len(&self) -> Option<usize> {
        Some(self.data.len())
    }

    fn next_chunk(&mut self) -> Result<Chunk<'_>> {
        let end = (self.pos + self.chunk_size.max(1)).min(self.data.len());
        let chunk = &self.data[self.pos..end];
        self.pos = end;
        Ok(Chunk {
            data: chunk,
            more: self.pos < self.data.len(),
        })
    }
}

/// Producer driven by a closure that fills a scratch buffer.
///
/// The closure returns how many bytes it wrote and whether more follow.
/// Unless a length is declared with [`FnProducer::with_len`], encoding a
/// field bound to this producer fails with [`Error::LengthUnknown`].
pub struct FnProducer<F> {
    fill: F,
    len: Option<usize>,
    scratch: [u8; FN_PRODUCER_SCRATCH],
}

impl<F> FnProducer<F>
where
    F: FnMut(&mut [u8]) -> Result<(usize, bool)>,
{
    /// Wraps a closure whose total output length is unknown
    pub fn new(fill: F) -> Self {
        Self {
            fill,
            len: None,
            scratch: [0; FN_PRODUCER_SCRATCH],
        }
    }

    /// Declares the total number of bytes the closure will produce
    pub fn with_len(mut self, len: usize) -> Self {
        self.len = Some(len);
        self
    }
}

impl<F> StreamProducer for FnProducer<F>
where
    F: FnMut(&mut [u8]) -> Result<(usize, bool)>,
{
    fn total_len(&self) -> Option<usize> {
        self.len
    }

    fn next_chunk(&mut self) -> Result<Chunk<'_>> {
        let (written, more) = (self.fill)(&mut self.scratch)?;
        if written > self.scratch.len() {
            return Err(Error::ChunkOverrun {
                reported: written,
                capacity: self.scratch.len(),
            });
        }
        Ok(Chunk {
            data: &self.scratch[..written],
            more,
        })
    }
}

impl<F> fmt::Debug for FnProducer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProducer").field("len", &self.len).finish()
    }
}

/// Fixed-capacity text line, usable as a consumer and as a producer source.
///
/// Sized for character LCD rows (16 or 20 columns); anything longer than
/// `N` bytes fails with [`Error::BufferFull`].
#[derive(Clone, Copy)]
pub struct LineBuffer<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> LineBuffer<N> {
    /// Creates an empty line
    pub fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
        }
    }

    /// Creates a line holding `text`
    pub fn from_text(text: &str) -> Result<Self> {
        let mut line = Self::new();
        line.push(text.as_bytes())?;
        Ok(line)
    }

    /// Capacity in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of bytes held
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the line is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops the contents
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Raw contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Contents as text
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(self.as_bytes()).map_err(|_| Error::InvalidUtf8)
    }

    /// Producer over the current contents
    pub fn producer(&self) -> SliceProducer<'_> {
        SliceProducer::new(self.as_bytes())
    }

    /// Append bytes; nothing is appended if they do not all fit
    pub fn push(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > N - self.len {
            return Err(Error::buffer_full(N));
        }
        self.buf[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
        Ok(())
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PartialEq for LineBuffer<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> Eq for LineBuffer<N> {}

impl<const N: usize> fmt::Debug for LineBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineBuffer<{}>({:?})", N, String::from_utf8_lossy(self.as_bytes()))
    }
}

impl<const N: usize> StreamConsumer for LineBuffer<N> {
    fn consume(&mut self, chunk: &[u8]) -> Result<()> {
        self.push(chunk)
    }
}

/// Copy a producer's output into `out`, checking it against `declared`.
///
/// The caller has already written the record key and the length prefix.
pub fn write_stream<S: ByteSink + ?Sized>(
    out: &mut S,
    tag: u32,
    declared: usize,
    producer: &mut dyn StreamProducer,
) -> Result<()> {
    let mut produced = 0usize;

    loop {
        let chunk = producer.next_chunk()?;

        // Every chunk before the last must make progress
        if chunk.more && chunk.data.is_empty() {
            return Err(Error::LengthMismatch {
                tag,
                declared,
                produced,
            });
        }

        produced += chunk.data.len();
        if produced > declared {
            return Err(Error::LengthMismatch {
                tag,
                declared,
                produced,
            });
        }

        out.put_slice(chunk.data)?;
        trace!("field {}: streamed {} bytes", tag, chunk.data.len());

        if !chunk.more {
            break;
        }
    }

    if produced != declared {
        return Err(Error::LengthMismatch {
            tag,
            declared,
            produced,
        });
    }

    Ok(())
}

/// Hand a received payload to a consumer.
///
/// With `max_chunk == 0`, or when the payload fits, the consumer is called
/// once with the whole payload. Otherwise it receives sequential slices of
/// at most `max_chunk` bytes. Returns the number of calls made.
pub fn read_stream(
    consumer: &mut dyn StreamConsumer,
    payload: &[u8],
    max_chunk: usize,
) -> Result<usize> {
    if max_chunk == 0 || payload.len() <= max_chunk {
        consumer.consume(payload)?;
        return Ok(1);
    }

    let mut calls = 0;
    for chunk in payload.chunks(max_chunk) {
        consumer.consume(chunk)?;
        calls += 1;
    }
    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Writer;

    #[test]
    fn test_slice_producer_chunks() {
        let mut producer = SliceProducer::from_text("hello").chunk_size(2);
        assert_eq!(producer.total_len(), Some(5));
        assert_eq!(producer.next_chunk().unwrap(), Chunk::partial(b"he"));
        assert_eq!(producer.next_chunk().unwrap(), Chunk::partial(b"ll"));
        assert_eq!(producer.next_chunk().unwrap(), Chunk::last(b"o"));

        producer.reset();
        assert_eq!(producer.next_chunk().unwrap().data, b"he");
    }

    #[test]
    fn test_empty_slice_producer() {
        let mut producer = SliceProducer::new(b"");
        assert_eq!(producer.next_chunk().unwrap(), Chunk::last(b""));
    }

    #[test]
    fn test_write_stream() {
        let mut buf = [0u8; 8];
        let mut writer = Writer::new(&mut buf);
        let mut producer = SliceProducer::new(b"abcdef").chunk_size(4);
        write_stream(&mut writer, 1, 6, &mut producer).unwrap();
        assert_eq!(writer.written(), b"abcdef");
    }

    #[test]
    fn test_write_stream_length_mismatch() {
        let mut buf = [0u8; 8];
        let mut writer = Writer::new(&mut buf);
        let mut producer = SliceProducer::new(b"abc");
        let err = write_stream(&mut writer, 2, 5, &mut producer).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                tag: 2,
                declared: 5,
                produced: 3
            }
        ));
    }

    #[test]
    fn test_write_stream_stalled_producer() {
        let mut buf = [0u8; 8];
        let mut writer = Writer::new(&mut buf);
        let mut producer = FnProducer::new(|_: &mut [u8]| Ok((0, true))).with_len(4);
        let err = write_stream(&mut writer, 1, 4, &mut producer).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                tag: 1,
                declared: 4,
                produced: 0
            }
        ));
    }

    #[test]
    fn test_write_stream_endless_producer() {
        let mut buf = [0u8; 16];
        let mut writer = Writer::new(&mut buf);
        let mut calls = 0;
        let mut producer = FnProducer::new(|buf: &mut [u8]| {
            calls += 1;
            buf[..2].copy_from_slice(b"ab");
            Ok((2, true))
        })
        .with_len(4);
        let err = write_stream(&mut writer, 1, 4, &mut producer).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                tag: 1,
                declared: 4,
                produced: 6
            }
        ));
        drop(producer);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_fn_producer_overrun() {
        let mut producer = FnProducer::new(|buf: &mut [u8]| Ok((buf.len() + 1, false)));
        assert!(matches!(
            producer.next_chunk(),
            Err(Error::ChunkOverrun {
                reported,
                capacity: FN_PRODUCER_SCRATCH,
            }) if reported == FN_PRODUCER_SCRATCH + 1
        ));
    }

    #[test]
    fn test_fn_producer() {
        let mut remaining = 3;
        let mut producer = FnProducer::new(|buf: &mut [u8]| {
            buf[0] = b'x';
            remaining -= 1;
            Ok((1, remaining > 0))
        });
        assert_eq!(producer.total_len(), None);
        assert_eq!(producer.next_chunk().unwrap(), Chunk::partial(b"x"));

        let producer = FnProducer::new(|_: &mut [u8]| Ok((0, false))).with_len(0);
        assert_eq!(producer.total_len(), Some(0));
    }

    #[test]
    fn test_read_stream_rechunks() {
        let mut seen: Vec<Vec<u8>> = Vec::new();
        let mut consumer = |chunk: &[u8]| {
            seen.push(chunk.to_vec());
            Ok::<(), Error>(())
        };
        assert_eq!(read_stream(&mut consumer, b"abcdefg", 3).unwrap(), 3);
        assert_eq!(seen, vec![b"abc".to_vec(), b"def".to_vec(), b"g".to_vec()]);
    }

    #[test]
    fn test_read_stream_whole_payload() {
        let mut line = LineBuffer::<16>::new();
        assert_eq!(read_stream(&mut line, b"HELLO", 0).unwrap(), 1);
        assert_eq!(line.as_str().unwrap(), "HELLO");
    }

    #[test]
    fn test_line_buffer_capacity() {
        let mut line = LineBuffer::<4>::from_text("abc").unwrap();
        assert!(matches!(
            line.consume(b"de"),
            Err(Error::BufferFull { capacity: 4 })
        ));
        assert_eq!(line.as_bytes(), b"abc");
        line.consume(b"d").unwrap();
        assert_eq!(line.len(), line.capacity());
        assert!(LineBuffer::<2>::from_text("abc").is_err());
    }

    #[test]
    fn test_line_buffer_invalid_utf8() {
        let mut line = LineBuffer::<4>::new();
        line.push(&[0xFF, 0xFE]).unwrap();
        assert!(matches!(line.as_str(), Err(Error::InvalidUtf8)));
    }

    #[test]
    fn test_callback_binding() {
        let mut producer = SliceProducer::from_text("HI");
        let mut callback = Callback::produce(&mut producer);
        assert!(callback.consumer().is_none());
        assert_eq!(callback.producer().and_then(|p| p.total_len()), Some(2));
        assert!(Callback::default().is_unbound());
    }
}
