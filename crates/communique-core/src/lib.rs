//! # communique-core
//!
//! An allocation-free tag-length-value codec for the quick command deck's
//! serial link between the deck firmware and the host.
//!
//! This crate provides the core functionality for:
//! - Encoding and decoding base-128 varints and TLV records
//! - Describing messages with static field descriptor tables
//! - Streaming long string fields through producer/consumer callbacks
//! - Exporting the schemas as protobuf descriptors and `.proto` source
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`wire`]: Varints, record keys, fixed-capacity reader and writer
//! - [`schema`]: Field descriptor tables
//! - [`codec`]: Schema-driven message encode/decode
//! - [`stream`]: Callback adapters for streamed fields
//! - [`messages`]: The deck's `ButtonPushed` and `DisplayText` messages
//! - [`proto`]: Protobuf descriptor export
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use communique_core::{decode, encode_to_slice, ButtonPushed, DisplayText, LineBuffer, SliceProducer};
//!
//! let mut buf = [0u8; ButtonPushed::MAX_SIZE];
//! let len = encode_to_slice(&mut ButtonPushed::new(3), &mut buf)?;
//! assert_eq!(&buf[..len], &[0x08, 0x06]);
//! assert_eq!(decode::<ButtonPushed>(&buf[..len])?.number, 3);
//!
//! // Streamed lines are borrowed from the caller, never owned by the message
//! let mut line1 = SliceProducer::from_text("HI");
//! let mut line2 = SliceProducer::from_text("");
//! let mut msg = DisplayText::outgoing(&mut line1, &mut line2).brightness(100);
//! let mut buf = [0u8; 64];
//! let len = encode_to_slice(&mut msg, &mut buf)?;
//!
//! let (mut rx1, mut rx2) = (LineBuffer::<16>::new(), LineBuffer::<16>::new());
//! let mut received = DisplayText::incoming(&mut rx1, &mut rx2);
//! communique_core::decode_into(&mut received, &buf[..len])?;
//! assert_eq!(received.brightness, 100);
//! drop(received);
//! assert_eq!(rx1.as_str()?, "HI");
//! # Ok::<(), communique_core::Error>(())
//! ```
//!
//! ## Extensibility
//!
//! The library provides several traits for customization:
//!
//! - [`Message`]: Map your own structs onto a [`Schema`]
//! - [`StreamProducer`] / [`StreamConsumer`]: Supply or receive streamed bytes
//! - [`ProtoWriter`]: Customize how exported schemas are written
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod codec;
pub mod error;
pub mod messages;
pub mod proto;
pub mod schema;
pub mod stream;
pub mod wire;

// Re-export primary types for convenience
pub use codec::{
    decode, decode_into, encode, encode_to_bytes, encode_to_slice, encoded_len, Codec,
    CodecConfig, Message, Value,
};
pub use error::{Error, Result};
pub use messages::{split_lines, ButtonPushed, DisplayText, BUTTON_PUSHED, DISPLAY_TEXT};
pub use proto::{ExportConfig, ProtoExporter, ProtoWriter, StatsWriter};
pub use schema::{FieldDescriptor, FieldKind, Schema, Storage};
pub use stream::{
    Callback, Chunk, FnProducer, LineBuffer, SliceProducer, StreamConsumer, StreamProducer,
};
pub use wire::{Reader, WireType, Writer};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum valid field number (2^29 - 1)
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;
