//! The [`Message`] trait and the field values exchanged with the codec.

use crate::error::{Error, Result};
use crate::schema::{FieldDescriptor, FieldKind, Schema};
use crate::stream::{StreamConsumer, StreamProducer};

/// A static field value, typed by the field's [`FieldKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    /// `FieldKind::SInt32`
    SInt32(i32),
    /// `FieldKind::SInt64`
    SInt64(i64),
    /// `FieldKind::UInt32`
    UInt32(u32),
    /// `FieldKind::UInt64`
    UInt64(u64),
    /// `FieldKind::Bool`
    Bool(bool),
    /// `FieldKind::Fixed32`
    Fixed32(u32),
    /// `FieldKind::String`
    Str(&'a str),
    /// `FieldKind::Bytes`
    Bytes(&'a [u8]),
}

impl Value<'_> {
    /// The field kind this value belongs to
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::SInt32(_) => FieldKind::SInt32,
            Value::SInt64(_) => FieldKind::SInt64,
            Value::UInt32(_) => FieldKind::UInt32,
            Value::UInt64(_) => FieldKind::UInt64,
            Value::Bool(_) => FieldKind::Bool,
            Value::Fixed32(_) => FieldKind::Fixed32,
            Value::Str(_) => FieldKind::String,
            Value::Bytes(_) => FieldKind::Bytes,
        }
    }

    /// Returns true for the zero value, which is never written to the wire
    pub fn is_default(&self) -> bool {
        match *self {
            Value::SInt32(n) => n == 0,
            Value::SInt64(n) => n == 0,
            Value::UInt32(n) | Value::Fixed32(n) => n == 0,
            Value::UInt64(n) => n == 0,
            Value::Bool(b) => !b,
            Value::Str(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
        }
    }
}

/// A message type the codec can encode and decode.
///
/// Implementations map their struct fields onto the descriptors of their
/// [`Schema`]. Static fields go through [`Message::value`] and
/// [`Message::set_value`]; streamed fields through [`Message::producer`]
/// and [`Message::consumer`].
pub trait Message {
    /// The descriptor table for this message
    fn schema(&self) -> &'static Schema;

    /// Current value of a static field
    fn value(&self, field: &FieldDescriptor) -> Option<Value<'_>>;

    /// Store a decoded value into a static field
    fn set_value(&mut self, field: &FieldDescriptor, value: Value<'_>) -> Result<()>;

    /// Producer bound to a streamed field
    fn producer(&mut self, field: &FieldDescriptor) -> Option<&mut dyn StreamProducer> {
        let _ = field;
        None
    }

    /// Consumer bound to a streamed field
    fn consumer(&mut self, field: &FieldDescriptor) -> Option<&mut dyn StreamConsumer> {
        let _ = field;
        None
    }
}

/// Error for a value whose type disagrees with its field descriptor.
///
/// Only reachable when a [`Message`] implementation and its schema are out
/// of sync.
pub fn unexpected_value(field: &FieldDescriptor, value: &Value<'_>) -> Error {
    Error::UnexpectedValue {
        tag: field.tag,
        expected: field.kind,
        found: value.kind(),
    }
}
