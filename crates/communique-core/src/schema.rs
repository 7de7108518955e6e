//! Static field descriptor tables.
//!
//! A [`Schema`] is an ordered list of [`FieldDescriptor`]s defined once per
//! message type, usually as a `static`, and shared read-only by every encode
//! and decode call. Lookup by tag is a linear scan; schemas here hold a
//! handful of fields.

use crate::error::{Error, Result};
use crate::wire::{WireType, MAX_VARINT_LEN};
use crate::MAX_FIELD_NUMBER;

/// Value type of a field, which also fixes its wire type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Signed 32-bit integer, zig-zag varint
    SInt32,
    /// Signed 64-bit integer, zig-zag varint
    SInt64,
    /// Unsigned 32-bit integer, plain varint
    UInt32,
    /// Unsigned 64-bit integer, plain varint
    UInt64,
    /// Boolean, single-byte varint
    Bool,
    /// Unsigned 32-bit integer, four bytes little-endian
    Fixed32,
    /// UTF-8 text, length-delimited
    String,
    /// Raw bytes, length-delimited
    Bytes,
}

impl FieldKind {
    /// Wire type used for this kind
    pub const fn wire_type(self) -> WireType {
        match self {
            FieldKind::SInt32
            | FieldKind::SInt64
            | FieldKind::UInt32
            | FieldKind::UInt64
            | FieldKind::Bool => WireType::Varint,
            FieldKind::Fixed32 => WireType::Fixed32,
            FieldKind::String | FieldKind::Bytes => WireType::Len,
        }
    }

    /// Upper bound on the payload size, if one exists
    pub fn max_payload_len(self) -> Option<usize> {
        match self {
            FieldKind::Bool => Some(1),
            FieldKind::Fixed32 => Some(4),
            FieldKind::SInt32 | FieldKind::SInt64 | FieldKind::UInt32 | FieldKind::UInt64 => {
                Some(MAX_VARINT_LEN)
            }
            FieldKind::String | FieldKind::Bytes => None,
        }
    }

    /// Protobuf scalar type name for this kind
    pub fn proto_name(self) -> &'static str {
        match self {
            FieldKind::SInt32 => "sint32",
            FieldKind::SInt64 => "sint64",
            FieldKind::UInt32 => "uint32",
            FieldKind::UInt64 => "uint64",
            FieldKind::Bool => "bool",
            FieldKind::Fixed32 => "fixed32",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
        }
    }
}

/// Where a field's value lives while a message is encoded or decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    /// Fixed-size slot inside the message struct
    Static,
    /// Produced or consumed in chunks through a stream callback
    Streamed,
}

/// Metadata for one field of a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name
    pub name: &'static str,
    /// Field number, unique within the schema
    pub tag: u32,
    /// Value type
    pub kind: FieldKind,
    /// Storage mode
    pub storage: Storage,
}

impl FieldDescriptor {
    /// Creates a static field
    pub const fn new(name: &'static str, tag: u32, kind: FieldKind) -> Self {
        Self {
            name,
            tag,
            kind,
            storage: Storage::Static,
        }
    }

    /// Creates a streamed field
    pub const fn streamed(name: &'static str, tag: u32, kind: FieldKind) -> Self {
        Self {
            name,
            tag,
            kind,
            storage: Storage::Streamed,
        }
    }

    /// Wire type expected on the wire for this field
    pub const fn wire_type(&self) -> WireType {
        self.kind.wire_type()
    }

    /// Returns true for fields handled by stream callbacks
    pub fn is_streamed(&self) -> bool {
        self.storage == Storage::Streamed
    }
}

/// Ordered, immutable field list for one message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    name: &'static str,
    fields: &'static [FieldDescriptor],
}

impl Schema {
    /// Defines a schema; call [`Schema::validate`] in tests to check invariants
    pub const fn new(name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self { name, fields }
    }

    /// Message name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    /// Find the descriptor for a field number
    pub fn field(&self, tag: u32) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.tag == tag)
    }

    /// Find the descriptor for a field name
    pub fn field_by_name(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Check the descriptor table invariants.
    ///
    /// Tags must be in `1..=MAX_FIELD_NUMBER` and unique, and only
    /// length-delimited kinds may be streamed.
    pub fn validate(&self) -> Result<()> {
        for (i, field) in self.fields.iter().enumerate() {
            if field.tag == 0 || field.tag > MAX_FIELD_NUMBER {
                return Err(Error::invalid_schema(
                    self.name,
                    format!(
                        "field '{}' has tag {}, must be between 1 and {}",
                        field.name, field.tag, MAX_FIELD_NUMBER
                    ),
                ));
            }

            if let Some(other) = self.fields[..i].iter().find(|f| f.tag == field.tag) {
                return Err(Error::invalid_schema(
                    self.name,
                    format!(
                        "fields '{}' and '{}' share tag {}",
                        other.name, field.name, field.tag
                    ),
                ));
            }

            if field.is_streamed() && field.wire_type() != WireType::Len {
                return Err(Error::invalid_schema(
                    self.name,
                    format!("field '{}' is streamed but not length-delimited", field.name),
                ));
            }
        }

        Ok(())
    }

    /// Largest possible encoded size, or `None` when it depends on runtime data
    pub fn max_encoded_size(&self) -> Option<usize> {
        self.fields.iter().try_fold(0, |total, field| {
            let key_len = crate::wire::varint_len(crate::wire::encode_key(
                field.tag,
                field.wire_type(),
            ));
            field
                .kind
                .max_payload_len()
                .map(|payload| total + key_len + payload)
        })
    }
}
