//! Protobuf descriptor export.
//!
//! The wire format is protobuf-compatible for the field kinds the codec
//! supports, so host software can use stock protobuf tooling against the
//! deck. This module turns static [`Schema`] tables into:
//!
//! 1. A `FileDescriptorProto` (prost-types)
//! 2. A validated `DescriptorPool` (prost-reflect), useful for dynamic
//!    decoding on the host
//! 3. `.proto` source text, written through the [`ProtoWriter`] trait
//!
//! ## Extensibility
//!
//! The [`ProtoWriter`] trait allows customization of how schemas are written.
//! [`StatsWriter`] is a small example that only counts.

mod writer;

use crate::error::{Error, Result};
use crate::messages::{BUTTON_PUSHED, DISPLAY_TEXT};
use crate::schema::{FieldDescriptor, FieldKind, Schema};
use prost::Message as _;
use prost_reflect::{DescriptorPool, MessageDescriptor};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet};
use std::fmt::Write as FmtWrite;

pub use writer::{ProtoWriter, StatsWriter};

/// Configuration for descriptor export
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Protobuf package (empty for none)
    pub package: String,
    /// Name of the exported `.proto` file
    pub file_name: String,
    /// Indentation string (default: 2 spaces)
    pub indent_str: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            package: "communique".to_string(),
            file_name: "communique.proto".to_string(),
            indent_str: "  ".to_string(),
        }
    }
}

impl ExportConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the protobuf package
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Sets the exported file name
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Sets the indentation string
    pub fn indent_str(mut self, s: impl Into<String>) -> Self {
        self.indent_str = s.into();
        self
    }
}

/// Exports a set of schemas as protobuf descriptors and source
#[derive(Debug, Clone)]
pub struct ProtoExporter {
    schemas: Vec<&'static Schema>,
    config: ExportConfig,
}

impl ProtoExporter {
    /// Creates an exporter, validating every schema
    pub fn new(schemas: &[&'static Schema]) -> Result<Self> {
        for schema in schemas {
            schema.validate()?;
        }

        Ok(Self {
            schemas: schemas.to_vec(),
            config: ExportConfig::default(),
        })
    }

    /// Creates an exporter for the deck's `ButtonPushed` and `DisplayText`
    pub fn deck() -> Result<Self> {
        Self::new(&[&BUTTON_PUSHED, &DISPLAY_TEXT])
    }

    /// Creates a new exporter with custom config
    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    /// Name of the exported file
    pub fn file_name(&self) -> &str {
        &self.config.file_name
    }

    /// Build the `FileDescriptorProto` for all schemas
    pub fn file_descriptor(&self) -> FileDescriptorProto {
        let package = if self.config.package.is_empty() {
            None
        } else {
            Some(self.config.package.clone())
        };

        FileDescriptorProto {
            name: Some(self.config.file_name.clone()),
            package,
            message_type: self.schemas.iter().map(|s| message_proto(s)).collect(),
            syntax: Some("proto3".to_string()),
            ..Default::default()
        }
    }

    /// Build and validate a descriptor pool holding the exported file
    pub fn descriptor_pool(&self) -> Result<DescriptorPool> {
        let fds = FileDescriptorSet {
            file: vec![self.file_descriptor()],
        };

        let mut fds_bytes = Vec::new();
        fds.encode(&mut fds_bytes).map_err(|e| {
            Error::descriptor_build(format!("failed to encode descriptor set: {}", e))
        })?;

        DescriptorPool::decode(fds_bytes.as_slice()).map_err(|e| {
            Error::descriptor_build(format!("failed to decode descriptor pool: {}", e))
        })
    }

    /// Resolve one exported message by its short name
    pub fn message_descriptor(&self, name: &str) -> Result<MessageDescriptor> {
        let full_name = if self.config.package.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.config.package, name)
        };

        self.descriptor_pool()?
            .get_message_by_name(&full_name)
            .ok_or_else(|| Error::descriptor_build(format!("message {} not found in pool", full_name)))
    }

    /// Walk every schema through a [`ProtoWriter`]
    pub fn visit<W: ProtoWriter + ?Sized>(&self, writer: &mut W) -> std::fmt::Result {
        writer.write_file(&self.config.package)?;
        for schema in &self.schemas {
            writer.write_message(schema)?;
            for field in schema.fields() {
                writer.write_field(field)?;
            }
            writer.end_message(schema)?;
        }
        Ok(())
    }

    /// Render the `.proto` source as a string
    pub fn render(&self) -> String {
        let mut output = String::new();
        self.write_to(&mut output).expect("String write cannot fail");
        output
    }

    /// Write the `.proto` source to a writer
    pub fn write_to(&self, w: &mut impl FmtWrite) -> std::fmt::Result {
        let mut writer = DefaultProtoWriter::new(w, &self.config);
        self.visit(&mut writer)
    }
}

fn message_proto(schema: &Schema) -> DescriptorProto {
    DescriptorProto {
        name: Some(schema.name().to_string()),
        field: schema.fields().iter().map(field_proto).collect(),
        ..Default::default()
    }
}

fn field_proto(field: &FieldDescriptor) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(field.name.to_string()),
        number: Some(field.tag as i32),
        label: Some(Label::Optional as i32),
        r#type: Some(field_type(field.kind) as i32),
        json_name: Some(to_lower_camel_case(field.name)),
        ..Default::default()
    }
}

fn field_type(kind: FieldKind) -> Type {
    match kind {
        FieldKind::SInt32 => Type::Sint32,
        FieldKind::SInt64 => Type::Sint64,
        FieldKind::UInt32 => Type::Uint32,
        FieldKind::UInt64 => Type::Uint64,
        FieldKind::Bool => Type::Bool,
        FieldKind::Fixed32 => Type::Fixed32,
        FieldKind::String => Type::String,
        FieldKind::Bytes => Type::Bytes,
    }
}

/// Default implementation of ProtoWriter, producing `.proto` source
struct DefaultProtoWriter<'a, W: FmtWrite> {
    writer: &'a mut W,
    config: &'a ExportConfig,
}

impl<'a, W: FmtWrite> DefaultProtoWriter<'a, W> {
    fn new(writer: &'a mut W, config: &'a ExportConfig) -> Self {
        Self { writer, config }
    }
}

impl<W: FmtWrite> ProtoWriter for DefaultProtoWriter<'_, W> {
    fn write_file(&mut self, package: &str) -> std::fmt::Result {
        writeln!(self.writer, "syntax = \"proto3\";")?;
        writeln!(self.writer)?;

        if !package.is_empty() {
            writeln!(self.writer, "package {};", package)?;
            writeln!(self.writer)?;
        }

        Ok(())
    }

    fn write_message(&mut self, schema: &Schema) -> std::fmt::Result {
        writeln!(self.writer, "message {} {{", schema.name())
    }

    fn write_field(&mut self, field: &FieldDescriptor) -> std::fmt::Result {
        write!(
            self.writer,
            "{}{} {} = {};",
            self.config.indent_str,
            field.kind.proto_name(),
            field.name,
            field.tag
        )?;

        // Streamed fields are still plain strings/bytes on the wire
        if field.is_streamed() {
            write!(self.writer, " // streamed")?;
        }

        writeln!(self.writer)
    }

    fn end_message(&mut self, _schema: &Schema) -> std::fmt::Result {
        writeln!(self.writer, "}}")?;
        writeln!(self.writer)
    }
}

/// Convert a snake_case name to lowerCamelCase
fn to_lower_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = false;

    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}
