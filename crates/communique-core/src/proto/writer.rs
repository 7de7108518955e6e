//! Extensible schema writing traits.
//!
//! This module provides the [`ProtoWriter`] trait for customizing
//! how exported schemas are written to output.

use crate::schema::{FieldDescriptor, Schema};
use std::fmt::Result;

/// Trait for writing schema elements to output.
///
/// [`ProtoExporter::visit`](super::ProtoExporter::visit) calls these in
/// order: `write_file` once, then for every schema `write_message`,
/// `write_field` per field, and `end_message`. Every method defaults to a
/// no-op, so implementors override only what they need.
pub trait ProtoWriter {
    /// Write the file header
    fn write_file(&mut self, package: &str) -> Result {
        let _ = package;
        Ok(())
    }

    /// Open a message definition
    fn write_message(&mut self, schema: &Schema) -> Result {
        let _ = schema;
        Ok(())
    }

    /// Write a field definition
    fn write_field(&mut self, field: &FieldDescriptor) -> Result {
        let _ = field;
        Ok(())
    }

    /// Close a message definition
    fn end_message(&mut self, schema: &Schema) -> Result {
        let _ = schema;
        Ok(())
    }
}

/// A writer that collects statistics about the exported schemas
#[derive(Debug, Default)]
pub struct StatsWriter {
    /// Number of messages
    pub message_count: usize,
    /// Number of fields
    pub field_count: usize,
    /// Number of streamed fields
    pub streamed_count: usize,
}

impl ProtoWriter for StatsWriter {
    fn write_message(&mut self, _schema: &Schema) -> Result {
        self.message_count += 1;
        Ok(())
    }

    fn write_field(&mut self, field: &FieldDescriptor) -> Result {
        self.field_count += 1;
        if field.is_streamed() {
            self.streamed_count += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{BUTTON_PUSHED, DISPLAY_TEXT};

    #[test]
    fn test_stats_writer() {
        let mut writer = StatsWriter::default();
        writer.write_message(&BUTTON_PUSHED).unwrap();
        writer.write_message(&DISPLAY_TEXT).unwrap();
        for field in DISPLAY_TEXT.fields() {
            writer.write_field(field).unwrap();
        }

        assert_eq!(writer.message_count, 2);
        assert_eq!(writer.field_count, 5);
        assert_eq!(writer.streamed_count, 2);
    }
}
