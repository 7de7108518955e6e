//! The deck's serial messages.
//!
//! - [`ButtonPushed`] travels from the deck firmware to the host when a
//!   physical button is pressed. `number` selects a host command.
//! - [`DisplayText`] travels from the host to the deck and drives the
//!   character LCD: two text lines, backlight brightness, how long to show
//!   the message, and whether to flash the LED.
//!
//! The text lines of [`DisplayText`] are streamed fields, so the struct
//! itself never owns line memory; bind a producer to send and a consumer
//! (usually a [`LineBuffer`](crate::stream::LineBuffer)) to receive.

use crate::codec::{unexpected_value, Message, Value};
use crate::error::Result;
use crate::schema::{FieldDescriptor, FieldKind, Schema};
use crate::stream::{Callback, StreamConsumer, StreamProducer};

/// Columns on the deck's 1602 character display
pub const DEFAULT_COLUMNS: usize = 16;

static BUTTON_PUSHED_FIELDS: [FieldDescriptor; 1] =
    [FieldDescriptor::new("number", ButtonPushed::NUMBER_TAG, FieldKind::SInt32)];

/// Field table for [`ButtonPushed`]
pub static BUTTON_PUSHED: Schema = Schema::new("ButtonPushed", &BUTTON_PUSHED_FIELDS);

static DISPLAY_TEXT_FIELDS: [FieldDescriptor; 5] = [
    FieldDescriptor::streamed("line1", DisplayText::LINE1_TAG, FieldKind::String),
    FieldDescriptor::streamed("line2", DisplayText::LINE2_TAG, FieldKind::String),
    FieldDescriptor::new("brightness", DisplayText::BRIGHTNESS_TAG, FieldKind::SInt32),
    FieldDescriptor::new("duration_ms", DisplayText::DURATION_MS_TAG, FieldKind::SInt32),
    FieldDescriptor::new("flash_led", DisplayText::FLASH_LED_TAG, FieldKind::Bool),
];

/// Field table for [`DisplayText`]
pub static DISPLAY_TEXT: Schema = Schema::new("DisplayText", &DISPLAY_TEXT_FIELDS);

/// A button press reported by the deck
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ButtonPushed {
    /// Index of the pressed button, mapped to a host command
    pub number: i32,
}

impl ButtonPushed {
    /// Tag of `number`
    pub const NUMBER_TAG: u32 = 1;

    /// Largest encoding: one key byte plus a ten byte varint
    pub const MAX_SIZE: usize = 11;

    /// Creates a button press event
    pub fn new(number: i32) -> Self {
        Self { number }
    }
}

impl Message for ButtonPushed {
    fn schema(&self) -> &'static Schema {
        &BUTTON_PUSHED
    }

    fn value(&self, field: &FieldDescriptor) -> Option<Value<'_>> {
        match field.tag {
            Self::NUMBER_TAG => Some(Value::SInt32(self.number)),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &FieldDescriptor, value: Value<'_>) -> Result<()> {
        match (field.tag, value) {
            (Self::NUMBER_TAG, Value::SInt32(n)) => self.number = n,
            (_, value) => return Err(unexpected_value(field, &value)),
        }
        Ok(())
    }
}

/// Text and backlight command for the deck display
#[derive(Debug, Default)]
pub struct DisplayText<'a> {
    /// First display row
    pub line1: Callback<'a>,
    /// Second display row
    pub line2: Callback<'a>,
    /// Backlight brightness
    pub brightness: i32,
    /// How long the message stays on screen
    pub duration_ms: i32,
    /// Flash the status LED, if fitted
    pub flash_led: bool,
}

impl<'a> DisplayText<'a> {
    /// Tag of `line1`
    pub const LINE1_TAG: u32 = 1;
    /// Tag of `line2`
    pub const LINE2_TAG: u32 = 2;
    /// Tag of `brightness`
    pub const BRIGHTNESS_TAG: u32 = 3;
    /// Tag of `duration_ms`
    pub const DURATION_MS_TAG: u32 = 4;
    /// Tag of `flash_led`
    pub const FLASH_LED_TAG: u32 = 5;

    /// A command whose lines are read from the given producers
    pub fn outgoing(
        line1: &'a mut dyn StreamProducer,
        line2: &'a mut dyn StreamProducer,
    ) -> Self {
        Self {
            line1: Callback::produce(line1),
            line2: Callback::produce(line2),
            ..Default::default()
        }
    }

    /// A command whose lines are delivered to the given consumers
    pub fn incoming(
        line1: &'a mut dyn StreamConsumer,
        line2: &'a mut dyn StreamConsumer,
    ) -> Self {
        Self {
            line1: Callback::consume(line1),
            line2: Callback::consume(line2),
            ..Default::default()
        }
    }

    /// Sets the backlight brightness
    pub fn brightness(mut self, brightness: i32) -> Self {
        self.brightness = brightness;
        self
    }

    /// Sets the display duration
    pub fn duration_ms(mut self, duration_ms: i32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Sets the LED flash flag
    pub fn flash_led(mut self, flash_led: bool) -> Self {
        self.flash_led = flash_led;
        self
    }

    fn line(&mut self, tag: u32) -> Option<&mut Callback<'a>> {
        match tag {
            Self::LINE1_TAG => Some(&mut self.line1),
            Self::LINE2_TAG => Some(&mut self.line2),
            _ => None,
        }
    }
}

impl Message for DisplayText<'_> {
    fn schema(&self) -> &'static Schema {
        &DISPLAY_TEXT
    }

    fn value(&self, field: &FieldDescriptor) -> Option<Value<'_>> {
        match field.tag {
            Self::BRIGHTNESS_TAG => Some(Value::SInt32(self.brightness)),
            Self::DURATION_MS_TAG => Some(Value::SInt32(self.duration_ms)),
            Self::FLASH_LED_TAG => Some(Value::Bool(self.flash_led)),
            _ => None,
        }
    }

    fn set_value(&mut self, field: &FieldDescriptor, value: Value<'_>) -> Result<()> {
        match (field.tag, value) {
            (Self::BRIGHTNESS_TAG, Value::SInt32(n)) => self.brightness = n,
            (Self::DURATION_MS_TAG, Value::SInt32(n)) => self.duration_ms = n,
            (Self::FLASH_LED_TAG, Value::Bool(b)) => self.flash_led = b,
            (_, value) => return Err(unexpected_value(field, &value)),
        }
        Ok(())
    }

    fn producer(&mut self, field: &FieldDescriptor) -> Option<&mut dyn StreamProducer> {
        self.line(field.tag)?.producer()
    }

    fn consumer(&mut self, field: &FieldDescriptor) -> Option<&mut dyn StreamConsumer> {
        self.line(field.tag)?.consumer()
    }
}

/// Split `text` into two display rows of at most `columns` characters.
///
/// Anything past the second row is dropped.
pub fn split_lines(text: &str, columns: usize) -> (&str, &str) {
    let (line1, rest) = split_at_char(text, columns);
    let (line2, _) = split_at_char(rest, columns);
    (line1, line2)
}

fn split_at_char(text: &str, n: usize) -> (&str, &str) {
    match text.char_indices().nth(n) {
        Some((idx, _)) => text.split_at(idx),
        None => (text, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode_to_slice};

    #[test]
    fn test_schemas_are_valid() {
        assert!(BUTTON_PUSHED.validate().is_ok());
        assert!(DISPLAY_TEXT.validate().is_ok());
    }

    #[test]
    fn test_button_pushed_max_size() {
        assert_eq!(BUTTON_PUSHED.max_encoded_size(), Some(ButtonPushed::MAX_SIZE));
        assert_eq!(DISPLAY_TEXT.max_encoded_size(), None);

        let mut buf = [0u8; ButtonPushed::MAX_SIZE];
        let written = encode_to_slice(&mut ButtonPushed::new(i32::MIN), &mut buf).unwrap();
        assert!(written <= ButtonPushed::MAX_SIZE);
    }

    #[test]
    fn test_button_pushed_bytes() {
        let mut buf = [0u8; 4];
        let written = encode_to_slice(&mut ButtonPushed::new(3), &mut buf).unwrap();
        assert_eq!(&buf[..written], &[0x08, 0x06]);
        assert_eq!(decode::<ButtonPushed>(&[0x08, 0x06]).unwrap(), ButtonPushed::new(3));
    }

    #[test]
    fn test_zero_button_is_empty() {
        let mut buf = [0u8; 4];
        assert_eq!(encode_to_slice(&mut ButtonPushed::new(0), &mut buf).unwrap(), 0);
        assert_eq!(decode::<ButtonPushed>(&[]).unwrap(), ButtonPushed::default());
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("HELLO", 16), ("HELLO", ""));
        assert_eq!(
            split_lines("Build finished successfully", 16),
            ("Build finished s", "uccessfully")
        );
        assert_eq!(split_lines("abcdefghij", 4), ("abcd", "efgh"));
        assert_eq!(split_lines("héllo wörld", 5), ("héllo", " wörl"));
        assert_eq!(split_lines("", 16), ("", ""));
    }
}
