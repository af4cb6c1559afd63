//! Decoded values delivered to devices.

use serde::{Deserialize, Serialize};

/// A semantic value produced by decoding one typical slot or topic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DecodedValue {
    /// On/off state.
    Boolean(bool),
    /// Raw state byte; meaning depends on the typical.
    RawByte(u8),
    /// Percentage, 0 to 100.
    Percent(u8),
    /// Red, green and blue components.
    RgbTriple(u8, u8, u8),
    /// Two analog readings, such as measured value and setpoint.
    AnalogPair(f32, f32),
    /// One analog reading.
    Analog(f32),
    /// Eight packed flags.
    BitFlags(u8),
}

impl DecodedValue {
    /// Convert a 0..=255 dimmer level into [`DecodedValue::Percent`], rounding to nearest.
    pub fn level_to_percent(level: u8) -> Self {
        let percent = (u16::from(level) * 100 + 127) / 255;
        DecodedValue::Percent(percent as u8)
    }

    /// Test one flag of a [`DecodedValue::BitFlags`] value.
    ///
    /// Returns `None` for other variants or a bit index above 7.
    pub fn flag(&self, bit: u8) -> Option<bool> {
        match self {
            DecodedValue::BitFlags(flags) if bit < 8 => Some(flags & (1 << bit) != 0),
            _ => None,
        }
    }

    /// Short stable name of the variant.
    pub const fn kind(&self) -> &'static str {
        match self {
            DecodedValue::Boolean(_) => "boolean",
            DecodedValue::RawByte(_) => "raw_byte",
            DecodedValue::Percent(_) => "percent",
            DecodedValue::RgbTriple(..) => "rgb",
            DecodedValue::AnalogPair(..) => "analog_pair",
            DecodedValue::Analog(_) => "analog",
            DecodedValue::BitFlags(_) => "bit_flags",
        }
    }
}
