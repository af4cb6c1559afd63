//! Typicals and their decode rules.
//!
//! A typical is the protocol's device-class descriptor. Each one owns a slot
//! in its node's memory map and, depending on its class, the next few slots
//! as well. Slots consumed that way are announced as [`TypicalCode::Related`]
//! in typical definitions.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ProtocolError, Result};
use crate::half_float;
use crate::value::DecodedValue;

/// Device-type tag announced by a node for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypicalCode {
    /// Empty slot.
    Empty,
    /// ON/OFF digital output.
    T11,
    /// ON/OFF digital output with AUTO mode.
    T12,
    /// Digital input value.
    T13,
    /// Pulse digital output.
    T14,
    /// RGB light.
    T16,
    /// ON/OFF step relay.
    T18,
    /// Single color LED dimmer.
    T19,
    /// Digital input pass-through.
    T1A,
    /// Motorized device with limit switches.
    T21,
    /// Motorized device without limit switches.
    T22,
    /// Temperature control.
    T31,
    /// Anti-theft integration (main).
    T41,
    /// Anti-theft integration (peer).
    T42,
    /// Analog input, `T51` through `T58`. Holds the raw code.
    AnalogInput(u8),
    /// Analog setpoint, `T61` through `T68`. Holds the raw code.
    AnalogSetpoint(u8),
    /// Secondary slot of the preceding typical.
    Related,
    /// A code this decoder does not know.
    Unknown(u8),
}

impl TypicalCode {
    /// The raw code as sent on the wire.
    pub const fn as_byte(&self) -> u8 {
        match self {
            TypicalCode::Empty => T_EMPTY,
            TypicalCode::T11 => T11,
            TypicalCode::T12 => T12,
            TypicalCode::T13 => T13,
            TypicalCode::T14 => T14,
            TypicalCode::T16 => T16,
            TypicalCode::T18 => T18,
            TypicalCode::T19 => T19,
            TypicalCode::T1A => T1A,
            TypicalCode::T21 => T21,
            TypicalCode::T22 => T22,
            TypicalCode::T31 => T31,
            TypicalCode::T41 => T41,
            TypicalCode::T42 => T42,
            TypicalCode::AnalogInput(code)
            | TypicalCode::AnalogSetpoint(code)
            | TypicalCode::Unknown(code) => *code,
            TypicalCode::Related => T_RELATED,
        }
    }

    /// Whether this slot describes an independent device.
    ///
    /// Empty and related slots are skipped when enumerating typicals.
    pub const fn is_device(&self) -> bool {
        !matches!(self, TypicalCode::Empty | TypicalCode::Related)
    }

    /// The decode rule for this typical, if it has one.
    pub const fn rule(&self) -> Option<DecodeRule> {
        match self {
            TypicalCode::T11 | TypicalCode::T13 | TypicalCode::T14 | TypicalCode::T18 => {
                Some(DecodeRule::Switch)
            }
            TypicalCode::T12
            | TypicalCode::T21
            | TypicalCode::T22
            | TypicalCode::T41
            | TypicalCode::T42 => Some(DecodeRule::RawState),
            TypicalCode::T1A => Some(DecodeRule::Flags),
            TypicalCode::T16 => Some(DecodeRule::Rgb),
            TypicalCode::T19 => Some(DecodeRule::Dimmer),
            TypicalCode::T31 => Some(DecodeRule::Thermostat),
            TypicalCode::AnalogInput(_) | TypicalCode::AnalogSetpoint(_) => Some(DecodeRule::Analog),
            TypicalCode::Empty | TypicalCode::Related | TypicalCode::Unknown(_) => None,
        }
    }
}

impl From<u8> for TypicalCode {
    fn from(code: u8) -> Self {
        match code {
            T_EMPTY => TypicalCode::Empty,
            T11 => TypicalCode::T11,
            T12 => TypicalCode::T12,
            T13 => TypicalCode::T13,
            T14 => TypicalCode::T14,
            T16 => TypicalCode::T16,
            T18 => TypicalCode::T18,
            T19 => TypicalCode::T19,
            T1A => TypicalCode::T1A,
            T21 => TypicalCode::T21,
            T22 => TypicalCode::T22,
            T31 => TypicalCode::T31,
            T41 => TypicalCode::T41,
            T42 => TypicalCode::T42,
            T51..=T58 => TypicalCode::AnalogInput(code),
            T61..=T68 => TypicalCode::AnalogSetpoint(code),
            T_RELATED => TypicalCode::Related,
            other => TypicalCode::Unknown(other),
        }
    }
}

impl std::fmt::Display for TypicalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypicalCode::Empty => f.write_str("empty"),
            TypicalCode::Related => f.write_str("related"),
            TypicalCode::Unknown(code) => write!(f, "unknown (0x{:02X})", code),
            other => write!(f, "T{:02X}", other.as_byte()),
        }
    }
}

/// How the bytes at a typical's slot turn into values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeRule {
    /// One byte, non-zero means on.
    Switch,
    /// One byte passed through; the value itself carries a multi-state meaning.
    RawState,
    /// One byte of eight packed flags.
    Flags,
    /// State byte plus level byte.
    Dimmer,
    /// Command byte plus red, green and blue bytes.
    Rgb,
    /// Status flags, then measured value and setpoint as half-floats.
    Thermostat,
    /// One half-float.
    Analog,
}

impl DecodeRule {
    /// Number of slot bytes the rule reads.
    pub const fn width(&self) -> usize {
        match self {
            DecodeRule::Switch | DecodeRule::RawState | DecodeRule::Flags => 1,
            DecodeRule::Dimmer | DecodeRule::Analog => 2,
            DecodeRule::Rgb => 4,
            DecodeRule::Thermostat => 5,
        }
    }

    /// Decode the slot starting at `offset` within a state payload.
    ///
    /// Returns the values in slot order. An analog reading that decodes to
    /// NaN yields no value. The only failure is a payload too short for
    /// the rule's width.
    pub fn decode(&self, payload: &[u8], offset: usize) -> Result<Vec<DecodedValue>> {
        let end = offset + self.width();
        if payload.len() < end {
            return Err(ProtocolError::too_short(
                MACACO_HEADER_LEN + end,
                MACACO_HEADER_LEN + payload.len(),
            ));
        }
        let bytes = &payload[offset..end];

        let values = match self {
            DecodeRule::Switch => vec![DecodedValue::Boolean(bytes[0] != 0)],
            DecodeRule::RawState => vec![DecodedValue::RawByte(bytes[0])],
            DecodeRule::Flags => vec![DecodedValue::BitFlags(bytes[0])],
            DecodeRule::Dimmer => vec![
                DecodedValue::RawByte(bytes[0]),
                DecodedValue::RawByte(bytes[1]),
            ],
            DecodeRule::Rgb => vec![
                DecodedValue::RawByte(bytes[0]),
                DecodedValue::RgbTriple(bytes[1], bytes[2], bytes[3]),
            ],
            DecodeRule::Thermostat => {
                let mut values = vec![DecodedValue::BitFlags(bytes[0])];
                let measured = half_float::decode_le(bytes[1], bytes[2]);
                let setpoint = half_float::decode_le(bytes[3], bytes[4]);
                if !measured.is_nan() && !setpoint.is_nan() {
                    values.push(DecodedValue::AnalogPair(measured, setpoint));
                }
                values
            }
            DecodeRule::Analog => half_float::decode_available(u16::from_le_bytes([
                bytes[0], bytes[1],
            ]))
            .map(DecodedValue::Analog)
            .into_iter()
            .collect(),
        };
        Ok(values)
    }
}

/// Decode the slot of `typical` at `offset` within a state payload.
///
/// Typicals without a rule decode to no values.
pub fn decode_typical(typical: TypicalCode, payload: &[u8], offset: usize) -> Result<Vec<DecodedValue>> {
    match typical.rule() {
        Some(rule) => rule.decode(payload, offset),
        None => Ok(Vec::new()),
    }
}

/// Status bits of a T31 temperature control.
pub mod thermostat {
    /// System on.
    pub const SYSTEM_ON: u8 = 1 << 0;
    /// Heating active.
    pub const HEATING_ON: u8 = 1 << 1;
    /// Cooling active.
    pub const COOLING_ON: u8 = 1 << 2;
    /// Fan speed 1.
    pub const FAN1_ON: u8 = 1 << 3;
    /// Fan speed 2.
    pub const FAN2_ON: u8 = 1 << 4;
    /// Fan speed 3.
    pub const FAN3_ON: u8 = 1 << 5;
    /// Fan in automatic mode.
    pub const FAN_AUTO: u8 = 1 << 6;
    /// Set for cooling mode, clear for heating mode.
    pub const COOLING_MODE: u8 = 1 << 7;
}
