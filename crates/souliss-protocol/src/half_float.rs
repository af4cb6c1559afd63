//! Souliss 16-bit float codec.
//!
//! Analog typicals carry their value as a 16-bit float with a 1-bit sign,
//! 5-bit exponent (bias 15) and 10-bit mantissa. The node firmware converts
//! with a table-free routine that differs from strict IEEE binary16 in one
//! place: an exact power of two with a normal exponent above 2^-14 is widened
//! with the low ten mantissa bits of the `f32` set. Readings derived from this
//! codec must match the firmware bit-for-bit, so that quirk is reproduced here.
//!
//! ```text
//! 15   14      10 9              0
//! +---+----------+----------------+
//! | s | exponent |    mantissa    |
//! +---+----------+----------------+
//! ```
//!
//! On the wire the value occupies two bytes, low byte first.

/// Decode a raw 16-bit pattern into an `f32`.
///
/// Every pattern decodes. Exponent `0x1F` with a non-zero mantissa yields
/// NaN, which callers must treat as "value unavailable".
pub fn decode(raw: u16) -> f32 {
    let hbits = u32::from(raw);
    let sign = (hbits & 0x8000) << 16;
    let mut mant = hbits & 0x03ff;
    let mut exp = hbits & 0x7c00;

    if exp == 0x7c00 {
        // Inf/NaN
        exp = 0x3fc00;
    } else if exp != 0 {
        exp += 0x1c000;
        if mant == 0 && exp > 0x1c400 {
            return f32::from_bits(sign | (exp << 13) | 0x3ff);
        }
    } else if mant != 0 {
        // Subnormal: renormalize into the f32 exponent range
        exp = 0x1c400;
        loop {
            mant <<= 1;
            exp -= 0x400;
            if mant & 0x400 != 0 {
                break;
            }
        }
        mant &= 0x3ff;
    }

    f32::from_bits(sign | ((exp | mant) << 13))
}

/// Decode a raw pattern, mapping NaN to `None`.
pub fn decode_available(raw: u16) -> Option<f32> {
    let value = decode(raw);
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

/// Decode the `(lo, hi)` byte pair as it appears in a frame.
pub fn decode_le(lo: u8, hi: u8) -> f32 {
    decode((u16::from(hi) << 8) | u16::from(lo))
}

/// Encode an `f32` into the 16-bit representation, rounding to nearest.
///
/// Magnitudes in `[65504, 65536)` round down to the largest finite value
/// `0x7BFF`; anything larger becomes infinity. NaN stays NaN. Magnitudes
/// below half the smallest subnormal flush to a signed zero.
pub fn encode(value: f32) -> u16 {
    let fbits = value.to_bits();
    let sign = (fbits >> 16) & 0x8000;
    let magnitude = fbits & 0x7fff_ffff;
    let rounded = magnitude + 0x1000;

    if rounded >= 0x4780_0000 {
        if magnitude >= 0x4780_0000 {
            if rounded < 0x7f80_0000 {
                return (sign | 0x7c00) as u16;
            }
            return (sign | 0x7c00 | ((fbits & 0x007f_ffff) >> 13)) as u16;
        }
        return (sign | 0x7bff) as u16;
    }
    if rounded >= 0x3880_0000 {
        return (sign | ((rounded - 0x3800_0000) >> 13)) as u16;
    }
    if rounded < 0x3300_0000 {
        return sign as u16;
    }

    // Result is subnormal
    let exp = magnitude >> 23;
    if exp < 102 {
        return sign as u16;
    }
    let mant = (fbits & 0x007f_ffff) | 0x0080_0000;
    (sign | ((mant + (0x0080_0000 >> (exp - 102))) >> (126 - exp))) as u16
}

/// Encode an `f32` into the `(lo, hi)` byte pair used on the wire.
pub fn encode_le(value: f32) -> [u8; 2] {
    encode(value).to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_decode_zero() {
        assert_eq!(decode(0x0000), 0.0);
        assert!(decode(0x0000).is_sign_positive());
        assert_eq!(decode(0x8000), 0.0);
        assert!(decode(0x8000).is_sign_negative());
    }

    #[test]
    fn test_decode_reference_vectors() {
        // Values with a non-zero mantissa decode exactly
        assert_eq!(decode(0x4D40), 21.0);
        assert_eq!(decode(0xC500), -5.0);
        assert_eq!(decode(0x3E00), 1.5);
        assert_eq!(decode(0x5A4B), 201.375);
        // Smallest normal has no widening
        assert_eq!(decode(0x0400), 6.103_515_6e-5);
    }

    #[test]
    fn test_decode_power_of_two_widening() {
        // Firmware sets the low ten f32 mantissa bits on exact powers of two
        assert_eq!(decode(0x3C00).to_bits(), 0x3F80_03FF);
        assert_eq!(decode(0xC000).to_bits(), 0xC000_03FF);
        assert_relative_eq!(decode(0x3C00), 1.0, epsilon = 1e-3);
        assert_relative_eq!(decode(0x4000), 2.0, epsilon = 1e-3);
        assert_relative_eq!(decode(0x3800), 0.5, epsilon = 1e-3);
    }

    #[test]
    fn test_decode_subnormal() {
        assert_eq!(decode(0x0001), 5.960_464_5e-8);
        assert_eq!(decode(0x8001), -5.960_464_5e-8);
    }

    #[test]
    fn test_decode_special_values() {
        assert_eq!(decode(0x7C00), f32::INFINITY);
        assert_eq!(decode(0xFC00), f32::NEG_INFINITY);
        assert!(decode(0x7E00).is_nan());
        assert!(decode(0xFFFF).is_nan());
        assert!(decode(0x7C01).is_nan());
    }

    #[test]
    fn test_decode_available() {
        assert_eq!(decode_available(0x4D40), Some(21.0));
        assert_eq!(decode_available(0x7E00), None);
        assert_eq!(decode_available(0x7C00), Some(f32::INFINITY));
    }

    #[test]
    fn test_decode_le_byte_order() {
        assert_eq!(decode_le(0x40, 0x4D), 21.0);
        assert_eq!(decode_le(0x00, 0xC5), -5.0);
    }

    #[test]
    fn test_encode_reference_vectors() {
        assert_eq!(encode(21.0), 0x4D40);
        assert_eq!(encode(-5.0), 0xC500);
        assert_eq!(encode(1.0), 0x3C00);
        assert_eq!(encode(0.0), 0x0000);
        assert_eq!(encode(-0.0), 0x8000);
        assert_eq!(encode_le(21.0), [0x40, 0x4D]);
    }

    #[test]
    fn test_encode_saturation_and_specials() {
        assert_eq!(encode(65504.0), 0x7BFF);
        assert_eq!(encode(65520.0), 0x7BFF);
        assert_eq!(encode(65536.0), 0x7C00);
        assert_eq!(encode(-65536.0), 0xFC00);
        assert_eq!(encode(1.0e6), 0x7C00);
        assert_eq!(encode(f32::INFINITY), 0x7C00);
        assert_eq!(encode(f32::NEG_INFINITY), 0xFC00);
        assert!(decode(encode(f32::NAN)).is_nan());
        // Below half the smallest subnormal flushes to zero
        assert_eq!(encode(1.0e-9), 0x0000);
    }

    #[test]
    fn test_encode_subnormal() {
        assert_eq!(encode(5.960_464_5e-8), 0x0001);
        // Rounds into the subnormal range from one exponent below it
        assert_eq!(encode(f32::from_bits(0x32FF_F000)), 0x0000);
        assert_eq!(encode(f32::from_bits(0xB2FF_F000)), 0x8000);
        assert_eq!(encode(f32::from_bits(0x32FF_FFFF)), 0x0000);
    }

    #[test]
    fn test_typical_readings_survive_round_trip() {
        for reading in [-12.5_f32, 0.25, 18.75, 21.5, 48.0, 100.0, 1013.0] {
            assert_relative_eq!(decode(encode(reading)), reading, max_relative = 1e-3);
        }
    }
}
