//! Conversions from raw register bytes to measured values.

use crate::registers::GPIO_ACTIVE;

/// Pack voltage in millivolts from the two little-endian register bytes.
#[inline]
pub const fn decode_voltage(bytes: [u8; 2]) -> i32 {
    ((bytes[1] as i32) << 8) | bytes[0] as i32
}

/// UPS current in milliamps from the two little-endian register bytes.
///
/// Raw values above `i16::MAX` are shifted down by 65535, not 65536, so `0xFFFF` decodes
/// to `0` and `0x8000` to `-32767`. Consumers of the published reading rely on this scale.
#[inline]
pub const fn decode_ups_current(bytes: [u8; 2]) -> i32 {
    let raw = ((bytes[1] as i32) << 8) | bytes[0] as i32;
    if raw > 32767 { raw - 65535 } else { raw }
}

/// High-side-switch current from an ADC conversion result.
///
/// The first byte carries the two high bits, the second the low byte.
#[inline]
pub const fn decode_hss_current(bytes: [u8; 2]) -> u16 {
    (((bytes[0] & 0x03) as u16) << 8) | bytes[1] as u16
}

/// Whether the GPIO data byte reports the switch as active.
#[inline]
pub const fn decode_gpio(byte: u8) -> bool {
    byte == GPIO_ACTIVE
}
