//! This module contains the data types shared by the driver and the monitor.

use strum_macros::{EnumIter, IntoStaticStr};

/// Decoded voltage meaning "no valid reading yet".
pub const VOLTAGE_SENTINEL: i32 = 0xFFFF;

/// Decoded UPS current meaning "no valid reading yet".
///
/// The chip reports raw `0xFFFE`, which the current fix-up turns into `-1`.
pub const UPS_CURRENT_SENTINEL: i32 = -1;

/// The three supported chips, each living at one fixed bus address.
#[derive(Debug, EnumIter, IntoStaticStr, PartialEq, Eq, Clone, Copy)]
#[strum(serialize_all = "kebab-case")]
pub enum Variant {
    /// Balancer reporting pack voltage and UPS current.
    Balancer,
    /// ADC measuring the high-side-switch current.
    AdcCurrent,
    /// Expander reporting the high-side-switch toggle.
    Gpio,
}

impl Variant {
    /// 7-bit bus address of this variant.
    pub const fn address(self) -> u8 {
        match self {
            Variant::Balancer => 0x0B,
            Variant::AdcCurrent => 0x36,
            Variant::Gpio => 0x41,
        }
    }

    /// Look up the variant attached at `address`.
    pub fn from_address(address: u8) -> Option<Self> {
        match address {
            0x0B => Some(Variant::Balancer),
            0x36 => Some(Variant::AdcCurrent),
            0x41 => Some(Variant::Gpio),
            _ => None,
        }
    }

    /// Name used in log messages.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Used to be less ambiguous about whether the switch is on or off.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum GpioState {
    /// Switch off.
    #[default]
    Inactive,
    /// Switch on.
    Active,
}

impl From<GpioState> for bool {
    fn from(value: GpioState) -> Self {
        match value {
            GpioState::Inactive => false,
            GpioState::Active => true,
        }
    }
}

impl From<bool> for GpioState {
    fn from(value: bool) -> Self {
        match value {
            true => GpioState::Active,
            false => GpioState::Inactive,
        }
    }
}

/// One poll's worth of measurements.
///
/// Only the fields belonging to the attached [`Variant`] are filled in, the rest stay zeroed.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Reading {
    /// Pack voltage in millivolts.
    pub voltage_mv: i32,
    /// UPS current in milliamps.
    pub ups_current_ma: i32,
    /// Raw 10-bit high-side-switch current.
    pub hss_current: u16,
    /// Whether the high-side switch reads as active.
    pub gpio_status: bool,
}

impl Reading {
    /// A reading may be published unless voltage or current still holds its sentinel.
    pub fn is_valid(&self) -> bool {
        self.voltage_mv != VOLTAGE_SENTINEL && self.ups_current_ma != UPS_CURRENT_SENTINEL
    }
}
