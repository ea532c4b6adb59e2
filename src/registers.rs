//! This module is used to define the registers of the charger chips.
//!
//! Register numbers are per chip, so the same value may name different registers
//! depending on which [`Variant`](crate::types::Variant) is attached.

/// Register addresses on the balancer monitor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum BalancerRegister {
    /// __R__ - Pack voltage.
    ///
    /// Value is u16 little-endian in millivolts.
    Voltage = 0x09,
    /// __R__ - Pack current.
    ///
    /// Value is u16 little-endian in milliamps, see
    /// [`decode_ups_current`](crate::decode::decode_ups_current) for the sign fix-up.
    Current = 0x0A,
}

/// Register addresses on the HSS current ADC.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum AdcRegister {
    /// __W__ - Setup byte. Written once during init.
    ///
    /// Conversion results are read back without selecting a register.
    Config = 0x02,
}

/// Register addresses on the GPIO status expander.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum GpioRegister {
    /// __R/W__ - Pin data.
    /// * [`GPIO_ACTIVE`] - Switch on.
    /// * [`GPIO_INACTIVE`] - Switch off.
    Data = 0x01,
    /// __W__ - Pin direction configuration.
    Config = 0x03,
}

/// Configuration byte written to [`AdcRegister::Config`] during init.
pub const ADC_CONFIG_VALUE: u8 = 0xF4;

/// Configuration byte written to [`GpioRegister::Config`] during init.
pub const GPIO_CONFIG_VALUE: u8 = 0xF4;

/// [`GpioRegister::Data`] value while the switch is on.
pub const GPIO_ACTIVE: u8 = 0x01;

/// [`GpioRegister::Data`] value while the switch is off.
pub const GPIO_INACTIVE: u8 = 0x00;

impl From<BalancerRegister> for u8 {
    fn from(value: BalancerRegister) -> Self {
        value as u8
    }
}

impl From<AdcRegister> for u8 {
    fn from(value: AdcRegister) -> Self {
        value as u8
    }
}

impl From<GpioRegister> for u8 {
    fn from(value: GpioRegister) -> Self {
        value as u8
    }
}
