//! This crate polls the battery/charger chips of a flight controller over I2C and republishes the
//! latest reading for the rest of the flight software.
//!
//! It supports `no-std` environments by use of the `no-std` feature flag, with default features
//! disabled. The `cli` feature (on by default) adds a command surface and needs `std`.
//!
//! One of three chips is driven per instance, picked by its bus address:
//! * Balancer, reporting pack voltage and UPS current. (`0x0B`)
//! * High-side-switch current ADC. (`0x36`)
//! * High-side-switch GPIO status expander. (`0x41`)
//!
//! [`charger::Charger`] does the register access and decoding. [`monitor::Monitor`] reads it once
//! per interval and publishes valid readings through a [`topic::Publisher`], such as
//! [`topic::BatteryTopic`].
//!
//! The bus should be configured like so:
//! * Clock: 100 kHz
//! * 7-bit addressing

#![cfg_attr(feature = "no-std", no_std)]

pub mod charger;
#[cfg(feature = "cli")]
pub mod cli;
pub mod decode;
pub mod error;
pub mod monitor;
pub mod registers;
pub mod topic;
pub mod types;
pub mod work;

#[cfg(test)]
mod mock_i2c;

pub use charger::Charger;
pub use error::{Error, Result};
pub use monitor::{FailurePolicy, Monitor, MonitorConfig, MonitorState, TickOutcome};
pub use topic::{BatteryTopic, Publisher};
pub use types::{Reading, Variant};
