//! Our error types for the charger driver.

use thiserror::Error;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Custom error type for charger communications and lifecycle.
#[derive(Error, Debug)]
pub enum Error<I: embedded_hal::i2c::Error> {
    #[error("I2C transport error: {0:?}")]
    Transport(I),
    /// The decoded value is the chip's "no valid reading yet" marker.
    #[error("Sentinel value read")]
    SentinelValue,
    #[error("Unknown charger address {0:#04x}")]
    UnknownAddress(u8),
    #[error("Already started")]
    AlreadyStarted,
    #[error("Not started")]
    NotStarted,
}

impl<I: embedded_hal::i2c::Error> Error<I> {
    /// Process exit status for a command that failed with this error.
    ///
    /// Issuing a command before `start` is reported but not treated as a failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::NotStarted => 0,
            _ => 1,
        }
    }
}
