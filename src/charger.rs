use crate::{
    decode::{decode_gpio, decode_hss_current, decode_ups_current, decode_voltage},
    error::{Error, Result},
    registers::{
        ADC_CONFIG_VALUE, AdcRegister, BalancerRegister, GPIO_ACTIVE, GPIO_CONFIG_VALUE,
        GPIO_INACTIVE, GpioRegister,
    },
    types::{GpioState, UPS_CURRENT_SENTINEL, VOLTAGE_SENTINEL, Variant},
};
use embedded_hal::i2c::I2c;
use log::warn;

/// You can create a Charger using any bus which implements [embedded_hal::i2c::I2c].
///
/// For its methods, we generally use the nomenclature that "set" means to write a configuration and "get" means to
/// read back a configuration or status value. Whereas "read" means to get a measured value.
pub struct Charger<I: I2c> {
    interface: I,
    /// Bus number, kept for log messages.
    bus: u8,
    variant: Variant,
}

impl<I: I2c> Charger<I> {
    /// Create a new Charger talking to `variant` over the given interface.
    pub fn new(interface: I, bus: u8, variant: Variant) -> Self {
        Self {
            interface,
            bus,
            variant,
        }
    }

    /// Create a new Charger from a raw bus address.
    ///
    /// Fails with [`Error::UnknownAddress`] if no supported chip lives at `address`.
    pub fn with_address(interface: I, bus: u8, address: u8) -> Result<Self, I::Error> {
        let variant = Variant::from_address(address).ok_or(Error::UnknownAddress(address))?;
        Ok(Self::new(interface, bus, variant))
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn address(&self) -> u8 {
        self.variant.address()
    }

    pub fn bus(&self) -> u8 {
        self.bus
    }

    /// Give the bus back, consuming the driver.
    pub fn release(self) -> I {
        self.interface
    }

    /// Check the device responds, then send the one-time configuration for its variant.
    ///
    /// Must succeed before the charger is monitored.
    pub fn init(&mut self) -> Result<(), I::Error> {
        if let Err(err) = self.probe() {
            warn!("bus {} probe of {:#04x} failed", self.bus, self.address());
            return Err(err);
        }

        let config = match self.variant {
            Variant::Balancer => None,
            Variant::AdcCurrent => Some((u8::from(AdcRegister::Config), ADC_CONFIG_VALUE)),
            Variant::Gpio => Some((u8::from(GpioRegister::Config), GPIO_CONFIG_VALUE)),
        };

        if let Some((register, value)) = config {
            if let Err(err) = self.write_register(register, value) {
                warn!("{} init failed", self.variant.name());
                return Err(err);
            }
        }
        Ok(())
    }

    /// Liveness check.
    ///
    /// __Note:__ This always reads the balancer voltage register, whichever variant is attached. The ADC and GPIO
    /// chips are therefore probed through a register they may not implement.
    pub fn probe(&mut self) -> Result<(), I::Error> {
        self.read_register::<2>(BalancerRegister::Voltage.into())?;
        Ok(())
    }

    /// Return the measured pack voltage in millivolts.
    pub fn read_voltage_mv(&mut self) -> Result<i32, I::Error> {
        let bytes = self.read_register(BalancerRegister::Voltage.into())?;
        Ok(decode_voltage(bytes))
    }

    /// Like [Self::read_voltage_mv], but a sentinel reading is reported as [`Error::SentinelValue`].
    pub fn read_voltage_checked(&mut self) -> Result<i32, I::Error> {
        match self.read_voltage_mv()? {
            VOLTAGE_SENTINEL => Err(Error::SentinelValue),
            voltage => Ok(voltage),
        }
    }

    /// Return the measured UPS current in milliamps.
    pub fn read_ups_current_ma(&mut self) -> Result<i32, I::Error> {
        let bytes = self.read_register(BalancerRegister::Current.into())?;
        Ok(decode_ups_current(bytes))
    }

    /// Like [Self::read_ups_current_ma], but a sentinel reading is reported as [`Error::SentinelValue`].
    pub fn read_ups_current_checked(&mut self) -> Result<i32, I::Error> {
        match self.read_ups_current_ma()? {
            UPS_CURRENT_SENTINEL => Err(Error::SentinelValue),
            current => Ok(current),
        }
    }

    /// Return the latest high-side-switch current conversion.
    ///
    /// The ADC has no register pointer, so this is a plain read.
    pub fn read_hss_current(&mut self) -> Result<u16, I::Error> {
        let mut data = [0u8; 2];
        self.interface
            .read(self.variant.address(), &mut data)
            .map_err(Error::Transport)?;
        Ok(decode_hss_current(data))
    }

    /// Get the high-side-switch toggle state.
    pub fn get_gpio(&mut self) -> Result<GpioState, I::Error> {
        let [data] = self.read_register::<1>(GpioRegister::Data.into())?;
        Ok(GpioState::from(decode_gpio(data)))
    }

    /// Set the high-side-switch toggle state.
    pub fn set_gpio(&mut self, state: impl Into<GpioState>) -> Result<(), I::Error> {
        let code = match state.into() {
            GpioState::Active => GPIO_ACTIVE,
            GpioState::Inactive => GPIO_INACTIVE,
        };
        self.write_register(GpioRegister::Data.into(), code)
    }

    /// Select `register` and read `N` bytes back in one combined transaction.
    fn read_register<const N: usize>(&mut self, register: u8) -> Result<[u8; N], I::Error> {
        let mut data = [0u8; N];
        self.interface
            .write_read(self.variant.address(), &[register], &mut data)
            .map_err(Error::Transport)?;
        Ok(data)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), I::Error> {
        self.interface
            .write(self.variant.address(), &[register, value])
            .map_err(Error::Transport)
    }
}
