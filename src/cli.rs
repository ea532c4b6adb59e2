//! Command surface for driving one charger from a shell.
//!
//! A [`Session`] owns the single charger instance, so `start` can only succeed once and every
//! other command fails with [`Error::NotStarted`] until it has.

use std::ffi::OsString;
use std::io::Write;

use clap::{Parser, Subcommand};
use embedded_hal::i2c::{ErrorType, I2c};
use log::{info, warn};

use crate::{
    charger::Charger,
    error::{Error, Result},
    monitor::{Monitor, MonitorConfig, TickOutcome},
    topic::Publisher,
    types::Variant,
    work::Instant,
};

/// Bus used when `--bus` is not given.
pub const DEFAULT_BUS: u8 = 1;

/// Device path used when `--path` is not given.
pub const DEFAULT_PATH: &str = "/dev/ups0";

#[derive(Debug, Parser)]
#[command(name = "charger", about = "Battery charger monitor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Open the bus and initialise the charger.
    Start {
        /// I2C bus number.
        #[arg(short, long, default_value_t = DEFAULT_BUS)]
        bus: u8,
        /// Charger address, decimal or `0x` prefixed hex.
        #[arg(
            short = 'a',
            long = "chargeraddr",
            default_value_t = Variant::Balancer.address(),
            value_parser = parse_address
        )]
        chargeraddr: u8,
        /// Device node of the bus.
        #[arg(short, long, default_value = DEFAULT_PATH)]
        path: String,
    },
    /// Start publishing readings periodically.
    Monitor,
    /// Stop publishing readings.
    Off,
    /// Print the pack voltage in millivolts.
    Voltage,
    /// Print the UPS current in milliamps.
    UpsCurrent,
    /// Print the high-side-switch current.
    HssCurrent,
}

fn parse_address(value: &str) -> core::result::Result<u8, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|err| err.to_string())
}

/// Opens the bus a charger is attached to.
pub trait BusOpener {
    type Bus: I2c;

    fn open(
        &mut self,
        bus: u8,
        path: &str,
    ) -> core::result::Result<Self::Bus, <Self::Bus as ErrorType>::Error>;
}

/// What a successful command produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Done,
    /// A value to print.
    Value(i32),
}

type BusError<O> = <<O as BusOpener>::Bus as ErrorType>::Error;

/// Holds the charger between commands.
pub struct Session<O: BusOpener, P: Publisher + Clone> {
    opener: O,
    publisher: P,
    config: MonitorConfig,
    monitor: Option<Monitor<O::Bus, P>>,
}

impl<O: BusOpener, P: Publisher + Clone> Session<O, P> {
    pub fn new(opener: O, publisher: P, config: MonitorConfig) -> Self {
        Self {
            opener,
            publisher,
            config,
            monitor: None,
        }
    }

    pub fn monitor(&self) -> Option<&Monitor<O::Bus, P>> {
        self.monitor.as_ref()
    }

    /// Parse `args` (program name first), run the command and print its result to `out`.
    ///
    /// Returns the process exit status.
    pub fn dispatch<T>(
        &mut self,
        args: impl IntoIterator<Item = T>,
        now: Instant,
        out: &mut impl Write,
    ) -> u8
    where
        T: Into<OsString> + Clone,
    {
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(err) => {
                let code = match err.kind() {
                    clap::error::ErrorKind::DisplayHelp
                    | clap::error::ErrorKind::DisplayVersion
                    | clap::error::ErrorKind::InvalidSubcommand => 0,
                    _ => 1,
                };
                return reported(write!(out, "{}", err.render()), code);
            }
        };

        match self.execute(cli.command, now) {
            Ok(Output::Done) => 0,
            Ok(Output::Value(value)) => reported(writeln!(out, "{}", value), 0),
            Err(err) => reported(writeln!(out, "{}", err), err.exit_code()),
        }
    }

    /// Run a single command.
    pub fn execute(&mut self, command: Command, now: Instant) -> Result<Output, BusError<O>> {
        let output = match command {
            Command::Start {
                bus,
                chargeraddr,
                path,
            } => {
                self.start(bus, chargeraddr, &path)?;
                Output::Done
            }
            Command::Monitor => {
                self.started()?.set_mode(true, now);
                Output::Done
            }
            Command::Off => {
                self.started()?.set_mode(false, now);
                Output::Done
            }
            Command::Voltage => Output::Value(self.started()?.charger_mut().read_voltage_mv()?),
            Command::UpsCurrent => {
                Output::Value(self.started()?.charger_mut().read_ups_current_ma()?)
            }
            Command::HssCurrent => {
                Output::Value(self.started()?.charger_mut().read_hss_current()?.into())
            }
        };
        Ok(output)
    }

    /// Run the monitor's queued tick if it is due.
    pub fn run_pending(&mut self, now: Instant) -> Option<TickOutcome> {
        self.monitor.as_mut()?.run_pending(now)
    }

    /// When the monitor's next tick is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.monitor.as_ref()?.next_deadline()
    }

    /// Drop the charger, handing back its bus.
    pub fn teardown(&mut self) -> Option<O::Bus> {
        let (charger, _) = self.monitor.take()?.into_parts();
        Some(charger.release())
    }

    fn started(&mut self) -> Result<&mut Monitor<O::Bus, P>, BusError<O>> {
        self.monitor.as_mut().ok_or(Error::NotStarted)
    }

    fn start(&mut self, bus: u8, address: u8, path: &str) -> Result<(), BusError<O>> {
        if self.monitor.is_some() {
            return Err(Error::AlreadyStarted);
        }
        let variant = Variant::from_address(address).ok_or(Error::UnknownAddress(address))?;

        let interface = self.opener.open(bus, path).map_err(Error::Transport)?;
        let mut charger = Charger::new(interface, bus, variant);
        if let Err(err) = charger.init() {
            warn!("init failed");
            return Err(err);
        }

        info!("{} started on {} (bus {}, {:#04x})", variant.name(), path, bus, address);
        self.monitor = Some(Monitor::new(charger, self.publisher.clone(), self.config));
        Ok(())
    }
}

/// Exit status once the command's output has been written. Output that could not be written
/// fails the command.
fn reported(written: std::io::Result<()>, code: u8) -> u8 {
    match written {
        Ok(()) => code,
        Err(err) => {
            warn!("failed to write output: {}", err);
            1
        }
    }
}
