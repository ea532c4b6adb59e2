//! Periodic polling of a [`Charger`], republishing each valid reading.
//!
//! The monitor is a self-rescheduling task: every tick reads the chip, publishes, and queues the
//! next tick one interval later while the monitor is still running. Stopping only clears the
//! running flag, so a tick already queued runs once more and then lets the chain end.

use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::{
    charger::Charger,
    error::{Error, Result},
    topic::Publisher,
    types::{Reading, UPS_CURRENT_SENTINEL, VOLTAGE_SENTINEL, Variant},
    work::{Duration, Instant, Work},
};

/// What a tick does when a read fails on the bus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abandon the tick and do not queue another. Monitoring stays stalled until re-enabled.
    #[default]
    Stop,
    /// Abandon the tick but still queue the next one.
    Retry,
}

/// Tunables for a [`Monitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Gap between the end of one tick and the start of the next.
    pub interval: Duration,
    pub on_transport_error: FailurePolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::millis(1000),
            on_transport_error: FailurePolicy::Stop,
        }
    }
}

impl MonitorConfig {
    /// Set the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set what happens when a read fails.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_transport_error = policy;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No tick chain is running.
    Idle,
    /// Running with a tick queued.
    Armed,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The reading was valid and went out on the channel.
    Published(Reading),
    /// A sentinel survived its retry, nothing was published.
    Skipped(Reading),
    /// A read failed on the bus.
    Aborted,
}

/// Drives the periodic polling of one charger.
pub struct Monitor<I: I2c, P: Publisher> {
    charger: Charger<I>,
    publisher: P,
    config: MonitorConfig,
    running: bool,
    /// Set by the first publish, `None` until the channel has been advertised.
    handle: Option<P::Handle>,
    work: Work,
}

impl<I: I2c, P: Publisher> Monitor<I, P> {
    /// Wrap an initialised charger. The monitor starts [`MonitorState::Idle`].
    pub fn new(charger: Charger<I>, publisher: P, config: MonitorConfig) -> Self {
        Self {
            charger,
            publisher,
            config,
            running: false,
            handle: None,
            work: Work::new(),
        }
    }

    pub fn charger(&self) -> &Charger<I> {
        &self.charger
    }

    /// Direct access for one-shot reads between ticks.
    pub fn charger_mut(&mut self) -> &mut Charger<I> {
        &mut self.charger
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Take the monitor apart again.
    pub fn into_parts(self) -> (Charger<I>, P) {
        (self.charger, self.publisher)
    }

    pub fn state(&self) -> MonitorState {
        if self.running && self.work.is_pending() {
            MonitorState::Armed
        } else {
            MonitorState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Monitoring is enabled but the tick chain ended on a bus error.
    pub fn is_stalled(&self) -> bool {
        self.running && !self.work.is_pending()
    }

    /// When the queued tick is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.work.due()
    }

    /// Enable or disable monitoring.
    ///
    /// Enabling queues the first tick straight away unless one is already queued. Disabling
    /// never cancels the queued tick, it only stops it from queueing another.
    pub fn set_mode(&mut self, enable: bool, now: Instant) {
        if enable {
            self.running = true;
            if !self.work.is_pending() {
                debug!(
                    "monitoring {} on bus {}",
                    self.charger.variant().name(),
                    self.charger.bus()
                );
                self.work.queue(now, Duration::millis(0));
            }
        } else {
            self.running = false;
        }
    }

    /// Run the queued tick if it is due.
    pub fn run_pending(&mut self, now: Instant) -> Option<TickOutcome> {
        if !self.work.take_due(now) {
            return None;
        }
        Some(self.tick(now))
    }

    fn tick(&mut self, now: Instant) -> TickOutcome {
        let reading = match self.sample() {
            Ok(reading) => reading,
            Err(err) => {
                warn!("failed to poll {}: {}", self.charger.variant().name(), err);
                if self.config.on_transport_error == FailurePolicy::Retry {
                    self.rearm(now);
                }
                return TickOutcome::Aborted;
            }
        };

        let outcome = if reading.is_valid() {
            self.publish(&reading);
            debug!(
                "voltage: {}, current: {}",
                reading.voltage_mv, reading.ups_current_ma
            );
            TickOutcome::Published(reading)
        } else {
            TickOutcome::Skipped(reading)
        };

        self.rearm(now);
        outcome
    }

    fn rearm(&mut self, now: Instant) {
        if self.running {
            self.work.queue(now, self.config.interval);
        } else {
            debug!("monitoring stopped");
        }
    }

    fn publish(&mut self, reading: &Reading) {
        match &self.handle {
            Some(handle) => self.publisher.publish(handle, reading),
            None => self.handle = Some(self.publisher.advertise(reading)),
        }
    }

    /// Read whatever the attached variant measures.
    fn sample(&mut self) -> Result<Reading, I::Error> {
        let mut reading = Reading::default();
        match self.charger.variant() {
            Variant::Balancer => {
                reading.voltage_mv = self.read_voltage()?;
                reading.ups_current_ma = self.read_ups_current()?;
            }
            Variant::AdcCurrent => {
                reading.hss_current = self.charger.read_hss_current()?;
            }
            Variant::Gpio => {
                reading.gpio_status = self.charger.get_gpio()?.into();
            }
        }
        Ok(reading)
    }

    /// Voltage, read a second time if the first attempt returned the sentinel.
    fn read_voltage(&mut self) -> Result<i32, I::Error> {
        match self.charger.read_voltage_checked() {
            Err(Error::SentinelValue) => {
                debug!("voltage not ready, reading again");
                Ok(retried(self.charger.read_voltage_mv(), VOLTAGE_SENTINEL))
            }
            result => result,
        }
    }

    /// UPS current, read a second time if the first attempt returned the sentinel.
    fn read_ups_current(&mut self) -> Result<i32, I::Error> {
        match self.charger.read_ups_current_checked() {
            Err(Error::SentinelValue) => {
                debug!("current not ready, reading again");
                Ok(retried(self.charger.read_ups_current_ma(), UPS_CURRENT_SENTINEL))
            }
            result => result,
        }
    }
}

/// The outcome of a retry. A failed retry leaves the sentinel in place so the reading is not published.
fn retried<I: embedded_hal::i2c::Error>(result: Result<i32, I>, sentinel: i32) -> i32 {
    result.unwrap_or_else(|err| {
        warn!("retry failed: {}", err);
        sentinel
    })
}
