//! Drive a charger on a Linux I2C bus from the terminal.
//!
//! Each line typed is one command, e.g. `start --bus 1 --chargeraddr 0x0B`, then `monitor`.
//! Readings published while monitoring are printed as they arrive. `quit` exits.
//!
//! Set `RUST_LOG=debug` to see every tick.

use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError};

use charger_monitor::{
    BatteryTopic, MonitorConfig,
    cli::{BusOpener, Session},
    work::Instant,
};
use linux_embedded_hal::{I2CError, I2cdev};
use tracing_subscriber::EnvFilter;

// How long to wait for input while nothing is scheduled.
const IDLE_POLL_MS: u64 = 500;

/// Opens `/dev/i2c-<bus>`. The `--path` given to `start` names the charger, not the bus.
struct LinuxBus;

impl BusOpener for LinuxBus {
    type Bus = I2cdev;

    fn open(&mut self, bus: u8, path: &str) -> Result<I2cdev, I2CError> {
        let node = format!("/dev/i2c-{}", bus);
        println!("Opening {} for {}", node, path);
        I2cdev::new(&node).map_err(I2CError::from)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Read stdin on its own thread so ticks keep running while we wait for a command.
    let (tx, rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let topic = BatteryTopic::new();
    let mut subscriber = topic.subscribe();
    let mut session = Session::new(LinuxBus, &topic, MonitorConfig::default());
    let started = std::time::Instant::now();
    let now = || Instant::from_ticks(started.elapsed().as_millis() as u64);

    loop {
        let wait_ms = match session.next_deadline() {
            Some(due) => due.ticks().saturating_sub(now().ticks()),
            None => IDLE_POLL_MS,
        };

        match rx.recv_timeout(std::time::Duration::from_millis(wait_ms)) {
            Ok(line) => {
                let line = line.trim();
                if line == "quit" {
                    break;
                }
                if line.is_empty() {
                    continue;
                }
                let args = std::iter::once("charger").chain(line.split_whitespace());
                let code = session.dispatch(args, now(), &mut std::io::stdout());
                if code != 0 {
                    println!("exit status {}", code);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            // Stdin closed, keep monitoring until interrupted.
            Err(RecvTimeoutError::Disconnected) if session.next_deadline().is_some() => {
                std::thread::sleep(std::time::Duration::from_millis(wait_ms));
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }

        session.run_pending(now());
        if let Some(reading) = subscriber.check() {
            println!("{:?}", reading);
        }
    }

    if session.teardown().is_some() {
        println!("Charger released");
    }
}
