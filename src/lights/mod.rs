use anyhow::Error;
use log::{error, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::config::Config;
use crate::pins::{Level, PinBank};

/// One entry of a command payload.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub enum Command {
    TurnOn,
    TurnOff,
    Blink,
    /// Any tag this build does not know about. Logged and skipped.
    #[serde(other)]
    Unrecognized,
}

/// One HTTP request body: LED name -> command tag.
pub type CommandPayload = HashMap<String, Command>;

pub struct LightController<B> {
    bank: Arc<Mutex<B>>,
    pins: HashMap<String, u8>,
    blinkers: HashMap<String, JoinHandle<()>>,
    blink_interval: Duration,
}

impl<B: PinBank + 'static> LightController<B> {
    /// Claims the configured pins and drives them all low, so the board
    /// comes up in a known all-off state.
    pub async fn init(config: &Config, bank: B) -> Result<Self, Error> {
        let bank = Arc::new(Mutex::new(bank));
        let mut pins = HashMap::new();

        {
            let mut bank = bank.lock().await;
            for light in &config.lights {
                info!("Light {}: initializing on pin {}", light.name, light.pin);
                bank.output(light.pin, Level::Low)?;
                pins.insert(light.name.clone(), light.pin);
            }
        }

        Ok(Self {
            bank,
            pins,
            blinkers: HashMap::new(),
            blink_interval: Duration::from_millis(config.blink_interval_ms),
        })
    }

    /// Applies one payload. Nothing in here is fatal: unknown names, unknown
    /// tags, and pin failures degrade to a log line and the rest of the
    /// payload still runs.
    pub async fn dispatch(&mut self, payload: &CommandPayload) {
        for (name, command) in payload {
            let Some(&pin) = self.pins.get(name) else {
                warn!("No {} LED found", name);
                continue;
            };

            match command {
                Command::TurnOn => self.set_pin(name, pin, Level::High).await,
                Command::TurnOff => self.set_pin(name, pin, Level::Low).await,
                Command::Blink => self.start_blink(name, pin),
                Command::Unrecognized => warn!("Command not recognized for {} LED", name),
            }
        }
    }

    /// A direct level write always cancels a running blinker first, so the
    /// level written here is the final word for this LED.
    async fn set_pin(&mut self, name: &str, pin: u8, level: Level) {
        self.stop_blink(name);
        info!("Setting pin for {} LED to {:?}", name, level);
        if let Err(e) = self.bank.lock().await.output(pin, level) {
            error!("Failed to set pin {} for {} LED: {}", pin, name, e);
        }
    }

    /// Cancels the blinker for `name` if one is running. No-op otherwise.
    fn stop_blink(&mut self, name: &str) {
        if let Some(handle) = self.blinkers.remove(name) {
            handle.abort();
        }
    }

    /// Replaces any running blinker for `name` with a fresh task toggling
    /// the pin at the configured interval.
    fn start_blink(&mut self, name: &str, pin: u8) {
        self.stop_blink(name);
        info!("Making {} LED blink", name);

        let bank = self.bank.clone();
        let period = self.blink_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            // The first tick of a tokio interval completes immediately;
            // consume it so the pin starts flipping one period from now.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = bank.lock().await.toggle(pin) {
                    error!("Failed to toggle pin {}: {}", pin, e);
                }
            }
        });

        self.blinkers.insert(name.to_string(), handle);
    }

    /// Number of LEDs with an active blinker.
    pub fn active_blinkers(&self) -> usize {
        self.blinkers.len()
    }

    pub fn is_blinking(&self, name: &str) -> bool {
        self.blinkers.contains_key(name)
    }
}
