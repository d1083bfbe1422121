use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[cfg(feature = "pi")]
use rppal::gpio::{Gpio, OutputPin};

/// Output level of a single pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn toggled(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// A bank of output pins addressed by pin number.
///
/// The dispatcher and the startup path only talk to this trait, so both can
/// run against [`MemoryBank`] without real hardware.
pub trait PinBank: Send {
    fn output(&mut self, pin: u8, level: Level) -> Result<()>;
    fn toggle(&mut self, pin: u8) -> Result<()>;
}

/// In-memory pin bank. Pins start low; levels can be read back through a
/// cloned handle, which the tests use in place of a multimeter.
#[derive(Clone, Default)]
pub struct MemoryBank {
    levels: Arc<Mutex<HashMap<u8, Level>>>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, pin: u8) -> Level {
        *self.levels.lock().unwrap().get(&pin).unwrap_or(&Level::Low)
    }
}

impl PinBank for MemoryBank {
    fn output(&mut self, pin: u8, level: Level) -> Result<()> {
        self.levels.lock().unwrap().insert(pin, level);
        Ok(())
    }

    fn toggle(&mut self, pin: u8) -> Result<()> {
        let mut levels = self.levels.lock().unwrap();
        let flipped = levels.get(&pin).copied().unwrap_or(Level::Low).toggled();
        levels.insert(pin, flipped);
        Ok(())
    }
}

/// Real GPIO output pins, claimed once at startup.
#[cfg(feature = "pi")]
pub struct GpioBank {
    pins: HashMap<u8, OutputPin>,
}

#[cfg(feature = "pi")]
impl GpioBank {
    pub fn new(pin_numbers: impl IntoIterator<Item = u8>) -> Result<Self> {
        let gpio = Gpio::new()?;
        let mut pins = HashMap::new();
        for number in pin_numbers {
            pins.insert(number, gpio.get(number)?.into_output());
        }
        Ok(Self { pins })
    }

    fn pin(&mut self, pin: u8) -> Result<&mut OutputPin> {
        self.pins
            .get_mut(&pin)
            .ok_or_else(|| anyhow::anyhow!("pin {} was never claimed", pin))
    }
}

#[cfg(feature = "pi")]
impl PinBank for GpioBank {
    fn output(&mut self, pin: u8, level: Level) -> Result<()> {
        let pin = self.pin(pin)?;
        match level {
            Level::Low => pin.set_low(),
            Level::High => pin.set_high(),
        }
        Ok(())
    }

    fn toggle(&mut self, pin: u8) -> Result<()> {
        self.pin(pin)?.toggle();
        Ok(())
    }
}
