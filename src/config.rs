use anyhow::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub port: u16,
    pub blink_interval_ms: u64,
    pub lights: Vec<Light>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct Light {
    pub name: String,
    pub pin: u8,
}

impl Default for Config {
    /// The pin map of the board this was written for: four LEDs on pins 0-3.
    fn default() -> Self {
        let lights = [("yellow", 0), ("green", 1), ("red", 2), ("blue", 3)]
            .into_iter()
            .map(|(name, pin)| Light {
                name: name.to_string(),
                pin,
            })
            .collect();

        Config {
            port: 8080,
            blink_interval_ms: 300,
            lights,
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, Error> {
        Config::load_from("config.ron")
    }

    /// Reads a RON config file, falling back to the built-in pin map when no
    /// file exists.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Config, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }

        let config = std::fs::read_to_string(path)?;
        let config: Config = ron::from_str(&config)?;
        Ok(config)
    }
}
