use anyhow::Error;
use log::info;
use rusty_leds::net;
use rusty_leds::prelude::*;
use std::sync::Arc;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    // Load the config file, or fall back to the built-in pin map
    let config = Config::load()?;

    // Claim the pins
    #[cfg(feature = "pi")]
    let bank = GpioBank::new(config.lights.iter().map(|light| light.pin))?;
    #[cfg(not(feature = "pi"))]
    let bank = MemoryBank::new();

    // Initialize the lights (everything off)
    let controller = LightController::init(&config, bank).await?;

    match net::local_ip() {
        Some(ip) => info!("Listening at {}:{}", ip, config.port),
        None => info!("Listening on port {}", config.port),
    }

    serve(&config, Arc::new(Mutex::new(controller))).await
}
