// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heater daemon running on simulated hardware.
//!
//! Connects to an MQTT broker and serves the shadow and RPC topics of one
//! thing, with an in-memory relay pin and a sensor stuck at 22.25 °C.
//!
//! # Usage
//!
//! ```bash
//! # Thing name on the command line, default hardware settings
//! cargo run --features daemon --bin heaterd -- mqtt://192.168.1.50:1883 heater-01
//!
//! # Full configuration from a JSON file, with broker credentials
//! cargo run --features daemon --bin heaterd -- mqtt://broker:1883 heater.json user pass
//! ```
//!
//! Set `RUST_LOG=heater_shadow=debug` for per-message logs.

use std::env;
use std::path::Path;

use heater_shadow::hal::Mcp9808;
use heater_shadow::hal::sim::{SimulatedBus, SimulatedPin};
use heater_shadow::{Heater, HeaterConfig, ShadowClientBuilder};

/// Raw register value of 22.25 °C.
const SIMULATED_RAW_TEMPERATURE: u16 = 0x0164;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        print_usage(program_name(&args));
        std::process::exit(1);
    }

    let broker_url = &args[1];
    let config = load_config(&args[2])?;

    let mut builder = ShadowClientBuilder::new()
        .broker(broker_url)
        .thing_name(&config.thing_name);
    if let (Some(username), Some(password)) = (args.get(3), args.get(4)) {
        builder = builder.credentials(username, password);
    }
    let (client, inbound) = builder.build().await?;

    tracing::info!(
        broker = %broker_url,
        thing = %config.thing_name,
        relay_pin = config.relay_pin,
        "Starting simulated heater"
    );

    let sensor = Mcp9808::with_address(
        SimulatedBus::new(SIMULATED_RAW_TEMPERATURE),
        config.sensor_address,
        config.temperature_register,
    );
    let mut heater = Heater::new(config, sensor, SimulatedPin::new(), client)?;

    heater.run(inbound).await;
    Ok(())
}

/// Reads a JSON configuration file, or builds a default one for a thing name.
fn load_config(arg: &str) -> Result<HeaterConfig, Box<dyn std::error::Error>> {
    let path = Path::new(arg);
    if path.extension().is_some_and(|ext| ext == "json") {
        let json = std::fs::read_to_string(path)?;
        return Ok(HeaterConfig::from_json_str(&json)?);
    }

    let config = HeaterConfig::new(arg);
    config.validate()?;
    Ok(config)
}

/// Name to show in the usage text, even when argv is empty.
fn program_name(args: &[String]) -> &str {
    args.first().map_or("heaterd", String::as_str)
}

fn print_usage(program: &str) {
    eprintln!("Usage:");
    eprintln!("  {program} <broker_url> <thing_name | config.json> [username] [password]");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {program} mqtt://192.168.1.50:1883 heater-01");
    eprintln!("  {program} mqtt://broker:1883 heater.json user pass");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_name_falls_back_on_empty_args() {
        assert_eq!(program_name(&[]), "heaterd");
        assert_eq!(program_name(&["/usr/bin/heaterd".to_string()]), "/usr/bin/heaterd");
    }

    #[test]
    fn load_config_from_thing_name() {
        let config = load_config("heater-01").unwrap();
        assert_eq!(config, HeaterConfig::new("heater-01"));
        assert!(load_config("  ").is_err());
    }
}
