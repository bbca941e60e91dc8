// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ParseError};
use crate::hal::{AMBIENT_TEMPERATURE_REGISTER, DEFAULT_RELAY_PIN, DEFAULT_SENSOR_ADDRESS};

/// Default period of the reporter, in milliseconds.
pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 20_000;

/// Configuration for a heater controller.
///
/// Only `thing_name` is required when loading from JSON; every other field
/// falls back to its default.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use heater_shadow::HeaterConfig;
///
/// let config = HeaterConfig::new("heater-01").with_report_interval(Duration::from_secs(5));
/// assert_eq!(config.relay_pin, 13);
/// assert!(config.validate().is_ok());
///
/// let config = HeaterConfig::from_json_str(r#"{"thing_name": "heater-02"}"#).unwrap();
/// assert_eq!(config.report_interval(), Duration::from_millis(20_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeaterConfig {
    /// Name of the shadow and address of the device on the command interface.
    pub thing_name: String,
    /// Digital pin driving the relay.
    ///
    /// Informational: the controller drives whatever [`OutputPin`] it is
    /// given, so board code uses this number to open that pin.
    ///
    /// [`OutputPin`]: crate::hal::OutputPin
    #[serde(default = "default_relay_pin")]
    pub relay_pin: u8,
    /// Bus address of the temperature sensor.
    #[serde(default = "default_sensor_address")]
    pub sensor_address: u8,
    /// Register holding the ambient temperature.
    #[serde(default = "default_temperature_register")]
    pub temperature_register: u8,
    /// Period of the reporter, in milliseconds.
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
}

fn default_relay_pin() -> u8 {
    DEFAULT_RELAY_PIN
}

fn default_sensor_address() -> u8 {
    DEFAULT_SENSOR_ADDRESS
}

fn default_temperature_register() -> u8 {
    AMBIENT_TEMPERATURE_REGISTER
}

fn default_report_interval_ms() -> u64 {
    DEFAULT_REPORT_INTERVAL_MS
}

impl HeaterConfig {
    /// Creates a configuration with default hardware settings.
    #[must_use]
    pub fn new(thing_name: impl Into<String>) -> Self {
        Self {
            thing_name: thing_name.into(),
            relay_pin: DEFAULT_RELAY_PIN,
            sensor_address: DEFAULT_SENSOR_ADDRESS,
            temperature_register: AMBIENT_TEMPERATURE_REGISTER,
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
        }
    }

    /// Sets the relay pin.
    #[must_use]
    pub fn with_relay_pin(mut self, pin: u8) -> Self {
        self.relay_pin = pin;
        self
    }

    /// Sets the sensor bus address and temperature register.
    #[must_use]
    pub fn with_sensor(mut self, address: u8, register: u8) -> Self {
        self.sensor_address = address;
        self.temperature_register = register;
        self
    }

    /// Sets the reporter period.
    ///
    /// Sub-millisecond precision is dropped.
    #[must_use]
    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns the reporter period.
    #[must_use]
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    /// Checks the configuration for values the controller cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyThingName`] or
    /// [`ConfigError::ZeroReportInterval`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thing_name.trim().is_empty() {
            return Err(ConfigError::EmptyThingName);
        }
        if self.report_interval_ms == 0 {
            return Err(ConfigError::ZeroReportInterval);
        }
        Ok(())
    }

    /// Loads and validates a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed JSON or a missing `thing_name`,
    /// and a config error if validation fails.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(ParseError::from)?;
        config.validate()?;
        Ok(config)
    }
}
