// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature sensor reader.

use std::fmt;

use crate::types::Temperature;

/// Default bus address of the temperature chip.
pub const DEFAULT_SENSOR_ADDRESS: u8 = 0x1f;

/// Ambient temperature register of the MCP9808.
pub const AMBIENT_TEMPERATURE_REGISTER: u8 = 0x05;

/// A bus capable of reading a 16-bit register from a device.
pub trait RegisterBus {
    /// Error reported by the bus driver.
    type Error: fmt::Debug;

    /// Reads a 16-bit word from `register` on the device at `address`.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the transfer fails.
    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error>;
}

/// Anything that yields a temperature sample.
pub trait TemperatureSensor {
    /// Samples the sensor once.
    ///
    /// Never fails: a bad read is reported as [`Temperature::Unavailable`]
    /// and the caller is expected to sample again later.
    fn read_temperature(&mut self) -> Temperature;
}

/// MCP9808 temperature sensor on a [`RegisterBus`].
#[derive(Debug)]
pub struct Mcp9808<B> {
    bus: B,
    address: u8,
    register: u8,
}

impl<B: RegisterBus> Mcp9808<B> {
    /// Creates a sensor at the default address and register.
    #[must_use]
    pub fn new(bus: B) -> Self {
        Self::with_address(bus, DEFAULT_SENSOR_ADDRESS, AMBIENT_TEMPERATURE_REGISTER)
    }

    /// Creates a sensor at a custom device address and register.
    #[must_use]
    pub fn with_address(bus: B, address: u8, register: u8) -> Self {
        Self {
            bus,
            address,
            register,
        }
    }

    /// Returns the device address on the bus.
    #[must_use]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Returns the register the sample is read from.
    #[must_use]
    pub fn register(&self) -> u8 {
        self.register
    }
}

impl<B: RegisterBus> TemperatureSensor for Mcp9808<B> {
    fn read_temperature(&mut self) -> Temperature {
        match self.bus.read_word(self.address, self.register) {
            Ok(raw) => {
                let temperature = Temperature::from_register(raw);
                if temperature.is_unavailable() {
                    tracing::warn!(
                        address = self.address,
                        register = self.register,
                        "Sensor returned an empty register"
                    );
                }
                temperature
            }
            Err(e) => {
                tracing::warn!(
                    address = self.address,
                    register = self.register,
                    error = ?e,
                    "Sensor read failed"
                );
                Temperature::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimulatedBus;

    #[test]
    fn default_address_and_register() {
        let sensor = Mcp9808::new(SimulatedBus::new(0x0050));
        assert_eq!(sensor.address(), 0x1f);
        assert_eq!(sensor.register(), 5);
    }

    #[test]
    fn reads_and_decodes() {
        let mut sensor = Mcp9808::new(SimulatedBus::new(0x0164));
        assert_eq!(sensor.read_temperature(), Temperature::Celsius(22.25));
    }

    #[test]
    fn bus_error_is_unavailable() {
        let bus = SimulatedBus::new(0x0050);
        bus.fail_reads();
        let mut sensor = Mcp9808::new(bus);
        assert_eq!(sensor.read_temperature(), Temperature::Unavailable);
    }

    #[test]
    fn failure_lasts_for_one_call_only() {
        let bus = SimulatedBus::new(0x0050);
        let mut sensor = Mcp9808::new(bus.clone());

        bus.fail_reads();
        assert!(sensor.read_temperature().is_unavailable());

        bus.set_raw(0x0060);
        assert_eq!(sensor.read_temperature(), Temperature::Celsius(6.0));
    }

    #[test]
    fn reads_from_configured_address() {
        let bus = SimulatedBus::new(0x0050);
        let mut sensor = Mcp9808::with_address(bus.clone(), 0x18, 0x05);
        sensor.read_temperature();
        assert_eq!(bus.last_read(), Some((0x18, 0x05)));
    }
}
