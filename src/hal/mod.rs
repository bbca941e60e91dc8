// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hardware seams for the heater controller.
//!
//! Board support is consumed through two narrow traits:
//!
//! - [`RegisterBus`] - a 16-bit register read on the sensor bus
//! - [`OutputPin`] - a digital output that can be read back
//!
//! On top of these sit the two drivers the controller uses:
//! [`Mcp9808`] decodes the temperature register and [`Relay`] drives the
//! heater relay. The [`sim`] module provides in-memory implementations of
//! both traits for tests and the simulation daemon.

mod actuator;
mod sensor;
pub mod sim;

pub use actuator::{DEFAULT_RELAY_PIN, OutputPin, Relay};
pub use sensor::{
    AMBIENT_TEMPERATURE_REGISTER, DEFAULT_SENSOR_ADDRESS, Mcp9808, RegisterBus, TemperatureSensor,
};
