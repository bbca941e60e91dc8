// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heater relay driver.

/// Default GPIO driving the heater relay.
pub const DEFAULT_RELAY_PIN: u8 = 13;

/// A digital output pin.
///
/// Writes are infallible: a pin that cannot be driven is a board fault
/// outside the controller's reach.
pub trait OutputPin {
    /// Configures the pin as a push-pull output.
    fn set_output_mode(&mut self);

    /// Drives the pin high (`true`) or low (`false`).
    fn write(&mut self, high: bool);

    /// Reads the current pin level.
    fn read(&self) -> bool;
}

/// Relay driver that energizes the heater when its pin is high.
#[derive(Debug)]
pub struct Relay<P> {
    pin: P,
}

impl<P: OutputPin> Relay<P> {
    /// Takes ownership of `pin` and configures it as an output.
    #[must_use]
    pub fn new(mut pin: P) -> Self {
        pin.set_output_mode();
        Self { pin }
    }

    /// Energizes (`true`) or releases (`false`) the relay.
    pub fn apply_state(&mut self, on: bool) {
        tracing::trace!(on, "Writing relay pin");
        self.pin.write(on);
    }

    /// Reads back whether the relay is currently energized.
    #[must_use]
    pub fn read_actual_on(&self) -> bool {
        self.pin.read()
    }
}
