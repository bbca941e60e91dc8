// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature readings decoded from the sensor register.

use std::fmt;

/// Value reported on the wire when the sensor could not be read.
pub const UNAVAILABLE_SENTINEL: f32 = -1000.0;

/// Sign bit of the ambient temperature register.
const SIGN_BIT: u16 = 0x1000;

/// A temperature sample in degrees Celsius.
///
/// Serializes as a plain number. A failed read is carried as
/// [`Temperature::Unavailable`] and serializes as `-1000`, which is also the
/// value that deserializes back into `Unavailable`.
///
/// # Examples
///
/// ```
/// use heater_shadow::types::Temperature;
///
/// assert_eq!(Temperature::from_register(0x0050), Temperature::Celsius(5.0));
/// assert_eq!(Temperature::from_register(0x1050), Temperature::Celsius(-5.0));
/// assert_eq!(Temperature::from_register(0), Temperature::Unavailable);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "f32", into = "f32")]
pub enum Temperature {
    /// A decoded reading.
    Celsius(f32),
    /// The sensor read failed.
    Unavailable,
}

impl Temperature {
    /// Decodes a raw 16-bit ambient temperature register value.
    ///
    /// Bits 4-11 hold the integer degrees, bits 0-3 the sixteenths and bit 12
    /// the sign. A zero word is what the bus returns for an absent or
    /// uninitialized chip and decodes to [`Temperature::Unavailable`].
    #[must_use]
    pub fn from_register(raw: u16) -> Self {
        if raw == 0 {
            return Self::Unavailable;
        }

        let whole = f32::from((raw >> 4) & 0xff);
        let fraction = f32::from(raw & 0xf) / 16.0;
        let magnitude = whole + fraction;

        if raw & SIGN_BIT == 0 {
            Self::Celsius(magnitude)
        } else {
            Self::Celsius(-magnitude)
        }
    }

    /// Returns the reading in degrees Celsius, if available.
    #[must_use]
    pub const fn celsius(&self) -> Option<f32> {
        match self {
            Self::Celsius(value) => Some(*value),
            Self::Unavailable => None,
        }
    }

    /// Returns `true` if the sensor read failed.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl From<f32> for Temperature {
    #[allow(clippy::float_cmp)]
    fn from(value: f32) -> Self {
        if value == UNAVAILABLE_SENTINEL {
            Self::Unavailable
        } else {
            Self::Celsius(value)
        }
    }
}

impl From<Temperature> for f32 {
    fn from(value: Temperature) -> Self {
        value.celsius().unwrap_or(UNAVAILABLE_SENTINEL)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Celsius(value) => write!(f, "{value:.4}°C"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}
