// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local device state tracking.

use crate::types::Temperature;

use super::ShadowDocument;

/// What the controller believes is true about the heater.
///
/// This is the single authoritative copy of the device state. It is
/// serialized as the shadow's `reported` document:
///
/// ```json
/// {"on": true, "temp": 21.5}
/// ```
///
/// # Examples
///
/// ```
/// use heater_shadow::state::{DeviceState, ShadowDocument};
/// use heater_shadow::types::Temperature;
///
/// let mut state = DeviceState::new(Temperature::Celsius(20.0));
/// assert!(!state.on());
///
/// state.merge(&ShadowDocument::with_on(true));
/// assert!(state.on());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceState {
    /// Whether the heater relay is energized.
    on: bool,
    /// Last sampled temperature.
    #[serde(rename = "temp")]
    temperature: Temperature,
}

impl DeviceState {
    /// Creates the startup state: relay off, with the given first sample.
    #[must_use]
    pub fn new(temperature: Temperature) -> Self {
        Self {
            on: false,
            temperature,
        }
    }

    /// Creates a state from a live hardware sample.
    #[must_use]
    pub fn sampled(on: bool, temperature: Temperature) -> Self {
        Self { on, temperature }
    }

    /// Returns whether the heater relay is energized.
    #[must_use]
    pub fn on(&self) -> bool {
        self.on
    }

    /// Returns the last sampled temperature.
    #[must_use]
    pub fn temperature(&self) -> Temperature {
        self.temperature
    }

    /// Copies every field present in `document` into this state.
    ///
    /// Fields absent from the document are left untouched. Returns `true`
    /// if the state actually changed.
    pub fn merge(&mut self, document: &ShadowDocument) -> bool {
        match document.on() {
            Some(on) if on != self.on => {
                self.on = on;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_off() {
        let state = DeviceState::new(Temperature::Celsius(18.5));
        assert!(!state.on());
        assert_eq!(state.temperature(), Temperature::Celsius(18.5));
    }

    #[test]
    fn merge_present_field() {
        let mut state = DeviceState::new(Temperature::Unavailable);
        assert!(state.merge(&ShadowDocument::with_on(true)));
        assert!(state.on());

        // Same value again is not a change
        assert!(!state.merge(&ShadowDocument::with_on(true)));
    }

    #[test]
    fn merge_empty_document_is_noop() {
        let mut state = DeviceState::sampled(true, Temperature::Celsius(3.0));
        let before = state;

        assert!(!state.merge(&ShadowDocument::new()));
        assert_eq!(state, before);
    }

    #[test]
    fn merge_never_touches_temperature() {
        let mut state = DeviceState::new(Temperature::Celsius(7.25));
        state.merge(&ShadowDocument::with_on(true));
        assert_eq!(state.temperature(), Temperature::Celsius(7.25));
    }

    #[test]
    fn serializes_as_reported_document() {
        let state = DeviceState::sampled(true, Temperature::Celsius(21.5));
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json, serde_json::json!({"on": true, "temp": 21.5}));
    }

    #[test]
    fn serializes_unavailable_as_sentinel() {
        let state = DeviceState::new(Temperature::Unavailable);
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json, serde_json::json!({"on": false, "temp": -1000.0}));
    }

    #[test]
    fn deserializes_from_reported_document() {
        let state: DeviceState = serde_json::from_str(r#"{"on":true,"temp":-1000}"#).unwrap();
        assert!(state.on());
        assert!(state.temperature().is_unavailable());
    }
}
