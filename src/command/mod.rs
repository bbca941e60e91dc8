// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heater command definitions.
//!
//! | Method             | Arguments      | Result              |
//! |--------------------|----------------|---------------------|
//! | `Heater.SetState`  | `{"on"?: bool}`| `true`              |
//! | `Heater.GetState`  | none           | `{"temp": .., "on": ..}` |
//!
//! # Examples
//!
//! ```
//! use heater_shadow::command::{HeaterCommand, SetStateRequest};
//!
//! let cmd = HeaterCommand::parse("Heater.SetState", &serde_json::json!({"on": true})).unwrap();
//! assert_eq!(cmd, HeaterCommand::SetState(SetStateRequest::on(true)));
//! assert_eq!(cmd.name(), "Heater.SetState");
//! ```

use serde_json::Value;

use crate::protocol::RpcError;

/// Method name of the set-state command.
pub const SET_STATE: &str = "Heater.SetState";

/// Method name of the get-state command.
pub const GET_STATE: &str = "Heater.GetState";

/// Arguments of `Heater.SetState`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SetStateRequest {
    /// Relay level to apply; nothing is written when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
}

impl SetStateRequest {
    /// Creates a request that writes `on` to the relay.
    #[must_use]
    pub fn on(on: bool) -> Self {
        Self { on: Some(on) }
    }
}

/// Result of `Heater.SetState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SetStateResponse {
    /// Always `true`.
    pub success: bool,
}

/// A command accepted by the heater's command interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaterCommand {
    /// Drive the relay directly and request the negated prior state as desired.
    SetState(SetStateRequest),
    /// Sample the hardware.
    GetState,
}

impl HeaterCommand {
    /// Returns the RPC method name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetState(_) => SET_STATE,
            Self::GetState => GET_STATE,
        }
    }

    /// Parses a command from its method name and arguments.
    ///
    /// `SetState` accepts `null` or an object for `args`; a non-boolean `on`
    /// is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::method_not_found`] for unknown methods and
    /// [`RpcError::bad_request`] for non-object `SetState` arguments.
    pub fn parse(method: &str, args: &Value) -> Result<Self, RpcError> {
        match method {
            SET_STATE => match args {
                Value::Null => Ok(Self::SetState(SetStateRequest::default())),
                Value::Object(map) => Ok(Self::SetState(SetStateRequest {
                    on: map.get("on").and_then(Value::as_bool),
                })),
                _ => Err(RpcError::bad_request("args must be an object")),
            },
            GET_STATE => Ok(Self::GetState),
            other => Err(RpcError::method_not_found(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_set_state_with_on() {
        assert_eq!(
            HeaterCommand::parse(SET_STATE, &json!({"on": false})).unwrap(),
            HeaterCommand::SetState(SetStateRequest::on(false))
        );
    }

    #[test]
    fn parse_set_state_without_on() {
        assert_eq!(
            HeaterCommand::parse(SET_STATE, &json!({})).unwrap(),
            HeaterCommand::SetState(SetStateRequest::default())
        );
        assert_eq!(
            HeaterCommand::parse(SET_STATE, &Value::Null).unwrap(),
            HeaterCommand::SetState(SetStateRequest::default())
        );
    }

    #[test]
    fn parse_set_state_ignores_non_bool_on() {
        assert_eq!(
            HeaterCommand::parse(SET_STATE, &json!({"on": "true"})).unwrap(),
            HeaterCommand::SetState(SetStateRequest::default())
        );
    }

    #[test]
    fn parse_set_state_rejects_non_object() {
        let err = HeaterCommand::parse(SET_STATE, &json!([true])).unwrap_err();
        assert_eq!(err.code, RpcError::BAD_REQUEST);
    }

    #[test]
    fn parse_get_state_ignores_args() {
        assert_eq!(
            HeaterCommand::parse(GET_STATE, &json!({"anything": 1})).unwrap(),
            HeaterCommand::GetState
        );
    }

    #[test]
    fn parse_unknown_method() {
        let err = HeaterCommand::parse("Sys.Reboot", &Value::Null).unwrap_err();
        assert_eq!(err.code, RpcError::NOT_FOUND);
        assert_eq!(err.message, "No handler for Sys.Reboot");
    }

    #[test]
    fn set_state_response_is_bare_bool() {
        let response = SetStateResponse { success: true };
        assert_eq!(serde_json::to_value(response).unwrap(), json!(true));
    }
}
