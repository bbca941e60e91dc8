// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON-RPC style frames for the command interface.
//!
//! Requests arrive on `<device>/rpc` and replies go to `<caller>/rpc`:
//!
//! ```text
//! → {"id": 7, "src": "console", "method": "Heater.SetState", "args": {"on": true}}
//! ← {"id": 7, "src": "heater-01", "dst": "console", "result": true}
//! ```

use serde_json::Value;

use crate::error::ParseError;

/// Error object carried in a failed reply.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
#[error("rpc error {code}: {message}")]
pub struct RpcError {
    /// Numeric error code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
}

impl RpcError {
    /// Code for malformed arguments.
    pub const BAD_REQUEST: i32 = 400;

    /// Code for unknown methods.
    pub const NOT_FOUND: i32 = 404;

    /// Code for failures while executing a known method.
    pub const INTERNAL: i32 = 500;

    /// Creates an error for malformed arguments.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: Self::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Creates an error for a method without a handler.
    #[must_use]
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: Self::NOT_FOUND,
            message: format!("No handler for {method}"),
        }
    }

    /// Creates an error for a failure inside a handler.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: Self::INTERNAL,
            message: message.into(),
        }
    }
}

/// An incoming RPC request.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RpcRequest {
    /// Caller-chosen request identifier, echoed in the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Caller address; replies are sent to `<src>/rpc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Method name, e.g. `Heater.GetState`.
    pub method: String,
    /// Method arguments.
    #[serde(default)]
    pub args: Value,
}

impl RpcRequest {
    /// Creates a request without id or caller address.
    #[must_use]
    pub fn new(method: impl Into<String>, args: Value) -> Self {
        Self {
            id: None,
            src: None,
            method: method.into(),
            args,
        }
    }

    /// Sets the request identifier.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the caller address.
    #[must_use]
    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Decodes a request frame.
    ///
    /// # Errors
    ///
    /// Returns error if the payload is not JSON or has no `method`.
    pub fn from_payload(payload: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(payload)?;
        if value.get("method").and_then(Value::as_str).is_none() {
            return Err(ParseError::MissingField("method".to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// A reply to an [`RpcRequest`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RpcReply {
    /// Identifier of the request being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Address of the device answering.
    pub src: String,
    /// Address of the original caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst: Option<String>,
    /// Result of a successful call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error of a failed call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcReply {
    /// Builds the reply to `request` from the outcome of the call.
    #[must_use]
    pub fn to_request(
        request: &RpcRequest,
        src: impl Into<String>,
        outcome: Result<Value, RpcError>,
    ) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            id: request.id,
            src: src.into(),
            dst: request.src.clone(),
            result,
            error,
        }
    }

    /// Returns the topic the reply is published on, if the caller is known.
    #[must_use]
    pub fn reply_topic(&self) -> Option<String> {
        self.dst.as_ref().map(|dst| format!("{dst}/rpc"))
    }

    /// Returns `true` if the call failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
