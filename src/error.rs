// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the heater controller.
//!
//! Sensor failures and malformed shadow documents are not errors here: they
//! are absorbed into [`Temperature::Unavailable`](crate::types::Temperature)
//! and "field not present" respectively. What remains is configuration,
//! transport and parsing failures.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while validating configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurred during transport communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing an inbound message.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors related to controller configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The shadow thing name is empty.
    #[error("thing name must not be empty")]
    EmptyThingName,

    /// The report interval is zero.
    #[error("report interval must be greater than zero")]
    ZeroReportInterval,
}

/// Errors related to shadow transport communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT connection or communication failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Outbound document could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors related to parsing inbound payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the payload.
    #[error("missing field in payload: {0}")]
    MissingField(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
