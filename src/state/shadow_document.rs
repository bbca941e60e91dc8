// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Partial shadow documents.

use serde_json::Value;

/// A `reported` or `desired` sub-document of the shadow.
///
/// Every field is optional. Deserialization never fails: a field that is
/// missing, `null`, or of the wrong type is simply absent, and a payload
/// that is not an object yields an empty document.
///
/// # Examples
///
/// ```
/// use heater_shadow::state::ShadowDocument;
///
/// let doc: ShadowDocument = serde_json::from_str(r#"{"on": true, "temp": 4}"#).unwrap();
/// assert_eq!(doc.on(), Some(true));
///
/// let doc: ShadowDocument = serde_json::from_str(r#"{"on": "yes"}"#).unwrap();
/// assert_eq!(doc.on(), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Value")]
pub struct ShadowDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    on: Option<bool>,
}

impl ShadowDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document carrying only `on`.
    #[must_use]
    pub fn with_on(on: bool) -> Self {
        Self { on: Some(on) }
    }

    /// Returns the `on` field, if present.
    #[must_use]
    pub fn on(&self) -> Option<bool> {
        self.on
    }

    /// Returns `true` if no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.on.is_none()
    }

    /// Extracts known fields from an arbitrary JSON value.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            on: value.get("on").and_then(Value::as_bool),
        }
    }
}

impl From<Value> for ShadowDocument {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}
