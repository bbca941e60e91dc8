// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound shadow updates.

use serde_json::{Value, json};
use uuid::Uuid;

use crate::state::{DeviceState, ShadowDocument};

/// A publish to the shadow `update` topic.
///
/// # Examples
///
/// ```
/// use heater_shadow::protocol::ShadowUpdate;
/// use heater_shadow::state::ShadowDocument;
///
/// let update = ShadowUpdate::Desired(ShadowDocument::with_on(false));
/// assert_eq!(
///     update.state(),
///     serde_json::json!({"desired": {"on": false}})
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ShadowUpdate {
    /// Publish the device's own state as `reported`.
    Reported(DeviceState),
    /// Request a change of the `desired` state.
    Desired(ShadowDocument),
}

impl ShadowUpdate {
    /// Returns the reported state, if this is a `reported` update.
    #[must_use]
    pub fn reported(&self) -> Option<&DeviceState> {
        match self {
            Self::Reported(state) => Some(state),
            Self::Desired(_) => None,
        }
    }

    /// Returns the desired document, if this is a `desired` update.
    #[must_use]
    pub fn desired(&self) -> Option<&ShadowDocument> {
        match self {
            Self::Reported(_) => None,
            Self::Desired(document) => Some(document),
        }
    }

    /// Returns the `state` object of the update document.
    #[must_use]
    pub fn state(&self) -> Value {
        match self {
            Self::Reported(state) => json!({ "reported": state }),
            Self::Desired(document) => json!({ "desired": document }),
        }
    }

    /// Encodes the full update document with a fresh client token.
    ///
    /// ```json
    /// {"state": {"reported": {"on": true, "temp": 21.5}}, "clientToken": "..."}
    /// ```
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be encoded.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&json!({
            "state": self.state(),
            "clientToken": Uuid::new_v4(),
        }))
    }
}
