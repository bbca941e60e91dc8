// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shadow event types.

use std::fmt;

use serde_json::Value;

use crate::state::ShadowDocument;

/// The kind of notification delivered by the shadow transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowEventKind {
    /// The transport (re)connected to the cloud.
    Connected,
    /// The full shadow was returned in answer to a `get` request.
    GetAccepted,
    /// A `get` request was rejected.
    GetRejected,
    /// An `update` publish was accepted.
    UpdateAccepted,
    /// An `update` publish was rejected.
    UpdateRejected,
    /// The desired state differs from the reported state.
    UpdateDelta,
}

impl ShadowEventKind {
    /// Returns the upper-case name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "CONNECTED",
            Self::GetAccepted => "GET_ACCEPTED",
            Self::GetRejected => "GET_REJECTED",
            Self::UpdateAccepted => "UPDATE_ACCEPTED",
            Self::UpdateRejected => "UPDATE_REJECTED",
            Self::UpdateDelta => "UPDATE_DELTA",
        }
    }
}

impl fmt::Display for ShadowEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification from the shadow transport.
///
/// Only [`Connected`](Self::Connected), [`GetAccepted`](Self::GetAccepted)
/// and [`UpdateDelta`](Self::UpdateDelta) drive the controller; every other
/// kind is carried as [`Other`](Self::Other) and ignored.
///
/// # Examples
///
/// ```
/// use heater_shadow::event::{ShadowEvent, ShadowEventKind};
///
/// let event = ShadowEvent::from_payload(
///     ShadowEventKind::GetAccepted,
///     r#"{"state":{"reported":{"on":false},"desired":{"on":true}}}"#,
/// );
///
/// let ShadowEvent::GetAccepted { reported, desired } = event else {
///     panic!("unexpected event");
/// };
/// assert_eq!(reported.and_then(|d| d.on()), Some(false));
/// assert_eq!(desired.and_then(|d| d.on()), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShadowEvent {
    /// The transport connected.
    Connected,

    /// The current shadow, as answered to a `get` request.
    GetAccepted {
        /// The `reported` sub-document, if any.
        reported: Option<ShadowDocument>,
        /// The `desired` sub-document, if any.
        desired: Option<ShadowDocument>,
    },

    /// A change of desired state not yet acknowledged by the device.
    UpdateDelta {
        /// The `reported` sub-document, if any.
        reported: Option<ShadowDocument>,
        /// The `desired` sub-document, if any.
        desired: Option<ShadowDocument>,
    },

    /// Any other notification.
    Other(ShadowEventKind),
}

impl ShadowEvent {
    /// Returns the kind of this event.
    #[must_use]
    pub fn kind(&self) -> ShadowEventKind {
        match self {
            Self::Connected => ShadowEventKind::Connected,
            Self::GetAccepted { .. } => ShadowEventKind::GetAccepted,
            Self::UpdateDelta { .. } => ShadowEventKind::UpdateDelta,
            Self::Other(kind) => *kind,
        }
    }

    /// Builds an event of `kind` from a raw shadow payload.
    ///
    /// - `GET_ACCEPTED` payloads carry `state.reported` and `state.desired`.
    /// - `UPDATE_DELTA` payloads carry the pending changes directly under
    ///   `state`; these become the `desired` document.
    ///
    /// Never fails: an undecodable payload yields an event with no
    /// documents, which the controller treats as "no fields present".
    #[must_use]
    pub fn from_payload(kind: ShadowEventKind, payload: &str) -> Self {
        let value = match serde_json::from_str::<Value>(payload) {
            Ok(value) => value,
            Err(e) => {
                if !payload.is_empty() {
                    tracing::warn!(kind = %kind, error = %e, "Undecodable shadow payload");
                }
                Value::Null
            }
        };
        let state = value.get("state");

        match kind {
            ShadowEventKind::Connected => Self::Connected,
            ShadowEventKind::GetAccepted => Self::GetAccepted {
                reported: sub_document(state, "reported"),
                desired: sub_document(state, "desired"),
            },
            ShadowEventKind::UpdateDelta => Self::UpdateDelta {
                reported: None,
                desired: state.map(ShadowDocument::from_value),
            },
            other => Self::Other(other),
        }
    }
}

fn sub_document(state: Option<&Value>, key: &str) -> Option<ShadowDocument> {
    state
        .and_then(|s| s.get(key))
        .map(ShadowDocument::from_value)
}
