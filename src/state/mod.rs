// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state and shadow documents.
//!
//! [`DeviceState`] is the controller's own record of the heater, while
//! [`ShadowDocument`] is a partial `reported`/`desired` record received from
//! the cloud and merged into it.
//!
//! # Examples
//!
//! ```
//! use heater_shadow::state::{DeviceState, ShadowDocument};
//! use heater_shadow::types::Temperature;
//!
//! let mut state = DeviceState::new(Temperature::Celsius(21.0));
//!
//! // Reported first, desired last: desired wins
//! state.merge(&ShadowDocument::with_on(false));
//! state.merge(&ShadowDocument::with_on(true));
//!
//! assert!(state.on());
//! ```

mod device_state;
mod shadow_document;

pub use device_state::DeviceState;
pub use shadow_document::ShadowDocument;
