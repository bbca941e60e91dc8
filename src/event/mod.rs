// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events delivered by the cloud shadow transport.
//!
//! # Examples
//!
//! ```
//! use heater_shadow::event::{ShadowEvent, ShadowEventKind};
//!
//! let event = ShadowEvent::from_payload(ShadowEventKind::UpdateDelta, r#"{"state":{"on":true}}"#);
//! assert_eq!(event.kind(), ShadowEventKind::UpdateDelta);
//! ```

mod shadow_event;

pub use shadow_event::{ShadowEvent, ShadowEventKind};
