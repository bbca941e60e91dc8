// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the controller.
//!
//! - [`Temperature`] - A decoded sensor sample, or the unavailable marker

mod temperature;

pub use temperature::{Temperature, UNAVAILABLE_SENTINEL};
