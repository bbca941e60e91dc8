// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heater Shadow - keep a heater relay in sync with a cloud device shadow.
//!
//! The controller drives one relay and samples one temperature sensor. It
//! reconciles the relay with the `reported`/`desired` documents of a device
//! shadow, reports the sampled temperature periodically and answers a small
//! RPC command interface.
//!
//! # Building Blocks
//!
//! - **Hardware** ([`hal`]): pin and register-bus traits with the MCP9808
//!   decoder and the relay driver
//! - **State** ([`state`]): the local state store and partial shadow documents
//! - **Reconciliation** ([`reconcile`](mod@reconcile)): the pure merge-and-decide function
//! - **Commands** ([`command`]): `Heater.SetState` and `Heater.GetState`
//! - **Transport** ([`protocol`]): the MQTT shadow client and RPC frames
//! - **Controller** ([`Heater`]): the single-owner run loop tying it together
//!
//! # Quick Start
//!
//! ```no_run
//! use heater_shadow::hal::Mcp9808;
//! use heater_shadow::hal::sim::{SimulatedBus, SimulatedPin};
//! use heater_shadow::protocol::ShadowClient;
//! use heater_shadow::{Heater, HeaterConfig};
//!
//! #[tokio::main]
//! async fn main() -> heater_shadow::Result<()> {
//!     let config = HeaterConfig::new("heater-01");
//!     let (client, inbound) = ShadowClient::connect("mqtt://192.168.1.50:1883", "heater-01").await?;
//!
//!     let mut heater = Heater::new(
//!         config,
//!         Mcp9808::new(SimulatedBus::new(0x0164)),
//!         SimulatedPin::new(),
//!         client,
//!     )?;
//!
//!     heater.run(inbound).await;
//!     Ok(())
//! }
//! ```

pub mod command;
mod config;
pub mod error;
pub mod event;
pub mod hal;
mod heater;
pub mod protocol;
pub mod reconcile;
pub mod state;
pub mod types;

pub use command::{HeaterCommand, SetStateRequest, SetStateResponse};
pub use config::{DEFAULT_REPORT_INTERVAL_MS, HeaterConfig};
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result};
pub use event::{ShadowEvent, ShadowEventKind};
pub use heater::Heater;
#[cfg(feature = "mqtt")]
pub use protocol::{ShadowClient, ShadowClientBuilder};
pub use protocol::{Inbound, MemoryTransport, ShadowTransport, ShadowUpdate};
pub use reconcile::{Reconciliation, reconcile};
pub use state::{DeviceState, ShadowDocument};
pub use types::Temperature;
