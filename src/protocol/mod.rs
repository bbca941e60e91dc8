// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloud transport for the device shadow and the command interface.
//!
//! The controller talks to the cloud through the [`ShadowTransport`] trait
//! and receives [`Inbound`] messages over a channel.
//!
//! # Transports
//!
//! - [`ShadowClient`]: MQTT, using the AWS IoT shadow topic layout
//! - [`MemoryTransport`]: records every publish in memory

mod memory;
#[cfg(feature = "mqtt")]
mod mqtt;
mod rpc_frame;
mod shadow_topics;
mod shadow_update;

use std::future::Future;

pub use memory::MemoryTransport;
#[cfg(feature = "mqtt")]
pub use mqtt::{ShadowClient, ShadowClientBuilder};
pub use rpc_frame::{RpcError, RpcReply, RpcRequest};
pub use shadow_topics::{ShadowTopic, ShadowTopics};
pub use shadow_update::ShadowUpdate;

use crate::error::ProtocolError;
use crate::event::ShadowEvent;

/// A message delivered by the transport to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A shadow notification.
    Shadow(ShadowEvent),
    /// A command interface request.
    Rpc(RpcRequest),
}

/// Outbound half of the cloud transport.
///
/// Both methods return `Send` futures so a controller holding the transport
/// can run on a multi-threaded runtime.
pub trait ShadowTransport {
    /// Publishes an update to the device shadow.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the update cannot be encoded or sent.
    fn update_shadow(
        &self,
        update: &ShadowUpdate,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Sends a reply to an RPC caller.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the reply cannot be encoded or sent.
    fn reply_rpc(&self, reply: &RpcReply) -> impl Future<Output = Result<(), ProtocolError>> + Send;
}
