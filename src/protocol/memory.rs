// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory transport that records every publish.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ProtocolError;
use crate::protocol::{RpcReply, ShadowTransport, ShadowUpdate};

#[derive(Debug, Default)]
struct Recorded {
    updates: Vec<ShadowUpdate>,
    replies: Vec<RpcReply>,
}

/// Transport that keeps published updates and replies in memory.
///
/// Clones share the same record, so a test can hand one clone to the
/// controller and inspect the other.
///
/// # Examples
///
/// ```
/// use heater_shadow::protocol::{MemoryTransport, ShadowTransport, ShadowUpdate};
/// use heater_shadow::state::ShadowDocument;
///
/// # async fn example() {
/// let transport = MemoryTransport::new();
/// transport
///     .update_shadow(&ShadowUpdate::Desired(ShadowDocument::with_on(true)))
///     .await
///     .unwrap();
/// assert_eq!(transport.updates().len(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    recorded: Arc<Mutex<Recorded>>,
}

impl MemoryTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all shadow updates published so far.
    #[must_use]
    pub fn updates(&self) -> Vec<ShadowUpdate> {
        self.recorded.lock().updates.clone()
    }

    /// Returns all RPC replies sent so far.
    #[must_use]
    pub fn replies(&self) -> Vec<RpcReply> {
        self.recorded.lock().replies.clone()
    }

    /// Removes and returns all recorded shadow updates.
    pub fn take_updates(&self) -> Vec<ShadowUpdate> {
        std::mem::take(&mut self.recorded.lock().updates)
    }
}

impl ShadowTransport for MemoryTransport {
    async fn update_shadow(&self, update: &ShadowUpdate) -> Result<(), ProtocolError> {
        self.recorded.lock().updates.push(update.clone());
        Ok(())
    }

    async fn reply_rpc(&self, reply: &RpcReply) -> Result<(), ProtocolError> {
        self.recorded.lock().replies.push(reply.clone());
        Ok(())
    }
}
