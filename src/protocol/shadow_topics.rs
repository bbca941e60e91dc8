// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT topic layout of the device shadow.
//!
//! ```text
//! $aws/things/heater-01/shadow/update/delta  →  ShadowEvent::UpdateDelta
//! $aws/things/heater-01/shadow/get/accepted  →  ShadowEvent::GetAccepted
//! heater-01/rpc                              →  RpcRequest
//! ```

use crate::event::{ShadowEvent, ShadowEventKind};
use crate::protocol::{Inbound, RpcRequest};

/// What an incoming topic carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowTopic {
    /// A shadow notification of the given kind.
    Event(ShadowEventKind),
    /// An RPC request.
    Rpc,
}

/// Topic names for one thing's shadow and RPC channel.
///
/// # Examples
///
/// ```
/// use heater_shadow::protocol::ShadowTopics;
///
/// let topics = ShadowTopics::new("heater-01");
/// assert_eq!(topics.update(), "$aws/things/heater-01/shadow/update");
/// assert_eq!(topics.rpc(), "heater-01/rpc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowTopics {
    prefix: String,
    rpc: String,
}

impl ShadowTopics {
    /// Creates the topic layout for `thing_name`, with RPC on `<thing_name>/rpc`.
    #[must_use]
    pub fn new(thing_name: &str) -> Self {
        Self {
            prefix: format!("$aws/things/{thing_name}/shadow"),
            rpc: format!("{thing_name}/rpc"),
        }
    }

    /// Replaces the RPC request topic.
    #[must_use]
    pub fn with_rpc_topic(mut self, topic: impl Into<String>) -> Self {
        self.rpc = topic.into();
        self
    }

    /// Topic that shadow updates are published to.
    #[must_use]
    pub fn update(&self) -> String {
        format!("{}/update", self.prefix)
    }

    /// Topic that requests the full shadow.
    #[must_use]
    pub fn get(&self) -> String {
        format!("{}/get", self.prefix)
    }

    /// Topic that RPC requests arrive on.
    #[must_use]
    pub fn rpc(&self) -> &str {
        &self.rpc
    }

    /// Every topic the device must subscribe to.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        let mut topics: Vec<String> = [
            "update/delta",
            "update/accepted",
            "update/rejected",
            "get/accepted",
            "get/rejected",
        ]
        .iter()
        .map(|suffix| format!("{}/{suffix}", self.prefix))
        .collect();
        topics.push(self.rpc.clone());
        topics
    }

    /// Classifies an incoming topic.
    #[must_use]
    pub fn classify(&self, topic: &str) -> Option<ShadowTopic> {
        if topic == self.rpc {
            return Some(ShadowTopic::Rpc);
        }

        let suffix = topic.strip_prefix(&self.prefix)?.strip_prefix('/')?;
        let kind = match suffix {
            "update/delta" => ShadowEventKind::UpdateDelta,
            "update/accepted" => ShadowEventKind::UpdateAccepted,
            "update/rejected" => ShadowEventKind::UpdateRejected,
            "get/accepted" => ShadowEventKind::GetAccepted,
            "get/rejected" => ShadowEventKind::GetRejected,
            _ => return None,
        };
        Some(ShadowTopic::Event(kind))
    }

    /// Decodes an incoming publish into a controller message.
    ///
    /// Returns `None` for foreign topics and undecodable RPC frames.
    #[must_use]
    pub fn route(&self, topic: &str, payload: &str) -> Option<Inbound> {
        let Some(classified) = self.classify(topic) else {
            tracing::trace!(topic = %topic, "Ignoring foreign topic");
            return None;
        };

        match classified {
            ShadowTopic::Event(kind) => {
                Some(Inbound::Shadow(ShadowEvent::from_payload(kind, payload)))
            }
            ShadowTopic::Rpc => match RpcRequest::from_payload(payload) {
                Ok(request) => Some(Inbound::Rpc(request)),
                Err(e) => {
                    tracing::warn!(topic = %topic, error = %e, "Dropping undecodable RPC frame");
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ShadowDocument;

    #[test]
    fn outbound_topics() {
        let topics = ShadowTopics::new("heater-01");
        assert_eq!(topics.update(), "$aws/things/heater-01/shadow/update");
        assert_eq!(topics.get(), "$aws/things/heater-01/shadow/get");
    }

    #[test]
    fn subscriptions_cover_responses_and_rpc() {
        let topics = ShadowTopics::new("h");
        let subs = topics.subscriptions();
        assert_eq!(subs.len(), 6);
        assert!(subs.contains(&"$aws/things/h/shadow/update/delta".to_string()));
        assert!(subs.contains(&"$aws/things/h/shadow/get/accepted".to_string()));
        assert!(subs.contains(&"h/rpc".to_string()));
    }

    #[test]
    fn classify_shadow_topics() {
        let topics = ShadowTopics::new("heater-01");
        assert_eq!(
            topics.classify("$aws/things/heater-01/shadow/update/delta"),
            Some(ShadowTopic::Event(ShadowEventKind::UpdateDelta))
        );
        assert_eq!(
            topics.classify("$aws/things/heater-01/shadow/get/rejected"),
            Some(ShadowTopic::Event(ShadowEventKind::GetRejected))
        );
        assert_eq!(topics.classify("heater-01/rpc"), Some(ShadowTopic::Rpc));
    }

    #[test]
    fn classify_foreign_topics() {
        let topics = ShadowTopics::new("heater-01");
        assert_eq!(topics.classify("$aws/things/other/shadow/update/delta"), None);
        assert_eq!(topics.classify("$aws/things/heater-01/shadow/update"), None);
        assert_eq!(topics.classify("$aws/things/heater-01/shadowx/get/accepted"), None);
        assert_eq!(topics.classify("random"), None);
    }

    #[test]
    fn custom_rpc_topic() {
        let topics = ShadowTopics::new("heater-01").with_rpc_topic("devices/heater-01/rpc");
        assert_eq!(topics.classify("devices/heater-01/rpc"), Some(ShadowTopic::Rpc));
        assert_eq!(topics.classify("heater-01/rpc"), None);
    }

    #[test]
    fn route_delta() {
        let topics = ShadowTopics::new("heater-01");
        let inbound = topics.route(
            "$aws/things/heater-01/shadow/update/delta",
            r#"{"state":{"on":true}}"#,
        );
        assert_eq!(
            inbound,
            Some(Inbound::Shadow(ShadowEvent::UpdateDelta {
                reported: None,
                desired: Some(ShadowDocument::with_on(true)),
            }))
        );
    }

    #[test]
    fn route_rpc() {
        let topics = ShadowTopics::new("heater-01");
        let inbound = topics.route("heater-01/rpc", r#"{"id":1,"method":"Heater.GetState"}"#);
        assert!(matches!(inbound, Some(Inbound::Rpc(ref r)) if r.method == "Heater.GetState"));
    }

    #[test]
    fn route_drops_bad_rpc_frame() {
        let topics = ShadowTopics::new("heater-01");
        assert_eq!(topics.route("heater-01/rpc", "nope"), None);
    }
}
