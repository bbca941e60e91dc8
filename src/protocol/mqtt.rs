// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT shadow transport.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::sync::mpsc;

use crate::error::ProtocolError;
use crate::event::ShadowEvent;
use crate::protocol::{Inbound, RpcReply, ShadowTopics, ShadowTransport, ShadowUpdate};

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Default capacity of the inbound message channel.
const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Capacity of the request queue between the client and its event loop.
const REQUEST_CAPACITY: usize = 64;

/// MQTT client for a device shadow.
///
/// Uses the AWS IoT shadow topic structure:
/// - Updates: `$aws/things/<thing>/shadow/update`
/// - Full shadow requests: `$aws/things/<thing>/shadow/get`
/// - Notifications: `$aws/things/<thing>/shadow/{update,get}/...`
/// - RPC requests: `<thing>/rpc`
///
/// Every broker connection is announced as [`ShadowEvent::Connected`] and
/// followed by a `get` request, so the controller receives the current
/// shadow as `GetAccepted` shortly after (re)connecting.
///
/// Publishing never waits on the event loop: when the request queue is
/// full the publish fails at once. The event loop may itself be waiting
/// for the controller to drain the inbound channel.
///
/// # Examples
///
/// ```ignore
/// use heater_shadow::protocol::ShadowClient;
///
/// let (client, inbound) = ShadowClient::connect("mqtt://broker:1883", "heater-01").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ShadowClient {
    client: AsyncClient,
    thing_name: String,
    topics: ShadowTopics,
}

impl ShadowClient {
    /// Connects to an MQTT broker for the shadow of `thing_name`.
    ///
    /// Returns the client together with the receiver of inbound messages.
    ///
    /// # Arguments
    ///
    /// * `broker_url` - The MQTT broker URL (e.g., `mqtt://192.168.1.50:1883`)
    /// * `thing_name` - The shadow thing name (e.g., `heater-01`)
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or subscribing fails.
    pub async fn connect(
        broker_url: impl Into<String>,
        thing_name: impl Into<String>,
    ) -> Result<(Self, mpsc::Receiver<Inbound>), ProtocolError> {
        ShadowClientBuilder::new()
            .broker(broker_url)
            .thing_name(thing_name)
            .build()
            .await
    }

    /// Returns the thing name.
    #[must_use]
    pub fn thing_name(&self) -> &str {
        &self.thing_name
    }

    /// Returns the topic layout in use.
    #[must_use]
    pub fn topics(&self) -> &ShadowTopics {
        &self.topics
    }

    fn publish(&self, topic: String, payload: String) -> Result<(), ProtocolError> {
        tracing::debug!(topic = %topic, payload = %payload, "Publishing MQTT message");

        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)
            .map_err(ProtocolError::Mqtt)
    }
}

impl ShadowTransport for ShadowClient {
    async fn update_shadow(&self, update: &ShadowUpdate) -> Result<(), ProtocolError> {
        let payload = update.to_payload()?;
        self.publish(self.topics.update(), payload)
    }

    async fn reply_rpc(&self, reply: &RpcReply) -> Result<(), ProtocolError> {
        let Some(topic) = reply.reply_topic() else {
            tracing::debug!(id = ?reply.id, "RPC request had no caller, not replying");
            return Ok(());
        };
        let payload = serde_json::to_string(reply)?;
        self.publish(topic, payload)
    }
}

/// Parses an MQTT URL into host and port.
fn parse_mqtt_url(url: &str) -> Result<(String, u16), ProtocolError> {
    let url = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port) = if let Some((h, p)) = url.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {p}")))?;
        (h.to_string(), port)
    } else {
        (url.to_string(), 1883)
    };

    if host.is_empty() {
        return Err(ProtocolError::InvalidAddress("Empty host".to_string()));
    }

    Ok((host, port))
}

/// Handles MQTT events in the background.
async fn handle_shadow_events(
    mut event_loop: EventLoop,
    client: AsyncClient,
    topics: ShadowTopics,
    inbound_tx: mpsc::Sender<Inbound>,
    reconnect_delay: Duration,
) {
    use rumqttc::{Event, Packet};

    let mut connections: u64 = 0;

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                connections += 1;
                tracing::debug!(?connack, connections, "MQTT connected");

                // The first session's subscriptions were queued before connecting
                if connections > 1 {
                    for topic in topics.subscriptions() {
                        if let Err(e) = client.try_subscribe(topic, QoS::AtLeastOnce) {
                            tracing::warn!(error = %e, "Failed to resubscribe");
                        }
                    }
                }

                if inbound_tx
                    .send(Inbound::Shadow(ShadowEvent::Connected))
                    .await
                    .is_err()
                {
                    break;
                }

                let request =
                    client.try_publish(topics.get(), QoS::AtLeastOnce, false, Vec::<u8>::new());
                if let Err(e) = request {
                    tracing::warn!(error = %e, "Failed to request shadow");
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let Ok(payload) = String::from_utf8(publish.payload.to_vec()) else {
                    tracing::warn!(topic = %publish.topic, "Dropping non UTF-8 payload");
                    continue;
                };
                tracing::debug!(
                    topic = %publish.topic,
                    payload = %payload,
                    "Received MQTT message"
                );

                if let Some(message) = topics.route(&publish.topic, &payload)
                    && inbound_tx.send(message).await.is_err()
                {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                if inbound_tx.is_closed() {
                    break;
                }
                tracing::error!(error = %e, "MQTT event loop error");
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }

    tracing::debug!("Controller dropped its inbound channel, stopping MQTT event loop");
}

/// Builder for creating a shadow client with custom configuration.
#[derive(Debug, Default)]
pub struct ShadowClientBuilder {
    broker: Option<String>,
    thing_name: Option<String>,
    rpc_topic: Option<String>,
    username: Option<String>,
    password: Option<String>,
    client_id: Option<String>,
    keep_alive: Option<Duration>,
    reconnect_delay: Option<Duration>,
    channel_capacity: Option<usize>,
}

impl ShadowClientBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the MQTT broker URL.
    #[must_use]
    pub fn broker(mut self, broker: impl Into<String>) -> Self {
        self.broker = Some(broker.into());
        self
    }

    /// Sets the shadow thing name.
    #[must_use]
    pub fn thing_name(mut self, name: impl Into<String>) -> Self {
        self.thing_name = Some(name.into());
        self
    }

    /// Sets the topic RPC requests arrive on (default `<thing>/rpc`).
    #[must_use]
    pub fn rpc_topic(mut self, topic: impl Into<String>) -> Self {
        self.rpc_topic = Some(topic.into());
        self
    }

    /// Sets authentication credentials for the MQTT broker.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets a custom client ID.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = Some(duration);
        self
    }

    /// Sets the pause after a connection error before polling again.
    #[must_use]
    pub fn reconnect_delay(mut self, duration: Duration) -> Self {
        self.reconnect_delay = Some(duration);
        self
    }

    /// Sets the capacity of the inbound message channel.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    /// Builds the client and starts its event loop.
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing, the broker URL is
    /// invalid, or subscribing fails.
    pub async fn build(self) -> Result<(ShadowClient, mpsc::Receiver<Inbound>), ProtocolError> {
        let broker = self
            .broker
            .ok_or_else(|| ProtocolError::InvalidAddress("broker is required".to_string()))?;

        let thing_name = self
            .thing_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ProtocolError::InvalidAddress("thing_name is required".to_string()))?;

        let (host, port) = parse_mqtt_url(&broker)?;

        // Generate or use provided client ID (PID + counter to avoid conflicts)
        let client_id = self.client_id.unwrap_or_else(|| {
            let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
            format!("heater_{}_{}", std::process::id(), counter)
        });

        let mut mqtt_options = MqttOptions::new(&client_id, host, port);
        mqtt_options.set_keep_alive(self.keep_alive.unwrap_or(Duration::from_secs(30)));
        mqtt_options.set_clean_session(true);

        if let (Some(username), Some(password)) = (self.username, self.password) {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, REQUEST_CAPACITY);

        let mut topics = ShadowTopics::new(&thing_name);
        if let Some(rpc_topic) = self.rpc_topic {
            topics = topics.with_rpc_topic(rpc_topic);
        }

        for topic in topics.subscriptions() {
            client
                .subscribe(topic, QoS::AtLeastOnce)
                .await
                .map_err(ProtocolError::Mqtt)?;
        }

        let (inbound_tx, inbound_rx) =
            mpsc::channel(self.channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY));

        let reconnect_delay = self.reconnect_delay.unwrap_or(Duration::from_secs(5));
        let loop_client = client.clone();
        let loop_topics = topics.clone();
        tokio::spawn(async move {
            handle_shadow_events(
                event_loop,
                loop_client,
                loop_topics,
                inbound_tx,
                reconnect_delay,
            )
            .await;
        });

        tracing::debug!(client_id = %client_id, thing = %thing_name, "Shadow client started");

        Ok((
            ShadowClient {
                client,
                thing_name,
                topics,
            },
            inbound_rx,
        ))
    }
}
