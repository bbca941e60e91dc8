// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT shadow transport using mockforge-mqtt.

#![cfg(feature = "mqtt")]

use std::time::Duration;

use heater_shadow::protocol::ShadowClient;
use heater_shadow::{Inbound, ProtocolError, ShadowDocument, ShadowEvent};
use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep, timeout, timeout_at};

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18950);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to start, bind to port, and be ready to accept connections
    sleep(Duration::from_millis(500)).await;
}

/// Connects a plain client that plays the cloud side of the shadow.
fn cloud_client(port: u16, id: &str) -> AsyncClient {
    let options = MqttOptions::new(id, "127.0.0.1", port);
    let (client, mut event_loop) = AsyncClient::new(options, 10);

    tokio::spawn(async move {
        while event_loop.poll().await.is_ok() {}
    });

    client
}

/// Publishes `payload` until an inbound message matching `wanted` arrives.
async fn publish_until(
    cloud: &AsyncClient,
    inbound: &mut mpsc::Receiver<Inbound>,
    topic: &str,
    payload: &str,
    wanted: impl Fn(&Inbound) -> bool,
) -> Inbound {
    for _ in 0..5 {
        cloud
            .publish(topic, QoS::AtLeastOnce, false, payload.to_string())
            .await
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(1);
        while let Ok(Some(message)) = timeout_at(deadline, inbound.recv()).await {
            if wanted(&message) {
                return message;
            }
        }
    }
    panic!("no matching message arrived on {topic}");
}

// ============================================================================

mod shadow_client_connection {
    use super::*;

    #[tokio::test]
    async fn connect_to_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("mqtt://127.0.0.1:{port}");
        let result = ShadowClient::connect(&broker_url, "heater-test").await;

        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());

        let (client, _inbound) = result.unwrap();
        assert_eq!(client.thing_name(), "heater-test");
        assert_eq!(
            client.topics().update(),
            "$aws/things/heater-test/shadow/update"
        );
    }

    #[tokio::test]
    async fn connect_with_tcp_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("tcp://127.0.0.1:{port}");
        let result = ShadowClient::connect(&broker_url, "heater-tcp").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn connect_without_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("127.0.0.1:{port}");
        let result = ShadowClient::connect(&broker_url, "heater-bare").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn connect_with_invalid_port_fails() {
        let result = ShadowClient::connect("mqtt://127.0.0.1:notaport", "heater").await;

        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }
}

// ============================================================================
// ShadowClientBuilder Tests
// ============================================================================

mod shadow_client_builder {
    use super::*;
    use heater_shadow::protocol::ShadowClientBuilder;

    #[tokio::test]
    async fn build_with_broker_and_thing_name() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("mqtt://127.0.0.1:{port}");
        let client = ShadowClientBuilder::new()
            .broker(&broker_url)
            .thing_name("heater-builder")
            .build()
            .await;

        assert!(client.is_ok());
        let (client, _inbound) = client.unwrap();
        assert_eq!(client.thing_name(), "heater-builder");
        assert_eq!(client.topics().rpc(), "heater-builder/rpc");
    }

    #[tokio::test]
    async fn build_with_custom_rpc_topic() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("mqtt://127.0.0.1:{port}");
        let (client, _inbound) = ShadowClientBuilder::new()
            .broker(&broker_url)
            .thing_name("heater-rpc")
            .rpc_topic("devices/heater-rpc/rpc")
            .client_id("heater-rpc-client")
            .build()
            .await
            .unwrap();

        assert_eq!(client.topics().rpc(), "devices/heater-rpc/rpc");
    }

    #[tokio::test]
    async fn build_missing_broker_fails() {
        let result = ShadowClientBuilder::new()
            .thing_name("heater")
            .build()
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn build_missing_thing_name_fails() {
        let result = ShadowClientBuilder::new()
            .broker("mqtt://localhost:1883")
            .build()
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn build_empty_thing_name_fails() {
        let result = ShadowClientBuilder::new()
            .broker("mqtt://localhost:1883")
            .thing_name("")
            .build()
            .await;

        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }
}

// ============================================================================
// ShadowClient Inbound Tests
// ============================================================================

mod shadow_client_inbound {
    use super::*;

    async fn connected_client(port: u16, thing: &str) -> (ShadowClient, mpsc::Receiver<Inbound>) {
        start_mock_broker(port).await;

        let broker_url = format!("mqtt://127.0.0.1:{port}");
        let (client, mut inbound) = ShadowClient::connect(&broker_url, thing).await.unwrap();

        let first = timeout(Duration::from_secs(5), inbound.recv()).await;
        assert_eq!(
            first.ok().flatten(),
            Some(Inbound::Shadow(ShadowEvent::Connected))
        );

        // Let the broker acknowledge the subscriptions
        sleep(Duration::from_millis(300)).await;
        (client, inbound)
    }

    #[tokio::test]
    async fn first_message_is_connected() {
        let port = get_test_port();
        let (client, _inbound) = connected_client(port, "heater-inbound").await;
        assert_eq!(client.thing_name(), "heater-inbound");
    }

    #[tokio::test]
    async fn delta_arrives_as_update_delta() {
        let port = get_test_port();
        let (_client, mut inbound) = connected_client(port, "heater-delta").await;
        let cloud = cloud_client(port, "cloud-delta");

        let expected = Inbound::Shadow(ShadowEvent::UpdateDelta {
            reported: None,
            desired: Some(ShadowDocument::with_on(true)),
        });
        let message = publish_until(
            &cloud,
            &mut inbound,
            "$aws/things/heater-delta/shadow/update/delta",
            r#"{"state":{"on":true}}"#,
            |m| *m == expected,
        )
        .await;

        assert_eq!(message, expected);
    }

    #[tokio::test]
    async fn rpc_frame_arrives_as_request() {
        let port = get_test_port();
        let (_client, mut inbound) = connected_client(port, "heater-rpc-in").await;
        let cloud = cloud_client(port, "cloud-rpc");

        let message = publish_until(
            &cloud,
            &mut inbound,
            "heater-rpc-in/rpc",
            r#"{"id":1,"src":"console","method":"Heater.GetState"}"#,
            |m| matches!(m, Inbound::Rpc(_)),
        )
        .await;

        let Inbound::Rpc(request) = message else {
            unreachable!();
        };
        assert_eq!(request.method, "Heater.GetState");
        assert_eq!(request.id, Some(1));
        assert_eq!(request.src.as_deref(), Some("console"));
    }
}
