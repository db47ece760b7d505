// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT transport using mockforge-mqtt.

use std::time::Duration;

use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use mqtt_humidifier::Transport;
use mqtt_humidifier::accessory::{Accessory, Active};
use mqtt_humidifier::config::AccessoryConfig;
use mqtt_humidifier::protocol::MqttTransport;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18850);
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

/// Accepts one client, answers its CONNECT with a CONNACK, then goes away
/// for good. Returns the port it listened on.
async fn start_vanishing_broker() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut connect = [0u8; 256];
        let _ = socket.read(&mut connect).await;
        // CONNACK, session not present, connection accepted
        let _ = socket.write_all(&[0x20, 0x02, 0x00, 0x00]).await;
        let _ = socket.flush().await;
        sleep(Duration::from_millis(100)).await;
        // Dropping both closes the session and refuses reconnects.
    });

    port
}

// ============================================================================
// Connection Tests
// ============================================================================

mod transport_connection {
    use super::*;

    #[tokio::test]
    async fn connect_to_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("mqtt://127.0.0.1:{port}");
        let result = MqttTransport::builder()
            .broker_url(&broker_url)
            .unwrap()
            .build()
            .await;

        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());

        let (transport, _inbound) = result.unwrap();
        assert!(transport.is_connected());
        assert_eq!(transport.host(), "127.0.0.1");
        assert_eq!(transport.port(), port);
    }

    #[tokio::test]
    async fn connect_with_tcp_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("tcp://127.0.0.1:{port}");
        let result = MqttTransport::builder()
            .broker_url(&broker_url)
            .unwrap()
            .build()
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn connect_without_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("127.0.0.1:{port}");
        let result = MqttTransport::builder()
            .broker_url(&broker_url)
            .unwrap()
            .client_id("humidifier_test")
            .build()
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn connect_without_broker_fails() {
        let port = get_test_port();

        let result = MqttTransport::builder()
            .host("127.0.0.1")
            .port(port)
            .connection_timeout(Duration::from_secs(1))
            .reconnect_delay(Duration::from_millis(100))
            .build()
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn disconnect_marks_transport_closed() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (transport, _inbound) = MqttTransport::builder()
            .host("127.0.0.1")
            .port(port)
            .build()
            .await
            .unwrap();

        assert!(transport.disconnect().await.is_ok());
        sleep(Duration::from_millis(200)).await;
        assert!(!transport.is_connected());
    }
}

// ============================================================================
// Subscribe / Publish Tests
// ============================================================================

mod transport_messaging {
    use super::*;

    #[tokio::test]
    async fn subscribe_records_topic() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (transport, _inbound) = MqttTransport::builder()
            .host("127.0.0.1")
            .port(port)
            .build()
            .await
            .unwrap();

        let result = transport.subscribe("home/humidity/value").await;
        assert!(result.is_ok());
        assert_eq!(transport.subscriptions(), ["home/humidity/value"]);
    }

    #[tokio::test]
    async fn publish_is_acknowledged() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (transport, _inbound) = MqttTransport::builder()
            .host("127.0.0.1")
            .port(port)
            .build()
            .await
            .unwrap();

        let delivery = transport.publish("home/humidity/get", "refresh").await.unwrap();
        assert!(delivery.confirmed_within(Duration::from_secs(3)).await.is_ok());
        assert_eq!(transport.pending_deliveries(), 0);
    }
}

// ============================================================================
// Accessory Tests
// ============================================================================

mod accessory_mqtt {
    use super::*;

    #[tokio::test]
    async fn start_accessory_on_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let broker_url = format!("mqtt://127.0.0.1:{port}");
        let (transport, inbound) = MqttTransport::builder()
            .broker_url(&broker_url)
            .unwrap()
            .build()
            .await
            .unwrap();

        let config = AccessoryConfig::humidifier(broker_url);
        let accessory = Accessory::new(transport.clone(), &config).unwrap();

        let tasks = accessory.start(inbound).await;
        assert!(tasks.is_ok(), "Failed to start: {:?}", tasks.err());
        assert_eq!(transport.subscriptions().len(), 2);

        tasks.unwrap().abort();
    }
}

// ============================================================================
// Broker Outage Tests
// ============================================================================

mod broker_outage {
    use super::*;

    async fn connect_then_lose_broker() -> MqttTransport {
        let port = start_vanishing_broker().await;
        let (transport, _inbound) = MqttTransport::builder()
            .host("127.0.0.1")
            .port(port)
            .connection_timeout(Duration::from_secs(2))
            .reconnect_delay(Duration::from_millis(100))
            .build()
            .await
            .unwrap();

        sleep(Duration::from_millis(500)).await;
        transport
    }

    #[tokio::test]
    async fn publishes_never_block() {
        let transport = connect_then_lose_broker().await;

        let burst = timeout(Duration::from_secs(5), async {
            for _ in 0..30 {
                let _ = transport.publish("home/humidity/get", "refresh").await;
            }
        })
        .await;

        assert!(burst.is_ok(), "publish blocked while the broker was down");
    }

    #[tokio::test]
    async fn accessory_stays_responsive() {
        let transport = connect_then_lose_broker().await;

        let mut config = AccessoryConfig::humidifier("mqtt://127.0.0.1");
        config.await_refresh_on_read = false;
        config.delivery_timeout_seconds = 1;
        let accessory = Accessory::new(transport, &config).unwrap();

        let reads = timeout(Duration::from_secs(5), async {
            for _ in 0..30 {
                assert!(accessory.current_relative_humidity().await.is_ok());
            }
        })
        .await;
        assert!(reads.is_ok(), "humidity reads blocked while the broker was down");

        let getter = timeout(Duration::from_secs(1), accessory.active()).await;
        assert_eq!(getter.ok(), Some(Active::Active));

        let set = timeout(
            Duration::from_secs(3),
            accessory.set_active(Active::Inactive),
        )
        .await;
        assert!(matches!(set, Ok(Err(_))), "unconfirmed publish must fail in time");
    }
}
