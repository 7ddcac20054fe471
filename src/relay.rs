//! Message relay: one-way forwarder from the MQTT bus to the REST API.
//!
//! Subscribes under a configurable topic root and, for messages on the
//! `{root}/readings` topic, POSTs the temperature reading to the ingest
//! endpoint. Malformed payloads are logged and dropped; they never crash the
//! listener. The forwarding side is a trait so the handler can be tested
//! without a running HTTP server.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::ReadingBody;

// ---

/// A payload that could not be parsed as a sensor reading. The message is
/// dropped; nothing propagates past the receive loop.
#[derive(Debug, Error)]
#[error("malformed payload: {0}")]
pub struct MalformedPayload(pub String);

/// Connection settings for the relay.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub host: String,
    pub port: u16,
    pub topic_root: String,
}

/// Destination for relayed readings. Production uses [`HttpForwarder`];
/// tests inject a recording double.
pub trait ReadingForwarder: Send + Sync {
    fn forward(&self, reading: ReadingBody) -> impl Future<Output = Result<()>> + Send;
}

/// Forwards readings as JSON POSTs to the ingest endpoint.
pub struct HttpForwarder {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpForwarder {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

impl ReadingForwarder for HttpForwarder {
    fn forward(&self, reading: ReadingBody) -> impl Future<Output = Result<()>> + Send {
        // ---
        async move {
            let response = self
                .client
                .post(&self.endpoint)
                .json(&reading)
                .send()
                .await?;
            if !response.status().is_success() {
                anyhow::bail!("ingest endpoint returned {}", response.status());
            }
            Ok(())
        }
    }
}

/// Wire shape published by the sensor firmware.
#[derive(Debug, Deserialize)]
struct BusReading {
    temperature: f64,
    // Present on the wire and required for a payload to count as
    // well-formed, but not forwarded.
    pressure: f64,
}

/// Handle one incoming message.
///
/// Messages outside `{topic_root}/readings` are ignored. A well-formed
/// reading is forwarded as `{value, unit: "C", timestamp: now}`; a forward
/// failure is logged and the message dropped, since the bus keeps producing
/// fresher readings anyway.
pub async fn handle_message<F: ReadingForwarder>(
    forwarder: &F,
    topic_root: &str,
    topic: &str,
    payload: &[u8],
) -> Result<(), MalformedPayload> {
    // ---
    if topic != format!("{topic_root}/readings") {
        return Ok(());
    }

    let reading: BusReading =
        serde_json::from_slice(payload).map_err(|e| MalformedPayload(e.to_string()))?;
    debug!(
        temperature = reading.temperature,
        pressure = reading.pressure,
        "received sensor reading"
    );

    let body = ReadingBody {
        value: reading.temperature,
        unit: "C".to_string(),
        timestamp: Some(Local::now().naive_local()),
    };
    if let Err(e) = forwarder.forward(body).await {
        warn!("failed to forward reading: {e}");
    }
    Ok(())
}

/// Run the relay until the process exits.
///
/// Subscribes on every ConnAck so a broker reconnect re-establishes the
/// subscription, and backs off briefly on connection errors instead of
/// spinning.
pub async fn run<F: ReadingForwarder>(settings: RelaySettings, forwarder: F) {
    // ---
    let client_id = format!("sensorhub-{}", Uuid::new_v4());
    let mut options = MqttOptions::new(client_id, &settings.host, settings.port);
    options.set_keep_alive(Duration::from_secs(30));

    let (client, mut eventloop) = AsyncClient::new(options, 64);
    let subscription = format!("{}/#", settings.topic_root);

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!(
                    "connected to MQTT broker {}:{}",
                    settings.host, settings.port
                );
                if let Err(e) = client.subscribe(&subscription, QoS::AtMostOnce).await {
                    error!("failed to subscribe to {subscription}: {e}");
                } else {
                    info!("subscribed to {subscription}");
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if let Err(e) = handle_message(
                    &forwarder,
                    &settings.topic_root,
                    &publish.topic,
                    &publish.payload,
                )
                .await
                {
                    warn!("dropping message on {}: {e}", publish.topic);
                }
            }
            Ok(_) => {}
            Err(e) => {
                error!("MQTT connection error: {e}");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingForwarder {
        sent: Mutex<Vec<ReadingBody>>,
    }

    impl ReadingForwarder for RecordingForwarder {
        fn forward(&self, reading: ReadingBody) -> impl Future<Output = Result<()>> + Send {
            self.sent.lock().unwrap().push(reading);
            async { Ok(()) }
        }
    }

    struct FailingForwarder;

    impl ReadingForwarder for FailingForwarder {
        fn forward(&self, _reading: ReadingBody) -> impl Future<Output = Result<()>> + Send {
            async { anyhow::bail!("connection refused") }
        }
    }

    #[tokio::test]
    async fn well_formed_reading_is_forwarded_in_celsius() {
        // ---
        let forwarder = RecordingForwarder::default();
        handle_message(
            &forwarder,
            "lab/sensors",
            "lab/sensors/readings",
            br#"{"temperature": 21.7, "pressure": 101325.0}"#,
        )
        .await
        .unwrap();

        let sent = forwarder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].value, 21.7);
        assert_eq!(sent[0].unit, "C");
        assert!(sent[0].timestamp.is_some());
    }

    #[tokio::test]
    async fn non_json_payload_is_malformed() {
        // ---
        let forwarder = RecordingForwarder::default();
        let err = handle_message(
            &forwarder,
            "lab/sensors",
            "lab/sensors/readings",
            b"hello world",
        )
        .await
        .unwrap_err();

        assert!(err.to_string().starts_with("malformed payload"));
        assert!(forwarder.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn json_missing_fields_is_malformed() {
        // ---
        let forwarder = RecordingForwarder::default();
        let err = handle_message(
            &forwarder,
            "lab/sensors",
            "lab/sensors/readings",
            br#"{"temperature": 21.7}"#,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("pressure"));
    }

    #[tokio::test]
    async fn other_topics_are_ignored() {
        // ---
        let forwarder = RecordingForwarder::default();
        handle_message(
            &forwarder,
            "lab/sensors",
            "lab/sensors/status",
            b"not even json",
        )
        .await
        .unwrap();
        assert!(forwarder.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn forward_failure_is_swallowed_not_propagated() {
        // ---
        handle_message(
            &FailingForwarder,
            "lab/sensors",
            "lab/sensors/readings",
            br#"{"temperature": 21.7, "pressure": 101325.0}"#,
        )
        .await
        .unwrap();
    }
}
