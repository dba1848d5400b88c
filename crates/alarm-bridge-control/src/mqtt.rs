//! MQTT transport for discovery and status publishing.
//!
//! One broker connection serves both directions:
//!
//! - `<deployment>/ipaddress` is subscribed; payloads are forwarded to the
//!   discovery listener channel.
//! - `<deployment>/status` receives the alarm status as a retained message
//!   every time it changes.
//!
//! The subscription is re-issued on every `CONNACK`, so a reconnect made by
//! the client event loop picks discovery back up.

use std::time::Duration;

use alarm_bridge_core::AlarmStatus;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::Result;

/// Pause after a connection error before polling again.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Capacity of the client request queue.
const REQUEST_CAPACITY: usize = 16;

/// Broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttSettings {
    /// Broker host name.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    #[serde(default = "MqttSettings::default_keep_alive")]
    pub keep_alive_secs: u64,
}

impl MqttSettings {
    const fn default_keep_alive() -> u64 {
        30
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(Duration::from_secs(self.keep_alive_secs));
        options
    }
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            host: "broker.emqx.io".to_string(),
            port: 1883,
            client_id: "alarm-bridge".to_string(),
            keep_alive_secs: Self::default_keep_alive(),
        }
    }
}

/// Topics used by one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttTopics {
    /// Topic carrying the actuator address.
    pub discovery: String,
    /// Topic receiving the alarm status.
    pub status: String,
}

impl MqttTopics {
    /// Derive both topics from the deployment identifier.
    #[must_use]
    pub fn for_deployment(deployment_id: &str) -> Self {
        Self {
            discovery: format!("{deployment_id}/ipaddress"),
            status: format!("{deployment_id}/status"),
        }
    }
}

/// Handle for publishing over the broker connection.
#[derive(Debug, Clone)]
pub struct MqttLink {
    client: AsyncClient,
    topics: MqttTopics,
}

impl MqttLink {
    /// Connect to the broker and spawn the event loop task.
    ///
    /// Discovery payloads are sent to `discovery`. The event loop task ends
    /// when the receiving side of `discovery` is dropped.
    #[must_use]
    pub fn start(
        settings: &MqttSettings,
        topics: MqttTopics,
        discovery: mpsc::Sender<Vec<u8>>,
    ) -> (Self, JoinHandle<()>) {
        tracing::info!(
            host = %settings.host,
            port = settings.port,
            topic = %topics.discovery,
            "Connecting to MQTT broker"
        );

        let (client, eventloop) = AsyncClient::new(settings.options(), REQUEST_CAPACITY);
        let handle = tokio::spawn(poll_loop(
            eventloop,
            client.clone(),
            topics.discovery.clone(),
            discovery,
        ));

        (Self { client, topics }, handle)
    }

    /// The topics this link uses.
    #[must_use]
    pub const fn topics(&self) -> &MqttTopics {
        &self.topics
    }

    /// Publish `status` as a retained message on the status topic.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::Mqtt` if the request cannot be queued.
    pub async fn publish_status(&self, status: AlarmStatus) -> Result<()> {
        self.client
            .publish(
                self.topics.status.as_str(),
                QoS::AtLeastOnce,
                true,
                status.as_str().as_bytes().to_vec(),
            )
            .await?;
        tracing::debug!(status = %status, topic = %self.topics.status, "Published alarm status");
        Ok(())
    }

    /// Publish the current status, then every change, until the sender is
    /// dropped.
    #[must_use]
    pub fn spawn_status_publisher(self, mut status: watch::Receiver<AlarmStatus>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let current = *status.borrow_and_update();
                if let Err(e) = self.publish_status(current).await {
                    tracing::warn!(error = %e, status = %current, "Failed to publish alarm status");
                }
                if status.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}

/// What the event loop does with one polled event.
#[derive(Debug, PartialEq, Eq)]
enum LoopStep {
    /// A (re)connect was acknowledged; subscribe again.
    Subscribe,
    /// A discovery payload to hand to the listener.
    Forward(Vec<u8>),
    /// Nothing to do.
    Ignore,
}

fn step_for(event: &Event, topic: &str) -> LoopStep {
    match event {
        Event::Incoming(Packet::ConnAck(_)) => LoopStep::Subscribe,
        Event::Incoming(Packet::Publish(publish)) if publish.topic == topic => {
            LoopStep::Forward(publish.payload.to_vec())
        }
        _ => LoopStep::Ignore,
    }
}

/// Returns false once the discovery listener has gone away.
async fn forward(discovery: &mpsc::Sender<Vec<u8>>, payload: Vec<u8>) -> bool {
    discovery.send(payload).await.is_ok()
}

async fn poll_loop(
    mut eventloop: EventLoop,
    client: AsyncClient,
    topic: String,
    discovery: mpsc::Sender<Vec<u8>>,
) {
    loop {
        let event = match eventloop.poll().await {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "MQTT connection error");
                tokio::time::sleep(RECONNECT_DELAY).await;
                continue;
            }
        };

        match step_for(&event, &topic) {
            LoopStep::Subscribe => {
                tracing::info!(topic = %topic, "Connected to MQTT broker, subscribing");
                if let Err(e) = client.try_subscribe(topic.as_str(), QoS::AtMostOnce) {
                    tracing::warn!(error = %e, "Failed to subscribe to discovery topic");
                }
            }
            LoopStep::Forward(payload) => {
                if !forward(&discovery, payload).await {
                    tracing::debug!("Discovery listener gone, stopping MQTT loop");
                    break;
                }
            }
            LoopStep::Ignore => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use rumqttc::{ConnAck, ConnectReturnCode, Outgoing, Publish};

    use super::*;

    #[test]
    fn topics_for_deployment() {
        let topics = MqttTopics::for_deployment("3f1c9a");
        assert_eq!(topics.discovery, "3f1c9a/ipaddress");
        assert_eq!(topics.status, "3f1c9a/status");
    }

    fn publish(topic: &str, payload: &[u8]) -> Event {
        Event::Incoming(Packet::Publish(Publish::new(
            topic,
            QoS::AtMostOnce,
            payload.to_vec(),
        )))
    }

    #[test]
    fn connack_triggers_subscribe() {
        let event = Event::Incoming(Packet::ConnAck(ConnAck {
            session_present: false,
            code: ConnectReturnCode::Success,
        }));
        assert_eq!(step_for(&event, "3f1c9a/ipaddress"), LoopStep::Subscribe);
    }

    #[test]
    fn discovery_publish_is_forwarded() {
        let event = publish("3f1c9a/ipaddress", b"192.168.1.40");
        assert_eq!(
            step_for(&event, "3f1c9a/ipaddress"),
            LoopStep::Forward(b"192.168.1.40".to_vec())
        );
    }

    #[test]
    fn other_topics_and_packets_are_ignored() {
        let event = publish("3f1c9a/status", b"ARMED");
        assert_eq!(step_for(&event, "3f1c9a/ipaddress"), LoopStep::Ignore);

        let event = publish("other/ipaddress", b"10.0.0.1");
        assert_eq!(step_for(&event, "3f1c9a/ipaddress"), LoopStep::Ignore);

        let event = Event::Incoming(Packet::PingResp);
        assert_eq!(step_for(&event, "3f1c9a/ipaddress"), LoopStep::Ignore);

        let event = Event::Outgoing(Outgoing::PingReq);
        assert_eq!(step_for(&event, "3f1c9a/ipaddress"), LoopStep::Ignore);
    }

    #[tokio::test]
    async fn forward_reports_closed_listener() {
        let (tx, mut rx) = mpsc::channel(1);

        assert!(forward(&tx, b"10.0.0.7".to_vec()).await);
        assert_eq!(rx.recv().await.unwrap(), b"10.0.0.7".to_vec());

        drop(rx);
        assert!(!forward(&tx, b"10.0.0.8".to_vec()).await);
    }

    #[test]
    fn default_settings() {
        let settings = MqttSettings::default();
        assert_eq!(settings.host, "broker.emqx.io");
        assert_eq!(settings.port, 1883);
        assert_eq!(settings.keep_alive_secs, 30);
    }
}
