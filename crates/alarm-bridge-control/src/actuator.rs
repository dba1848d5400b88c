//! HTTP client for the actuator module.
//!
//! Each command is a plain `GET http://<address>/<code>`. Only `200 OK`
//! counts as success; the response body is ignored. The client performs no
//! retries and keeps no state besides reading the shared address registry.

use std::sync::Arc;
use std::time::Duration;

use alarm_bridge_core::CommandCode;
use async_trait::async_trait;

use crate::error::{ControlError, Result};
use crate::registry::AddressRegistry;

/// Trait for sending commands to the actuator.
///
/// This trait abstracts the transport, allowing for mock implementations in
/// tests.
#[async_trait]
pub trait ActuatorClient: Send + Sync {
    /// Send a single command.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is undefined, the request fails, or the
    /// actuator answers with anything other than `200 OK`.
    async fn send(&self, command: CommandCode) -> Result<()>;
}

/// Actuator client speaking the HTTP command protocol.
#[derive(Debug, Clone)]
pub struct HttpActuatorClient {
    client: reqwest::Client,
    registry: Arc<AddressRegistry>,
}

impl HttpActuatorClient {
    /// Create a new actuator client with the given request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created.
    #[must_use]
    pub fn new(registry: Arc<AddressRegistry>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, registry }
    }

    /// Create a new actuator client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, registry: Arc<AddressRegistry>) -> Self {
        Self { client, registry }
    }

    /// Build the request URL for `command` against `address`.
    #[must_use]
    pub fn command_url(address: &str, command: CommandCode) -> String {
        format!(
            "http://{}/{}",
            address.trim_end_matches('/'),
            command.wire_code()
        )
    }
}

#[async_trait]
impl ActuatorClient for HttpActuatorClient {
    async fn send(&self, command: CommandCode) -> Result<()> {
        let address = self.registry.current();
        let Some(address) = address.as_str() else {
            return Err(ControlError::UndefinedAddress);
        };

        let url = Self::command_url(address, command);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ControlError::Transport {
                command,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            tracing::debug!(url = %url, "Actuator command accepted");
            Ok(())
        } else {
            Err(ControlError::UnexpectedStatus {
                command,
                status: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> HttpActuatorClient {
        let registry = Arc::new(AddressRegistry::new());
        registry.update(&server.address().to_string());
        HttpActuatorClient::new(registry, Duration::from_secs(2))
    }

    #[test]
    fn command_url_format() {
        assert_eq!(
            HttpActuatorClient::command_url("192.168.1.40", CommandCode::RelayClose),
            "http://192.168.1.40/C"
        );
        assert_eq!(
            HttpActuatorClient::command_url("relay.local:8080/", CommandCode::BarYellow),
            "http://relay.local:8080/LY"
        );
    }

    #[tokio::test]
    async fn ok_status_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/H"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.send(CommandCode::LedOn).await.is_ok());
    }

    #[tokio::test]
    async fn other_success_codes_are_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/LG"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.send(CommandCode::BarGreen).await.unwrap_err();
        assert!(matches!(
            err,
            ControlError::UnexpectedStatus {
                command: CommandCode::BarGreen,
                status: 204
            }
        ));
    }

    #[tokio::test]
    async fn server_error_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.send(CommandCode::RelayOpen).await.unwrap_err();
        assert!(err.is_transport_failure());
    }

    #[tokio::test]
    async fn undefined_address_is_failure() {
        let client = HttpActuatorClient::new(Arc::new(AddressRegistry::new()), Duration::from_secs(1));
        let err = client.send(CommandCode::LedOff).await.unwrap_err();
        assert!(matches!(err, ControlError::UndefinedAddress));
    }

    #[tokio::test]
    async fn timeout_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let registry = Arc::new(AddressRegistry::new());
        registry.update(&server.address().to_string());
        let client = HttpActuatorClient::new(registry, Duration::from_millis(100));

        let err = client.send(CommandCode::RelayClose).await.unwrap_err();
        assert!(matches!(err, ControlError::Transport { command: CommandCode::RelayClose, .. }));
    }

    #[tokio::test]
    async fn reads_address_per_call() {
        let first = MockServer::start().await;
        let second = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&first)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&second)
            .await;

        let registry = Arc::new(AddressRegistry::new());
        let client = HttpActuatorClient::new(Arc::clone(&registry), Duration::from_secs(2));

        registry.update(&first.address().to_string());
        client.send(CommandCode::LedOn).await.unwrap();
        registry.update(&second.address().to_string());
        client.send(CommandCode::LedOff).await.unwrap();
    }
}
