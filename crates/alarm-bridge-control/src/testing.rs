//! Test doubles for the actuator transport.

use std::collections::HashSet;
use std::time::Duration;

use alarm_bridge_core::CommandCode;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::actuator::ActuatorClient;
use crate::error::{ControlError, Result};

/// A command observed by [`RecordingActuatorClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedCommand {
    /// The command sent.
    pub command: CommandCode,
    /// When it was sent, on the tokio clock.
    pub at: Instant,
}

/// Actuator client that records every command and answers from a script.
///
/// Commands succeed unless registered with [`fail_on`](Self::fail_on), in
/// which case they fail as if the actuator returned `500`. A call is
/// recorded when it is issued and answers after the configured latency.
#[derive(Debug, Default)]
pub struct RecordingActuatorClient {
    calls: Mutex<Vec<RecordedCommand>>,
    failing: Mutex<HashSet<CommandCode>>,
    latency: Mutex<Duration>,
}

impl RecordingActuatorClient {
    /// Create a client that accepts every command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `command` fail from now on.
    pub fn fail_on(&self, command: CommandCode) {
        self.failing.lock().insert(command);
    }

    /// Make every command fail from now on.
    pub fn fail_all(&self) {
        self.failing.lock().extend(CommandCode::ALL);
    }

    /// Make `command` succeed again.
    pub fn succeed_on(&self, command: CommandCode) {
        self.failing.lock().remove(&command);
    }

    /// All recorded calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.calls.lock().clone()
    }

    /// The recorded commands without timestamps.
    #[must_use]
    pub fn commands(&self) -> Vec<CommandCode> {
        self.calls.lock().iter().map(|c| c.command).collect()
    }

    /// How many times `command` was sent.
    #[must_use]
    pub fn count(&self, command: CommandCode) -> usize {
        self.calls.lock().iter().filter(|c| c.command == command).count()
    }

    /// Delay every answer by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl ActuatorClient for RecordingActuatorClient {
    async fn send(&self, command: CommandCode) -> Result<()> {
        self.calls.lock().push(RecordedCommand {
            command,
            at: Instant::now(),
        });

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.failing.lock().contains(&command) {
            Err(ControlError::UnexpectedStatus {
                command,
                status: 500,
            })
        } else {
            Ok(())
        }
    }
}
