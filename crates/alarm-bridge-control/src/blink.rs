//! Indicator LED blink scheduler.
//!
//! # Modes
//!
//! ```text
//! ALWAYS_ON      one led-on command
//! ALWAYS_OFF     one led-off command
//! BLINKING_SLOW  repeating timer, unit d = 1000 ms
//! BLINKING_FAST  repeating timer, unit d = 250 ms
//!
//! one blink period (3·d):
//!
//!   t=0      t=d       t=2d      t=3d
//!   │ on     │ off     │ idle    │ on ...
//!   ▼        ▼         ▼         ▼
//! ```
//!
//! At most one timer task exists at a time. [`BlinkScheduler::set_mode`]
//! holds the timer lock while it cancels the old task and applies the new
//! mode, so concurrent callers are serialized. Every mode change bumps a
//! generation counter; a tick that finishes an actuator call after its
//! generation was superseded discards the result and exits.

use std::sync::Arc;
use std::time::Duration;

use alarm_bridge_core::{BlinkMode, CommandCode, LedOutputState};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::actuator::ActuatorClient;
use crate::error::Result;

#[derive(Debug, Default)]
struct BlinkStatus {
    mode: BlinkMode,
    led: LedOutputState,
    generation: u64,
}

impl BlinkStatus {
    /// Record the outcome of an LED command issued under `generation`.
    ///
    /// Returns false if the caller should stop: the command failed, or the
    /// mode has changed since it was issued.
    fn record(&mut self, generation: u64, on: bool, result: &Result<()>) -> bool {
        if self.generation != generation {
            return false;
        }

        match result {
            Ok(()) => {
                self.led = LedOutputState::from(on);
                true
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    mode = %self.mode,
                    "LED command failed; indicator state undefined"
                );
                self.mode = BlinkMode::Undefined;
                self.led = LedOutputState::Undefined;
                false
            }
        }
    }
}

/// Drives the indicator LED through its lighting modes.
pub struct BlinkScheduler {
    actuator: Arc<dyn ActuatorClient>,
    slow_unit: Duration,
    fast_unit: Duration,
    status: Arc<Mutex<BlinkStatus>>,
    timer: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl BlinkScheduler {
    /// Create a scheduler in mode `UNDEFINED` with no timer running.
    #[must_use]
    pub fn new(actuator: Arc<dyn ActuatorClient>, slow_unit: Duration, fast_unit: Duration) -> Self {
        Self {
            actuator,
            slow_unit,
            fast_unit,
            status: Arc::new(Mutex::new(BlinkStatus::default())),
            timer: tokio::sync::Mutex::new(None),
        }
    }

    /// The current mode.
    #[must_use]
    pub fn current_mode(&self) -> BlinkMode {
        self.status.lock().mode
    }

    /// The last recorded LED output.
    #[must_use]
    pub fn led_state(&self) -> LedOutputState {
        self.status.lock().led
    }

    /// Whether a blink timer task is currently alive.
    pub async fn has_active_timer(&self) -> bool {
        self.timer
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Switch to `mode`.
    ///
    /// Cancels any running timer first. Steady modes issue one LED command
    /// and record its outcome; blinking modes start a fresh timer whose
    /// first tick fires one period from now. `UNDEFINED` only stops the
    /// timer.
    pub async fn set_mode(&self, mode: BlinkMode) {
        let mut timer = self.timer.lock().await;
        if let Some(handle) = timer.take() {
            handle.abort();
        }

        let generation = {
            let mut status = self.status.lock();
            status.generation = status.generation.wrapping_add(1);
            status.mode = mode;
            status.generation
        };

        tracing::info!(mode = %mode, "Setting indicator mode");

        match mode {
            BlinkMode::AlwaysOn | BlinkMode::AlwaysOff => {
                let on = mode == BlinkMode::AlwaysOn;
                let result = self.actuator.send(CommandCode::led(on)).await;
                self.status.lock().record(generation, on, &result);
            }
            BlinkMode::BlinkingSlow | BlinkMode::BlinkingFast => {
                let unit = if mode == BlinkMode::BlinkingSlow {
                    self.slow_unit
                } else {
                    self.fast_unit
                };
                *timer = Some(tokio::spawn(blink_loop(
                    Arc::clone(&self.actuator),
                    Arc::clone(&self.status),
                    generation,
                    unit,
                )));
            }
            BlinkMode::Undefined => {}
        }
    }
}

impl Drop for BlinkScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.get_mut().take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for BlinkScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.status.lock();
        f.debug_struct("BlinkScheduler")
            .field("mode", &status.mode)
            .field("led", &status.led)
            .field("slow_unit", &self.slow_unit)
            .field("fast_unit", &self.fast_unit)
            .finish_non_exhaustive()
    }
}

/// Repeating blink: every `3·unit`, on, wait `unit`, off, wait `unit`.
async fn blink_loop(
    actuator: Arc<dyn ActuatorClient>,
    status: Arc<Mutex<BlinkStatus>>,
    generation: u64,
    unit: Duration,
) {
    let period = unit * 3;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        for on in [true, false] {
            let result = actuator.send(CommandCode::led(on)).await;
            if !status.lock().record(generation, on, &result) {
                return;
            }
            tokio::time::sleep(unit).await;
        }
    }
}
