//! Alarm status state machine.
//!
//! Upstream property-change events are mapped onto transitions by a fixed
//! rule table. The first matching rule wins; everything else is ignored.
//!
//! ```text
//!  alarmArmDelay > 0              ──▶ ARMED      bar YELLOW
//!  ARMED ∧ alarm == true          ──▶ TRIGGERED  blink FAST, relay CLOSED, bar RED
//!  guardMode == 6                 ──▶ DISARMED   blink SLOW, relay OPEN,   bar GREEN
//! ```
//!
//! The status is updated before any side effect is issued and does not
//! depend on whether the actuator commands succeed.

use std::sync::Arc;

use alarm_bridge_core::{AlarmStatus, BarColor, BlinkMode, PropertyChangeEvent};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::controller::Controller;

/// Property announcing the exit delay when the system is being armed.
pub const ARM_DELAY_PROPERTY: &str = "alarmArmDelay";
/// Property flagging an alarm.
pub const ALARM_PROPERTY: &str = "alarm";
/// Property carrying the guard mode.
pub const GUARD_MODE_PROPERTY: &str = "guardMode";
/// Guard mode value meaning disarmed.
pub const GUARD_MODE_DISARMED: f64 = 6.0;

/// A transition selected by the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmTransition {
    /// The system is being armed.
    Arm,
    /// An armed system was tripped.
    Trigger,
    /// The system was disarmed.
    Disarm,
}

impl AlarmTransition {
    /// The status this transition moves to.
    #[must_use]
    pub const fn target(self) -> AlarmStatus {
        match self {
            Self::Arm => AlarmStatus::Armed,
            Self::Trigger => AlarmStatus::Triggered,
            Self::Disarm => AlarmStatus::Disarmed,
        }
    }
}

/// Select the transition for `event` given the current status.
///
/// Values must have the expected primitive type: numbers for
/// `alarmArmDelay` and `guardMode`, a boolean for `alarm`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn classify(status: AlarmStatus, event: &PropertyChangeEvent) -> Option<AlarmTransition> {
    let value = &event.value;

    match event.name.as_str() {
        ARM_DELAY_PROPERTY if value.as_number().is_some_and(|delay| delay > 0.0) => {
            Some(AlarmTransition::Arm)
        }
        ALARM_PROPERTY if status == AlarmStatus::Armed && value.as_bool() == Some(true) => {
            Some(AlarmTransition::Trigger)
        }
        GUARD_MODE_PROPERTY if value.as_number() == Some(GUARD_MODE_DISARMED) => {
            Some(AlarmTransition::Disarm)
        }
        _ => None,
    }
}

/// Owns the alarm status and turns events into actuator effects.
pub struct AlarmStateMachine {
    controller: Arc<Controller>,
    status: watch::Sender<AlarmStatus>,
    changed_at: RwLock<DateTime<Utc>>,
}

impl AlarmStateMachine {
    /// Create a state machine starting out `DISARMED`.
    #[must_use]
    pub fn new(controller: Arc<Controller>) -> Self {
        let (status, _) = watch::channel(AlarmStatus::default());
        Self {
            controller,
            status,
            changed_at: RwLock::new(Utc::now()),
        }
    }

    /// Current alarm status.
    #[must_use]
    pub fn status(&self) -> AlarmStatus {
        *self.status.borrow()
    }

    /// When the last matching event was applied (or construction time).
    #[must_use]
    pub fn changed_at(&self) -> DateTime<Utc> {
        *self.changed_at.read()
    }

    /// Watch status changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AlarmStatus> {
        self.status.subscribe()
    }

    /// The controller receiving side effects.
    #[must_use]
    pub const fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }

    /// Update the status for one upstream event without touching the
    /// actuator.
    ///
    /// Returns the transition taken, or `None` if the event was ignored.
    /// The caller is responsible for running its effects.
    pub fn apply(&self, event: &PropertyChangeEvent) -> Option<AlarmTransition> {
        let mut transition = None;
        self.status.send_if_modified(|status| {
            transition = classify(*status, event);
            match transition {
                Some(t) => {
                    let changed = *status != t.target();
                    *status = t.target();
                    changed
                }
                None => false,
            }
        });

        let Some(transition) = transition else {
            tracing::trace!(name = %event.name, value = %event.value, "Ignoring property change");
            return None;
        };

        *self.changed_at.write() = Utc::now();
        tracing::info!(
            name = %event.name,
            value = %event.value,
            status = %transition.target(),
            "Alarm status changed"
        );

        Some(transition)
    }

    /// Issue the relay, bar and indicator commands for `transition`.
    ///
    /// Failures are recorded by the controller as undefined state.
    pub async fn run_effects(&self, transition: AlarmTransition) {
        let controller = &self.controller;
        match transition {
            AlarmTransition::Arm => {
                controller.set_bar_color(BarColor::Yellow).await;
            }
            AlarmTransition::Trigger => {
                futures::join!(
                    controller.blink().set_mode(BlinkMode::BlinkingFast),
                    controller.close_relay(true),
                    controller.set_bar_color(BarColor::Red),
                );
            }
            AlarmTransition::Disarm => {
                futures::join!(
                    controller.blink().set_mode(BlinkMode::BlinkingSlow),
                    controller.close_relay(false),
                    controller.set_bar_color(BarColor::Green),
                );
            }
        }
    }

    /// Apply one upstream event and wait for its effects.
    ///
    /// Returns the transition taken, or `None` if the event was ignored.
    pub async fn handle_event(&self, event: &PropertyChangeEvent) -> Option<AlarmTransition> {
        let transition = self.apply(event)?;
        self.run_effects(transition).await;
        Some(transition)
    }
}

impl std::fmt::Debug for AlarmStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlarmStateMachine")
            .field("status", &self.status())
            .field("changed_at", &self.changed_at())
            .finish_non_exhaustive()
    }
}

/// Feed events from `events` into `machine` until the channel closes.
///
/// Status changes are applied as events arrive. Their actuator effects are
/// queued to a single worker and run in order, so a slow actuator never
/// holds back the status of later events. The returned task finishes once
/// the channel is closed and every queued effect has run.
#[must_use]
pub fn spawn_event_pump(
    machine: Arc<AlarmStateMachine>,
    mut events: mpsc::Receiver<PropertyChangeEvent>,
) -> JoinHandle<()> {
    let (effects_tx, mut effects_rx) = mpsc::unbounded_channel::<AlarmTransition>();

    let worker = {
        let machine = Arc::clone(&machine);
        tokio::spawn(async move {
            while let Some(transition) = effects_rx.recv().await {
                machine.run_effects(transition).await;
            }
        })
    };

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Some(transition) = machine.apply(&event) {
                if effects_tx.send(transition).is_err() {
                    tracing::error!("Alarm effects worker stopped");
                    break;
                }
            }
        }
        tracing::warn!("Upstream event channel closed");

        drop(effects_tx);
        if let Err(e) = worker.await {
            tracing::error!(error = %e, "Alarm effects worker failed");
        }
    })
}
