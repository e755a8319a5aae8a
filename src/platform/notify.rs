//! Notification delivery
//!
//! The simulation queues `GameEvent::Notify`; hosts drain the queue each
//! frame and hand messages to a sink (toast UI in the browser, the log
//! natively).

use crate::sim::{GameEvent, GameState, Severity};

/// Fire-and-forget user-facing messages
pub trait NotificationSink {
    fn notify(&mut self, message: &str, severity: Severity, duration_ms: u32);
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&mut self, message: &str, severity: Severity, duration_ms: u32) {
        match severity {
            Severity::Info | Severity::Success => {
                log::info!("[{:?}] {} ({}ms)", severity, message, duration_ms)
            }
            Severity::Warning => log::warn!("{} ({}ms)", message, duration_ms),
            Severity::Error => log::error!("{} ({}ms)", message, duration_ms),
        }
    }
}

/// Keeps every notification; handy for headless runs
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub messages: Vec<(String, Severity)>,
}

impl NotificationSink for CollectingSink {
    fn notify(&mut self, message: &str, severity: Severity, _duration_ms: u32) {
        self.messages.push((message.to_string(), severity));
    }
}

/// Drain queued events, deliver notifications, and return the rest for
/// sound and UI
pub fn dispatch_events(state: &mut GameState, sink: &mut dyn NotificationSink) -> Vec<GameEvent> {
    let mut others = Vec::new();
    for event in state.take_events() {
        match event {
            GameEvent::Notify {
                message,
                severity,
                duration_ms,
            } => sink.notify(&message, severity, duration_ms),
            other => others.push(other),
        }
    }
    others
}
