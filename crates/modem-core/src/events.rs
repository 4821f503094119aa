//! Event system for UI decoupling.
//!
//! Allows the CLI (or any other front end) to follow bring-up progress
//! without coupling to the state machine.

use crate::state::BringUpState;

/// Log level for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Events emitted during modem bring-up.
#[derive(Debug, Clone)]
pub enum ModemEvent {
    /// State changed.
    StateChanged { from: BringUpState, to: BringUpState },
    /// Binary port opened by us.
    PortOpened { port: String },
    /// Binary port closed by us.
    PortClosed { port: String },
    /// A best-effort step failed; bring-up continues.
    Diagnostic { message: String },
    /// Log message.
    Log { level: LogLevel, message: String },
    /// Fatal error, the attempt is over.
    Error { message: String },
    /// Attempt finished successfully.
    Complete,
}

/// Observer trait for receiving modem events.
///
/// Implement this trait in your UI layer to receive updates.
pub trait ModemObserver: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &ModemEvent);
}

/// No-op observer that discards all events.
pub struct NullObserver;

impl ModemObserver for NullObserver {
    fn on_event(&self, _event: &ModemEvent) {}
}

/// Observer that logs events using tracing.
pub struct TracingObserver;

impl ModemObserver for TracingObserver {
    fn on_event(&self, event: &ModemEvent) {
        match event {
            ModemEvent::StateChanged { from, to } => {
                tracing::debug!(from = %from, to = %to, "State changed");
            }
            ModemEvent::PortOpened { port } => {
                tracing::info!(port = %port, "Binary port opened");
            }
            ModemEvent::PortClosed { port } => {
                tracing::info!(port = %port, "Binary port closed");
            }
            ModemEvent::Diagnostic { message } => {
                tracing::warn!("{}", message);
            }
            ModemEvent::Log { level, message } => match level {
                LogLevel::Trace => tracing::trace!("{}", message),
                LogLevel::Debug => tracing::debug!("{}", message),
                LogLevel::Info => tracing::info!("{}", message),
                LogLevel::Warn => tracing::warn!("{}", message),
                LogLevel::Error => tracing::error!("{}", message),
            },
            ModemEvent::Error { message } => {
                tracing::error!("Error: {}", message);
            }
            ModemEvent::Complete => {
                tracing::info!("Bring-up complete");
            }
        }
    }
}

/// Observer that records every event, for tests and reports.
#[derive(Default)]
pub struct RecordingObserver {
    events: std::sync::Mutex<Vec<ModemEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ModemEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ModemObserver for RecordingObserver {
    fn on_event(&self, event: &ModemEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
