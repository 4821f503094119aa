//! State machine implementation for modem bring-up.

use std::fmt;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use super::error::{BringUpError, LegacyStep};
use crate::events::{ModemEvent, ModemObserver};

/// Why an attempt ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    PortMissing,
    PortOpenFailed,
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::PortMissing => write!(f, "PORT_MISSING"),
            FailureReason::PortOpenFailed => write!(f, "PORT_OPEN_FAILED"),
            FailureReason::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Bring-up state of a binary-protocol modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BringUpState {
    #[default]
    Idle,
    /// Binary port handle obtained.
    PortAcquired,
    /// Waiting on the asynchronous open.
    BinaryPortOpening,
    BinaryPortOpen,
    /// Generic initialization handed to the modem base.
    ParentInitDelegated,
    /// Generic initialization finished, successfully or not.
    LegacyInitAttempted,
    Ready,
    Enabling,
    Failed(FailureReason),
}

impl fmt::Display for BringUpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BringUpState::Idle => write!(f, "IDLE"),
            BringUpState::PortAcquired => write!(f, "PORT_ACQUIRED"),
            BringUpState::BinaryPortOpening => write!(f, "BINARY_PORT_OPENING"),
            BringUpState::BinaryPortOpen => write!(f, "BINARY_PORT_OPEN"),
            BringUpState::ParentInitDelegated => write!(f, "PARENT_INIT_DELEGATED"),
            BringUpState::LegacyInitAttempted => write!(f, "LEGACY_INIT_ATTEMPTED"),
            BringUpState::Ready => write!(f, "READY"),
            BringUpState::Enabling => write!(f, "ENABLING"),
            BringUpState::Failed(reason) => write!(f, "FAILED({reason})"),
        }
    }
}

impl BringUpState {
    /// Check if an attempt is currently running.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            BringUpState::PortAcquired
                | BringUpState::BinaryPortOpening
                | BringUpState::BinaryPortOpen
                | BringUpState::ParentInitDelegated
                | BringUpState::LegacyInitAttempted
                | BringUpState::Enabling
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BringUpState::Failed(_))
    }
}

/// Per-attempt context.
///
/// Writes every transition through to the modem's shared state cell, keeps
/// the trace of visited states and collects non-fatal diagnostics.
pub struct BringUpContext<'a, O: ModemObserver + ?Sized> {
    state: &'a Mutex<BringUpState>,
    observer: &'a O,
    trace: Vec<BringUpState>,
    diagnostics: Vec<BringUpError>,
}

impl<'a, O: ModemObserver + ?Sized> BringUpContext<'a, O> {
    pub fn new(state: &'a Mutex<BringUpState>, observer: &'a O) -> Self {
        Self {
            state,
            observer,
            trace: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn state(&self) -> BringUpState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Transition to a new state.
    pub fn goto_state(&mut self, new_state: BringUpState) {
        let from = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *state, new_state)
        };
        tracing::info!(from = %from, to = %new_state, "State transition");
        self.trace.push(new_state);
        self.observer.on_event(&ModemEvent::StateChanged {
            from,
            to: new_state,
        });
    }

    /// Move to `Failed` and hand the error back for returning.
    pub fn fail(&mut self, reason: FailureReason, error: BringUpError) -> BringUpError {
        self.goto_state(BringUpState::Failed(reason));
        self.observer.on_event(&ModemEvent::Error {
            message: error.to_string(),
        });
        error
    }

    /// Run a best-effort step: a failure is logged, recorded as a diagnostic
    /// and turned into `None`.
    pub async fn attempt_non_fatal<T, F>(&mut self, step: LegacyStep, step_future: F) -> Option<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match step_future.await {
            Ok(value) => Some(value),
            Err(e) => {
                let diagnostic = BringUpError::LegacyStepFailed {
                    step,
                    message: format!("{e:#}"),
                };
                warn!(step = %step, error = %diagnostic, "Continuing without legacy step");
                self.observer.on_event(&ModemEvent::Diagnostic {
                    message: diagnostic.to_string(),
                });
                self.diagnostics.push(diagnostic);
                None
            }
        }
    }

    pub fn emit(&self, event: ModemEvent) {
        self.observer.on_event(&event);
    }

    pub fn trace(&self) -> &[BringUpState] {
        &self.trace
    }

    pub fn diagnostics(&self) -> &[BringUpError] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<BringUpError> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingObserver;
    use anyhow::anyhow;

    #[test]
    fn test_state_display() {
        assert_eq!(BringUpState::Idle.to_string(), "IDLE");
        assert_eq!(BringUpState::ParentInitDelegated.to_string(), "PARENT_INIT_DELEGATED");
        assert_eq!(
            BringUpState::Failed(FailureReason::PortMissing).to_string(),
            "FAILED(PORT_MISSING)"
        );
    }

    #[test]
    fn test_busy_states() {
        assert!(!BringUpState::Idle.is_busy());
        assert!(BringUpState::BinaryPortOpening.is_busy());
        assert!(BringUpState::Enabling.is_busy());
        assert!(!BringUpState::Ready.is_busy());
        assert!(!BringUpState::Failed(FailureReason::Cancelled).is_busy());
    }

    #[test]
    fn test_goto_state_writes_through() {
        let cell = Mutex::new(BringUpState::Idle);
        let observer = RecordingObserver::new();
        let mut ctx = BringUpContext::new(&cell, &observer);

        ctx.goto_state(BringUpState::PortAcquired);
        ctx.goto_state(BringUpState::BinaryPortOpening);

        assert_eq!(*cell.lock().unwrap(), BringUpState::BinaryPortOpening);
        assert_eq!(
            ctx.trace(),
            &[BringUpState::PortAcquired, BringUpState::BinaryPortOpening]
        );

        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1],
            ModemEvent::StateChanged {
                from: BringUpState::PortAcquired,
                to: BringUpState::BinaryPortOpening
            }
        ));
    }

    #[test]
    fn test_fail_sets_reason() {
        let cell = Mutex::new(BringUpState::PortAcquired);
        let observer = RecordingObserver::new();
        let mut ctx = BringUpContext::new(&cell, &observer);

        let err = ctx.fail(FailureReason::PortMissing, BringUpError::PortMissing);
        assert!(matches!(err, BringUpError::PortMissing));
        assert_eq!(ctx.state(), BringUpState::Failed(FailureReason::PortMissing));
        assert!(matches!(observer.events().last(), Some(ModemEvent::Error { .. })));
    }

    #[tokio::test]
    async fn test_attempt_non_fatal() {
        let cell = Mutex::new(BringUpState::Idle);
        let observer = RecordingObserver::new();
        let mut ctx = BringUpContext::new(&cell, &observer);

        let ok = ctx
            .attempt_non_fatal(LegacyStep::Initialization, async { Ok(7) })
            .await;
        assert_eq!(ok, Some(7));
        assert!(ctx.diagnostics().is_empty());

        let failed: Option<()> = ctx
            .attempt_non_fatal(LegacyStep::Enabling, async { Err(anyhow!("AT port timed out")) })
            .await;
        assert!(failed.is_none());

        let diagnostics = ctx.into_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(!diagnostics[0].is_fatal());
        assert_eq!(
            diagnostics[0].to_string(),
            "Legacy enabling failed: AT port timed out"
        );
        assert!(matches!(
            observer.events().last(),
            Some(ModemEvent::Diagnostic { .. })
        ));
    }
}
