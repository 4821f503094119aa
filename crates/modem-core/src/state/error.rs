//! Bring-up error types.

use std::fmt;

use thiserror::Error;

use super::machine::BringUpState;
use crate::port::PortError;

/// Best-effort step delegated to the generic modem base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyStep {
    Initialization,
    Enabling,
}

impl fmt::Display for LegacyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyStep::Initialization => write!(f, "initialization"),
            LegacyStep::Enabling => write!(f, "enabling"),
        }
    }
}

#[derive(Error, Debug)]
pub enum BringUpError {
    /// The binary port handle could not be obtained (device gone).
    #[error("Binary port missing")]
    PortMissing,

    /// Transport error from opening the binary port, reported verbatim.
    #[error(transparent)]
    PortOpenFailed(#[from] PortError),

    /// Non-fatal: only ever recorded as a diagnostic.
    #[error("Legacy {step} failed: {message}")]
    LegacyStepFailed { step: LegacyStep, message: String },

    #[error("Bring-up cancelled")]
    Cancelled,

    #[error("Modem not ready (state {state})")]
    NotReady { state: BringUpState },

    #[error("Bring-up already in progress (state {state})")]
    InProgress { state: BringUpState },
}

impl BringUpError {
    /// Whether this error aborts the attempt.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, BringUpError::LegacyStepFailed { .. })
    }
}
