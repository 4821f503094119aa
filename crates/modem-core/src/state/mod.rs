//! State machine module.

pub mod error;
pub mod machine;

pub use error::{BringUpError, LegacyStep};
pub use machine::{BringUpContext, BringUpState, FailureReason};
