//! Modem module - bring-up orchestration and capability helpers.

pub mod binary;
pub mod capabilities;
pub mod generic;
pub mod identity;
pub mod mock;
pub mod objects;
pub mod traits;

pub use binary::{BinaryModem, InitializationOutcome};
pub use capabilities::{Capabilities, CommandError};
pub use generic::AtModemBase;
pub use identity::ModemIdentity;
pub use mock::MockModemBase;
pub use objects::{BearerProperties, MbimBearer, MbimSim};
pub use traits::ModemBase;
