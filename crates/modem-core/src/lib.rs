//! Modem-Core: capability negotiation and bring-up for u-blox / MBIM modems.
//!
//! This crate parses the u-blox AT replies that describe a modem's radio
//! capabilities, negotiates technology combinations against the device
//! model, and brings up modems whose primary channel is a binary (MBIM)
//! management port with a best-effort legacy text port next to it.
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! - **Protocol**: Reply parsers and command builders
//! - **Modes**: Technology combination table, model filter, selection
//! - **Device**: Kernel device abstraction and discovery backends (nusb, TOML)
//! - **Port**: Binary and text channel abstraction (mock included)
//! - **State**: Bring-up state machine and errors
//! - **Modem**: Bring-up orchestrator, generic base, AT capability helpers
//! - **Events**: Observer pattern for UI decoupling
//! - **Session**: Dry-run orchestrator
//!
//! # Example
//!
//! ```no_run
//! use modem_core::session::{ModemSession, SessionConfig};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = SessionConfig {
//!     model: Some("TOBY-L201".to_string()),
//!     ..Default::default()
//! };
//!
//! let report = ModemSession::new(config).run().await?;
//! println!("{} combinations", report.supported_modes.len());
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod events;
pub mod modem;
pub mod modes;
pub mod port;
pub mod protocol;
pub mod session;
pub mod state;

// Re-exports for convenience
pub use device::{DeviceDescriptor, DeviceError, DeviceTable, KernelDevice};
pub use events::{LogLevel, ModemEvent, ModemObserver, NullObserver, TracingObserver};
pub use modem::{
    AtModemBase, BinaryModem, Capabilities, CommandError, InitializationOutcome, ModemBase,
    ModemIdentity,
};
pub use modes::{CapabilityError, Generation, ModeRequest, ModeSet, RadioCombination};
pub use port::{AtPort, BinaryPort, MockAtPort, MockBinaryPort, PortError};
pub use protocol::ParseError;
pub use session::{ModemSession, SessionConfig, SessionReport};
pub use state::{BringUpError, BringUpState};
