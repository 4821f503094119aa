//! Port module - binary and text channel abstractions.

pub mod mock;
pub mod traits;

pub use mock::{MockAtPort, MockBinaryPort};
pub use traits::{AtPort, BinaryPort, PortError};
