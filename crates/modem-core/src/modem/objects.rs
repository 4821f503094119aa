//! Objects created on behalf of a binary-protocol modem.

use serde::{Deserialize, Serialize};

/// Connection settings requested for a bearer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerProperties {
    #[serde(default)]
    pub apn: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub allow_roaming: bool,
}

/// Data bearer bound to a modem's physical device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MbimBearer {
    pub device: String,
    pub properties: BearerProperties,
}

/// SIM object reachable through the binary port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MbimSim {
    pub device: String,
    /// Binary port the SIM is queried through.
    pub port: String,
}
