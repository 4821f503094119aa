//! Modem identity.

use serde::{Deserialize, Serialize};

use crate::device::{KernelDevice, PROPERTY_PRODUCT};

/// Who a modem object is: physical device, drivers, plugin and ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModemIdentity {
    /// Physical device path (sysfs path when known).
    pub device: String,
    #[serde(default)]
    pub drivers: Vec<String>,
    pub plugin: String,
    #[serde(default)]
    pub vendor_id: u16,
    #[serde(default)]
    pub product_id: u16,
    /// Model name as reported by the device, e.g. `TOBY-L201`.
    #[serde(default)]
    pub model: Option<String>,
}

impl ModemIdentity {
    pub fn new(device: impl Into<String>, plugin: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            plugin: plugin.into(),
            ..Default::default()
        }
    }

    /// Build from the primary port's kernel device.
    pub fn from_device(device: &dyn KernelDevice, plugin: &str) -> Self {
        let path = device
            .parent_sysfs_path()
            .or(device.sysfs_path())
            .unwrap_or(device.name());

        Self {
            device: path.to_string(),
            drivers: device.driver().map(str::to_string).into_iter().collect(),
            plugin: plugin.to_string(),
            vendor_id: device.physdev_vid(),
            product_id: device.physdev_pid(),
            model: device.property(PROPERTY_PRODUCT).map(str::to_string),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}
