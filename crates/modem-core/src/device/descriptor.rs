//! Property-bag backed kernel device.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::KernelDevice;
use super::{
    PROPERTY_DEVICE_IGNORE, PROPERTY_MANUAL_SCAN_ONLY, SUBSYSTEM_TTY, SUPPORTED_SUBSYSTEMS,
};

/// Snapshot of a device node as reported by a discovery backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub subsystem: String,
    pub name: String,
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub sysfs_path: Option<String>,
    #[serde(default)]
    pub parent_sysfs_path: Option<String>,
    #[serde(default)]
    pub physdev_uid: Option<String>,
    #[serde(default)]
    pub vendor_id: u16,
    #[serde(default)]
    pub product_id: u16,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl DeviceDescriptor {
    pub fn new(subsystem: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            subsystem: subsystem.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    pub fn with_physdev(mut self, uid: impl Into<String>, vid: u16, pid: u16) -> Self {
        self.physdev_uid = Some(uid.into());
        self.vendor_id = vid;
        self.product_id = pid;
        self
    }

    pub fn with_sysfs_path(mut self, path: impl Into<String>) -> Self {
        self.sysfs_path = Some(path.into());
        self
    }

    pub fn with_parent_sysfs_path(mut self, path: impl Into<String>) -> Self {
        self.parent_sysfs_path = Some(path.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl KernelDevice for DeviceDescriptor {
    fn subsystem(&self) -> &str {
        &self.subsystem
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn driver(&self) -> Option<&str> {
        self.driver.as_deref()
    }

    fn sysfs_path(&self) -> Option<&str> {
        self.sysfs_path.as_deref()
    }

    fn parent_sysfs_path(&self) -> Option<&str> {
        self.parent_sysfs_path.as_deref()
    }

    fn physdev_uid(&self) -> Option<&str> {
        self.physdev_uid.as_deref()
    }

    fn physdev_vid(&self) -> u16 {
        self.vendor_id
    }

    fn physdev_pid(&self) -> u16 {
        self.product_id
    }

    fn is_candidate(&self, manual_scan: bool) -> bool {
        if self.physdev_uid.is_none() {
            debug!(name = %self.name, "Not a candidate: no physical device");
            return false;
        }
        if !SUPPORTED_SUBSYSTEMS.contains(&self.subsystem.as_str()) {
            return false;
        }
        if self.property_as_bool(PROPERTY_DEVICE_IGNORE) == Some(true) {
            debug!(name = %self.name, "Not a candidate: explicitly ignored");
            return false;
        }
        if !manual_scan && self.property_as_bool(PROPERTY_MANUAL_SCAN_ONLY) == Some(true) {
            debug!(name = %self.name, "Not a candidate: manual scan only");
            return false;
        }
        // Virtual consoles and friends have no driver
        if self.subsystem == SUBSYSTEM_TTY && self.driver.is_none() {
            return false;
        }
        true
    }

    fn property(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }
}

/// Static device list, the configuration-backed discovery source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceTable {
    #[serde(default)]
    pub devices: Vec<DeviceDescriptor>,
}

impl DeviceTable {
    /// Load a `[[devices]]` table from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let table: DeviceTable = toml::from_str(&content)?;
        Ok(table)
    }

    /// Devices worth probing.
    pub fn candidates(&self, manual_scan: bool) -> impl Iterator<Item = &DeviceDescriptor> {
        self.devices
            .iter()
            .filter(move |d| d.is_candidate(manual_scan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mbim_port() -> DeviceDescriptor {
        DeviceDescriptor::new("usbmisc", "cdc-wdm0")
            .with_driver("cdc_mbim")
            .with_physdev("1-1", 0x1546, 0x1146)
            .with_sysfs_path("/sys/devices/pci0000:00/usb1/1-1/1-1:1.0/usbmisc/cdc-wdm0")
            .with_parent_sysfs_path("/sys/devices/pci0000:00/usb1/1-1/1-1:1.0")
    }

    #[test]
    fn test_accessors() {
        let dev = mbim_port();
        assert_eq!(dev.subsystem(), "usbmisc");
        assert_eq!(dev.name(), "cdc-wdm0");
        assert_eq!(dev.driver(), Some("cdc_mbim"));
        assert_eq!(dev.physdev_vid(), 0x1546);
        assert_eq!(dev.physdev_pid(), 0x1146);
        assert!(dev.parent_sysfs_path().unwrap().ends_with("1-1:1.0"));
    }

    #[test]
    fn test_typed_properties() {
        let dev = mbim_port()
            .with_property("ID_MM_PORT_TYPE_MBIM", "1")
            .with_property("FLAG", "Yes")
            .with_property("OFF", "false")
            .with_property("WEIRD", "maybe")
            .with_property("IFNUM", "0x0c")
            .with_property("PRIO", "42");

        assert!(dev.has_property("FLAG"));
        assert!(!dev.has_property("MISSING"));
        assert_eq!(dev.property_as_bool("ID_MM_PORT_TYPE_MBIM"), Some(true));
        assert_eq!(dev.property_as_bool("FLAG"), Some(true));
        assert_eq!(dev.property_as_bool("OFF"), Some(false));
        assert_eq!(dev.property_as_bool("WEIRD"), None);
        assert_eq!(dev.property_as_bool("MISSING"), None);
        assert_eq!(dev.property_as_int("IFNUM"), Some(12));
        assert_eq!(dev.property_as_int("PRIO"), Some(42));
        assert_eq!(dev.property_as_int("WEIRD"), None);
    }

    #[test]
    fn test_candidacy() {
        assert!(mbim_port().is_candidate(false));

        let ignored = mbim_port().with_property(PROPERTY_DEVICE_IGNORE, "1");
        assert!(!ignored.is_candidate(true));

        let manual = mbim_port().with_property(PROPERTY_MANUAL_SCAN_ONLY, "1");
        assert!(!manual.is_candidate(false));
        assert!(manual.is_candidate(true));

        let console = DeviceDescriptor::new("tty", "tty0").with_physdev("virt", 0, 0);
        assert!(!console.is_candidate(true));

        let orphan = DeviceDescriptor::new("tty", "ttyACM0").with_driver("cdc_acm");
        assert!(!orphan.is_candidate(true));

        let block = DeviceDescriptor::new("block", "sda").with_physdev("2-1", 0, 0);
        assert!(!block.is_candidate(true));
    }

    #[test]
    fn test_same_device_is_structural() {
        let a = mbim_port();
        let b = mbim_port().with_property("EXTRA", "1");
        assert!(a.same_device(&b));

        let other = DeviceDescriptor::new("usbmisc", "cdc-wdm0").with_physdev("2-1", 0x1546, 0x1146);
        assert!(!a.same_device(&other));
    }

    #[test]
    fn test_device_table_from_toml() {
        let table: DeviceTable = toml::from_str(
            r#"
            [[devices]]
            subsystem = "usbmisc"
            name = "cdc-wdm0"
            driver = "cdc_mbim"
            physdev_uid = "1-1"
            vendor_id = 0x1546
            product_id = 0x1146

            [[devices]]
            subsystem = "tty"
            name = "ttyACM0"
            driver = "cdc_acm"
            physdev_uid = "1-1"
            properties = { ID_MM_DEVICE_MANUAL_SCAN_ONLY = "1" }
            "#,
        )
        .unwrap();

        assert_eq!(table.devices.len(), 2);
        assert_eq!(table.candidates(false).count(), 1);
        assert_eq!(table.candidates(true).count(), 2);
    }
}
