//! Kernel device abstraction.
//!
//! Defines the `KernelDevice` trait over a device node reported by a
//! discovery backend (USB enumeration, static table, udev, ...).

use std::fmt;

/// Read-only view of a kernel device node.
///
/// Absent properties are not errors; callers decide what a missing or
/// unparsable value means.
pub trait KernelDevice: Send + Sync + fmt::Debug {
    /// Subsystem name, e.g. `tty`, `net`, `usbmisc`.
    fn subsystem(&self) -> &str;

    /// Device name within the subsystem, e.g. `ttyACM0`, `cdc-wdm0`.
    fn name(&self) -> &str;

    fn driver(&self) -> Option<&str>;

    fn sysfs_path(&self) -> Option<&str>;

    fn parent_sysfs_path(&self) -> Option<&str>;

    /// Unique id of the physical device this node belongs to.
    fn physdev_uid(&self) -> Option<&str>;

    fn physdev_vid(&self) -> u16;

    fn physdev_pid(&self) -> u16;

    /// Whether this node should be probed, given the kind of scan running.
    fn is_candidate(&self, manual_scan: bool) -> bool;

    fn property(&self, property: &str) -> Option<&str>;

    fn has_property(&self, property: &str) -> bool {
        self.property(property).is_some()
    }

    /// `1/0`, `true/false` and `yes/no`, case-insensitive.
    fn property_as_bool(&self, property: &str) -> Option<bool> {
        let value = self.property(property)?.trim();
        if value == "1"
            || value.eq_ignore_ascii_case("true")
            || value.eq_ignore_ascii_case("yes")
        {
            Some(true)
        } else if value == "0"
            || value.eq_ignore_ascii_case("false")
            || value.eq_ignore_ascii_case("no")
        {
            Some(false)
        } else {
            None
        }
    }

    /// Decimal or `0x`-prefixed hexadecimal.
    fn property_as_int(&self, property: &str) -> Option<i32> {
        let value = self.property(property)?.trim();
        match value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
        {
            Some(hex) => i32::from_str_radix(hex, 16).ok(),
            None => value.parse().ok(),
        }
    }

    /// Structural identity: same subsystem, name and physical device.
    fn same_device(&self, other: &dyn KernelDevice) -> bool {
        self.subsystem() == other.subsystem()
            && self.name() == other.name()
            && self.physdev_uid() == other.physdev_uid()
    }
}
