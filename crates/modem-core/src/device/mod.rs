//! Device module - kernel device abstraction and discovery backends.

pub mod descriptor;
pub mod traits;
pub mod usb;

pub use descriptor::{DeviceDescriptor, DeviceTable};
pub use traits::KernelDevice;
pub use usb::{DeviceError, enumerate};

pub const SUBSYSTEM_TTY: &str = "tty";
pub const SUBSYSTEM_NET: &str = "net";
pub const SUBSYSTEM_USBMISC: &str = "usbmisc";
pub const SUBSYSTEM_USB: &str = "usb";
pub const SUBSYSTEM_WWAN: &str = "wwan";

/// Subsystems that may carry modem ports.
pub const SUPPORTED_SUBSYSTEMS: [&str; 5] = [
    SUBSYSTEM_TTY,
    SUBSYSTEM_NET,
    SUBSYSTEM_USBMISC,
    SUBSYSTEM_USB,
    SUBSYSTEM_WWAN,
];

pub const PROPERTY_DEVICE_IGNORE: &str = "ID_MM_DEVICE_IGNORE";
pub const PROPERTY_MANUAL_SCAN_ONLY: &str = "ID_MM_DEVICE_MANUAL_SCAN_ONLY";
pub const PROPERTY_PORT_TYPE_MBIM: &str = "ID_MM_PORT_TYPE_MBIM";
pub const PROPERTY_MANUFACTURER: &str = "ID_VENDOR_FROM_DATABASE";
pub const PROPERTY_PRODUCT: &str = "ID_MODEL_FROM_DATABASE";
