//! nusb-based device discovery.
//!
//! Snapshots every attached USB device into a [`DeviceDescriptor`] so the
//! rest of the stack can treat it like any other kernel device.

use nusb::{DeviceInfo, MaybeFuture, list_devices};
use thiserror::Error;
use tracing::{debug, instrument};

use super::descriptor::DeviceDescriptor;
use super::{
    PROPERTY_MANUFACTURER, PROPERTY_PORT_TYPE_MBIM, PROPERTY_PRODUCT, SUBSYSTEM_USB,
};

/// USB communications class.
const USB_CLASS_CDC: u8 = 0x02;
/// Mobile Broadband Interface Model subclass.
const USB_SUBCLASS_MBIM: u8 = 0x0e;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("USB enumeration failed: {0}")]
    Enumeration(String),
}

/// List attached USB devices, optionally restricted to one vendor.
#[instrument(level = "debug")]
pub fn enumerate(vendor_id: Option<u16>) -> Result<Vec<DeviceDescriptor>, DeviceError> {
    let devices = list_devices()
        .wait()
        .map_err(|e| DeviceError::Enumeration(e.to_string()))?;

    let descriptors: Vec<_> = devices
        .filter(|d| vendor_id.is_none_or(|vid| d.vendor_id() == vid))
        .map(|d| describe(&d))
        .collect();

    debug!(count = descriptors.len(), "Enumerated USB devices");
    Ok(descriptors)
}

fn describe(info: &DeviceInfo) -> DeviceDescriptor {
    let name = bus_path(info.bus_id(), info.port_chain());
    let uid = physdev_uid(info.serial_number(), &name);

    let mut descriptor = DeviceDescriptor::new(SUBSYSTEM_USB, name.clone()).with_physdev(
        uid,
        info.vendor_id(),
        info.product_id(),
    );

    #[cfg(target_os = "linux")]
    {
        descriptor = descriptor.with_sysfs_path(info.sysfs_path().display().to_string());
    }

    if let Some(manufacturer) = info.manufacturer_string() {
        descriptor = descriptor.with_property(PROPERTY_MANUFACTURER, manufacturer);
    }
    if let Some(product) = info.product_string() {
        descriptor = descriptor.with_property(PROPERTY_PRODUCT, product);
    }
    if has_mbim_interface(info.interfaces().map(|i| (i.class(), i.subclass()))) {
        descriptor = descriptor.with_property(PROPERTY_PORT_TYPE_MBIM, "1");
    }

    descriptor
}

/// Kernel-style bus path, e.g. `1-1.4`.
fn bus_path(bus_id: &str, ports: &[u8]) -> String {
    if ports.is_empty() {
        return format!("usb{bus_id}");
    }
    let chain: Vec<String> = ports.iter().map(u8::to_string).collect();
    format!("{bus_id}-{}", chain.join("."))
}

/// Serial number when the device reports a usable one, bus path otherwise.
fn physdev_uid(serial: Option<&str>, bus_path: &str) -> String {
    match serial.map(str::trim) {
        Some(serial) if !serial.is_empty() => serial.to_string(),
        _ => bus_path.to_string(),
    }
}

fn has_mbim_interface(mut classes: impl Iterator<Item = (u8, u8)>) -> bool {
    classes.any(|(class, subclass)| class == USB_CLASS_CDC && subclass == USB_SUBCLASS_MBIM)
}
