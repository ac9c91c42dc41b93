//! USB device snapshots, device classes and per-device results.

use super::controller::ControllerInfo;
use super::endpoint::{Endpoint, TransferType};
use super::speed::UsbSpeed;
use super::status::Status;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const USB_CLASS_AUDIO: u8 = 0x01;
pub const USB_CLASS_HID: u8 = 0x03;
pub const USB_CLASS_HUB: u8 = 0x09;
pub const USB_CLASS_VIDEO: u8 = 0x0e;
pub const USB_CLASS_WIRELESS: u8 = 0xe0;

/// Class names making up the default allow-list.
pub const DEFAULT_CLASSES: [&str; 3] = ["hid", "audio", "video"];

/// A USB device as read from sysfs (one entry of /sys/bus/usb/devices).
#[derive(Debug, Clone)]
pub struct DeviceNode {
    /// Sysfs path of the device entry (usually a symlink).
    pub path: PathBuf,
    /// Entry name (e.g., "3-1.2").
    pub name: String,
    /// Product string, if the device has one.
    pub product: Option<String>,
    /// Vendor ID.
    pub vendor_id: u16,
    /// Product ID.
    pub product_id: u16,
    /// bDeviceClass.
    pub device_class: Option<u8>,
    /// bInterfaceClass of every interface, in directory order.
    pub interface_classes: Vec<u8>,
    /// Negotiated speed.
    pub speed: Option<UsbSpeed>,
    /// Non-control endpoints across all interfaces.
    pub endpoints: Vec<Endpoint>,
}

impl DeviceNode {
    /// Get display name (product > "Unknown Device").
    pub fn display_name(&self) -> String {
        self.product
            .clone()
            .unwrap_or_else(|| "Unknown Device".to_string())
    }

    /// Format VID:PID as string.
    pub fn vid_pid(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor_id, self.product_id)
    }

    /// Is this a hub? (bDeviceClass == 0x09).
    pub fn is_hub(&self) -> bool {
        self.device_class == Some(USB_CLASS_HUB)
    }

    /// Interface classes that appear in `allowed`.
    pub fn matching_classes(&self, allowed: &[u8]) -> Vec<u8> {
        self.interface_classes
            .iter()
            .copied()
            .filter(|c| allowed.contains(c))
            .collect()
    }

    /// Polling rate of the first interrupt endpoint, in Hz.
    pub fn polling_rate_hz(&self) -> Option<u32> {
        let speed = self.speed?;
        self.endpoints
            .iter()
            .find(|ep| ep.transfer_type == TransferType::Interrupt)
            .and_then(|ep| ep.polling_rate_hz(speed))
    }
}

/// Mapping from device class names to USB interface class codes.
#[derive(Debug, Clone)]
pub struct ClassTable {
    classes: BTreeMap<String, u8>,
}

impl Default for ClassTable {
    fn default() -> Self {
        let classes = [
            ("hid", USB_CLASS_HID),
            ("audio", USB_CLASS_AUDIO),
            ("video", USB_CLASS_VIDEO),
            ("wireless", USB_CLASS_WIRELESS),
        ]
        .into_iter()
        .map(|(name, code)| (name.to_string(), code))
        .collect();
        Self { classes }
    }
}

impl ClassTable {
    /// Add or replace a class name.
    pub fn insert(&mut self, name: &str, code: u8) {
        self.classes.insert(name.to_lowercase(), code);
    }

    /// Look up a class code by name (case-insensitive).
    pub fn code(&self, name: &str) -> Option<u8> {
        self.classes.get(&name.to_lowercase()).copied()
    }

    /// Known class names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

/// Classification result for one device.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    /// Sysfs entry name (e.g., "3-1.2").
    pub sysfs_name: String,
    /// Display name.
    pub name: String,
    /// "vvvv:pppp".
    pub vid_pid: String,
    /// Interface classes that got the device selected.
    pub classes: Vec<u8>,
    /// Owning controller.
    pub controller: ControllerInfo,
    /// Intermediate hub names, nearest the device first.
    pub hubs: Vec<String>,
    /// Latency path status.
    pub status: Status,
    /// Polling rate of the first interrupt endpoint.
    pub polling_rate_hz: Option<u32>,
}

impl DeviceRecord {
    pub fn has_hub(&self) -> bool {
        !self.hubs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::endpoint::Direction;

    fn mouse() -> DeviceNode {
        DeviceNode {
            path: PathBuf::from("/sys/bus/usb/devices/1-2"),
            name: "1-2".to_string(),
            product: Some("USB Gaming Mouse".to_string()),
            vendor_id: 0x046d,
            product_id: 0xc08b,
            device_class: Some(0),
            interface_classes: vec![USB_CLASS_HID, USB_CLASS_HID],
            speed: Some(UsbSpeed::Full),
            endpoints: vec![Endpoint {
                address: 0x81,
                transfer_type: TransferType::Interrupt,
                direction: Direction::In,
                max_packet_size: 8,
                b_interval: 1,
            }],
        }
    }

    #[test]
    fn test_device_helpers() {
        let dev = mouse();
        assert_eq!(dev.vid_pid(), "046d:c08b");
        assert!(!dev.is_hub());
        assert_eq!(dev.display_name(), "USB Gaming Mouse");
        assert_eq!(dev.polling_rate_hz(), Some(1000));
        assert_eq!(
            dev.matching_classes(&[USB_CLASS_HID, USB_CLASS_AUDIO]),
            vec![USB_CLASS_HID, USB_CLASS_HID]
        );
        assert!(dev.matching_classes(&[USB_CLASS_VIDEO]).is_empty());
    }

    #[test]
    fn test_unknown_device_name() {
        let mut dev = mouse();
        dev.product = None;
        assert_eq!(dev.display_name(), "Unknown Device");
    }

    #[test]
    fn test_class_table() {
        let mut table = ClassTable::default();
        assert_eq!(table.code("HID"), Some(USB_CLASS_HID));
        assert_eq!(table.code("printer"), None);
        table.insert("Printer", 0x07);
        assert_eq!(table.code("printer"), Some(0x07));
        assert_eq!(table.code("Video"), Some(USB_CLASS_VIDEO));
        assert!(table.names().any(|n| n == "wireless"));
    }
}
