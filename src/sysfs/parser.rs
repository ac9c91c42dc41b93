//! Sysfs reader for USB devices and PCI USB controllers.

use super::attr::{read_attr, read_attr_opt, read_hex_u8, read_hex_u16};
use crate::model::{DeviceNode, Direction, Endpoint, PciAddress, TransferType, UsbSpeed};
use std::path::{Path, PathBuf};
use thiserror::Error;

const SYSFS_USB_DEVICES: &str = "/sys/bus/usb/devices";
const SYSFS_PCI_DEVICES: &str = "/sys/bus/pci/devices";

/// PCI class code of USB host controllers (class 0x0c, subclass 0x03).
const PCI_CLASS_USB_CONTROLLER: u32 = 0x0c03;

/// Errors that can occur during sysfs enumeration.
#[derive(Debug, Error)]
pub enum SysfsError {
    #[error("cannot list {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}

/// Reader for the Linux sysfs device tree.
#[derive(Debug, Clone)]
pub struct Sysfs {
    usb_root: PathBuf,
    pci_root: PathBuf,
}

impl Default for Sysfs {
    fn default() -> Self {
        Self::new()
    }
}

impl Sysfs {
    /// Create a reader using the default sysfs paths.
    pub fn new() -> Self {
        Self {
            usb_root: PathBuf::from(SYSFS_USB_DEVICES),
            pci_root: PathBuf::from(SYSFS_PCI_DEVICES),
        }
    }

    /// Create a reader with custom roots (for testing).
    pub fn with_roots(usb_root: impl AsRef<Path>, pci_root: impl AsRef<Path>) -> Self {
        Self {
            usb_root: usb_root.as_ref().to_path_buf(),
            pci_root: pci_root.as_ref().to_path_buf(),
        }
    }

    /// List all USB host controllers on the PCI bus, sorted by address.
    pub fn usb_controllers(&self) -> Result<Vec<PciAddress>, SysfsError> {
        let mut controllers: Vec<PciAddress> = list_dir(&self.pci_root)?
            .into_iter()
            .filter_map(|(name, path)| {
                let addr = PciAddress::parse(&name)?;
                is_usb_controller(&path).then_some(addr)
            })
            .collect();
        controllers.sort();
        Ok(controllers)
    }

    /// Read all USB devices (not root hubs, not interfaces), sorted by name.
    ///
    /// Entries without a vendor or product ID are skipped.
    pub fn usb_devices(&self) -> Result<Vec<DeviceNode>, SysfsError> {
        let mut devices = Vec::new();

        for (name, path) in list_dir(&self.usb_root)? {
            // Match device paths like "3-1", "3-1.2", etc. (contain '-', no ':')
            if name.contains(':') || !name.contains('-') {
                continue;
            }
            match parse_device(&name, &path) {
                Some(device) => {
                    log::trace!(
                        "{} {}: {}",
                        name,
                        device.vid_pid(),
                        device
                            .speed
                            .map(|s| s.to_string())
                            .unwrap_or_else(|| "unknown speed".to_string())
                    );
                    for ep in &device.endpoints {
                        log::trace!("  {}", ep);
                    }
                    devices.push(device);
                }
                None => log::debug!("skipping {}: no vendor/product ID", name),
            }
        }

        devices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(devices)
    }
}

/// List a directory as (entry name, entry path) pairs.
fn list_dir(dir: &Path) -> Result<Vec<(String, PathBuf)>, SysfsError> {
    let entries = std::fs::read_dir(dir).map_err(|e| SysfsError::Io(dir.to_path_buf(), e))?;
    Ok(entries
        .flatten()
        .map(|entry| (entry.file_name().to_string_lossy().to_string(), entry.path()))
        .collect())
}

/// Check the PCI `class` attribute (e.g., "0x0c0330") for a USB controller.
fn is_usb_controller(pci_path: &Path) -> bool {
    let class = read_attr(&pci_path.join("class"), "");
    u32::from_str_radix(class.trim_start_matches("0x"), 16)
        .map(|c| c >> 8 == PCI_CLASS_USB_CONTROLLER)
        .unwrap_or(false)
}

/// Parse a USB device directory.
fn parse_device(name: &str, path: &Path) -> Option<DeviceNode> {
    let vendor_id = read_hex_u16(&path.join("idVendor"))?;
    let product_id = read_hex_u16(&path.join("idProduct"))?;

    Some(DeviceNode {
        path: path.to_path_buf(),
        name: name.to_string(),
        product: read_attr_opt(&path.join("product")),
        vendor_id,
        product_id,
        device_class: read_hex_u8(&path.join("bDeviceClass")),
        interface_classes: parse_interface_classes(path),
        speed: UsbSpeed::from_sysfs(&read_attr(&path.join("speed"), "")),
        endpoints: parse_all_endpoints(path),
    })
}

/// Interface directories of a device (e.g., "3-1.2:1.0"), sorted by name.
fn interface_dirs(device_path: &Path) -> Vec<PathBuf> {
    let Ok(entries) = list_dir(device_path) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .into_iter()
        .filter(|(name, path)| name.contains(':') && path.is_dir())
        .map(|(_, path)| path)
        .collect();
    dirs.sort();
    dirs
}

/// bInterfaceClass of every interface.
fn parse_interface_classes(device_path: &Path) -> Vec<u8> {
    interface_dirs(device_path)
        .iter()
        .filter_map(|iface| read_hex_u8(&iface.join("bInterfaceClass")))
        .collect()
}

/// Parse all non-control endpoints from all interfaces of a device.
fn parse_all_endpoints(device_path: &Path) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();

    for iface in interface_dirs(device_path) {
        let Ok(mut entries) = list_dir(&iface) else {
            continue;
        };
        entries.sort();
        for (ep_name, ep_path) in entries {
            // Match ep_XX but not ep_00 (control endpoint)
            if ep_name.starts_with("ep_")
                && ep_name != "ep_00"
                && let Some(ep) = parse_endpoint(&ep_path)
            {
                endpoints.push(ep);
            }
        }
    }

    endpoints
}

/// Parse a single endpoint directory.
///
/// Only `type` is required. The address falls back to the directory name
/// ("ep_81") and the direction to the address bit.
fn parse_endpoint(path: &Path) -> Option<Endpoint> {
    let transfer_type = TransferType::from_sysfs(&read_attr(&path.join("type"), ""))?;
    let address = read_hex_u8(&path.join("bEndpointAddress"))
        .or_else(|| address_from_dir_name(path))
        .unwrap_or(0);
    let direction = Direction::from_sysfs(&read_attr(&path.join("direction"), ""))
        .unwrap_or_else(|| Direction::from_address(address));

    Some(Endpoint {
        address,
        transfer_type,
        direction,
        max_packet_size: read_hex_u16(&path.join("wMaxPacketSize")).unwrap_or(0),
        b_interval: read_hex_u8(&path.join("bInterval")).unwrap_or(0),
    })
}

fn address_from_dir_name(path: &Path) -> Option<u8> {
    let name = path.file_name()?.to_str()?;
    u8::from_str_radix(name.strip_prefix("ep_")?, 16).ok()
}
