//! Device-tree node shapes and topology walk results.

use regex::Regex;
use std::sync::LazyLock;

static PCI_ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{4}:[0-9a-f]{2}:[0-9a-f]{2}\.[0-9a-f]$").expect("valid PCI regex")
});

static ROOT_HUB_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^usb[0-9]+$").expect("valid root hub regex"));

static USB_DEVICE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+-[0-9]+(\.[0-9]+)*$").expect("valid device regex"));

/// PCI bus address of a host controller (e.g., "0000:00:14.0").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PciAddress(pub String);

impl PciAddress {
    /// Parse a full `domain:bus:device.function` address.
    ///
    /// Only the lowercase form the kernel uses for sysfs directory names is
    /// accepted.
    pub fn parse(s: &str) -> Option<Self> {
        PCI_ADDRESS_PATTERN
            .is_match(s)
            .then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PciAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shape of a single path segment in the sysfs device tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeShape {
    /// A PCI function, i.e. the host controller owning the USB tree below it.
    PciAddress(PciAddress),
    /// Synthetic root hub of a controller (e.g., "usb3").
    RootHub,
    /// A USB device or hub (e.g., "3-1", "3-1.2.4").
    UsbDevice,
    /// Anything else: interfaces, PCI bridges' parents, "devices", ...
    Other,
}

impl NodeShape {
    /// Classify a path segment. PCI shape wins over root hub, which wins over
    /// USB device.
    pub fn classify(name: &str) -> Self {
        if let Some(addr) = PciAddress::parse(name) {
            Self::PciAddress(addr)
        } else if ROOT_HUB_PATTERN.is_match(name) {
            Self::RootHub
        } else if USB_DEVICE_PATTERN.is_match(name) {
            Self::UsbDevice
        } else {
            Self::Other
        }
    }
}

/// Result of walking from a device up to its host controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    /// Owning controller.
    pub controller: PciAddress,
    /// Names of intermediate hubs, in the order they were met walking upwards
    /// (nearest the device first).
    pub hubs: Vec<String>,
}

impl PathResult {
    /// Number of hub hops between the device and the root hub.
    pub fn hub_count(&self) -> usize {
        self.hubs.len()
    }

    pub fn has_hub(&self) -> bool {
        !self.hubs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_pci_address() {
        assert_eq!(
            NodeShape::classify("0000:00:14.0"),
            NodeShape::PciAddress(PciAddress("0000:00:14.0".to_string()))
        );
        assert_eq!(
            NodeShape::classify("0000:c1:00.4"),
            NodeShape::PciAddress(PciAddress("0000:c1:00.4".to_string()))
        );
        // Uppercase hex is not what the kernel writes
        assert_eq!(NodeShape::classify("0000:C1:00.4"), NodeShape::Other);
        assert_eq!(NodeShape::classify("pci0000:00"), NodeShape::Other);
    }

    #[test]
    fn test_classify_root_hub() {
        assert_eq!(NodeShape::classify("usb1"), NodeShape::RootHub);
        assert_eq!(NodeShape::classify("usb12"), NodeShape::RootHub);
        assert_eq!(NodeShape::classify("usb"), NodeShape::Other);
        assert_eq!(NodeShape::classify("usbmon"), NodeShape::Other);
    }

    #[test]
    fn test_classify_usb_device() {
        assert_eq!(NodeShape::classify("3-1"), NodeShape::UsbDevice);
        assert_eq!(NodeShape::classify("3-1.2"), NodeShape::UsbDevice);
        assert_eq!(NodeShape::classify("10-4.1.3"), NodeShape::UsbDevice);
        // Interfaces and malformed paths
        assert_eq!(NodeShape::classify("3-1.2:1.0"), NodeShape::Other);
        assert_eq!(NodeShape::classify("3-"), NodeShape::Other);
        assert_eq!(NodeShape::classify("3-1."), NodeShape::Other);
    }

    #[test]
    fn test_pci_address_parse() {
        let addr = PciAddress::parse("0000:05:00.4").unwrap();
        assert_eq!(addr.to_string(), "0000:05:00.4");
        assert!(PciAddress::parse("05:00.4").is_none());
        assert!(PciAddress::parse("0000:05:00.4 ").is_none());
    }

    #[test]
    fn test_path_result_hub_count() {
        let result = PathResult {
            controller: PciAddress("0000:00:14.0".to_string()),
            hubs: vec!["Hub A".to_string(), "Hub B".to_string()],
        };
        assert_eq!(result.hub_count(), 2);
        assert!(result.has_hub());
    }
}
