//! Device scan: enumerate, filter, walk and classify every candidate device.

use crate::model::{ControllerInfo, DeviceNode, DeviceRecord, PciAddress, Status, StatusCounts};
use crate::pci::{ControllerResolver, PciError, PciNameSource};
use crate::sysfs::{Sysfs, resolve_topology};
use thiserror::Error;

/// Fatal scan errors.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{0}")]
    MissingPciTool(#[source] PciError),
}

/// Which devices end up in the report.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Interface class allow-list.
    pub allowed_classes: Vec<u8>,
    /// Keep devices outside the allow-list too.
    pub show_all: bool,
    /// Only keep devices with one of these classes (empty = no filter).
    pub class_filter: Vec<u8>,
    /// Only keep devices on a controller matching this text.
    pub controller_filter: Option<String>,
    /// Only keep BEST devices.
    pub only_best: bool,
}

/// Result of a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// All USB controllers, in discovery order.
    pub controllers: Vec<ControllerInfo>,
    /// Devices that passed every filter.
    pub devices: Vec<DeviceRecord>,
    /// Per-status device counts.
    pub counts: StatusCounts,
}

/// Scans sysfs and classifies devices.
pub struct Scanner<S> {
    sysfs: Sysfs,
    resolver: ControllerResolver<S>,
    controller_order: Vec<PciAddress>,
}

impl<S: PciNameSource> Scanner<S> {
    pub fn new(sysfs: Sysfs, resolver: ControllerResolver<S>) -> Self {
        Self {
            sysfs,
            resolver,
            controller_order: Vec::new(),
        }
    }

    /// Run a full scan.
    ///
    /// Fails only if controller names cannot be looked up at all. Devices
    /// whose topology cannot be resolved are left out of the report.
    pub fn scan(&mut self, options: &ScanOptions) -> Result<ScanReport, ScanError> {
        self.resolver
            .ensure_available()
            .map_err(ScanError::MissingPciTool)?;

        self.discover_controllers();

        let devices = self.sysfs.usb_devices().unwrap_or_else(|e| {
            log::warn!("cannot enumerate USB devices: {}", e);
            Vec::new()
        });

        let mut records = Vec::new();
        for device in &devices {
            if let Some(record) = self.classify_device(device, options) {
                records.push(record);
            }
        }

        let controllers = self
            .controller_order
            .iter()
            .filter_map(|addr| self.resolver.get(addr).cloned())
            .collect();
        let counts = records.iter().map(|r| &r.status).collect();

        Ok(ScanReport {
            controllers,
            devices: records,
            counts,
        })
    }

    /// Resolve every USB controller on the PCI bus up front.
    fn discover_controllers(&mut self) {
        let addresses = self.sysfs.usb_controllers().unwrap_or_else(|e| {
            log::warn!("cannot enumerate PCI controllers: {}", e);
            Vec::new()
        });
        for addr in addresses {
            self.resolve_controller(&addr);
        }
    }

    fn resolve_controller(&mut self, addr: &PciAddress) -> ControllerInfo {
        if self.resolver.get(addr).is_none() {
            self.controller_order.push(addr.clone());
        }
        self.resolver.resolve(addr).clone()
    }

    /// Apply filters to one device and classify it.
    fn classify_device(
        &mut self,
        device: &DeviceNode,
        options: &ScanOptions,
    ) -> Option<DeviceRecord> {
        let name = device.display_name();

        if device.is_hub() {
            log::debug!("skipping {} ({}): hub", name, device.name);
            return None;
        }

        let mut classes = device.matching_classes(&options.allowed_classes);
        if classes.is_empty() {
            if !options.show_all {
                log::debug!(
                    "skipping {} (class {})",
                    name,
                    device
                        .device_class
                        .map(|c| format!("{:02x}", c))
                        .unwrap_or_else(|| "?".to_string())
                );
                return None;
            }
            classes = device.device_class.into_iter().collect();
        }

        if !options.class_filter.is_empty()
            && !classes.iter().any(|c| options.class_filter.contains(c))
        {
            log::debug!("skipping {}: not in requested classes", name);
            return None;
        }

        let Some(path) = resolve_topology(&device.path) else {
            log::debug!("skipping {}: no controller found above {}", name, device.name);
            return None;
        };

        let controller = self.resolve_controller(&path.controller);
        if let Some(filter) = &options.controller_filter
            && !controller.matches(filter)
        {
            log::debug!("skipping {}: not on controller {}", name, filter);
            return None;
        }

        let status = Status::classify(controller.is_cpu_direct, path.has_hub());
        if options.only_best && status != Status::Best {
            return None;
        }

        Some(DeviceRecord {
            sysfs_name: device.name.clone(),
            name,
            vid_pid: device.vid_pid(),
            classes,
            controller,
            hubs: path.hubs,
            status,
            polling_rate_hz: device.polling_rate_hz(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::device::{USB_CLASS_AUDIO, USB_CLASS_HID, USB_CLASS_VIDEO};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    struct FixedNames(HashMap<String, String>);

    impl PciNameSource for FixedNames {
        fn pci_name(&self, address: &PciAddress) -> Result<String, PciError> {
            self.0
                .get(address.as_str())
                .cloned()
                .ok_or_else(|| PciError::NotInstalled("fixed".to_string()))
        }
    }

    struct NoTool;

    impl PciNameSource for NoTool {
        fn pci_name(&self, _: &PciAddress) -> Result<String, PciError> {
            unreachable!()
        }

        fn ensure_available(&self) -> Result<(), PciError> {
            Err(PciError::NotInstalled("lspci".to_string()))
        }
    }

    /// Synthetic sysfs with bus/usb/devices symlinks into devices/.
    struct FakeSysfs {
        tmp: TempDir,
    }

    impl FakeSysfs {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            fs::create_dir_all(tmp.path().join("bus/usb/devices")).unwrap();
            fs::create_dir_all(tmp.path().join("bus/pci/devices")).unwrap();
            Self { tmp }
        }

        fn controller(&self, addr: &str) -> PathBuf {
            let path = self.tmp.path().join("devices/pci0000:00").join(addr);
            write(&path, &[("class", "0x0c0330")]);
            std::os::unix::fs::symlink(&path, self.tmp.path().join("bus/pci/devices").join(addr))
                .unwrap();
            path
        }

        fn device(&self, parent: &Path, name: &str, attrs: &[(&str, &str)]) -> PathBuf {
            let path = parent.join(name);
            write(&path, attrs);
            std::os::unix::fs::symlink(&path, self.tmp.path().join("bus/usb/devices").join(name))
                .unwrap();
            path
        }

        fn sysfs(&self) -> Sysfs {
            Sysfs::with_roots(
                self.tmp.path().join("bus/usb/devices"),
                self.tmp.path().join("bus/pci/devices"),
            )
        }
    }

    fn write(dir: &Path, attrs: &[(&str, &str)]) {
        fs::create_dir_all(dir).unwrap();
        for (name, value) in attrs {
            fs::write(dir.join(name), format!("{value}\n")).unwrap();
        }
    }

    fn usb_device(product: &str, class: &str, iface_class: &str) -> Vec<(String, String)> {
        vec![
            ("idVendor".into(), "1234".into()),
            ("idProduct".into(), "5678".into()),
            ("product".into(), product.into()),
            ("bDeviceClass".into(), class.into()),
            ("__iface".into(), iface_class.into()),
        ]
    }

    fn add_device(
        fake: &FakeSysfs,
        parent: &Path,
        name: &str,
        attrs: Vec<(String, String)>,
    ) -> PathBuf {
        let iface = attrs
            .iter()
            .find(|(k, _)| k == "__iface")
            .map(|(_, v)| v.clone());
        let plain: Vec<(&str, &str)> = attrs
            .iter()
            .filter(|(k, _)| k != "__iface")
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let path = fake.device(parent, name, &plain);
        if let Some(class) = iface {
            write(&path.join(format!("{name}:1.0")), &[("bInterfaceClass", &class)]);
        }
        path
    }

    fn options() -> ScanOptions {
        ScanOptions {
            allowed_classes: vec![USB_CLASS_HID, USB_CLASS_AUDIO, USB_CLASS_VIDEO],
            ..Default::default()
        }
    }

    fn scanner(fake: &FakeSysfs, names: &[(&str, &str)]) -> Scanner<FixedNames> {
        let names = names
            .iter()
            .map(|(a, n)| (a.to_string(), n.to_string()))
            .collect();
        Scanner::new(fake.sysfs(), ControllerResolver::new(FixedNames(names)))
    }

    #[test]
    fn test_filters_hubs_and_unlisted_classes() {
        let fake = FakeSysfs::new();
        let root = fake.controller("0000:00:14.0").join("usb1");
        let hub = add_device(&fake, &root, "1-1", usb_device("Hub", "09", "09"));
        add_device(&fake, &hub, "1-1.1", usb_device("Keyboard", "00", "03"));
        add_device(&fake, &root, "1-2", usb_device("Flash Drive", "00", "08"));

        let mut scanner = scanner(&fake, &[("0000:00:14.0", "Intel USB 3.1 xHCI")]);
        let report = scanner.scan(&options()).unwrap();

        let names: Vec<&str> = report.devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Keyboard"]);
        assert_eq!(report.devices[0].status, Status::Hub);
        assert_eq!(report.devices[0].hubs, vec!["Hub".to_string()]);
        assert_eq!(report.controllers.len(), 1);
        assert_eq!(report.counts.hub, 1);
    }

    #[test]
    fn test_show_all_uses_device_class() {
        let fake = FakeSysfs::new();
        let root = fake.controller("0000:00:14.0").join("usb1");
        add_device(&fake, &root, "1-2", usb_device("Flash Drive", "00", "08"));

        let mut scanner = scanner(&fake, &[("0000:00:14.0", "Intel USB 3.1 xHCI")]);
        let report = scanner
            .scan(&ScanOptions {
                show_all: true,
                ..options()
            })
            .unwrap();

        assert_eq!(report.devices.len(), 1);
        assert_eq!(report.devices[0].classes, vec![0x00]);
        assert_eq!(report.devices[0].status, Status::Best);
    }

    #[test]
    fn test_class_and_controller_filters() {
        let fake = FakeSysfs::new();
        let cpu = fake.controller("0000:00:14.0").join("usb1");
        let chipset = fake.controller("0000:05:00.0").join("usb3");
        add_device(&fake, &cpu, "1-1", usb_device("Mouse", "00", "03"));
        add_device(&fake, &cpu, "1-2", usb_device("Headset", "00", "01"));
        add_device(&fake, &chipset, "3-1", usb_device("Webcam", "ef", "0e"));

        let names = [
            ("0000:00:14.0", "AMD USB 3.0 Host Controller"),
            ("0000:05:00.0", "ASMedia ASM2142 USB 3.1 Host Controller"),
        ];

        let mut s = scanner(&fake, &names);
        let report = s
            .scan(&ScanOptions {
                class_filter: vec![USB_CLASS_AUDIO, USB_CLASS_VIDEO],
                ..options()
            })
            .unwrap();
        let found: Vec<&str> = report.devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(found, vec!["Headset", "Webcam"]);

        let mut s = scanner(&fake, &names);
        let report = s
            .scan(&ScanOptions {
                controller_filter: Some("asmedia".to_string()),
                ..options()
            })
            .unwrap();
        let found: Vec<&str> = report.devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(found, vec!["Webcam"]);
        assert_eq!(report.devices[0].status, Status::Chipset);

        let mut s = scanner(&fake, &names);
        let report = s
            .scan(&ScanOptions {
                only_best: true,
                ..options()
            })
            .unwrap();
        assert_eq!(report.devices.len(), 2);
        assert!(report.devices.iter().all(|d| d.status == Status::Best));
        assert_eq!(report.counts.best, 2);
        assert_eq!(report.controllers.len(), 2);
    }

    #[test]
    fn test_broken_topology_is_skipped() {
        let fake = FakeSysfs::new();
        let root = fake.controller("0000:00:14.0").join("usb1");
        add_device(&fake, &root, "1-1", usb_device("Mouse", "00", "03"));
        let virt = fake.tmp.path().join("devices/virtual/usb9");
        add_device(&fake, &virt, "9-1", usb_device("Ghost", "00", "03"));

        let mut scanner = scanner(&fake, &[("0000:00:14.0", "AMD USB 3.0 Host Controller")]);
        let report = scanner.scan(&options()).unwrap();

        assert_eq!(report.devices.len(), 1);
        assert_eq!(report.devices[0].name, "Mouse");
    }

    #[test]
    fn test_controller_found_only_by_walk() {
        let fake = FakeSysfs::new();
        // Controller not listed under bus/pci/devices
        let root = fake
            .tmp
            .path()
            .join("devices/pci0000:00/0000:00:08.1/0000:0b:00.3/usb5");
        add_device(&fake, &root, "5-1", usb_device("Mouse", "00", "03"));

        let names = [("0000:0b:00.3", "AMD Matisse USB 3.0 Host Controller")];
        let mut scanner = scanner(&fake, &names);
        let report = scanner.scan(&options()).unwrap();

        assert_eq!(report.controllers.len(), 1);
        assert_eq!(report.controllers[0].address.as_str(), "0000:0b:00.3");
        assert_eq!(report.devices[0].status, Status::Best);
    }

    #[test]
    fn test_missing_tool_is_fatal() {
        let fake = FakeSysfs::new();
        let mut scanner = Scanner::new(fake.sysfs(), ControllerResolver::new(NoTool));
        assert!(matches!(
            scanner.scan(&options()),
            Err(ScanError::MissingPciTool(_))
        ));
    }

    #[test]
    fn test_empty_system() {
        let fake = FakeSysfs::new();
        let mut scanner = scanner(&fake, &[]);
        let report = scanner.scan(&options()).unwrap();
        assert!(report.devices.is_empty());
        assert!(report.controllers.is_empty());
        assert_eq!(report.counts.total(), 0);
    }
}
