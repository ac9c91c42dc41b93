//! Walk from a USB device up to the PCI controller that owns it.
//!
//! A device entry under `/sys/bus/usb/devices` is a symlink into the real
//! device hierarchy, e.g.
//!
//! ```text
//! /sys/devices/pci0000:00/0000:00:14.0/usb1/1-1/1-1.2
//!                         ^controller   ^root ^hub ^device
//! ```
//!
//! Walking upwards from the canonical path, the first USB device node is the
//! device itself, every further one is a hub hop, root hubs are transparent and
//! the first PCI-shaped node is the controller.

use super::attr::read_attr;
use crate::model::{NodeShape, PathResult};
use std::path::Path;

/// Display name used for hubs without a readable `product` attribute.
pub const UNKNOWN_HUB: &str = "Unknown Hub";

/// Resolve the owning controller and hub chain of a device.
///
/// Returns `None` when the path cannot be canonicalized or when no PCI
/// controller is found above it; callers skip such devices.
pub fn resolve_topology(leaf: &Path) -> Option<PathResult> {
    let real_path = match leaf.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            log::debug!("cannot resolve {}: {}", leaf.display(), e);
            return None;
        }
    };

    let mut hubs = Vec::new();
    let mut seen_device = false;
    let mut current = real_path.as_path();

    loop {
        let name = current
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        match NodeShape::classify(&name) {
            NodeShape::PciAddress(controller) => {
                return Some(PathResult { controller, hubs });
            }
            NodeShape::UsbDevice => {
                // The first device node is the leaf itself (or the device
                // enclosing an interface leaf), never a hop.
                if seen_device {
                    hubs.push(read_attr(&current.join("product"), UNKNOWN_HUB));
                }
                seen_device = true;
            }
            NodeShape::RootHub | NodeShape::Other => {}
        }

        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => {
                log::debug!("no PCI controller above {}", real_path.display());
                return None;
            }
        }
    }
}
