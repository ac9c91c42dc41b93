//! CPU-direct USB checker
//!
//! A library and CLI tool that tells whether latency-sensitive USB devices
//! (mice, keyboards, headsets, webcams) are wired to a USB controller on the
//! CPU die or to one behind the chipset, and whether a hub sits in between.

pub mod config;
pub mod model;
pub mod output;
pub mod pci;
pub mod scan;
pub mod sysfs;

pub use config::Config;
pub use model::{ControllerInfo, DeviceRecord, PathResult, PciAddress, Status};
pub use pci::{ControllerResolver, Lspci, is_cpu_controller};
pub use scan::{ScanError, ScanOptions, ScanReport, Scanner};
pub use sysfs::{Sysfs, resolve_topology};
