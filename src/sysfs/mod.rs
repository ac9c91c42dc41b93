//! Linux sysfs access: attribute reads, device enumeration and topology walks.

pub mod attr;
pub mod parser;
pub mod walker;

pub use attr::read_attr;
pub use parser::{Sysfs, SysfsError};
pub use walker::{UNKNOWN_HUB, resolve_topology};
