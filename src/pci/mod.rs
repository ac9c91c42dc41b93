//! PCI USB controller naming and CPU/chipset classification.

pub mod classify;
pub mod lspci;
pub mod resolver;

pub use classify::{RULES, Rule, Verdict, is_cpu_controller};
pub use lspci::{Lspci, PciError, PciNameSource};
pub use resolver::ControllerResolver;
