//! USB host controller information.

use super::topology::PciAddress;

/// A USB host controller found on the PCI bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    /// PCI address (e.g., "0000:00:14.0").
    pub address: PciAddress,
    /// Descriptive name from lspci, or a placeholder if that failed.
    pub name: String,
    /// Is the controller part of the CPU package?
    pub is_cpu_direct: bool,
    /// User-defined label from config.
    pub label: Option<String>,
}

impl ControllerInfo {
    /// "CPU" or "Chipset".
    pub fn kind(&self) -> &'static str {
        if self.is_cpu_direct { "CPU" } else { "Chipset" }
    }

    /// Get display name (label > lspci name).
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => format!("{} ({})", label, self.name),
            None => self.name.clone(),
        }
    }

    /// Case-insensitive substring match against name, label and address.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .label
                .as_ref()
                .is_some_and(|l| l.to_lowercase().contains(&needle))
            || self.address.as_str().contains(&needle)
    }
}
