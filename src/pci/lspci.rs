//! Controller names from the external `lspci` tool.

use crate::model::PciAddress;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Marker lspci puts before the device description of USB controllers.
const USB_CONTROLLER_MARKER: &str = "USB controller:";

/// Errors from looking up a PCI device name.
#[derive(Debug, Error)]
pub enum PciError {
    #[error("{0} command not found. Please install pciutils (e.g., sudo apt install pciutils).")]
    NotInstalled(String),
    #[error("failed to run {0}: {1}")]
    Spawn(String, #[source] std::io::Error),
    #[error("{program} -s {address} exited with {status}")]
    Failed {
        program: String,
        address: PciAddress,
        status: std::process::ExitStatus,
    },
    #[error("{program} printed nothing for {address}")]
    Empty { program: String, address: PciAddress },
    #[error("{0} output is not valid UTF-8")]
    Utf8(String),
}

/// Source of human-readable PCI device names.
pub trait PciNameSource {
    /// Describe the device at `address`.
    fn pci_name(&self, address: &PciAddress) -> Result<String, PciError>;

    /// Check that the source can be used at all.
    fn ensure_available(&self) -> Result<(), PciError> {
        Ok(())
    }
}

/// Looks up names by running `lspci -s <address>`.
#[derive(Debug, Clone)]
pub struct Lspci {
    program: String,
}

impl Default for Lspci {
    fn default() -> Self {
        Self::new("lspci")
    }
}

impl Lspci {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate the program in PATH (or check an explicit path).
    pub fn locate(&self) -> Result<PathBuf, PciError> {
        which::which(&self.program).map_err(|_| PciError::NotInstalled(self.program.clone()))
    }
}

impl PciNameSource for Lspci {
    fn ensure_available(&self) -> Result<(), PciError> {
        let path = self.locate()?;
        log::debug!("using {}", path.display());
        Ok(())
    }

    fn pci_name(&self, address: &PciAddress) -> Result<String, PciError> {
        let output = Command::new(&self.program)
            .arg("-s")
            .arg(address.as_str())
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| PciError::Spawn(self.program.clone(), e))?;

        if !output.status.success() {
            return Err(PciError::Failed {
                program: self.program.clone(),
                address: address.clone(),
                status: output.status,
            });
        }

        let stdout =
            String::from_utf8(output.stdout).map_err(|_| PciError::Utf8(self.program.clone()))?;
        let line = stdout.lines().next().unwrap_or_default().trim();
        if line.is_empty() {
            return Err(PciError::Empty {
                program: self.program.clone(),
                address: address.clone(),
            });
        }
        Ok(description_from_lspci(line))
    }
}

/// Extract the description from an lspci line.
///
/// `05:00.4 USB controller: Advanced Micro Devices, Inc. [AMD] Device 14c9`
/// becomes `Advanced Micro Devices, Inc. [AMD] Device 14c9`; lines without the
/// marker are returned whole.
pub fn description_from_lspci(line: &str) -> String {
    match line.split_once(USB_CONTROLLER_MARKER) {
        Some((_, rest)) => rest.trim().to_string(),
        None => line.trim().to_string(),
    }
}
