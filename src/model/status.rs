//! Latency path status of a device.

use serde::Serialize;
use std::fmt;

/// Where a device sits on the latency scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    /// CPU-direct controller, no hub.
    #[serde(rename = "BEST")]
    Best,
    /// CPU-direct controller behind at least one hub.
    #[serde(rename = "HUB")]
    Hub,
    /// Chipset controller, no hub.
    #[serde(rename = "CHIPSET")]
    Chipset,
    /// Chipset controller behind at least one hub.
    #[serde(rename = "CHIPSET+HUB")]
    ChipsetHub,
}

impl Status {
    /// All statuses, best first.
    pub const ALL: [Status; 4] = [Self::Best, Self::Hub, Self::Chipset, Self::ChipsetHub];

    pub fn classify(is_cpu_direct: bool, has_hub: bool) -> Self {
        match (is_cpu_direct, has_hub) {
            (true, false) => Self::Best,
            (true, true) => Self::Hub,
            (false, false) => Self::Chipset,
            (false, true) => Self::ChipsetHub,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Best => "BEST",
            Self::Hub => "HUB",
            Self::Chipset => "CHIPSET",
            Self::ChipsetHub => "CHIPSET+HUB",
        }
    }

    /// One-line advice shown in the status guide.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Best => "CPU-direct, no hub - lowest possible latency",
            Self::Hub => "CPU-direct but through a hub - try another port",
            Self::Chipset => "Chipset USB - move to CPU port if available",
            Self::ChipsetHub => "Worst path - definitely move this device",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of devices per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    #[serde(rename = "BEST")]
    pub best: usize,
    #[serde(rename = "HUB")]
    pub hub: usize,
    #[serde(rename = "CHIPSET")]
    pub chipset: usize,
    #[serde(rename = "CHIPSET+HUB")]
    pub chipset_hub: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: Status) {
        *self.slot_mut(status) += 1;
    }

    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Best => self.best,
            Status::Hub => self.hub,
            Status::Chipset => self.chipset,
            Status::ChipsetHub => self.chipset_hub,
        }
    }

    pub fn total(&self) -> usize {
        self.best + self.hub + self.chipset + self.chipset_hub
    }

    fn slot_mut(&mut self, status: Status) -> &mut usize {
        match status {
            Status::Best => &mut self.best,
            Status::Hub => &mut self.hub,
            Status::Chipset => &mut self.chipset,
            Status::ChipsetHub => &mut self.chipset_hub,
        }
    }
}

impl<'a> FromIterator<&'a Status> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = &'a Status>>(iter: I) -> Self {
        let mut counts = Self::default();
        for status in iter {
            counts.add(*status);
        }
        counts
    }
}
