//! USB endpoint model with polling interval calculation.

use super::speed::UsbSpeed;
use std::fmt;

/// USB transfer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Control,
    Bulk,
    Interrupt,
    Isochronous,
}

impl TransferType {
    /// Parse from sysfs 'type' attribute string.
    pub fn from_sysfs(s: &str) -> Option<Self> {
        match s.trim() {
            "Control" => Some(Self::Control),
            "Bulk" => Some(Self::Bulk),
            "Interrupt" => Some(Self::Interrupt),
            "Isoc" | "Isochronous" => Some(Self::Isochronous),
            _ => None,
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Control => "Control",
            Self::Bulk => "Bulk",
            Self::Interrupt => "Interrupt",
            Self::Isochronous => "Isochronous",
        };
        write!(f, "{}", name)
    }
}

/// Endpoint direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Parse from sysfs 'direction' attribute.
    pub fn from_sysfs(s: &str) -> Option<Self> {
        match s.trim() {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            _ => None,
        }
    }

    /// Direction bit (bit 7) of an endpoint address.
    pub fn from_address(address: u8) -> Self {
        if address & 0x80 != 0 { Self::In } else { Self::Out }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "IN"),
            Self::Out => write!(f, "OUT"),
        }
    }
}

/// A USB endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Endpoint address (e.g., 0x81 = IN endpoint 1).
    pub address: u8,
    /// Transfer type.
    pub transfer_type: TransferType,
    /// Direction.
    pub direction: Direction,
    /// Maximum packet size in bytes (from wMaxPacketSize).
    pub max_packet_size: u16,
    /// Polling interval (raw bInterval value from descriptor).
    /// Zero means the attribute was missing or unreadable.
    pub b_interval: u8,
}

impl Endpoint {
    /// Polling interval in microseconds, or `None` without a usable bInterval.
    pub fn interval_us(&self, device_speed: UsbSpeed) -> Option<u64> {
        if self.b_interval == 0 {
            return None;
        }
        match device_speed {
            // Full/Low speed: bInterval is in milliseconds (1-255).
            UsbSpeed::Low | UsbSpeed::Full => Some(self.b_interval as u64 * 1000),
            // High/Super speed: interval = 2^(bInterval-1) * 125µs.
            UsbSpeed::High | UsbSpeed::Super | UsbSpeed::SuperPlus | UsbSpeed::SuperPlus2 => {
                let exponent = (self.b_interval - 1).min(15) as u32;
                Some((1u64 << exponent) * device_speed.frame_period_us() as u64)
            }
        }
    }

    /// Polling rate in Hz.
    pub fn polling_rate_hz(&self, device_speed: UsbSpeed) -> Option<u32> {
        let interval_us = self.interval_us(device_speed)?;
        u32::try_from(1_000_000 / interval_us).ok()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EP{:02X} {} {} {}B bInterval={}",
            self.address,
            self.transfer_type,
            self.direction,
            self.max_packet_size & 0x07FF,
            self.b_interval
        )
    }
}
