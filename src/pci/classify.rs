//! Name-based CPU-direct vs. chipset heuristic.
//!
//! Vendors do not name their controllers consistently, so this is a
//! best-effort guess. Unknown names are reported as chipset: overstating the
//! latency of a port is the safer mistake.

use std::fmt;

/// Outcome of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    CpuDirect,
    Chipset,
}

impl Verdict {
    pub fn is_cpu_direct(self) -> bool {
        self == Self::CpuDirect
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CpuDirect => write!(f, "CPU"),
            Self::Chipset => write!(f, "Chipset"),
        }
    }
}

/// A single classification rule, applied to the lowercased controller name.
pub struct Rule {
    /// Short description, used in debug logs.
    pub description: &'static str,
    pub matches: fn(&str) -> bool,
    pub verdict: Verdict,
}

/// Rules in precedence order; the first match wins.
pub static RULES: &[Rule] = &[
    Rule {
        description: "AMD USB/xHC controller",
        matches: is_amd_usb,
        verdict: Verdict::CpuDirect,
    },
    Rule {
        description: "Intel xHCI/USB controller",
        matches: is_intel_usb,
        verdict: Verdict::CpuDirect,
    },
    Rule {
        description: "chipset",
        matches: |n| n.contains("chipset"),
        verdict: Verdict::Chipset,
    },
    Rule {
        description: "ASMedia",
        matches: |n| n.contains("asmedia"),
        verdict: Verdict::Chipset,
    },
    Rule {
        description: "VIA/NEC",
        matches: |n| n.contains("via") || n.contains("nec"),
        verdict: Verdict::Chipset,
    },
    Rule {
        description: "AMD Promontory",
        matches: |n| n.contains("promontory"),
        verdict: Verdict::Chipset,
    },
];

fn is_amd_usb(name: &str) -> bool {
    name.contains("amd") && (name.contains("usb") || name.contains("xhc"))
}

fn is_intel_usb(name: &str) -> bool {
    name.contains("intel") && (name.contains("xhci") || name.contains("usb"))
}

/// First rule matching `name`, if any.
pub fn matching_rule(name: &str) -> Option<&'static Rule> {
    let name = name.to_lowercase();
    RULES.iter().find(|rule| (rule.matches)(&name))
}

/// Is a controller with this name CPU-direct?
///
/// `force` short-circuits to `true` for controllers the user has vouched for.
pub fn is_cpu_controller(name: &str, force: bool) -> bool {
    if force {
        return true;
    }
    match matching_rule(name) {
        Some(rule) => {
            log::trace!("{:?} matched rule '{}'", name, rule.description);
            rule.verdict.is_cpu_direct()
        }
        None => false,
    }
}
