//! Per-run controller name resolution and classification cache.

use super::classify::is_cpu_controller;
use super::lspci::{PciError, PciNameSource};
use crate::model::{ControllerInfo, PciAddress};
use std::collections::{HashMap, HashSet};

/// Resolves and classifies controllers, at most once per address.
pub struct ControllerResolver<S> {
    source: S,
    force_cpu: HashSet<PciAddress>,
    labels: HashMap<String, String>,
    cache: HashMap<PciAddress, ControllerInfo>,
}

impl<S: PciNameSource> ControllerResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            force_cpu: HashSet::new(),
            labels: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    /// Treat these controllers as CPU-direct regardless of their name.
    pub fn with_force_cpu(mut self, addresses: impl IntoIterator<Item = PciAddress>) -> Self {
        self.force_cpu.extend(addresses);
        self
    }

    /// User labels by PCI address.
    pub fn with_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    /// Check that controller names can be looked up at all.
    pub fn ensure_available(&self) -> Result<(), PciError> {
        self.source.ensure_available()
    }

    /// Resolve a controller, using the cached entry if there is one.
    ///
    /// Never fails: an unresolvable name becomes `Unknown Controller [<addr>]`
    /// and is classified like any other name.
    pub fn resolve(&mut self, address: &PciAddress) -> &ControllerInfo {
        if !self.cache.contains_key(address) {
            let info = self.lookup(address);
            self.cache.insert(address.clone(), info);
        }
        &self.cache[address]
    }

    /// Cached entry, if the controller has been resolved.
    pub fn get(&self, address: &PciAddress) -> Option<&ControllerInfo> {
        self.cache.get(address)
    }

    /// Number of resolved controllers.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn lookup(&self, address: &PciAddress) -> ControllerInfo {
        let name = match self.source.pci_name(address) {
            Ok(name) => name,
            Err(e) => {
                log::warn!("cannot resolve controller {}: {}", address, e);
                format!("Unknown Controller [{}]", address)
            }
        };
        let force = self.force_cpu.contains(address);
        let is_cpu_direct = is_cpu_controller(&name, force);
        log::info!(
            "controller {} '{}': {}{}",
            address,
            name,
            if is_cpu_direct { "CPU" } else { "Chipset" },
            if force { " (forced)" } else { "" }
        );

        ControllerInfo {
            address: address.clone(),
            name,
            is_cpu_direct,
            label: self.labels.get(address.as_str()).cloned(),
        }
    }
}
