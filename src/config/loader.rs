//! Configuration loading and management.

use crate::model::{ClassTable, DEFAULT_CLASSES, PciAddress};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Inheritance error: {0}")]
    Inheritance(String),
    #[error("Invalid class code for '{0}': {1:?} (expected two hex digits)")]
    ClassCode(String, String),
    #[error("Invalid PCI address in force_cpu: {0:?} (expected e.g. 0000:00:14.0)")]
    PciAddress(String),
}

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Global settings.
    #[serde(default)]
    pub settings: Settings,

    /// Controller labels by PCI address.
    #[serde(default)]
    pub controllers: HashMap<String, String>,

    /// Extra device classes by name (e.g., "printer" = "07").
    #[serde(default)]
    pub classes: HashMap<String, String>,
}

/// Global settings.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Colored text output.
    #[serde(default = "default_color")]
    pub color: bool,

    /// Output format used when none is given on the command line.
    #[serde(default = "default_format")]
    pub format: String,

    /// Include devices outside the class allow-list.
    #[serde(default)]
    pub show_all: bool,

    /// Program used to look up controller names.
    #[serde(default = "default_pci_tool")]
    pub pci_tool: String,

    /// Controllers to treat as CPU-direct whatever their name.
    #[serde(default)]
    pub force_cpu: Vec<String>,

    /// Class names making up the allow-list.
    #[serde(default = "default_classes")]
    pub default_classes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: default_color(),
            format: default_format(),
            show_all: false,
            pci_tool: default_pci_tool(),
            force_cpu: Vec::new(),
            default_classes: default_classes(),
        }
    }
}

fn default_color() -> bool {
    true
}

fn default_format() -> String {
    "text".to_string()
}

fn default_pci_tool() -> String {
    "lspci".to_string()
}

fn default_classes() -> Vec<String> {
    DEFAULT_CLASSES.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load configuration from default locations.
    /// Search order:
    /// 1. ./cpudirect.toml
    /// 2. ~/.config/cpudirect/config.toml
    /// 3. /etc/cpudirect.toml
    pub fn load() -> Result<Self, ConfigError> {
        let paths = Self::config_paths();

        for path in paths.into_iter().flatten() {
            if path.exists() {
                log::debug!("loading config from {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        // No config file found - use defaults
        Ok(Config::default())
    }

    /// Load configuration from a specific path, supporting inheritance.
    ///
    /// If the config file contains an `inherit` key (string or array of strings),
    /// the inherited files are loaded first and merged, with the current file's
    /// values taking priority.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let merged = read_and_flatten_toml(path, &mut seen)?;
        let config: Config = merged.try_into()?;
        Ok(config)
    }

    /// Get list of possible config paths.
    fn config_paths() -> Vec<Option<PathBuf>> {
        vec![
            std::env::current_dir()
                .ok()
                .map(|p| p.join("cpudirect.toml")),
            dirs::config_dir().map(|p| p.join("cpudirect").join("config.toml")),
            Some(PathBuf::from("/etc/cpudirect.toml")),
        ]
    }

    /// Builtin device classes extended by the `[classes]` table.
    pub fn class_table(&self) -> Result<ClassTable, ConfigError> {
        let mut table = ClassTable::default();
        for (name, code) in &self.classes {
            let parsed = u8::from_str_radix(code.trim().trim_start_matches("0x"), 16)
                .map_err(|_| ConfigError::ClassCode(name.clone(), code.clone()))?;
            table.insert(name, parsed);
        }
        Ok(table)
    }

    /// PCI addresses from `settings.force_cpu`.
    pub fn force_cpu(&self) -> Result<Vec<PciAddress>, ConfigError> {
        self.settings
            .force_cpu
            .iter()
            .map(|s| {
                PciAddress::parse(&s.to_lowercase())
                    .ok_or_else(|| ConfigError::PciAddress(s.clone()))
            })
            .collect()
    }

    /// Get label for a controller.
    pub fn controller_label(&self, pci_address: &str) -> Option<String> {
        self.controllers.get(pci_address).cloned()
    }
}

// =============================================================================
// TOML Inheritance Support
// =============================================================================

/// Read a TOML file and flatten any inheritance.
///
/// If the file contains an `inherit` key, the inherited files are loaded first
/// and merged. The `inherit` key can be:
/// - A string: single file to inherit from
/// - An array of strings: multiple files to inherit from (applied in order)
///
/// Paths in `inherit` are relative to the directory containing the config file.
fn read_and_flatten_toml(
    path: &Path,
    seen: &mut HashSet<PathBuf>,
) -> Result<toml::Value, ConfigError> {
    // Prevent circular inheritance
    let canonical = path.canonicalize().map_err(|e| {
        ConfigError::Inheritance(format!("cannot resolve {}: {}", path.display(), e))
    })?;

    if !seen.insert(canonical) {
        return Err(ConfigError::Inheritance(format!(
            "{} is inherited more than once; circular dependencies are not allowed",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let mut doc: toml::Value = toml::from_str(&content)?;

    let inherit = doc.as_table_mut().and_then(|table| table.remove("inherit"));
    let Some(inherit) = inherit else {
        return Ok(doc);
    };

    // Relative paths resolve against the directory of this config file
    let base_dir = path.parent().unwrap_or(Path::new("."));

    let inherited_paths: Vec<PathBuf> = match inherit {
        toml::Value::String(s) => vec![base_dir.join(&s)],
        toml::Value::Array(arr) => arr
            .into_iter()
            .map(|item| match item {
                toml::Value::String(s) => Ok(base_dir.join(&s)),
                _ => Err(ConfigError::Inheritance(
                    "inherit array must contain only strings".to_string(),
                )),
            })
            .collect::<Result<_, _>>()?,
        _ => {
            return Err(ConfigError::Inheritance(
                "inherit must be a string or array of strings".to_string(),
            ));
        }
    };

    let mut merged: Option<toml::Value> = None;
    for inherited_path in inherited_paths {
        let inherited = read_and_flatten_toml(&inherited_path, seen)?;
        merged = Some(match merged {
            Some(base) => merge_toml_values(base, inherited),
            None => inherited,
        });
    }

    // Current file wins over everything it inherits
    Ok(match merged {
        Some(base) => merge_toml_values(base, doc),
        None => doc,
    })
}

/// Deep-merge two TOML values.
///
/// - Tables are merged recursively (later values override earlier)
/// - Arrays are concatenated
/// - Other values are replaced by the later value
fn merge_toml_values(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_value) in overlay_table {
                let merged_value = match base_table.remove(&key) {
                    Some(base_value) => merge_toml_values(base_value, overlay_value),
                    None => overlay_value,
                };
                base_table.insert(key, merged_value);
            }
            toml::Value::Table(base_table)
        }
        (toml::Value::Array(mut base_arr), toml::Value::Array(overlay_arr)) => {
            base_arr.extend(overlay_arr);
            toml::Value::Array(base_arr)
        }
        (_, overlay) => overlay,
    }
}

/// Generate example configuration content.
pub fn example_config() -> &'static str {
    r#"# cpudirect configuration file
# Place in ./cpudirect.toml, ~/.config/cpudirect/config.toml, or /etc/cpudirect.toml
#
# inherit = "common.toml"

[settings]
# Colored text output
color = true
# Default output format: "text", "json", "csv" or "table"
format = "text"
# Include devices that are not HID/audio/video
show_all = false
# Program used to look up controller names
pci_tool = "lspci"
# Controllers known to be wired to the CPU, whatever lspci calls them
force_cpu = []
# Device classes checked by default
default_classes = ["hid", "audio", "video"]

# Controller labels (by PCI address)
[controllers]
# "0000:0c:00.3" = "Rear I/O (CPU)"
# "0000:02:00.0" = "Front panel"

# Extra device classes (name = USB interface class code, hex)
[classes]
# printer = "07"
# storage = "08"
"#
}
