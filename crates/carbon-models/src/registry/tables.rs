//! Raw vendor hardware tables as they come from reference data files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::vendor::Vendor;

/// Number cell which may be stored as a number or as a string with `.` or `,` decimal separator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    /// Returns the parsed value, `None` for empty, malformed or non-finite cells.
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            RawNumber::Number(value) => *value,
            RawNumber::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                text.replace(',', ".").parse().ok()?
            }
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Number(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

/// Per-vCPU wattage range of a CPU microarchitecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WattageRange {
    #[serde(rename = "Min Watts")]
    pub min_watts: RawNumber,
    #[serde(rename = "Max Watts")]
    pub max_watts: RawNumber,
}

/// Row of a microarchitecture table in CSV form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureRow {
    #[serde(rename = "Architecture")]
    pub architecture: String,
    #[serde(rename = "Min Watts")]
    pub min_watts: RawNumber,
    #[serde(rename = "Max Watts")]
    pub max_watts: RawNumber,
}

/// Row of an instance type table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRow {
    #[serde(rename = "Instance type", alias = "Machine type", alias = "Virtual Machine")]
    pub name: String,
    /// One or more microarchitecture names separated by commas.
    #[serde(rename = "Microarchitecture")]
    pub microarchitecture: String,
    #[serde(rename = "Instance vCPU", alias = "Instance vCPUs", default)]
    pub vcpus: Option<RawNumber>,
    #[serde(
        rename = "Platform vCPU (highest vCPU possible)",
        alias = "Platform vCPUs (highest vCPU possible)",
        default
    )]
    pub platform_vcpus: Option<RawNumber>,
    #[serde(rename = "Instance @ Idle", default)]
    pub idle: Option<RawNumber>,
    #[serde(rename = "Instance @ 10%", default)]
    pub ten_percent: Option<RawNumber>,
    #[serde(rename = "Instance @ 50%", default)]
    pub fifty_percent: Option<RawNumber>,
    #[serde(rename = "Instance @ 100%", default)]
    pub full: Option<RawNumber>,
}

/// Row of an embodied emissions table, `total` is in kg CO2e.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbodiedRow {
    #[serde(rename = "type")]
    pub instance_type: String,
    pub total: RawNumber,
}

/// Raw tables of one vendor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorTables {
    pub architectures: BTreeMap<String, WattageRange>,
    pub instances: Vec<InstanceRow>,
    pub embodied: Vec<EmbodiedRow>,
}

impl VendorTables {
    /// Adds architecture rows, later rows replace earlier ones with the same name.
    pub fn with_architecture_rows(mut self, rows: impl IntoIterator<Item = ArchitectureRow>) -> Self {
        for row in rows {
            let wattage = WattageRange {
                min_watts: row.min_watts,
                max_watts: row.max_watts,
            };
            self.architectures.insert(row.architecture, wattage);
        }
        self
    }
}

/// Raw tables of all vendors, consumed by [`InstanceMetricsRegistry::build`](super::InstanceMetricsRegistry::build).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTables {
    pub vendors: BTreeMap<Vendor, VendorTables>,
}

impl ReferenceTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vendor(mut self, vendor: Vendor, tables: VendorTables) -> Self {
        self.vendors.insert(vendor, tables);
        self
    }
}
