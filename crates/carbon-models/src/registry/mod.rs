//! Instance metrics registry: standardized power profiles of all supported instance types.

pub mod architecture;
pub mod loader;
pub mod profile;
pub mod tables;

use std::collections::BTreeMap;

use log::{info, warn};

use crate::error::{ModelError, Result};
use crate::registry::profile::{CalibrationPoints, InstanceProfile, PowerConsumption};
use crate::registry::tables::{InstanceRow, RawNumber, ReferenceTables, VendorTables};
use crate::vendor::Vendor;

/// Read-only registry of instance profiles, keyed by vendor and instance type name.
///
/// Built once from [`ReferenceTables`] and then shared between models.
#[derive(Debug, Clone, Default)]
pub struct InstanceMetricsRegistry {
    vendors: BTreeMap<Vendor, BTreeMap<String, InstanceProfile>>,
}

impl InstanceMetricsRegistry {
    /// Builds profiles of all instance types listed in the tables.
    ///
    /// Fails if an instance references a microarchitecture missing from the vendor wattage table,
    /// or if its vCPU count is missing.
    pub fn build(tables: &ReferenceTables) -> Result<Self> {
        let mut vendors = BTreeMap::new();
        for (vendor, vendor_tables) in tables.vendors.iter() {
            let profiles = build_vendor(*vendor, vendor_tables)?;
            info!("Built {} instance profiles for {}", profiles.len(), vendor);
            vendors.insert(*vendor, profiles);
        }
        Ok(Self { vendors })
    }

    /// Builds the registry from the sample tables bundled with the crate.
    pub fn bundled() -> Result<Self> {
        Self::build(&loader::bundled_tables()?)
    }

    /// Returns the profile of `instance_type` offered by `vendor`.
    pub fn profile(&self, vendor: Vendor, instance_type: &str) -> Option<&InstanceProfile> {
        self.vendors.get(&vendor)?.get(instance_type)
    }

    /// Returns the vendors present in the registry.
    pub fn vendors(&self) -> impl Iterator<Item = Vendor> + '_ {
        self.vendors.keys().copied()
    }

    /// Returns the names of instance types offered by `vendor`, sorted.
    pub fn instance_types(&self, vendor: Vendor) -> impl Iterator<Item = &str> + '_ {
        self.vendors
            .get(&vendor)
            .into_iter()
            .flat_map(|profiles| profiles.keys().map(String::as_str))
    }

    /// Returns the profiles offered by `vendor`, sorted by name.
    pub fn profiles(&self, vendor: Vendor) -> impl Iterator<Item = &InstanceProfile> + '_ {
        self.vendors.get(&vendor).into_iter().flat_map(|profiles| profiles.values())
    }
}

fn build_vendor(vendor: Vendor, tables: &VendorTables) -> Result<BTreeMap<String, InstanceProfile>> {
    let wattages = architecture::wattage_table(&tables.architectures);
    let mut profiles = BTreeMap::new();
    for row in tables.instances.iter() {
        let profile = build_profile(row, &wattages)?;
        if profile.vcpus > profile.max_vcpus {
            warn!(
                "{} {}: {} vCPUs exceed {} platform vCPUs",
                vendor, profile.name, profile.vcpus, profile.max_vcpus
            );
        }
        profiles.insert(profile.name.clone(), profile);
    }

    for row in tables.embodied.iter() {
        let Some(profile) = profiles.get_mut(&row.instance_type) else {
            continue;
        };
        match row.total.value() {
            Some(total) if total >= 0. => profile.embodied_emission = Some(total),
            _ => warn!("{} {}: invalid embodied emissions {:?}", vendor, row.instance_type, row.total),
        }
    }
    let missing = profiles.values().filter(|p| p.embodied_emission.is_none()).count();
    if missing > 0 {
        warn!("{} instance types of {} have no embodied emissions data", missing, vendor);
    }
    Ok(profiles)
}

fn build_profile(
    row: &InstanceRow,
    wattages: &BTreeMap<String, architecture::ArchitectureWattage>,
) -> Result<InstanceProfile> {
    let vcpus = parse_count(row, "vCPU", row.vcpus.as_ref())?.ok_or_else(|| {
        ModelError::input(
            "InstanceMetricsRegistry",
            format!("instance type '{}' has no vCPU count", row.name),
        )
    })?;
    let max_vcpus = parse_count(row, "platform vCPU", row.platform_vcpus.as_ref())?.unwrap_or(vcpus);

    let architectures = architecture::resolve(&row.microarchitecture, wattages)?;
    let count = architectures.len() as f64;
    let min_watts = architectures.iter().map(|a| a.min_watts).sum::<f64>() / count * vcpus as f64;
    let max_watts = architectures.iter().map(|a| a.max_watts).sum::<f64>() / count * vcpus as f64;

    Ok(InstanceProfile {
        name: row.name.clone(),
        vcpus,
        max_vcpus,
        consumption: PowerConsumption {
            min_watts,
            max_watts,
            calibration: parse_calibration(row)?,
        },
        embodied_emission: None,
    })
}

fn parse_count(row: &InstanceRow, column: &str, cell: Option<&RawNumber>) -> Result<Option<u32>> {
    let Some(value) = cell.and_then(RawNumber::value) else {
        return Ok(None);
    };
    if value < 1. || value.fract() != 0. || value > u32::MAX as f64 {
        return Err(ModelError::input(
            "InstanceMetricsRegistry",
            format!("instance type '{}' has invalid {} count {}", row.name, column, value),
        ));
    }
    Ok(Some(value as u32))
}

/// Four-point data is used only when all four cells are present.
fn parse_calibration(row: &InstanceRow) -> Result<Option<CalibrationPoints>> {
    let cells = [&row.idle, &row.ten_percent, &row.fifty_percent, &row.full];
    let values: Vec<f64> = cells
        .iter()
        .filter_map(|cell| cell.as_ref().and_then(RawNumber::value))
        .collect();
    if values.len() != cells.len() {
        return Ok(None);
    }
    if let Some(negative) = values.iter().find(|v| **v < 0.) {
        return Err(ModelError::input(
            "InstanceMetricsRegistry",
            format!("instance type '{}' has negative calibration wattage {}", row.name, negative),
        ));
    }
    Ok(Some(CalibrationPoints {
        idle: values[0],
        ten_percent: values[1],
        fifty_percent: values[2],
        full: values[3],
    }))
}
