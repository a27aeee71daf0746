//! Microarchitecture name normalization and wattage tables.

use std::collections::BTreeMap;

use crate::error::{ModelError, Result};
use crate::registry::tables::WattageRange;

/// Key of the synthetic entry averaging all architectures of a vendor.
pub const AVERAGE: &str = "Average";

/// Per-vCPU wattage bounds of a microarchitecture, in W.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchitectureWattage {
    pub min_watts: f64,
    pub max_watts: f64,
}

/// Parses the raw table and adds the [`AVERAGE`] entry.
///
/// Entries with unparseable wattages are skipped.
pub fn wattage_table(raw: &BTreeMap<String, WattageRange>) -> BTreeMap<String, ArchitectureWattage> {
    let mut table: BTreeMap<String, ArchitectureWattage> = raw
        .iter()
        .filter_map(|(name, range)| {
            let min_watts = range.min_watts.value()?;
            let max_watts = range.max_watts.value()?;
            Some((name.clone(), ArchitectureWattage { min_watts, max_watts }))
        })
        .collect();
    if !table.is_empty() && !table.contains_key(AVERAGE) {
        let count = table.len() as f64;
        let average = ArchitectureWattage {
            min_watts: table.values().map(|a| a.min_watts).sum::<f64>() / count,
            max_watts: table.values().map(|a| a.max_watts).sum::<f64>() / count,
        };
        table.insert(AVERAGE.to_string(), average);
    }
    table
}

/// Maps a microarchitecture name as written in instance tables to the key used in wattage tables.
pub fn canonical_name(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_prefix("AMD ").unwrap_or(name);
    if name.contains("Skylake") {
        "Sky Lake".to_string()
    } else if name.contains("Graviton") {
        if name.contains('2') {
            "Graviton2".to_string()
        } else {
            "Graviton".to_string()
        }
    } else if name.contains("Unknown") {
        AVERAGE.to_string()
    } else {
        name.to_string()
    }
}

/// Resolves a comma separated list of microarchitectures against the wattage table.
pub fn resolve<'a>(
    microarchitecture: &str,
    table: &'a BTreeMap<String, ArchitectureWattage>,
) -> Result<Vec<&'a ArchitectureWattage>> {
    let names: Vec<&str> = microarchitecture
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return Err(ModelError::unsupported(
            "InstanceMetricsRegistry",
            "microarchitecture",
            microarchitecture,
            "no architecture listed",
        ));
    }
    names
        .into_iter()
        .map(|name| {
            let key = canonical_name(name);
            table.get(&key).ok_or_else(|| {
                ModelError::unsupported(
                    "InstanceMetricsRegistry",
                    "microarchitecture",
                    name,
                    format!("no wattage entry for '{}'", key),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names() {
        assert_eq!(canonical_name("AMD EPYC 2nd Gen"), "EPYC 2nd Gen");
        assert_eq!(canonical_name("Skylake"), "Sky Lake");
        assert_eq!(canonical_name("Intel Xeon Skylake-SP"), "Sky Lake");
        assert_eq!(canonical_name("AWS Graviton2"), "Graviton2");
        assert_eq!(canonical_name("Graviton"), "Graviton");
        assert_eq!(canonical_name("Unknown"), "Average");
        assert_eq!(canonical_name("Cascade Lake"), "Cascade Lake");
    }

    #[test]
    fn average_entry() {
        let mut raw = BTreeMap::new();
        raw.insert(
            "A".to_string(),
            WattageRange {
                min_watts: 1.0.into(),
                max_watts: 3.0.into(),
            },
        );
        raw.insert(
            "B".to_string(),
            WattageRange {
                min_watts: "2,0".into(),
                max_watts: "5,0".into(),
            },
        );
        let table = wattage_table(&raw);
        assert_eq!(table[AVERAGE], ArchitectureWattage { min_watts: 1.5, max_watts: 4. });
    }

    #[test]
    fn unresolvable_architecture() {
        let table = wattage_table(&BTreeMap::new());
        assert!(resolve("Pentium", &table).unwrap_err().is_unsupported_value());
    }
}
