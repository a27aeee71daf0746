//! Loading of reference tables from JSON or CSV files.
//!
//! A data directory holds up to three files per vendor:
//! `<vendor>-architectures`, `<vendor>-instances` and `<vendor>-embodied`,
//! each either `.json` or `.csv`. Vendors without an instances file are skipped.

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::de::DeserializeOwned;

use crate::error::{ModelError, Result};
use crate::registry::tables::{ArchitectureRow, ReferenceTables, VendorTables, WattageRange};
use crate::vendor::Vendor;

const BUNDLED: [(Vendor, &str, &str, &str); 3] = [
    (
        Vendor::Aws,
        include_str!("../../data/aws-architectures.json"),
        include_str!("../../data/aws-instances.json"),
        include_str!("../../data/aws-embodied.json"),
    ),
    (
        Vendor::Gcp,
        include_str!("../../data/gcp-architectures.json"),
        include_str!("../../data/gcp-instances.json"),
        include_str!("../../data/gcp-embodied.json"),
    ),
    (
        Vendor::Azure,
        include_str!("../../data/azure-architectures.json"),
        include_str!("../../data/azure-instances.json"),
        include_str!("../../data/azure-embodied.json"),
    ),
];

/// Returns the sample tables bundled with the crate.
pub fn bundled_tables() -> Result<ReferenceTables> {
    let mut tables = ReferenceTables::new();
    for (vendor, architectures, instances, embodied) in BUNDLED {
        let source = format!("bundled {} tables", vendor);
        tables = tables.with_vendor(vendor, vendor_tables_from_json(&source, architectures, instances, embodied)?);
    }
    Ok(tables)
}

/// Parses tables of one vendor from JSON strings.
///
/// The architectures table is an object keyed by architecture name, the other two are arrays of rows.
pub fn vendor_tables_from_json(
    source: &str,
    architectures: &str,
    instances: &str,
    embodied: &str,
) -> Result<VendorTables> {
    Ok(VendorTables {
        architectures: parse_json(source, architectures)?,
        instances: parse_json(source, instances)?,
        embodied: parse_json(source, embodied)?,
    })
}

/// Loads tables of all vendors found in `dir`.
///
/// Fails with [`ModelError::Io`] if `dir` is not a directory.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<ReferenceTables> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ModelError::Io {
            path: dir.display().to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        });
    }
    let mut tables = ReferenceTables::new();
    for vendor in Vendor::ALL {
        let Some(instances) = find_table(dir, vendor, "instances") else {
            debug!("No instance table for {} in {}", vendor, dir.display());
            continue;
        };
        let mut vendor_tables = VendorTables {
            instances: read_rows(&instances)?,
            ..VendorTables::default()
        };
        if let Some(path) = find_table(dir, vendor, "architectures") {
            vendor_tables = if is_csv(&path) {
                vendor_tables.with_architecture_rows(read_csv::<ArchitectureRow>(&path)?)
            } else {
                VendorTables {
                    architectures: read_json::<BTreeMap<String, WattageRange>>(&path)?,
                    ..vendor_tables
                }
            };
        }
        if let Some(path) = find_table(dir, vendor, "embodied") {
            vendor_tables.embodied = read_rows(&path)?;
        }
        info!(
            "Loaded {} tables from {}: {} architectures, {} instance types, {} embodied rows",
            vendor,
            dir.display(),
            vendor_tables.architectures.len(),
            vendor_tables.instances.len(),
            vendor_tables.embodied.len()
        );
        tables = tables.with_vendor(vendor, vendor_tables);
    }
    Ok(tables)
}

fn find_table(dir: &Path, vendor: Vendor, kind: &str) -> Option<PathBuf> {
    ["json", "csv"]
        .iter()
        .map(|ext| dir.join(format!("{}-{}.{}", vendor, kind, ext)))
        .find(|path| path.is_file())
}

fn is_csv(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "csv")
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if is_csv(path) {
        read_csv(path)
    } else {
        read_json(path)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_reader(file).map_err(|e| ModelError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let parse_error = |e: csv::Error| ModelError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    let mut reader = csv::Reader::from_path(path).map_err(parse_error)?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()
        .map_err(parse_error)
}

fn parse_json<T: DeserializeOwned>(source: &str, json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| ModelError::Parse {
        path: source.to_string(),
        message: e.to_string(),
    })
}
