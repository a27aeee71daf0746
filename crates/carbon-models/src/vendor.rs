//! Cloud vendors with bundled reference tables.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Holds supported cloud vendors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    #[default]
    Aws,
    Gcp,
    Azure,
}

impl Vendor {
    /// All supported vendors.
    pub const ALL: [Vendor; 3] = [Vendor::Aws, Vendor::Gcp, Vendor::Azure];

    /// Lowercase name used in configs and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Aws => "aws",
            Vendor::Gcp => "gcp",
            Vendor::Azure => "azure",
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = ModelError;

    fn from_str(input: &str) -> Result<Vendor, Self::Err> {
        match input {
            "aws" => Ok(Vendor::Aws),
            "gcp" => Ok(Vendor::Gcp),
            "azure" => Ok(Vendor::Azure),
            _ => Err(ModelError::unsupported(
                "Config",
                "vendor",
                input,
                "expected one of 'aws', 'gcp', 'azure'",
            )),
        }
    }
}
