//! Model configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::embodied::MissingEmbodied;
use crate::error::{ModelError, Result};
use crate::power_model::Interpolation;
use crate::registry::profile::InstanceProfile;
use crate::registry::InstanceMetricsRegistry;
use crate::vendor::Vendor;

pub const VENDOR: &str = "vendor";
pub const INSTANCE_TYPE: &str = "instance-type";
pub const EXPECTED_LIFESPAN: &str = "expected-lifespan";
pub const INTERPOLATION: &str = "interpolation";
pub const MISSING_EMBODIED: &str = "missing-embodied";

/// Default expected host lifespan in years.
pub const DEFAULT_EXPECTED_LIFESPAN: f64 = 4.;

/// Holds raw model config as read from YAML file or a flat key-value object.
///
/// All fields are optional, defaults are applied and values are validated by [`ModelConfig::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawModelConfig {
    pub vendor: Option<String>,
    pub instance_type: Option<String>,
    pub expected_lifespan: Option<f64>,
    pub interpolation: Option<String>,
    pub missing_embodied: Option<String>,
}

impl RawModelConfig {
    /// Reads raw config from YAML file.
    pub fn from_file(file_name: impl AsRef<Path>) -> Result<Self> {
        let path = file_name.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|e| ModelError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Picks recognized options from a flat key-value object, other keys are ignored.
    pub fn from_object(object: &Map<String, Value>) -> Result<Self> {
        Ok(Self {
            vendor: string_option(object, VENDOR)?,
            instance_type: string_option(object, INSTANCE_TYPE)?,
            expected_lifespan: match object.get(EXPECTED_LIFESPAN) {
                None | Some(Value::Null) => None,
                Some(value) => Some(value.as_f64().ok_or_else(|| {
                    ModelError::input("Config", format!("'{}' must be a number, got {}", EXPECTED_LIFESPAN, value))
                })?),
            },
            interpolation: string_option(object, INTERPOLATION)?,
            missing_embodied: string_option(object, MISSING_EMBODIED)?,
        })
    }

    /// Returns true if no option is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Returns a copy of `self` with every option set in `other` replaced.
    pub fn overlay(&self, other: &RawModelConfig) -> RawModelConfig {
        RawModelConfig {
            vendor: other.vendor.clone().or_else(|| self.vendor.clone()),
            instance_type: other.instance_type.clone().or_else(|| self.instance_type.clone()),
            expected_lifespan: other.expected_lifespan.or(self.expected_lifespan),
            interpolation: other.interpolation.clone().or_else(|| self.interpolation.clone()),
            missing_embodied: other.missing_embodied.clone().or_else(|| self.missing_embodied.clone()),
        }
    }
}

fn string_option(object: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(value) => Err(ModelError::input(
            "Config",
            format!("'{}' must be a string, got {}", key, value),
        )),
    }
}

/// Represents validated model configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelConfig {
    /// Vendor whose tables are used.
    pub vendor: Vendor,
    /// Instance type, present in the registry for the vendor.
    pub instance_type: String,
    /// Expected host lifespan in years.
    pub expected_lifespan: f64,
    /// Power curve interpolation strategy.
    pub interpolation: Interpolation,
    /// Policy for instance types without embodied emissions data.
    pub missing_embodied: MissingEmbodied,
}

impl ModelConfig {
    /// Applies defaults to `raw` and validates it against `registry`.
    ///
    /// Returns the config together with the selected instance profile.
    pub fn resolve<'a>(
        raw: &RawModelConfig,
        registry: &'a InstanceMetricsRegistry,
    ) -> Result<(Self, &'a InstanceProfile)> {
        let vendor = match &raw.vendor {
            Some(vendor) => vendor.parse()?,
            None => Vendor::default(),
        };
        let instance_type = raw
            .instance_type
            .clone()
            .ok_or_else(|| ModelError::input("Config", format!("'{}' is required", INSTANCE_TYPE)))?;
        let profile = registry.profile(vendor, &instance_type).ok_or_else(|| {
            ModelError::unsupported(
                "Config",
                "instance-type",
                &instance_type,
                format!("not found in {} reference tables", vendor),
            )
        })?;
        let expected_lifespan = raw.expected_lifespan.unwrap_or(DEFAULT_EXPECTED_LIFESPAN);
        if !expected_lifespan.is_finite() || expected_lifespan <= 0. {
            return Err(ModelError::input(
                "Config",
                format!("'{}' must be a positive number of years, got {}", EXPECTED_LIFESPAN, expected_lifespan),
            ));
        }
        let interpolation: Interpolation = match &raw.interpolation {
            Some(interpolation) => interpolation.parse()?,
            None => Interpolation::default(),
        };
        if interpolation == Interpolation::Spline && profile.consumption.calibration.is_none() {
            return Err(ModelError::unsupported(
                "Config",
                "interpolation",
                interpolation,
                format!("{} {} has no four-point calibration data", vendor, instance_type),
            ));
        }
        let missing_embodied = match &raw.missing_embodied {
            Some(policy) => policy.parse()?,
            None => MissingEmbodied::default(),
        };
        let config = Self {
            vendor,
            instance_type,
            expected_lifespan,
            interpolation,
            missing_embodied,
        };
        Ok((config, profile))
    }
}
