//! Energy and embodied carbon model applied to utilization records.

use std::sync::Arc;

use log::{debug, info};
use serde_json::Value;

use crate::config::{ModelConfig, RawModelConfig};
use crate::embodied::{EmbodiedEmissionsCalculator, ResourceShare};
use crate::error::{ModelError, Result};
use crate::power_model::{energy_kwh, power_model_for, PowerModel};
use crate::record::{Record, UtilizationRecord, EMBODIED_CARBON, ENERGY, TIMESTAMP};
use crate::registry::profile::InstanceProfile;
use crate::registry::InstanceMetricsRegistry;

/// Everything derived from a validated config.
#[derive(Clone)]
struct Setup {
    config: ModelConfig,
    profile: InstanceProfile,
    power_model: Box<dyn PowerModel>,
    embodied: EmbodiedEmissionsCalculator,
}

impl Setup {
    fn new(raw: &RawModelConfig, registry: &InstanceMetricsRegistry) -> Result<Self> {
        let (config, profile) = ModelConfig::resolve(raw, registry)?;
        Ok(Self {
            power_model: power_model_for(profile, config.interpolation)?,
            embodied: EmbodiedEmissionsCalculator::new(config.expected_lifespan, config.missing_embodied),
            profile: profile.clone(),
            config,
        })
    }

    fn apply(&self, record: &mut Record) -> Result<()> {
        let input = UtilizationRecord::parse(record)?;
        let power = self.power_model.get_power(input.cpu_utilization);
        let energy = energy_kwh(power, input.duration);

        let mut share = ResourceShare::of(&self.profile);
        if let Some(reserved) = input.resources_reserved {
            share.reserved = reserved;
        }
        if let Some(total) = input.resources_total {
            share.total = total;
        }
        let embodied_carbon = self.embodied.embodied_carbon(&self.profile, share, input.duration)?;

        debug!(
            "{} {} at {}: {:.1}% cpu, {:.3} W, {} kWh, {} g embodied",
            self.config.vendor,
            self.config.instance_type,
            input.timestamp,
            input.cpu_utilization,
            power,
            energy,
            embodied_carbon
        );
        record.insert(ENERGY.to_string(), Value::from(energy));
        record.insert(EMBODIED_CARBON.to_string(), Value::from(embodied_carbon));
        Ok(())
    }
}

/// Computes energy and embodied carbon of an instance for each utilization record.
///
/// The model must be configured with [`configure`](CarbonModel::configure) before records
/// can be processed with [`execute`](CarbonModel::execute).
/// Records may override config options for themselves by carrying the same keys.
#[derive(Clone)]
pub struct CarbonModel {
    registry: Arc<InstanceMetricsRegistry>,
    raw_config: RawModelConfig,
    setup: Option<Setup>,
}

impl CarbonModel {
    /// Creates an unconfigured model over a shared registry.
    pub fn new(registry: Arc<InstanceMetricsRegistry>) -> Self {
        Self {
            registry,
            raw_config: RawModelConfig::default(),
            setup: None,
        }
    }

    /// Validates `raw` and replaces the current config with it.
    ///
    /// On error the previous config (or unconfigured state) is kept.
    pub fn configure(&mut self, raw: RawModelConfig) -> Result<()> {
        let setup = Setup::new(&raw, &self.registry)?;
        info!(
            "Configured {} {} ({} interpolation, {} years lifespan)",
            setup.config.vendor, setup.config.instance_type, setup.config.interpolation, setup.config.expected_lifespan
        );
        self.raw_config = raw;
        self.setup = Some(setup);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.setup.is_some()
    }

    /// Returns the current config, if any.
    pub fn config(&self) -> Option<&ModelConfig> {
        self.setup.as_ref().map(|setup| &setup.config)
    }

    /// Adds `energy` (kWh) and `embodied-carbon` (g CO2e) to every record.
    ///
    /// Records are processed in order, the first invalid record aborts the whole call
    /// and the error names its index (and timestamp, when readable).
    pub fn execute(&self, mut records: Vec<Record>) -> Result<Vec<Record>> {
        let setup = self
            .setup
            .as_ref()
            .ok_or_else(|| ModelError::input("CarbonModel", "execute called before configure"))?;
        for (index, record) in records.iter_mut().enumerate() {
            self.apply(setup, record).map_err(|e| {
                let timestamp = record.get(TIMESTAMP).map(|t| t.as_str().map_or_else(|| t.to_string(), String::from));
                e.in_record(index, timestamp.as_deref())
            })?;
        }
        Ok(records)
    }

    fn apply(&self, setup: &Setup, record: &mut Record) -> Result<()> {
        let overrides = RawModelConfig::from_object(record)?;
        if overrides.is_empty() {
            setup.apply(record)
        } else {
            Setup::new(&self.raw_config.overlay(&overrides), &self.registry)?.apply(record)
        }
    }
}
