use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

use carbon_models::config::RawModelConfig;
use carbon_models::error::{ModelError, Result};
use carbon_models::model::CarbonModel;
use carbon_models::record::Record;
use carbon_models::registry::loader::load_dir;
use carbon_models::registry::InstanceMetricsRegistry;
use carbon_models::vendor::Vendor;

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
/// Computes energy and embodied carbon of an instance for a trace of utilization records
struct Args {
    /// Path to YAML file with model configuration
    #[arg(short, long, required_unless_present = "list_instances")]
    config: Option<PathBuf>,

    /// Path to JSON file with an array of input records
    #[arg(short, long, required_unless_present = "list_instances")]
    input: Option<PathBuf>,

    /// Path to produced JSON file with enriched records (default - stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory with reference tables (default - bundled sample tables)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Print instance types known for the vendor and exit
    #[arg(long, value_name = "VENDOR")]
    list_instances: Option<Vendor>,
}

fn read_records(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    serde_json::from_str(&content).map_err(|e| ModelError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn io_error(path: &Path, source: std::io::Error) -> ModelError {
    ModelError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn run(args: Args) -> Result<()> {
    let registry = match &args.data {
        Some(dir) => InstanceMetricsRegistry::build(&load_dir(dir)?)?,
        None => InstanceMetricsRegistry::bundled()?,
    };

    if let Some(vendor) = args.list_instances {
        for profile in registry.profiles(vendor) {
            println!(
                "{}\t{} vCPU / {}\t{:.2}-{:.2} W\t{}",
                profile.name,
                profile.vcpus,
                profile.max_vcpus,
                profile.consumption.min_watts,
                profile.consumption.max_watts,
                if profile.consumption.calibration.is_some() {
                    "spline"
                } else {
                    "linear"
                }
            );
        }
        return Ok(());
    }

    let (Some(config), Some(input)) = (args.config, args.input) else {
        return Err(ModelError::InputValidation {
            component: "carbon-estimate",
            message: "--config and --input are required".to_string(),
        });
    };

    let mut model = CarbonModel::new(Arc::new(registry));
    model.configure(RawModelConfig::from_file(&config)?)?;
    let records = read_records(&input)?;
    info!("Read {} records from {}", records.len(), input.display());
    let records = model.execute(records)?;

    let json = serde_json::to_string_pretty(&records).map_err(|e| ModelError::Parse {
        path: "output".to_string(),
        message: e.to_string(),
    })?;
    match args.output {
        Some(path) => std::fs::File::create(&path)
            .and_then(|mut file| file.write_all(json.as_bytes()))
            .map_err(|source| io_error(&path, source)),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
