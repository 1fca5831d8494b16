//! Binary entrypoint: `twin`
//!
//! Runs scenario batches against the offline example generator and prints
//! JSON to stdout. Logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use twin_core::{CandidateArtifact, ResourceType};
use twin_engine::{
    apply_operation, extract_document, BatchRunner, DeviceOperation, DeviceRequest, EngineConfig,
    ExampleGenerator, Orchestrator, Strictness,
};

#[derive(Parser, Debug)]
#[command(name = "twin", version, about = "Synthetic Redfish/Swordfish device generator")]
struct Cli {
    /// Engine configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available scenarios
    Scenarios,

    /// Run a scenario batch and print the batch report
    Run {
        /// Scenario key (ex: enterprise_storage)
        scenario: String,

        #[arg(long)]
        concurrency: Option<usize>,

        #[arg(long)]
        retry_budget: Option<u32>,

        /// compliant | presentation_ready
        #[arg(long)]
        strictness: Option<Strictness>,
    },

    /// Generate devices of one resource type
    Generate {
        resource_type: ResourceType,

        #[arg(long, default_value_t = 1)]
        count: u32,

        #[arg(long)]
        profile: Option<String>,
    },

    /// Validate a document file and print the scored result
    Validate {
        resource_type: ResourceType,

        file: PathBuf,
    },

    /// Apply a device operation to a document file and print the new state
    Operate {
        resource_type: ResourceType,

        file: PathBuf,

        /// power_on | power_off | reset | maintenance | test
        operation: DeviceOperation,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Scenarios => {
            let catalog = config.scenario_catalog()?;
            let listing: Vec<_> = catalog
                .keys()
                .filter_map(|key| catalog.get(key).ok().map(|s| (key, s)))
                .map(|(key, scenario)| {
                    serde_json::json!({
                        "key": key,
                        "name": scenario.name,
                        "description": scenario.description,
                        "devices": scenario.devices,
                        "target_score": scenario.target_score,
                    })
                })
                .collect();
            print_json(&listing)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Run {
            scenario,
            concurrency,
            retry_budget,
            strictness,
        } => {
            let mut config = config;
            if let Some(concurrency) = concurrency {
                config.concurrency = concurrency;
            }
            if let Some(budget) = retry_budget {
                config.orchestrator.retry_budget = budget;
            }
            if let Some(strictness) = strictness {
                config.orchestrator.strictness = strictness;
            }
            config.validate()?;

            let catalog = config.scenario_catalog()?;
            let selected = catalog.get(&scenario)?;
            let runner = batch_runner(&config)?;

            let report = runner
                .run_labelled(
                    Some(scenario.clone()),
                    Some(selected.target_score),
                    selected.requests(),
                )
                .await;
            print_json(&report)?;
            Ok(exit_code(report.statistics.exhausted == 0))
        }

        Commands::Generate {
            resource_type,
            count,
            profile,
        } => {
            if count == 0 {
                bail!("--count must be at least 1");
            }
            let requests = (1..=count)
                .map(|instance_id| {
                    let request = DeviceRequest::new(resource_type, instance_id);
                    match &profile {
                        Some(profile) => request.with_profile(profile.clone()),
                        None => request,
                    }
                })
                .collect();

            let report = batch_runner(&config)?.run(requests).await;
            print_json(&report)?;
            Ok(exit_code(report.statistics.exhausted == 0))
        }

        Commands::Validate { resource_type, file } => {
            let artifact = read_artifact(resource_type, &file)?;
            let validator = config.build_validator()?;
            let result = validator.validate(&artifact);
            print_json(&result)?;
            Ok(exit_code(result.is_compliant))
        }

        Commands::Operate {
            resource_type,
            file,
            operation,
        } => {
            let artifact = read_artifact(resource_type, &file)?;
            let next = apply_operation(&artifact, operation)?;
            let result = config.build_validator()?.validate(&next);
            print_json(&serde_json::json!({
                "operation": operation,
                "document": next.document(),
                "validation": result,
            }))?;
            Ok(exit_code(result.is_compliant))
        }
    }
}

/// File config (or defaults), then environment overrides
fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let config = config.with_env_overrides()?;
    config.validate()?;
    Ok(config)
}

fn read_artifact(resource_type: ResourceType, file: &Path) -> Result<CandidateArtifact> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let document = extract_document(twin_core::RawContent::Text(text))
        .with_context(|| format!("parsing {}", file.display()))?;
    Ok(CandidateArtifact::new(resource_type, document))
}

fn batch_runner(config: &EngineConfig) -> Result<BatchRunner> {
    let validator = config.build_validator()?.shared();
    let generator = Arc::new(ExampleGenerator::redfish()?);
    let orchestrator = Orchestrator::new(generator, validator, config.orchestrator.clone());
    Ok(BatchRunner::new(Arc::new(orchestrator), config.concurrency))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 2 signals "ran fine, but something was not accepted"
fn exit_code(all_good: bool) -> ExitCode {
    if all_good {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags_parse() {
        let cli = Cli::try_parse_from([
            "twin",
            "run",
            "cloud_native",
            "--retry-budget",
            "5",
            "--strictness",
            "presentation-ready",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                scenario,
                retry_budget,
                strictness,
                ..
            } => {
                assert_eq!(scenario, "cloud_native");
                assert_eq!(retry_budget, Some(5));
                assert_eq!(strictness, Some(Strictness::PresentationReady));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_resource_type_argument_is_parsed() {
        let cli = Cli::try_parse_from(["twin", "generate", "storage_pool", "--count", "3"]).unwrap();
        match cli.command {
            Commands::Generate { resource_type, count, .. } => {
                assert_eq!(resource_type, ResourceType::StoragePool);
                assert_eq!(count, 3);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_operate_arguments_are_parsed() {
        let cli = Cli::try_parse_from(["twin", "operate", "drive", "drive.json", "power-off"]).unwrap();
        match cli.command {
            Commands::Operate {
                resource_type,
                file,
                operation,
            } => {
                assert_eq!(resource_type, ResourceType::Drive);
                assert_eq!(file, PathBuf::from("drive.json"));
                assert_eq!(operation, DeviceOperation::PowerOff);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["twin", "operate", "drive", "drive.json", "explode"]).is_err());
    }

    #[test]
    fn test_unknown_resource_type_is_rejected() {
        assert!(Cli::try_parse_from(["twin", "generate", "toaster"]).is_err());
    }
}
