use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;

use clinic_outcomes::aggregation::Aggregator;
use clinic_outcomes::api::DashboardMetadata;
use clinic_outcomes::config::Config;
use clinic_outcomes::output::{save_dashboard, DashboardReport};
use clinic_outcomes::period::Period;
use clinic_outcomes::service::{dashboard_response, ClinicOutcomesService};
use clinic_outcomes::simulation::CohortSimulator;
use clinic_outcomes::source::DirectorySource;

#[derive(Parser)]
#[command(name = "clinic-outcomes")]
#[command(about = "Time in Range and GMI summaries for clinic dashboards")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a synthetic cohort for the 30, 60 and 90 day windows
    Generate {
        /// Output directory for the reading files
        #[arg(short, long)]
        output: PathBuf,

        /// Number of active patients
        #[arg(short, long)]
        patients: Option<usize>,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Aggregate one period's readings into dashboard summaries
    Summarize {
        /// Directory holding time_in_range_<days>d and gmi_<days>d files
        #[arg(short, long)]
        data: PathBuf,

        /// Period in days; anything other than 30, 60 or 90 means 30
        #[arg(short, long, default_value = "30")]
        period: String,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory for the JSON, CSV and markdown outputs
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let config = Config::from_file(path)
                .with_context(|| format!("failed to load configuration from {:?}", path))?;
            info!("Loaded configuration from {:?}", path);
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    match cli.command {
        Command::Generate { output, patients, seed, config } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(patients) = patients {
                config.cohort.active_patients = patients;
            }

            match seed {
                Some(seed) => info!("Generating cohort (seed: {})", seed),
                None => info!("Generating cohort (random seed)"),
            }

            let mut simulator = CohortSimulator::new(config, seed)?;
            let cohort = simulator.simulate()?;

            let target = DirectorySource::new(&output);
            for (period, readings) in &cohort.periods {
                target
                    .write_period(*period, readings)
                    .with_context(|| format!("failed to write {} readings to {:?}", period, output))?;
            }
            info!("Cohort of {} patients written to {:?}", cohort.profiles.len(), output);
        }

        Command::Summarize { data, period, config, output } => {
            let config = load_config(config.as_ref())?;
            let period = Period::parse_lenient(&period);
            let now = Utc::now();

            let service = ClinicOutcomesService::new(DirectorySource::new(&data), Aggregator::new(config.clone()));
            let (time_in_range, gmi) = service
                .summarize(period)
                .with_context(|| format!("failed to summarize readings in {:?}", data))?;
            if time_in_range.active_patient_count == 0 {
                warn!("No patient in {:?} has enough readings for {}", data, period);
            }

            let response = dashboard_response(period, &time_in_range, &gmi, now);
            println!("{}", serde_json::to_string_pretty(&response)?);

            if let Some(output) = output {
                let metadata = DashboardMetadata::for_period(period, now);
                let report = DashboardReport {
                    response: &response,
                    time_in_range: &time_in_range,
                    gmi: &gmi,
                    metadata: &metadata,
                    config: &config,
                };
                let written = save_dashboard(&report, &output)
                    .with_context(|| format!("failed to save output to {:?}", output))?;
                info!("Wrote {} files", written.len());
            }
        }
    }

    Ok(())
}
