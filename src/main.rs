use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use literature_reconciler::{
    config::{Config, ConfigOverrides},
    logging::init_logging,
    normalize, CsvResultRepository, Harvester, PipelineReport, ReconcilePipeline, SourceName,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(
    name = "literature-reconciler",
    about = "Harvest literature-search APIs and reconcile duplicate records across sources",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory receiving the result files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Earliest publication year kept in the unique results
    #[arg(long, global = true)]
    min_year: Option<i64>,

    /// Log level or filter directives (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Query every enabled source and reconcile the results.
    Harvest,

    /// Re-run reconciliation from per-source files in the output directory.
    Reconcile {
        /// Comma-separated sources in union order (default: enabled sources)
        #[arg(long, value_delimiter = ',')]
        sources: Vec<String>,
    },

    /// Print the processed title used as the duplicate key.
    Normalize { title: String },

    /// Print the effective configuration with secrets masked.
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_overrides(&ConfigOverrides {
        output_dir: cli.output_dir.clone(),
        min_year: cli.min_year,
        log_level: cli.log_level.clone(),
        json_logs: cli.json_logs,
    });
    config.validate().context("Invalid configuration")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Harvest => harvest(&config).await,
        Commands::Reconcile { sources } => reconcile_stored(&config, &sources).await,
        Commands::Normalize { title } => {
            println!("{}", normalize(Some(&title)));
            Ok(())
        }
        Commands::ShowConfig => {
            let rendered = toml::to_string_pretty(&config.redacted())
                .context("Failed to render configuration")?;
            print!("{rendered}");
            Ok(())
        }
    }
}

fn pipeline(config: &Config) -> ReconcilePipeline {
    let repository = Arc::new(CsvResultRepository::new(&config.output.directory));
    ReconcilePipeline::new(repository).with_min_year(config.output.min_publication_year)
}

async fn harvest(config: &Config) -> Result<()> {
    config
        .validate_for_harvest()
        .context("Configuration is not ready for harvesting")?;

    let harvester = Harvester::from_config(config).context("Failed to set up source providers")?;
    info!("Harvesting from {} sources", harvester.sources().len());

    let result = harvester
        .harvest()
        .await
        .map_err(literature_reconciler::Error::from)
        .context("Harvest failed")?;
    for (source, message) in &result.provider_errors {
        error!("{} stopped early: {}", source, message);
    }

    let report = pipeline(config)
        .run(result.batches)
        .await
        .context("Failed to reconcile harvested records")?;
    print_report(&report, config);
    Ok(())
}

async fn reconcile_stored(config: &Config, sources: &[String]) -> Result<()> {
    let sources: Vec<SourceName> = if sources.is_empty() {
        config.sources.enabled()
    } else {
        sources
            .iter()
            .map(|name| name.trim().parse())
            .collect::<literature_reconciler::Result<_>>()
            .context("Invalid --sources value")?
    };

    let pipeline = pipeline(config);
    let batches = pipeline
        .load_stored(&sources)
        .await
        .with_context(|| format!("Failed to load stored results from {}", config.output.directory.display()))?;

    let report = pipeline
        .run(batches)
        .await
        .context("Failed to reconcile stored records")?;
    print_report(&report, config);
    Ok(())
}

fn print_report(report: &PipelineReport, config: &Config) {
    for (source, count) in &report.per_source {
        println!("{:<22} {count:>6}", source.display_name());
    }
    println!("{:<22} {:>6}", "Total", report.total_records);
    println!("{:<22} {:>6}", "Distinct titles", report.distinct_titles);
    println!(
        "{:<22} {:>6}",
        format!("Unique (>= {})", config.output.min_publication_year),
        report.unique_records
    );
    println!("{:<22} {:>6}", "Repeated", report.repeated_records);
    println!("Results written to {}", config.output.directory.display());

    if let Some(skipped) = &report.year_filter_skipped {
        warn!("Year filter skipped: {}", skipped);
        println!("Warning: unique results are not year-filtered ({skipped})");
    }
}
