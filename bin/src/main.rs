//! CLI for the anomalies predictor library.
//!
//! This binary lists the available predictors, shows their metadata, and
//! computes predictor files from a directory of intermediate tables.

use anomalies::{
    PredictorConfig, PredictorInfo, PredictorRegistry, TableSet, WarehouseConfig, write_csv,
};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "anomalies")]
#[command(about = "Point-in-time anomaly predictors from Compustat and CRSP panels", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all available predictors
    List,
    /// Show information about a specific predictor
    Info {
        /// Predictor name
        predictor: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute one predictor and write `<out-dir>/<NAME>.csv`
    Run {
        /// Predictor name
        predictor: String,
        /// Directory holding the intermediate tables
        #[arg(long, default_value = "pyData/Intermediate")]
        data_dir: PathBuf,
        /// Directory receiving predictor files
        #[arg(long, default_value = "pyData/Predictors")]
        out_dir: PathBuf,
        /// Override the predictor's publication lag, in months
        #[arg(long)]
        publication_lag: Option<u32>,
    },
    /// Compute every predictor
    RunAll {
        /// Directory holding the intermediate tables
        #[arg(long, default_value = "pyData/Intermediate")]
        data_dir: PathBuf,
        /// Directory receiving predictor files
        #[arg(long, default_value = "pyData/Predictors")]
        out_dir: PathBuf,
    },
    /// Validate warehouse credentials and print the connection URL
    CheckWarehouse {
        /// Read credentials from this file instead of `./.env`
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut registry = PredictorRegistry::with_defaults();

    match cli.command {
        Commands::List => list_predictors(&registry),
        Commands::Info { predictor, json } => show_predictor_info(&registry, &predictor, json)?,
        Commands::Run {
            predictor,
            data_dir,
            out_dir,
            publication_lag,
        } => {
            if let Some(lag) = publication_lag {
                registry.configure(&predictor, PredictorConfig::with_publication_lag(lag))?;
            }
            run_predictor(&registry, &predictor, &data_dir, &out_dir)?;
        }
        Commands::RunAll { data_dir, out_dir } => run_all(&registry, &data_dir, &out_dir)?,
        Commands::CheckWarehouse { env_file } => check_warehouse(env_file.as_deref())?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// List all available predictors grouped by category.
fn list_predictors(registry: &PredictorRegistry) {
    let mut by_category: BTreeMap<String, Vec<PredictorInfo>> = BTreeMap::new();
    for info in registry.all_info() {
        by_category
            .entry(info.category.to_string())
            .or_default()
            .push(info);
    }

    println!("Available Predictors ({} total)\n", registry.len());

    for (category, predictors) in by_category {
        println!("{}:", category);
        for info in predictors {
            println!("  {} - {}", info.name, info.description);
        }
        println!();
    }
}

fn find_info(registry: &PredictorRegistry, name: &str) -> Result<PredictorInfo> {
    let all_info = registry.all_info();
    match all_info.iter().find(|p| p.name == name) {
        Some(info) => Ok(info.clone()),
        None => {
            let available: Vec<_> = all_info.iter().map(|p| p.name.as_str()).collect();
            bail!(
                "predictor '{}' not found; available: {}",
                name,
                available.join(", ")
            )
        }
    }
}

/// Show detailed information about a specific predictor.
fn show_predictor_info(registry: &PredictorRegistry, name: &str, json: bool) -> Result<()> {
    let info = find_info(registry, name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Predictor: {}", info.name);
    println!("Category: {}", info.category);
    println!("Description: {}", info.description);
    println!("Publication lag: {} months", info.publication_lag);
    for (table, columns) in &info.inputs {
        println!("Table {}:", table);
        for column in columns {
            println!("  - {}", column);
        }
    }
    Ok(())
}

/// Compute one predictor and write its file.
fn run_predictor(
    registry: &PredictorRegistry,
    name: &str,
    data_dir: &Path,
    out_dir: &Path,
) -> Result<()> {
    let info = find_info(registry, name)?;
    let Some(predictor) = registry.get(&info.name) else {
        bail!("predictor '{}' not found", name);
    };

    info!(predictor = name, data_dir = %data_dir.display(), "starting");
    let tables = TableSet::from_dir(data_dir);
    let mut frame = predictor
        .compute(&tables)
        .with_context(|| format!("computing {name}"))?;
    let path = write_csv(&mut frame, out_dir, name)?;

    println!("{} rows -> {}", frame.height(), path.display());
    Ok(())
}

/// Compute every predictor and write one file per predictor.
fn run_all(registry: &PredictorRegistry, data_dir: &Path, out_dir: &Path) -> Result<()> {
    let tables = TableSet::from_dir(data_dir);
    let results = registry
        .compute_all(&tables)
        .with_context(|| format!("computing predictors from {}", data_dir.display()))?;

    for (name, mut frame) in results {
        let path = write_csv(&mut frame, out_dir, &name)?;
        println!("{:<12} {:>10} rows -> {}", name, frame.height(), path.display());
    }
    Ok(())
}

/// Load warehouse credentials and print the redacted connection URL.
fn check_warehouse(env_file: Option<&Path>) -> Result<()> {
    let config = match env_file {
        Some(path) => WarehouseConfig::from_env_file(path)?,
        None => WarehouseConfig::from_env()?,
    };
    println!("{}", config.redacted_url()?);
    Ok(())
}
