//! ideal-fit - least-squares ideal function selection
//!
//! Imports the training, ideal and test CSVs into a sled table store, selects
//! the best-fitting ideal function per training series, classifies the test
//! points and stores the result table.
//!
//! # Usage
//!
//! ```bash
//! # Import data/*.csv, run, print the result table
//! ideal-fit
//!
//! # Use a specific config and store, skip charts
//! ideal-fit --config ideal_fit.toml --store /tmp/fit-db --no-charts run
//!
//! # Export a stored table
//! ideal-fit export --table result --output result.csv
//! ```
//!
//! # Environment Variables
//!
//! - `IDEAL_FIT_CONFIG`: Path to the config file (default: ./ideal_fit.toml)
//! - `RUST_LOG`: Logging level (default: info)

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use ideal_fit::acquisition::write_record_table;
use ideal_fit::charts::{ChartSink, JsonDirSink, NullSink};
use ideal_fit::config::validation::validate_input_files;
use ideal_fit::config::CONFIG_ENV_VAR;
use ideal_fit::{import_csv_inputs, run_with_store, AppConfig, TableRepository, TableStore};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "ideal-fit")]
#[command(about = "Least-squares ideal function selection and test point classification")]
#[command(version)]
struct CliArgs {
    /// Config file (default: ./ideal_fit.toml, then built-in defaults)
    #[arg(long, env = CONFIG_ENV_VAR, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Table store directory (overrides [store] path)
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Do not write chart files
    #[arg(long)]
    no_charts: bool,

    /// Chart output directory (overrides [charts] output_dir)
    #[arg(long, value_name = "DIR")]
    chart_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Import the input CSVs (if enabled), fit, classify and save the result
    Run,

    /// Import the three input CSVs into the store
    Import,

    /// Write a stored table as CSV
    Export {
        /// Stored table name
        #[arg(long)]
        table: String,
        /// Output file (default: stdout)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// List stored tables
    Tables,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout carries CSV output, so logs go to stderr
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
    }
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load(),
    };

    if let Some(store) = &args.store {
        config.store.path.clone_from(store);
    }
    if let Some(dir) = &args.chart_dir {
        config.charts.output_dir.clone_from(dir);
    }
    if args.no_charts {
        config.charts.enabled = false;
    }

    Ok(config)
}

fn open_store(config: &AppConfig) -> Result<TableStore> {
    TableStore::open(&config.store.path)
        .with_context(|| format!("Failed to open table store at {}", config.store.path.display()))
}

fn output_writer(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Failed to create {}", p.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}

fn cmd_run(config: &AppConfig, store: &TableStore) -> Result<()> {
    if config.input.import_on_run {
        for w in validate_input_files(config) {
            warn!("{}", w);
        }
        import_csv_inputs(store, &config.input, &config.tables)
            .context("Failed to import input CSVs")?;
    }

    let mut sink: Box<dyn ChartSink> = if config.charts.enabled {
        Box::new(JsonDirSink::create(&config.charts.output_dir).with_context(|| {
            format!("Failed to create chart directory {}", config.charts.output_dir.display())
        })?)
    } else {
        Box::new(NullSink)
    };

    let output = run_with_store(store, &config.tables, &mut *sink).context("Pipeline run failed")?;

    for fit in &output.best_fit {
        info!(
            train = %fit.train_column,
            ideal = %fit.ideal_column,
            ideal_index = fit.ideal_index,
            sse = fit.sum_squared_error,
            "Best fit"
        );
    }
    info!(
        assigned = output.stats.assigned,
        unassigned = output.stats.unassigned,
        dropped = output.stats.dropped_test_rows,
        charts = output.stats.charts_emitted,
        "Run complete"
    );

    write_record_table(&output.result, io::stdout().lock()).context("Failed to print result table")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = load_config(&args)?;
    let store = open_store(&config)?;

    match args.command.unwrap_or(SubCommand::Run) {
        SubCommand::Run => cmd_run(&config, &store)?,
        SubCommand::Import => {
            for w in validate_input_files(&config) {
                warn!("{}", w);
            }
            import_csv_inputs(&store, &config.input, &config.tables)
                .context("Failed to import input CSVs")?;
        }
        SubCommand::Export { table, output } => {
            let record = store
                .load_table(&table)
                .with_context(|| format!("Failed to load table '{table}'"))?;
            let writer = output_writer(output.as_ref())?;
            write_record_table(&record, writer).context("Failed to write CSV")?;
        }
        SubCommand::Tables => {
            let mut out = io::stdout().lock();
            for name in store.table_names().context("Failed to list tables")? {
                writeln!(out, "{name}")?;
            }
        }
    }

    store.close().context("Failed to flush table store")?;
    Ok(())
}
