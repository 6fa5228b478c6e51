//! ChurnCause CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod ingest;
mod pipeline;
mod report;
mod results;

use config::PipelineConfig;

#[derive(Parser)]
#[command(name = "churncause")]
#[command(about = "ChurnCause - causal analysis of customer churn drivers")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    /// Pipeline configuration (YAML, or JSON when the extension is `.json`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis: clean, charts, causal model, refutations, results file
    Run {
        /// Input CSV (defaults to the configured input)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory for charts and the results file
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Seed for refutations and bootstrap intervals
        #[arg(long)]
        seed: Option<u64>,

        /// Simulations per refuter
        #[arg(long)]
        num_simulations: Option<usize>,

        /// Raster resolution of PNG charts
        #[arg(long)]
        dpi: Option<u32>,

        /// Write the JSON summary to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the JSON summary to stdout instead of the text report.
        #[arg(long)]
        json: bool,

        /// Write a reproducible run bundle (meta.json, inputs/, outputs/) into this directory
        #[arg(long)]
        bundle: Option<PathBuf>,
    },

    /// Clean and encode the input, writing the result as CSV
    Clean {
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Cleaned CSV output
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Exploratory charts only
    Eda {
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Identification, estimation and refutation (pretty JSON)
    Estimate {
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        num_simulations: Option<usize>,

        /// Output file for results (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a synthetic Telco-style churn dataset (CSV)
    GenerateData {
        /// Output CSV
        #[arg(short, long)]
        output: PathBuf,

        /// Number of customers
        #[arg(long, default_value = "1000")]
        rows: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Run { input, out_dir, seed, num_simulations, dpi, output, json, bundle } => {
            let overrides = Overrides { input, out_dir, seed, num_simulations, dpi };
            cmd_run(cfg, overrides, output.as_ref(), json, bundle.as_ref())
        }
        Commands::Clean { input, output } => {
            cmd_clean(cfg.with(Overrides { input, ..Default::default() }), &output)
        }
        Commands::Eda { input, out_dir } => {
            cmd_eda(cfg.with(Overrides { input, out_dir, ..Default::default() }))
        }
        Commands::Estimate { input, seed, num_simulations, output } => cmd_estimate(
            cfg.with(Overrides { input, seed, num_simulations, ..Default::default() }),
            output.as_ref(),
        ),
        Commands::GenerateData { output, rows, seed } => cmd_generate_data(&output, rows, seed),
        Commands::Version => {
            println!("churncause {}", cc_core::VERSION);
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(p) => config::read_pipeline_config(p),
        None => Ok(PipelineConfig::default()),
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
struct Overrides {
    input: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    seed: Option<u64>,
    num_simulations: Option<usize>,
    dpi: Option<u32>,
}

impl PipelineConfig {
    fn with(mut self, o: Overrides) -> Self {
        if let Some(input) = o.input {
            self.input = input;
        }
        if let Some(dir) = o.out_dir {
            self.out_dir = dir;
        }
        if let Some(seed) = o.seed {
            self.refute.random_seed = Some(seed);
            self.eda.grouped.seed = seed;
        }
        if let Some(n) = o.num_simulations {
            self.refute.num_simulations = n;
        }
        if let Some(dpi) = o.dpi {
            self.render.dpi = dpi;
        }
        self
    }
}

fn cmd_run(
    cfg: PipelineConfig,
    overrides: Overrides,
    output: Option<&PathBuf>,
    json: bool,
    bundle: Option<&PathBuf>,
) -> Result<()> {
    let args = serde_json::json!({
        "input": overrides.input,
        "out_dir": overrides.out_dir,
        "seed": overrides.seed,
        "num_simulations": overrides.num_simulations,
        "dpi": overrides.dpi,
    });
    let cfg = cfg.with(overrides);
    let viz = cfg.viz_config()?;
    if let Some(dir) = bundle {
        report::ensure_empty_dir(dir)?;
    }

    let summary = pipeline::run_pipeline(&cfg, &viz, !json)?;
    let value = serde_json::to_value(&summary)?;

    if let Some(dir) = bundle {
        report::write_bundle(dir, "run", args, &cfg.input, &value)?;
    }
    if let Some(path) = output {
        write_json(Some(path), value.clone())?;
    }
    if json {
        write_json(None, value)?;
    }
    Ok(())
}

fn cmd_clean(cfg: PipelineConfig, output: &PathBuf) -> Result<()> {
    let cleaned = pipeline::clean(pipeline::load(&cfg)?, &cfg)?;
    ingest::write_csv_table(&cleaned.table, output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    write_json(None, serde_json::to_value(&cleaned.report)?)
}

fn cmd_eda(cfg: PipelineConfig) -> Result<()> {
    let viz = cfg.viz_config()?;
    let cleaned = pipeline::clean(pipeline::load(&cfg)?, &cfg)?;
    let paths = pipeline::render_eda(&cleaned, &cfg, &viz)?;
    let artifacts: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    write_json(None, serde_json::json!({ "artifacts": artifacts }))
}

fn cmd_estimate(cfg: PipelineConfig, output: Option<&PathBuf>) -> Result<()> {
    let cleaned = pipeline::clean(pipeline::load(&cfg)?, &cfg)?;
    let graph = pipeline::causal_graph(&cfg)?;
    let analysis = pipeline::analyze(&cleaned, &graph, &cfg)?;

    let mut value = serde_json::to_value(&analysis)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("input".into(), serde_json::json!(cfg.input.display().to_string()));
        obj.insert("cleaning".into(), serde_json::to_value(&cleaned.report)?);
        obj.insert("dot".into(), serde_json::json!(graph.to_dot()));
    }
    write_json(output, value)
}

fn cmd_generate_data(output: &PathBuf, rows: usize, seed: u64) -> Result<()> {
    let config = cc_inference::TelcoDataConfig { n_customers: rows, seed, ..Default::default() };
    let table = cc_inference::generate_telco_table(&config)?;
    ingest::write_csv_table(&table, output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    write_json(
        None,
        serde_json::json!({
            "output": output.display().to_string(),
            "n": table.n_rows(),
            "columns": table.column_names(),
            "config": {
                "n_customers": config.n_customers,
                "new_customer_fraction": config.new_customer_fraction,
                "contract_log_odds": config.contract_log_odds,
                "seed": config.seed,
            },
        }),
    )
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
