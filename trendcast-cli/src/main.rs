//! Trendcast CLI: analyze, train, fetch and cache management commands.
//!
//! Commands:
//! - `analyze`: enrich recent bars, print the latest rows and a trend verdict
//! - `train`: fit a sequence model offline and save it as a JSON artifact
//! - `fetch`: download bars from the exchange and snapshot them as Parquet
//! - `cache status` / `cache clean`: inspect or prune stored snapshots

mod render;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{prelude::*, EnvFilter};
use trendcast_core::data::{
    export_enriched_csv, fetch_or_empty, CachedProvider, CsvProvider, DataProvider,
    ExchangeRouter, FetchRequest, ParquetStore, SyntheticProvider, DEFAULT_LIMIT,
};
use trendcast_core::domain::{PriceSeries, Timeframe};
use trendcast_core::model::{train_from_series, ModelArtifact, TrainOptions};
use trendcast_core::{enrich, score, PipelineConfig};

#[derive(Parser)]
#[command(
    name = "trendcast",
    version,
    about = "Trendcast CLI: crypto indicator enrichment and trend scoring"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich recent bars with indicators and print a trend verdict.
    Analyze {
        #[command(flatten)]
        series: SeriesArgs,

        /// Trained model artifact (JSON). Without it the heuristic is used.
        #[arg(long)]
        model: Option<PathBuf>,

        /// Pipeline config (TOML). Defaults to the built-in pipeline.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of latest enriched rows to print.
        #[arg(long, default_value_t = 5)]
        tail: usize,

        /// Write the full enriched series to this CSV file.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Train a model offline and save it as a JSON artifact.
    Train {
        #[command(flatten)]
        series: SeriesArgs,

        /// Output path for the model artifact.
        #[arg(long)]
        out: PathBuf,

        /// Pipeline config (TOML). Defaults to the built-in pipeline.
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = 20)]
        epochs: usize,

        #[arg(long, default_value_t = 32)]
        batch_size: usize,

        /// Gradient descent step size.
        #[arg(long)]
        learning_rate: Option<f64>,

        /// Seed for weight init and shuffling.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Download bars and snapshot them into the Parquet cache.
    Fetch {
        #[command(flatten)]
        series: SeriesArgs,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Args)]
struct SeriesArgs {
    /// Pair in BASE/QUOTE form. INR pairs are served by CoinDCX.
    #[arg(long, default_value = "BTC/USDT")]
    symbol: String,

    /// Bar interval: 1m, 5m, 15m, 1h, 4h, 1d, 1w.
    #[arg(long, default_value = "1d")]
    timeframe: Timeframe,

    /// Number of most recent bars.
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    #[arg(long, value_enum, default_value_t = Source::Exchange)]
    source: Source,

    /// CSV file for `--source csv`.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Offline mode: read the Parquet cache only.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Cache directory. Defaults to ./data.
    #[arg(long, default_value = "data")]
    cache_dir: PathBuf,
}

impl SeriesArgs {
    fn request(&self) -> FetchRequest {
        FetchRequest::new(self.symbol.clone(), self.timeframe, self.limit)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Binance, or CoinDCX for INR pairs.
    Exchange,
    /// Local CSV file (`--csv`).
    Csv,
    /// Deterministic random walk.
    Synthetic,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached snapshots, their ranges and sizes.
    Status {
        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Remove snapshots not refreshed within the given number of days.
    Clean {
        /// Remove snapshots cached more than this many days ago.
        #[arg(long)]
        unused_days: u64,

        /// Cache directory. Defaults to ./data.
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    match cli.command {
        Commands::Analyze {
            series,
            model,
            config,
            tail,
            export,
        } => run_analyze(&series, model.as_deref(), config.as_deref(), tail, export.as_deref()),
        Commands::Train {
            series,
            out,
            config,
            epochs,
            batch_size,
            learning_rate,
            seed,
        } => {
            let defaults = TrainOptions::default();
            let opts = TrainOptions {
                epochs,
                batch_size,
                learning_rate: learning_rate.unwrap_or(defaults.learning_rate),
                seed: seed.unwrap_or(defaults.seed),
                ..defaults
            };
            run_train(&series, &out, config.as_deref(), &opts)
        }
        Commands::Fetch { series } => run_fetch(&series),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => run_cache_status(&cache_dir),
            CacheAction::Clean {
                unused_days,
                cache_dir,
                confirm,
            } => run_cache_clean(&cache_dir, unused_days, confirm),
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn provider_for(args: &SeriesArgs) -> Result<Box<dyn DataProvider>> {
    if args.offline {
        return Ok(Box::new(ParquetStore::new(&args.cache_dir)));
    }
    let provider: Box<dyn DataProvider> = match args.source {
        Source::Exchange => Box::new(CachedProvider::new(
            ExchangeRouter::new()?,
            Duration::from_secs(60),
        )),
        Source::Csv => {
            let Some(path) = &args.csv else {
                bail!("--source csv requires --csv PATH");
            };
            Box::new(CsvProvider::new(path))
        }
        Source::Synthetic => Box::new(SyntheticProvider::default()),
    };
    Ok(provider)
}

/// Fetch bars; a failed fetch is logged and yields an empty series.
fn load_series(args: &SeriesArgs) -> Result<PriceSeries> {
    let provider = provider_for(args)?;
    Ok(fetch_or_empty(provider.as_ref(), &args.request()))
}

fn run_analyze(
    args: &SeriesArgs,
    model_path: Option<&Path>,
    config_path: Option<&Path>,
    tail: usize,
    export: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let series = load_series(args)?;
    if series.is_empty() {
        println!(
            "No data available for {} {}. Check the symbol or try --offline / --source synthetic.",
            args.symbol, args.timeframe
        );
        return Ok(());
    }

    // An unreadable model is reported and scoring continues with the heuristic.
    let artifact = model_path.and_then(|path| match ModelArtifact::load(path) {
        Ok(artifact) => Some(artifact),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "model could not be loaded");
            None
        }
    });

    let enriched = enrich(series, &config.indicators);
    let verdict = score(&enriched, artifact.as_ref(), &config)?;

    render::print_header(&enriched);
    render::print_table(&enriched.tail(tail));
    println!();
    println!("{verdict}");
    render::print_verdict_details(&verdict);

    if let Some(path) = export {
        export_enriched_csv(&enriched, path)
            .with_context(|| format!("failed to export {}", path.display()))?;
        println!("Enriched series written to: {}", path.display());
    }
    Ok(())
}

fn run_train(
    args: &SeriesArgs,
    out: &Path,
    config_path: Option<&Path>,
    opts: &TrainOptions,
) -> Result<()> {
    let config = load_config(config_path)?;
    let series = load_series(args)?;
    if series.is_empty() {
        bail!("no data for {} {}", args.symbol, args.timeframe);
    }
    let bars = series.len();

    let (artifact, report) = train_from_series(series, &config, opts)?;
    artifact.save(out)?;

    println!();
    println!("=== Training Result ===");
    println!("Symbol:         {} {}", artifact.symbol, artifact.timeframe);
    println!("Bars:           {bars}");
    println!("Samples:        {}", report.samples);
    println!("Epochs:         {}", report.epochs);
    println!("Final loss:     {:.6}", report.final_loss);
    println!("Contract:       {}", config.short_hash());
    println!("Model saved to: {}", out.display());
    Ok(())
}

fn run_fetch(args: &SeriesArgs) -> Result<()> {
    if args.offline {
        bail!("fetch needs network access; drop --offline");
    }
    let provider = provider_for(args)?;
    let request = args.request();
    let series = provider
        .fetch(&request)
        .with_context(|| format!("fetch failed for {} {}", request.symbol, request.timeframe))?;

    let store = ParquetStore::new(&args.cache_dir);
    let meta = store.write(&series, provider.source_for(&request))?;
    println!(
        "Cached {} bars of {} {} ({} to {})",
        meta.bar_count, meta.symbol, meta.timeframe, meta.start, meta.end
    );
    Ok(())
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }
    let store = ParquetStore::new(cache_dir);
    let metas = store.status()?;
    if metas.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    let sizes: Vec<u64> = metas
        .iter()
        .map(|m| store.size_of(&m.symbol, m.timeframe))
        .collect();
    println!("Cache: {}", cache_dir.display());
    println!("Snapshots: {}", metas.len());
    println!("Total size: {}", render::format_size(sizes.iter().sum()));
    println!();
    render::print_cache_rows(&metas, &sizes);
    Ok(())
}

fn run_cache_clean(cache_dir: &Path, unused_days: u64, confirm: bool) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }
    let store = ParquetStore::new(cache_dir);
    let stale = store.clean(unused_days, !confirm)?;

    if stale.is_empty() {
        println!("No snapshots older than {unused_days} days to remove.");
        return Ok(());
    }

    println!(
        "Found {} snapshot(s) not refreshed in {unused_days} days:",
        stale.len()
    );
    for meta in &stale {
        println!("  {} {} (cached {})", meta.symbol, meta.timeframe, meta.cached_at);
    }

    if !confirm {
        println!();
        println!("Dry run: pass --confirm to actually delete.");
        return Ok(());
    }
    println!("Done. Removed {} snapshot(s).", stale.len());
    Ok(())
}
