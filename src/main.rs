mod analyzer;
mod config;
mod model;
mod nlp;
mod normalizer;
mod orchestrator;
mod parser;
mod registry;
mod sale;
mod scraper;
mod search;
mod storage;
mod utils;

use clap::{Parser, Subcommand};
use config::load_config;
use model::{ConfigError, PipelineError};
use nlp::{EntityCache, TextAnalyzer};
use orchestrator::{Orchestrator, RunReport};
use registry::Registry;
use scraper::{HttpMarketplace, Marketplace};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storage::SqliteStorage;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "salesman", about = "Finds comparable classified ads and prices your own")]
struct Args {
    /// JSON config file; missing means defaults.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: String,

    /// SQLite database file.
    #[arg(long, value_name = "FILE", default_value = "data.db")]
    db: String,

    /// Print the similar-sales table after each master.
    #[arg(long)]
    table: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process master sales from a '#'-delimited virtual sales file.
    RunFile { path: PathBuf },
    /// Process master sales by id (stored or fetched from the marketplace).
    RunId {
        #[arg(required = true)]
        sale_ids: Vec<String>,
    },
    /// Process every stored sale marked as the operator's own.
    RunDb,
    /// Re-read all open sales and record state changes.
    CheckStatus,
    /// Remove duplicate (sale_id, version) rows.
    Dedupe,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Panic occurred: {}", panic_info);
    }));

    let args = Args::parse();
    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(args: Args) -> Result<i32, PipelineError> {
    let config = Arc::new(load_config(&args.config)?);

    let registry = Arc::new(Registry::builtin());
    let cache = Arc::new(EntityCache::new(
        Duration::from_secs(config.cache.ttl_s),
        config.cache.capacity,
    ));
    let analyzer = Arc::new(TextAnalyzer::new(registry, Some(cache))?);

    let storage = Arc::new(Mutex::new(SqliteStorage::new(&args.db)?));
    let marketplace: Arc<dyn Marketplace> = Arc::new(
        HttpMarketplace::new(&config.http, config.search.result_cap)
            .map_err(|e| ConfigError::Invalid(format!("cannot build HTTP client: {}", e)))?,
    );

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current step...");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let orchestrator = Orchestrator::new(config, analyzer, storage, marketplace, cancel);
    let today = utils::today();

    match args.command {
        Command::RunFile { path } => {
            let report = orchestrator.run_file(&path, today).await?;
            Ok(finish_run(&report, args.table))
        }
        Command::RunId { sale_ids } => {
            let report = orchestrator.run_ids(&sale_ids, today).await?;
            Ok(finish_run(&report, args.table))
        }
        Command::RunDb => {
            let report = orchestrator.run_my_sales(today).await?;
            Ok(finish_run(&report, args.table))
        }
        Command::CheckStatus => {
            let report = orchestrator.check_status(today).await?;
            println!(
                "checked={} touched={} new_versions={} state_changes={} relations_closed={} deferred={}",
                report.checked,
                report.touched,
                report.new_versions,
                report.state_changes,
                report.relations_closed,
                report.network_failures
            );
            Ok(report.exit_code())
        }
        Command::Dedupe => {
            let removed = orchestrator.dedupe().await?;
            println!("removed={}", removed);
            Ok(0)
        }
    }
}

fn finish_run(report: &RunReport, table: bool) -> i32 {
    for master in &report.masters {
        let lifecycle = &master.lifecycle;
        info!(
            "{}: {} children ({} open, {} sold, {} vanished, {} withdrawn)",
            master.sale_id,
            lifecycle.children,
            lifecycle.open,
            lifecycle.sold,
            lifecycle.vanished,
            lifecycle.withdrawn
        );
        if let (Some(days), Some(share)) = (lifecycle.avg_days_on_market, lifecycle.sold_share) {
            info!("{}: {:.1} days on market, {:.0}% sold", master.sale_id, days, share * 100.0);
        }
        if !table {
            continue;
        }
        for row in &master.table {
            println!(
                "{}\t{:>8.2}\t{}\t{}\t{}\t{}\t{}\t{}",
                if row.is_outlier { "*" } else { " " },
                row.price_single,
                row.start_date,
                row.source,
                row.region,
                row.sub_category,
                row.sale_id,
                row.title
            );
        }
        let mut per_entity: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for point in &master.plot {
            per_entity.entry(&point.plot_category).or_default().push(point.price_single);
        }
        for (entity, prices) in per_entity {
            let mean = prices.iter().sum::<f64>() / prices.len() as f64;
            println!("  {}: {} sales, mean {:.2}", entity, prices.len(), mean);
        }
    }
    report.exit_code()
}
