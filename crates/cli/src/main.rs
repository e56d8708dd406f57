mod args;
mod rundir;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use farehound_core::{
    combine_legs, load_config, plan_tasks, validate_config, write_grouped_report, write_trips_csv,
    AnthropicClient, Config, CsvLegStore, ErrorLog, FlightsApiSearcher, JsonProgressStore,
    LegSearcher, LegStore, LlmClient, PageExtractSearcher, ProgressStore, ReportContext,
    SearchOrchestrator, SearcherBackend,
};

use args::Args;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    if let Err(msg) = args.validate() {
        bail!("{}", msg);
    }

    // Load configuration
    info!("Loading configuration from {:?}", args.config);
    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;
    validate_config(&config).context("Configuration validation failed")?;

    // Pick or create the run directory; everything durable lives in it.
    let run_dir = match &args.resume_dir {
        Some(dir) => {
            if !dir.is_dir() {
                bail!("--resume-dir {} is not a directory", dir.display());
            }
            dir.clone()
        }
        None => rundir::create_run_dir(Path::new("runs"), chrono::Utc::now().date_naive())?,
    };
    info!("Run output: {}", run_dir.display());

    let leg_store = Arc::new(CsvLegStore::new(run_dir.join("legs.csv")));
    let progress_store = Arc::new(JsonProgressStore::in_dir(&run_dir));
    let error_log = Arc::new(ErrorLog::new(run_dir.join("errors.log")));

    if !args.combine_only {
        let mut progress = progress_store
            .load()
            .context("Failed to load progress file")?;
        if args.retry_failed {
            let reopened = progress.failed().len();
            progress.retry_failed();
            info!(reopened, "Resubmitting previously-failed tasks");
        }

        let tasks = plan_tasks(
            &config.search,
            args.start_date,
            args.end_date,
            progress.completed(),
        );
        info!(
            origin = %config.search.origin,
            destinations = config.search.destinations.len(),
            remaining = tasks.len(),
            already_done = progress.completed_count(),
            "Planned search matrix"
        );

        if tasks.is_empty() {
            info!("All searches already complete");
        } else {
            let searcher = build_searcher(&config)?;
            let orchestrator = SearchOrchestrator::new(
                config.orchestrator.clone(),
                config.search.clone(),
                searcher,
                leg_store.clone(),
                progress_store.clone(),
                error_log,
            );

            // Ctrl-c stops dispatch and triggers the final progress flush.
            let shutdown = orchestrator.shutdown_handle();
            tokio::spawn(async move {
                if signal::ctrl_c().await.is_ok() {
                    shutdown.shutdown();
                }
            });

            let (summary, _) = orchestrator.run(tasks, progress).await?;
            if summary.skipped > 0 {
                warn!(
                    skipped = summary.skipped,
                    "Run interrupted; progress saved, rerun to continue"
                );
            }
        }
    }

    build_reports(&config, &run_dir, leg_store.as_ref())?;
    Ok(())
}

fn build_searcher(config: &Config) -> Result<Arc<dyn LegSearcher>> {
    match config.searcher.backend {
        SearcherBackend::FlightsApi => {
            let api_config = config
                .searcher
                .flights_api
                .clone()
                .context("flights_api config missing")?;
            info!(url = %api_config.url, "Using flights API backend");
            Ok(Arc::new(FlightsApiSearcher::new(api_config)))
        }
        SearcherBackend::PageExtract => {
            let page_config = config
                .searcher
                .page_extract
                .clone()
                .context("page_extract config missing")?;
            let extractor_config = config
                .extractor
                .clone()
                .context("extractor config missing")?;

            let mut llm = AnthropicClient::new(
                extractor_config.api_key.clone(),
                extractor_config.model.clone(),
            );
            if let Some(api_base) = &extractor_config.api_base {
                llm = llm.with_api_base(api_base.clone());
            }
            let llm: Arc<dyn LlmClient> = Arc::new(llm);
            info!(
                url = %page_config.search_url,
                model = llm.model(),
                "Using page-extract backend"
            );
            Ok(Arc::new(PageExtractSearcher::new(
                page_config,
                extractor_config,
                llm,
            )))
        }
    }
}

/// Post-processing: rebuild round trips from the leg store and write the
/// ranked CSV plus the grouped report.
fn build_reports(config: &Config, run_dir: &Path, leg_store: &dyn LegStore) -> Result<()> {
    let legs = leg_store.load().context("Failed to load leg store")?;
    if legs.is_empty() {
        info!("No legs stored yet, skipping reports");
        return Ok(());
    }

    let trips = combine_legs(&legs, &config.search.trip_lengths);
    if trips.is_empty() {
        info!("No round trips could be built yet");
        return Ok(());
    }

    let trips_path = run_dir.join("flights_filtered.csv");
    write_trips_csv(&trips_path, &trips).context("Failed to write ranked trips")?;

    let report_path = run_dir.join("flights_report.md");
    write_grouped_report(
        &report_path,
        &trips,
        &legs,
        &ReportContext {
            origin: &config.search.origin,
            adults: config.search.adults,
            trip_lengths: &config.search.trip_lengths,
            config: &config.report,
        },
    )
    .context("Failed to write grouped report")?;

    info!(
        trips = trips.len(),
        cheapest = trips.first().map(|t| t.total_price).unwrap_or(0),
        ranked = %trips_path.display(),
        report = %report_path.display(),
        "Reports written"
    );

    // Console summary of the best finds.
    println!("\nTop 20 cheapest round trips:");
    println!(
        "{:<5} {:<20} {:<12} {:<12} {:>4} {:>7}  {:<16} {:<16}",
        "Dest", "City", "Depart", "Return", "Days", "Total", "Outbound", "Return"
    );
    for trip in trips.iter().take(20) {
        println!(
            "{:<5} {:<20} {:<12} {:<12} {:>4} {:>6}$  {:<16} {:<16}",
            trip.destination,
            trip.city_name,
            trip.depart_date,
            trip.return_date,
            trip.trip_days,
            trip.total_price,
            trip.outbound_airline,
            trip.return_airline,
        );
    }

    Ok(())
}
