//! Cache writer binary.
//!
//! `trend-worker --once` refreshes every target and exits (non-zero when all
//! targets failed). Without `--once` and with `CACHE_INTERVAL_SECS` set it
//! repeats on that period until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trend_firestore::{FirestoreClient, FirestoreTrendStore, MemoryStore, StoreBackend, TrendCacheStore};
use trend_llm::{LlmClient, TrendAnalyzer};
use trend_worker::{CacheRunReport, CacheWriter, CacheWriterConfig};
use trend_youtube::TrendingClient;

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("trend_worker=info".parse().unwrap())
        .add_directive("trend_firestore=info".parse().unwrap())
        .add_directive("trend_youtube=info".parse().unwrap())
        .add_directive("trend_llm=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting trend-worker");

    let config = match CacheWriterConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid cache writer configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Cache writer config: {:?}", config);

    let once = std::env::args().any(|a| a == "--once") || config.interval.is_none();

    let writer = match build_writer(config).await {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to initialize cache writer: {:#}", e);
            std::process::exit(1);
        }
    };

    if once {
        let report = writer.run_once().await;
        log_report(&report);
        if report.all_failed() {
            error!("Every target failed");
            std::process::exit(1);
        }
        return;
    }

    if let Some(port) = writer.config().metrics_port {
        if let Err(e) = PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()
        {
            warn!("Failed to start metrics exporter: {}", e);
        }
    }

    run_loop(writer).await;
    info!("Worker shutdown complete");
}

async fn build_writer(config: CacheWriterConfig) -> anyhow::Result<CacheWriter> {
    let fetcher = TrendingClient::from_env().context("trending API client")?;
    let analyzer = TrendAnalyzer::new(LlmClient::from_env().context("LLM client")?);

    let store: Arc<dyn TrendCacheStore> = match config.store_backend {
        StoreBackend::Firestore => {
            let client = FirestoreClient::from_env().await.context("Firestore client")?;
            Arc::new(FirestoreTrendStore::new(
                client,
                FirestoreTrendStore::collection_from_env(),
            ))
        }
        StoreBackend::Memory => {
            warn!("STORE_BACKEND=memory: documents are discarded when the worker exits");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(CacheWriter::new(config, fetcher, analyzer, store))
}

async fn run_loop(writer: CacheWriter) {
    let Some(period) = writer.config().interval else {
        return;
    };
    info!(interval_secs = period.as_secs(), "Running cache writer on an interval");

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                break;
            }
            _ = ticker.tick() => {
                let report = writer.run_once().await;
                log_report(&report);
                if report.all_failed() {
                    warn!("Every target failed this run, retrying next interval");
                }
            }
        }
    }
}

fn log_report(report: &CacheRunReport) {
    for entry in &report.outcomes {
        info!(
            run_id = %report.run_id,
            target_key = %entry.target,
            outcome = entry.outcome.label(),
            elapsed_ms = entry.elapsed_ms,
            "{:?}",
            entry.outcome
        );
    }
    match serde_json::to_string(report) {
        Ok(json) => info!(run_id = %report.run_id, report = %json, "Cache run report"),
        Err(e) => warn!("Failed to serialize run report: {}", e),
    }
}
