//! Cache writer: fetch, analyze and store one document per target.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn, Instrument};
use trend_firestore::TrendCacheStore;
use trend_llm::TrendAnalyzer;
use trend_models::{AnalysisOutcome, CachedRegionDocument, ContentType, RegionCode};
use trend_youtube::TrendingClient;
use uuid::Uuid;

use crate::config::CacheWriterConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::RunLogger;

/// One (region, content type) pair refreshed by the writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub country: RegionCode,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
}

impl Target {
    pub fn new(country: RegionCode, content_type: Option<ContentType>) -> Self {
        Self {
            country,
            content_type,
        }
    }

    /// Document id this target writes.
    pub fn key(&self) -> String {
        CachedRegionDocument::document_id(&self.country, self.content_type)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// What happened to one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetOutcome {
    /// Document replaced.
    Written { videos: usize },
    /// Nothing fetched; the previous document is untouched.
    Skipped { reason: String },
    /// Nothing written; the previous document is untouched.
    Failed { error: String },
}

impl TargetOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TargetOutcome::Written { .. } => "written",
            TargetOutcome::Skipped { .. } => "skipped",
            TargetOutcome::Failed { .. } => "failed",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TargetOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub target: Target,
    #[serde(flatten)]
    pub outcome: TargetOutcome,
    pub elapsed_ms: u64,
}

/// Summary of one pass over every configured target.
#[derive(Debug, Clone, Serialize)]
pub struct CacheRunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// In target order.
    pub outcomes: Vec<TargetReport>,
}

impl CacheRunReport {
    /// True when there was at least one target and none succeeded or skipped.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|r| r.outcome.is_failed())
    }

    pub fn count(&self, label: &str) -> usize {
        self.outcomes
            .iter()
            .filter(|r| r.outcome.label() == label)
            .count()
    }

    pub fn outcome_for(&self, key: &str) -> Option<&TargetOutcome> {
        self.outcomes
            .iter()
            .find(|r| r.target.key() == key)
            .map(|r| &r.outcome)
    }
}

/// Refreshes cached region documents.
#[derive(Clone)]
pub struct CacheWriter {
    config: CacheWriterConfig,
    fetcher: TrendingClient,
    analyzer: TrendAnalyzer,
    store: Arc<dyn TrendCacheStore>,
}

impl CacheWriter {
    pub fn new(
        config: CacheWriterConfig,
        fetcher: TrendingClient,
        analyzer: TrendAnalyzer,
        store: Arc<dyn TrendCacheStore>,
    ) -> Self {
        Self {
            config,
            fetcher,
            analyzer,
            store,
        }
    }

    pub fn config(&self) -> &CacheWriterConfig {
        &self.config
    }

    /// Regions crossed with content types, or one unscoped target per region.
    pub fn targets(&self) -> Vec<Target> {
        self.config
            .regions
            .iter()
            .flat_map(|region| {
                if self.config.content_types.is_empty() {
                    vec![Target::new(region.clone(), None)]
                } else {
                    self.config
                        .content_types
                        .iter()
                        .map(|ct| Target::new(region.clone(), Some(*ct)))
                        .collect()
                }
            })
            .collect()
    }

    /// Process every target once.
    ///
    /// At most `max_concurrency` targets run at a time. Each runs in its own
    /// task under `target_timeout`, so a panic or a hang is reported as that
    /// target's failure and the rest carry on.
    pub async fn run_once(&self) -> CacheRunReport {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let targets = self.targets();

        info!(
            run_id = %run_id,
            targets = targets.len(),
            max_concurrency = self.config.max_concurrency,
            "Cache run started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut join_set = JoinSet::new();

        for (index, target) in targets.iter().cloned().enumerate() {
            let writer = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let logger = RunLogger::new(&run_id, &target);

            join_set.spawn(async move {
                let started = Instant::now();
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => writer.process_isolated(target.clone(), logger).await,
                    Err(e) => TargetOutcome::Failed {
                        error: WorkerError::TaskAborted(e.to_string()).to_string(),
                    },
                };
                let elapsed = started.elapsed();
                (
                    index,
                    TargetReport {
                        target,
                        outcome,
                        elapsed_ms: elapsed.as_millis() as u64,
                    },
                )
            });
        }

        let mut reports: Vec<Option<TargetReport>> = vec![None; targets.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, report)) => {
                    counter!("trend_cache_targets_total", "outcome" => report.outcome.label())
                        .increment(1);
                    histogram!("trend_cache_target_duration_seconds")
                        .record(report.elapsed_ms as f64 / 1000.0);
                    reports[index] = Some(report);
                }
                Err(e) => warn!(run_id = %run_id, error = %e, "Cache target task failed to join"),
            }
        }

        // An empty slot means the outer task itself died.
        let outcomes = reports
            .into_iter()
            .zip(targets)
            .map(|(report, target)| {
                report.unwrap_or(TargetReport {
                    target,
                    outcome: TargetOutcome::Failed {
                        error: WorkerError::TaskAborted("task lost".to_string()).to_string(),
                    },
                    elapsed_ms: 0,
                })
            })
            .collect();

        let report = CacheRunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };

        info!(
            run_id = %report.run_id,
            written = report.count("written"),
            skipped = report.count("skipped"),
            failed = report.count("failed"),
            duration_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "Cache run finished"
        );

        report
    }

    /// Run one target in its own task, bounded by the target timeout.
    async fn process_isolated(&self, target: Target, logger: RunLogger) -> TargetOutcome {
        let timeout = self.config.target_timeout;
        let writer = self.clone();
        let span = logger.create_span();
        let task_logger = logger.clone();

        let mut handle = tokio::spawn(
            async move { writer.process_target(&target, &task_logger).await }.instrument(span),
        );

        let result = match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                let reason = if join_error.is_panic() {
                    "panicked"
                } else {
                    "cancelled"
                };
                Err(WorkerError::TaskAborted(reason.to_string()))
            }
            Err(_) => {
                handle.abort();
                Err(WorkerError::Timeout(timeout))
            }
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                counter!("trend_cache_target_failures_total", "reason" => e.kind()).increment(1);
                logger.log_error(&e.to_string());
                TargetOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Fetch, analyze and store one target.
    ///
    /// An empty fetch or a sentinel analysis leaves the stored document as it
    /// was.
    pub async fn process_target(
        &self,
        target: &Target,
        logger: &RunLogger,
    ) -> WorkerResult<TargetOutcome> {
        logger.log_start("fetching trending videos");

        let videos = self
            .fetcher
            .fetch_trending(&target.country, target.content_type)
            .await;
        if videos.is_empty() {
            logger.log_warning("no trending videos fetched, keeping previous document");
            return Ok(TargetOutcome::Skipped {
                reason: "no trending videos fetched".to_string(),
            });
        }
        logger.log_progress(&format!("fetched {} videos, analyzing", videos.len()));

        let analysis = self.analyzer.analyze(&videos).await;
        if let AnalysisOutcome::Failed { error } = &analysis {
            return Err(WorkerError::analysis_failed(error.clone()));
        }

        let video_count = videos.len();
        let doc = CachedRegionDocument::new(
            target.country.clone(),
            target.content_type,
            videos,
            analysis,
            Utc::now(),
        );
        self.store.upsert(&doc).await?;

        logger.log_completion(&format!("stored {} videos", video_count));
        Ok(TargetOutcome::Written {
            videos: video_count,
        })
    }
}
