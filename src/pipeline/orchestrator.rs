use crate::config::Config;
use crate::error::Result;
use crate::pipeline::ingestion::{harvest_modality, StopReason};
use crate::pipeline::processing::consolidate::{consolidate, MergeMode};
use crate::pipeline::processing::record::RecordBuilder;
use crate::pipeline::storage::{load_prior, TableRepository};
use crate::types::{Modality, NoticeFeed};
use metrics::{counter, histogram};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Stages of a single run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStage {
    Fetching,
    Building,
    Merging,
    Persisted,
    /// Nothing was fetched; persisted state is left untouched
    NoNewData,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub modalities: Vec<Modality>,
    pub mode: MergeMode,
    pub page_delay: Duration,
    pub max_pages: Option<u32>,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            modalities: config.feed.modalities.clone(),
            mode: MergeMode::from_audit_flag(config.store.audit),
            page_delay: Duration::from_millis(config.feed.delay_ms),
            max_pages: config.feed.max_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModalitySummary {
    pub label: String,
    pub notices: usize,
    pub pages: u32,
    pub stop: StopReason,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub stage: RunStage,
    pub mode: MergeMode,
    pub modalities: Vec<ModalitySummary>,
    pub new_records: usize,
    pub prior_rows: usize,
    /// The persisted table was corrupt and has been replaced
    pub prior_recovered: bool,
    pub persisted_rows: usize,
    pub superseded: usize,
    pub repeated: usize,
}

/// Fetch → build → merge → persist, once, sequentially
pub struct Pipeline<'a> {
    feed: &'a dyn NoticeFeed,
    repository: &'a dyn TableRepository,
    builder: RecordBuilder,
    options: RunOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(feed: &'a dyn NoticeFeed, repository: &'a dyn TableRepository, options: RunOptions) -> Self {
        Self {
            feed,
            repository,
            builder: RecordBuilder::default(),
            options,
        }
    }

    pub fn with_builder(mut self, builder: RecordBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Runs the pipeline once.
    ///
    /// Feed failures only end the affected modality. Only repository errors
    /// other than corruption are returned.
    #[instrument(skip(self), fields(feed = %self.feed.feed_name(), mode = ?self.options.mode))]
    pub async fn run(&self) -> Result<RunReport> {
        let started = Instant::now();

        info!(stage = ?RunStage::Fetching, "🚀 Fetching {} modalities", self.options.modalities.len());
        let mut harvests = Vec::with_capacity(self.options.modalities.len());
        for modality in &self.options.modalities {
            let harvest = harvest_modality(
                self.feed,
                modality,
                self.options.page_delay,
                self.options.max_pages,
            )
            .await;
            harvests.push(harvest);
        }
        let modalities: Vec<ModalitySummary> = harvests
            .iter()
            .map(|h| ModalitySummary {
                label: h.modality.label.clone(),
                notices: h.notices.len(),
                pages: h.pages,
                stop: h.stop.clone(),
            })
            .collect();

        info!(stage = ?RunStage::Building, "🔧 Building records");
        let records: Vec<_> = harvests
            .iter()
            .flat_map(|h| {
                h.notices
                    .iter()
                    .map(move |notice| self.builder.build(notice, &h.modality.label))
            })
            .collect();
        counter!("pncp_records_built_total").increment(records.len() as u64);

        let mut report = RunReport {
            stage: RunStage::NoNewData,
            mode: self.options.mode,
            modalities,
            new_records: records.len(),
            prior_rows: 0,
            prior_recovered: false,
            persisted_rows: 0,
            superseded: 0,
            repeated: 0,
        };

        if records.is_empty() {
            info!(stage = ?RunStage::NoNewData, "💤 No new data fetched; persisted table left untouched");
            return Ok(report);
        }

        info!(stage = ?RunStage::Merging, "🔀 Merging {} new records", records.len());
        let prior = load_prior(self.repository).await?;
        report.prior_recovered = prior.was_recovered();
        let prior = prior.into_table();
        report.prior_rows = prior.len();

        let consolidation = consolidate(prior, records, self.options.mode);
        report.superseded = consolidation.superseded;
        report.repeated = consolidation.repeated;

        info!("💾 Saving {} rows to {}", consolidation.table.len(), self.repository.location());
        self.repository.save(&consolidation.table).await?;
        report.persisted_rows = consolidation.table.len();
        report.stage = RunStage::Persisted;

        counter!("pncp_rows_persisted_total").increment(report.persisted_rows as u64);
        histogram!("pncp_run_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            stage = ?RunStage::Persisted,
            persisted = report.persisted_rows,
            superseded = report.superseded,
            repeated = report.repeated,
            "✅ Run complete"
        );
        Ok(report)
    }
}
