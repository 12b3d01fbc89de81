//! The refresh pipeline
//!
//! Runs, strictly in order and each to completion before the next starts:
//!
//! 1. Stager: confirm, wipe and recreate the data root
//! 2. Catalog: fetch the pack listing
//! 3. Record stage: one `cards` invocation per pack
//! 4. Image stage: one `images` invocation per pack, then archive and clean up
//!
//! A failed stage stops the pipeline; artifacts of packs that already
//! succeeded are left on disk.

mod images;
mod records;


use crate::archive::{ArchiveHandler, handler_from_config};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::Result;
use crate::stager::{Confirmation, Stager, StagingArea};
use crate::tool::ExtractionTool;
use crate::types::PackRecord;
use images::fetch_images;
use records::fetch_records;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Outcome of a successful run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of packs processed
    pub packs: usize,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

/// Everything a stage task needs, shared across its workers
pub(crate) struct StageContext {
    pub(crate) staging: StagingArea,
    pub(crate) tool: ExtractionTool,
    pub(crate) archiver: Arc<dyn ArchiveHandler>,
    pub(crate) concurrency: Option<usize>,
}

/// Sequences the stager, the catalog and both fan-out stages
pub struct Pipeline {
    context: Arc<StageContext>,
}

impl Pipeline {
    /// Assemble a pipeline from explicit parts
    pub fn new(
        staging: StagingArea,
        tool: ExtractionTool,
        archiver: Arc<dyn ArchiveHandler>,
        concurrency: Option<usize>,
    ) -> Self {
        Self {
            context: Arc::new(StageContext {
                staging,
                tool,
                archiver,
                concurrency,
            }),
        }
    }

    /// Assemble a pipeline from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            StagingArea::new(config.data_root()),
            ExtractionTool::from_config(config)?,
            handler_from_config(&config.archive)?,
            config.max_concurrency,
        ))
    }

    /// The staging area this pipeline writes into
    pub fn staging(&self) -> &StagingArea {
        &self.context.staging
    }

    /// Run every step, stopping at the first failure
    pub async fn run(&self, confirmation: &mut dyn Confirmation) -> Result<RunSummary> {
        let start = Instant::now();
        let ctx = &self.context;

        Stager::new()
            .prepare(ctx.staging.root(), confirmation)
            .await?;

        let packs = Catalog::new(&ctx.tool, &ctx.staging)
            .fetch()
            .await
            .map_err(|e| e.context("failed to get packs"))?;

        fetch_records(Arc::clone(&self.context), &packs)
            .await
            .map_err(|e| e.context("failed to pull cards"))?;

        fetch_images(Arc::clone(&self.context), &packs)
            .await
            .map_err(|e| e.context("failed to download images"))?;

        let summary = RunSummary {
            packs: packs.len(),
            elapsed: start.elapsed(),
        };
        info!(
            packs = summary.packs,
            elapsed = ?summary.elapsed,
            root = ?ctx.staging.root(),
            "refresh completed"
        );
        Ok(summary)
    }

    /// Run only the record stage over `packs`
    pub async fn fetch_records(&self, packs: &[PackRecord]) -> Result<()> {
        fetch_records(Arc::clone(&self.context), packs).await
    }

    /// Run only the image stage over `packs`
    pub async fn fetch_images(&self, packs: &[PackRecord]) -> Result<()> {
        fetch_images(Arc::clone(&self.context), packs).await
    }
}
