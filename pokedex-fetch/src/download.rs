//! The download pass: resolve, process and persist every id in a range.
//!
//! Entities are independent. A failure is recorded in the run summary and
//! never stops the others; only output setup can fail the run.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Duration;

use pokedex_core::{EntityOutcome, MetadataRecord, RunSummary};
use pokedex_lib::{ArtifactProcessor, EntityWrite, MetadataWriter};

use crate::backoff::jitter;
use crate::error::{DownloadError, EntityError};
use crate::resolver::{AssetResolver, ResolvedAsset};
use crate::transport::Transport;

/// Error text recorded for entities skipped after cancellation.
pub const CANCELLED: &str = "cancelled";

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub start: u32,
    pub end: u32,
    /// Entity pipelines in flight at once.
    pub concurrency: usize,
    /// Pause after each saved entity, plus up to `settle_jitter`.
    pub settle: Duration,
    pub settle_jitter: Duration,
}

impl DownloadOptions {
    pub fn new(start: u32, end: u32, concurrency: usize) -> Self {
        Self {
            start,
            end,
            concurrency,
            settle: Duration::from_millis(50),
            settle_jitter: Duration::from_millis(100),
        }
    }

    pub fn without_pauses(mut self) -> Self {
        self.settle = Duration::ZERO;
        self.settle_jitter = Duration::ZERO;
        self
    }

    pub fn validate(&self) -> Result<(), DownloadError> {
        if self.start == 0 || self.start > self.end {
            return Err(DownloadError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        if self.concurrency == 0 {
            return Err(DownloadError::InvalidConcurrency);
        }
        Ok(())
    }

    pub fn ids(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    pub fn total(&self) -> usize {
        (self.end - self.start) as usize + 1
    }
}

/// Progress reported while the pass runs.
#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Started { total: usize },
    EntityStarted { id: u32 },
    EntitySaved {
        id: u32,
        name: String,
        bytes: u64,
        has_thumb: bool,
    },
    EntityFailed { id: u32, error: String },
    Done { saved: usize, failed: usize },
}

/// Set once to stop new entities from starting.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct DownloadReport {
    pub summary: RunSummary,
    pub summary_path: PathBuf,
}

/// Run the download pass over `options.ids()`.
///
/// Results are collected in completion order and written as one summary
/// file at the end.
pub async fn run_download<T: Transport>(
    resolver: &AssetResolver<T>,
    processor: &ArtifactProcessor,
    writer: &MetadataWriter,
    options: &DownloadOptions,
    cancel: &CancellationFlag,
    events: mpsc::UnboundedSender<DownloadEvent>,
) -> Result<DownloadReport, DownloadError> {
    options.validate()?;
    writer.ensure_layout()?;

    let _ = events.send(DownloadEvent::Started {
        total: options.total(),
    });
    log::info!(
        "Downloading ids {}..={} into {} ({} at a time)",
        options.start,
        options.end,
        writer.layout().root().display(),
        options.concurrency
    );

    let results: Vec<EntityOutcome> = stream::iter(options.ids())
        .map(|id| {
            let events = events.clone();
            async move {
                if cancel.is_cancelled() {
                    return EntityOutcome::Failed {
                        id,
                        error: CANCELLED.to_string(),
                    };
                }
                let _ = events.send(DownloadEvent::EntityStarted { id });

                match download_entity(resolver, processor, writer, id).await {
                    Ok(record) => {
                        log::info!("#{} {}: saved", record.id, record.name);
                        let _ = events.send(DownloadEvent::EntitySaved {
                            id: record.id,
                            name: record.name.clone(),
                            bytes: record.bytes,
                            has_thumb: record.saved_thumb.is_some(),
                        });
                        let pause = options.settle + jitter(options.settle_jitter);
                        if !pause.is_zero() {
                            tokio::time::sleep(pause).await;
                        }
                        EntityOutcome::Saved(record)
                    }
                    Err(e) => {
                        log::warn!("#{}: {}", id, e);
                        let error = e.to_string();
                        let _ = events.send(DownloadEvent::EntityFailed {
                            id,
                            error: error.clone(),
                        });
                        EntityOutcome::Failed { id, error }
                    }
                }
            }
        })
        .buffer_unordered(options.concurrency)
        .collect()
        .await;

    let summary = RunSummary::new(results);
    let summary_path = writer.write_summary(&summary)?;

    let (saved, failed) = (summary.saved_count(), summary.failed_count());
    log::info!(
        "Download finished: {} saved, {} failed; summary at {}",
        saved,
        failed,
        summary_path.display()
    );
    let _ = events.send(DownloadEvent::Done { saved, failed });

    Ok(DownloadReport {
        summary,
        summary_path,
    })
}

async fn download_entity<T: Transport>(
    resolver: &AssetResolver<T>,
    processor: &ArtifactProcessor,
    writer: &MetadataWriter,
    id: u32,
) -> Result<MetadataRecord, EntityError> {
    let ResolvedAsset {
        descriptor,
        source_url,
        asset,
    } = resolver.resolve(id).await?;

    let processor = processor.clone();
    let writer = writer.clone();
    tokio::task::spawn_blocking(move || {
        let processed = processor.process(&asset.bytes);
        writer.write_entity(&EntityWrite {
            id: descriptor.id,
            name: &descriptor.name,
            source_url: &source_url,
            types: &descriptor.types,
            original: &asset.bytes,
            processed: &processed,
            timestamp: Utc::now(),
        })
    })
    .await
    .map_err(|e| EntityError::Task(e.to_string()))?
    .map_err(EntityError::from)
}
