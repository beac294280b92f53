//! Load progress reporting.

use crate::loader::LoadOutcome;

/// Receives per-file results while a metadata directory is loaded.
pub trait ImportProgress {
    /// Called once the file list is known.
    fn on_start(&self, total: usize);

    /// Called after each metadata file, whatever its outcome.
    fn on_file(&self, current: usize, total: usize, outcome: &LoadOutcome);

    /// Called when the load is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl ImportProgress for SilentProgress {
    fn on_start(&self, _total: usize) {}
    fn on_file(&self, _current: usize, _total: usize, _outcome: &LoadOutcome) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl ImportProgress for LogProgress {
    fn on_start(&self, total: usize) {
        log::info!("Found {} metadata files", total);
    }

    fn on_file(&self, current: usize, total: usize, outcome: &LoadOutcome) {
        match outcome {
            LoadOutcome::Upserted { id, name, .. } => {
                if current.is_multiple_of(100) || current == total {
                    log::info!("  [{}/{}] #{} {}", current, total, id, name);
                }
            }
            LoadOutcome::Skipped { path, reason, .. } => {
                log::warn!("  [{}/{}] skipped {} ({})", current, total, path.display(), reason);
            }
            LoadOutcome::Failed { path, error } => {
                log::error!("  [{}/{}] {}: {}", current, total, path.display(), error);
            }
        }
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
