//! Load a metadata directory into the catalog store.
//!
//! Each file moves through `Pending -> MetaRead -> AssetsRead -> Upserted`
//! or stops at `Skipped(reason)`. One row is one transaction, so a crash
//! mid-run keeps every row committed before it. Files are independent:
//! nothing about one file can stop the others.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use pokedex_core::{ArtifactLayout, MetadataRecord, RecordError, is_summary_file};
use pokedex_db::{CatalogDb, CatalogRow, OperationError, UpsertOutcome};
use pokedex_lib::{sha256_hex, sniff_mime};

use crate::progress::ImportProgress;

/// Fatal problems with the load as a whole.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Metadata directory does not exist: {}", .0.display())]
    MetaDirMissing(PathBuf),
    #[error("Cannot read metadata directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Why a metadata file did not become a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SkipReason {
    InvalidJson,
    NoIdOrName,
    MalformedRecord,
    UnsupportedVersion,
    MissingOriginal,
}

impl SkipReason {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid-json",
            Self::NoIdOrName => "no-id-or-name",
            Self::MalformedRecord => "malformed-record",
            Self::UnsupportedVersion => "unsupported-version",
            Self::MissingOriginal => "missing-original",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<&RecordError> for SkipReason {
    fn from(e: &RecordError) -> Self {
        match e {
            RecordError::InvalidJson(_) => Self::InvalidJson,
            RecordError::MissingIdOrName => Self::NoIdOrName,
            RecordError::Malformed(_) => Self::MalformedRecord,
            RecordError::UnsupportedVersion(_) => Self::UnsupportedVersion,
        }
    }
}

/// Reason code used for unexpected per-file errors.
pub const ERROR_CODE: &str = "error";

/// Final state of one metadata file.
#[derive(Debug)]
pub enum LoadOutcome {
    Upserted {
        id: u32,
        name: String,
        outcome: UpsertOutcome,
        has_thumb: bool,
    },
    Skipped {
        path: PathBuf,
        reason: SkipReason,
        detail: String,
    },
    Failed {
        path: PathBuf,
        error: String,
    },
}

/// Totals for one load.
#[derive(Debug, Default)]
pub struct LoadStats {
    pub scanned: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped_by_reason: BTreeMap<&'static str, usize>,
    pub errors: usize,
}

impl LoadStats {
    pub fn upserted(&self) -> usize {
        self.inserted + self.updated
    }

    pub fn skipped(&self) -> usize {
        self.skipped_by_reason.values().sum()
    }

    fn record(&mut self, outcome: &LoadOutcome) {
        match outcome {
            LoadOutcome::Upserted { outcome, .. } => match outcome {
                UpsertOutcome::Inserted => self.inserted += 1,
                UpsertOutcome::Updated => self.updated += 1,
            },
            LoadOutcome::Skipped { reason, .. } => {
                *self.skipped_by_reason.entry(reason.code()).or_insert(0) += 1;
            }
            LoadOutcome::Failed { .. } => self.errors += 1,
        }
    }
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} scanned, {} inserted, {} updated, {} skipped, {} errors",
            self.scanned,
            self.inserted,
            self.updated,
            self.skipped(),
            self.errors
        )?;
        let mut parts: Vec<String> = self
            .skipped_by_reason
            .iter()
            .map(|(code, n)| format!("{code}: {n}"))
            .collect();
        if self.errors > 0 {
            parts.push(format!("{ERROR_CODE}: {}", self.errors));
        }
        if !parts.is_empty() {
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}

/// Per-file failures that are not skip reasons.
#[derive(Debug, Error)]
enum FileError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Db(#[from] OperationError),
}

/// Intermediate states of one file's load.
enum Stage {
    Pending,
    MetaRead {
        record: MetadataRecord,
        raw: String,
    },
    AssetsRead(CatalogRow),
    Done(LoadOutcome),
}

/// Metadata files in `meta_dir`: `*.json`, sorted, without run summaries.
pub fn metadata_files(meta_dir: &Path) -> Result<Vec<PathBuf>, ImportError> {
    if !meta_dir.is_dir() {
        return Err(ImportError::MetaDirMissing(meta_dir.to_path_buf()));
    }
    let io_err = |source| ImportError::Io {
        path: meta_dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(meta_dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file()
            && path.extension().is_some_and(|e| e == "json")
            && !is_summary_file(&path)
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load every metadata file in `meta_dir` into `db`.
///
/// Only a missing or unreadable directory is an error; everything per file
/// ends up in the returned stats.
pub fn load_metadata_dir(
    db: &CatalogDb,
    meta_dir: &Path,
    progress: &dyn ImportProgress,
) -> Result<LoadStats, ImportError> {
    let files = metadata_files(meta_dir)?;
    let layout = ArtifactLayout::from_meta_dir(meta_dir);
    let total = files.len();
    progress.on_start(total);

    let mut stats = LoadStats::default();
    for (i, path) in files.iter().enumerate() {
        let outcome = load_file(db, &layout, path);
        stats.scanned += 1;
        stats.record(&outcome);
        progress.on_file(i + 1, total, &outcome);
    }

    progress.on_complete(&format!("Load complete: {}", stats));
    Ok(stats)
}

/// Drive one file through the load states.
pub fn load_file(db: &CatalogDb, layout: &ArtifactLayout, path: &Path) -> LoadOutcome {
    let mut stage = Stage::Pending;
    loop {
        let next = match stage {
            Stage::Pending => read_meta(path),
            Stage::MetaRead { record, raw } => read_assets(layout, path, record, raw),
            Stage::AssetsRead(row) => upsert(db, row),
            Stage::Done(outcome) => return outcome,
        };
        stage = next.unwrap_or_else(|e| {
            Stage::Done(LoadOutcome::Failed {
                path: path.to_path_buf(),
                error: e.to_string(),
            })
        });
    }
}

fn read_meta(path: &Path) -> Result<Stage, FileError> {
    let bytes = std::fs::read(path).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let Ok(raw) = String::from_utf8(bytes) else {
        return Ok(skipped(path, SkipReason::InvalidJson, "not UTF-8".to_string()));
    };

    match MetadataRecord::from_json_str(&raw) {
        Ok(record) => Ok(Stage::MetaRead { record, raw }),
        Err(e) => Ok(skipped(path, SkipReason::from(&e), e.to_string())),
    }
}

fn read_assets(
    layout: &ArtifactLayout,
    path: &Path,
    record: MetadataRecord,
    raw: String,
) -> Result<Stage, FileError> {
    let Some(original_path) = record.saved_original.as_deref().map(|p| layout.resolve(p)) else {
        return Ok(skipped(
            path,
            SkipReason::MissingOriginal,
            format!("#{} {} has no saved original", record.id, record.name),
        ));
    };

    let image_blob = match std::fs::read(&original_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(skipped(
                path,
                SkipReason::MissingOriginal,
                format!("#{} {}: {} not found", record.id, record.name, original_path.display()),
            ));
        }
        Err(source) => {
            return Err(FileError::Io {
                path: original_path,
                source,
            });
        }
    };

    let (thumb_blob, thumb_mime) = read_thumbnail(layout, &record);

    let actual = sha256_hex(&image_blob);
    if !record.checksum.eq_ignore_ascii_case(&actual) {
        log::warn!(
            "#{} {}: recorded checksum {} does not match {} on disk",
            record.id,
            record.name,
            record.checksum,
            actual
        );
    }

    Ok(Stage::AssetsRead(CatalogRow {
        id: record.id,
        name: record.name,
        types: record.types,
        meta_json: raw,
        image_blob,
        image_mime: record.image_mime,
        thumb_blob,
        thumb_mime,
        checksum: record.checksum,
    }))
}

/// Thumbnail bytes and MIME, or `(None, None)` when absent or unreadable.
fn read_thumbnail(
    layout: &ArtifactLayout,
    record: &MetadataRecord,
) -> (Option<Vec<u8>>, Option<String>) {
    let Some(thumb_path) = record.saved_thumb.as_deref().map(|p| layout.resolve(p)) else {
        return (None, None);
    };
    match std::fs::read(&thumb_path) {
        Ok(bytes) => {
            let mime = record
                .thumb_mime
                .clone()
                .unwrap_or_else(|| sniff_mime(&bytes).0.to_string());
            (Some(bytes), Some(mime))
        }
        Err(e) => {
            log::warn!(
                "#{} {}: thumbnail {} unreadable ({}); storing without it",
                record.id,
                record.name,
                thumb_path.display(),
                e
            );
            (None, None)
        }
    }
}

fn upsert(db: &CatalogDb, row: CatalogRow) -> Result<Stage, FileError> {
    let outcome = db.upsert(&row)?;
    log::debug!(
        "{} #{} {} ({} bytes)",
        match outcome {
            UpsertOutcome::Inserted => "Inserted",
            UpsertOutcome::Updated => "Updated",
        },
        row.id,
        row.name,
        row.image_blob.len()
    );
    Ok(Stage::Done(LoadOutcome::Upserted {
        id: row.id,
        has_thumb: row.thumb_blob.is_some(),
        name: row.name,
        outcome,
    }))
}

fn skipped(path: &Path, reason: SkipReason, detail: String) -> Stage {
    Stage::Done(LoadOutcome::Skipped {
        path: path.to_path_buf(),
        reason,
        detail,
    })
}
