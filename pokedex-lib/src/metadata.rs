//! Persisting fetch results: originals, thumbnails, per-entity JSON and the
//! run summary.
//!
//! Every file goes to a `.tmp` sibling first and is renamed into place, so
//! readers only ever see complete files. The JSON descriptor is written last,
//! after the assets it points to.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use pokedex_core::{ArtifactLayout, METADATA_SCHEMA_VERSION, MetadataRecord, RunSummary};

use crate::artifact::ProcessedArtifact;
use crate::error::WriteError;

/// Inputs for one entity's metadata write.
#[derive(Debug)]
pub struct EntityWrite<'a> {
    pub id: u32,
    pub name: &'a str,
    pub source_url: &'a str,
    pub types: &'a [String],
    pub original: &'a [u8],
    pub processed: &'a ProcessedArtifact,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MetadataWriter {
    layout: ArtifactLayout,
}

impl MetadataWriter {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Create `originals/`, `thumbs/` and `meta/` under the output root.
    pub fn ensure_layout(&self) -> Result<(), WriteError> {
        for dir in [
            self.layout.root().to_path_buf(),
            self.layout.originals_dir(),
            self.layout.thumbs_dir(),
            self.layout.meta_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| WriteError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Write the original, the thumbnail (if any) and the JSON descriptor.
    ///
    /// A thumbnail that cannot be written is dropped from the record rather
    /// than failing the entity.
    pub fn write_entity(&self, input: &EntityWrite<'_>) -> Result<MetadataRecord, WriteError> {
        let original_path =
            self.layout
                .original_path(input.id, input.name, input.processed.extension);
        write_atomic(&original_path, input.original)?;

        let mut saved_thumb = None;
        let mut thumb_mime = None;
        if let Some(ref thumb) = input.processed.thumbnail {
            let thumb_path = self.layout.thumb_path(input.id, input.name, thumb.extension);
            match write_atomic(&thumb_path, &thumb.thumbnail_bytes) {
                Ok(()) => {
                    saved_thumb = Some(self.layout.relative(&thumb_path));
                    thumb_mime = Some(thumb.thumbnail_mime.clone());
                }
                Err(e) => log::warn!("#{} {}: could not save thumbnail: {}", input.id, input.name, e),
            }
        }

        let record = MetadataRecord {
            schema_version: METADATA_SCHEMA_VERSION,
            id: input.id,
            name: input.name.to_string(),
            source_url: input.source_url.to_string(),
            saved_original: Some(self.layout.relative(&original_path)),
            saved_thumb,
            image_mime: input.processed.mime.clone(),
            thumb_mime,
            checksum: input.processed.checksum.clone(),
            bytes: input.original.len() as u64,
            timestamp: input.timestamp,
            types: input.types.to_vec(),
            extra: Default::default(),
        };

        let meta_path = self.layout.meta_path(input.id, input.name);
        let json = record.to_json_pretty()?;
        write_atomic(&meta_path, json.as_bytes())?;

        Ok(record)
    }

    /// Write `summary_<epoch millis>.json`. Existing summaries are never
    /// replaced; on a name clash the next free millisecond is used.
    pub fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf, WriteError> {
        let json = serde_json::to_string_pretty(summary)?;
        let mut millis = summary.created_at.timestamp_millis();

        loop {
            let path = self.layout.summary_path(millis);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(json.as_bytes())
                        .and_then(|_| file.sync_all())
                        .map_err(|e| WriteError::io(&path, e))?;
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => millis += 1,
                Err(e) => return Err(WriteError::io(&path, e)),
            }
        }
    }
}

/// Write to `<path>.tmp`, then rename over `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    let tmp = tmp_path(path);
    std::fs::write(&tmp, bytes).map_err(|e| WriteError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        WriteError::io(path, e)
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactProcessor;
    use pokedex_core::EntityOutcome;

    fn png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(300, 150, image::Rgba([1, 2, 3, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn writer() -> (tempfile::TempDir, MetadataWriter) {
        let dir = tempfile::tempdir().unwrap();
        let writer = MetadataWriter::new(ArtifactLayout::new(dir.path()));
        writer.ensure_layout().unwrap();
        (dir, writer)
    }

    #[test]
    fn writes_all_three_files() {
        let (dir, writer) = writer();
        let bytes = png();
        let processed = ArtifactProcessor::default().process(&bytes);
        let types = vec!["grass".to_string(), "poison".to_string()];

        let record = writer
            .write_entity(&EntityWrite {
                id: 1,
                name: "bulbasaur",
                source_url: "https://img.test/1.png",
                types: &types,
                original: &bytes,
                processed: &processed,
                timestamp: Utc::now(),
            })
            .unwrap();

        let root = dir.path();
        assert!(root.join("originals/001_bulbasaur.png").exists());
        assert!(root.join("thumbs/001_bulbasaur.webp").exists());
        let meta = root.join("meta/001_bulbasaur.json");
        let text = std::fs::read_to_string(&meta).unwrap();
        let parsed = MetadataRecord::from_json_str(&text).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.bytes, bytes.len() as u64);
        assert_eq!(parsed.thumb_mime.as_deref(), Some("image/webp"));
        assert_eq!(parsed.types, types);
        assert_eq!(
            parsed.saved_original.as_deref(),
            Some(Path::new("originals/001_bulbasaur.png"))
        );
        assert_eq!(
            parsed.saved_thumb.as_deref(),
            Some(Path::new("thumbs/001_bulbasaur.webp"))
        );

        // No stray temp files
        let leftovers: Vec<_> = walk(root)
            .into_iter()
            .filter(|p| p.extension().is_some_and(|e| e == "tmp"))
            .collect();
        assert!(leftovers.is_empty(), "{:?}", leftovers);
    }

    #[test]
    fn missing_thumbnail_leaves_thumb_path_empty() {
        let (dir, writer) = writer();
        let bytes = b"\x89PNG\r\n\x1a\nbroken".to_vec();
        let processed = ArtifactProcessor::default().process(&bytes);
        assert!(processed.thumbnail.is_none());

        let record = writer
            .write_entity(&EntityWrite {
                id: 7,
                name: "squirtle",
                source_url: "https://img.test/7.png",
                types: &[],
                original: &bytes,
                processed: &processed,
                timestamp: Utc::now(),
            })
            .unwrap();

        assert!(record.saved_thumb.is_none());
        assert!(record.thumb_mime.is_none());
        assert_eq!(record.image_mime, "image/png");
        assert!(!dir.path().join("thumbs/007_squirtle.webp").exists());
    }

    #[test]
    fn summaries_never_overwrite() {
        let (_dir, writer) = writer();
        let summary = RunSummary::new(vec![EntityOutcome::Failed {
            id: 3,
            error: "boom".to_string(),
        }]);
        let first = writer.write_summary(&summary).unwrap();
        let second = writer.write_summary(&summary).unwrap();
        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"two");
        assert!(!dir.path().join("x.json.tmp").exists());
    }

    fn walk(dir: &Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(dir).unwrap().flatten() {
            let path = entry.path();
            if path.is_dir() {
                out.extend(walk(&path));
            } else {
                out.push(path);
            }
        }
        out
    }
}
