//! On-disk layout of a fetch run's artifacts.
//!
//! ```text
//! <root>/originals/<id:03>_<name>.<ext>
//! <root>/thumbs/<id:03>_<name>.<thumb ext>
//! <root>/meta/<id:03>_<name>.json
//! <root>/meta/summary_<epoch millis>.json
//! ```

use std::path::{Path, PathBuf};

pub const ORIGINALS_DIR: &str = "originals";
pub const THUMBS_DIR: &str = "thumbs";
pub const META_DIR: &str = "meta";
pub const SUMMARY_PREFIX: &str = "summary_";

/// Resolves artifact paths under an output root.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout whose metadata directory is `meta_dir`.
    ///
    /// Used by the load pass, which is pointed at the metadata directory and
    /// resolves relative asset paths against its parent.
    pub fn from_meta_dir(meta_dir: &Path) -> Self {
        let root = meta_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn originals_dir(&self) -> PathBuf {
        self.root.join(ORIGINALS_DIR)
    }

    pub fn thumbs_dir(&self) -> PathBuf {
        self.root.join(THUMBS_DIR)
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    pub fn original_path(&self, id: u32, name: &str, ext: &str) -> PathBuf {
        self.originals_dir()
            .join(format!("{}.{}", file_stem(id, name), ext))
    }

    pub fn thumb_path(&self, id: u32, name: &str, ext: &str) -> PathBuf {
        self.thumbs_dir()
            .join(format!("{}.{}", file_stem(id, name), ext))
    }

    pub fn meta_path(&self, id: u32, name: &str) -> PathBuf {
        self.meta_dir().join(format!("{}.json", file_stem(id, name)))
    }

    pub fn summary_path(&self, epoch_millis: i64) -> PathBuf {
        self.meta_dir()
            .join(format!("{}{}.json", SUMMARY_PREFIX, epoch_millis))
    }

    /// `path` relative to the output root, for recording in metadata.
    /// Paths outside the root are returned unchanged.
    pub fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    /// Resolve a path recorded in metadata. Absolute paths are used as-is.
    pub fn resolve(&self, recorded: &Path) -> PathBuf {
        if recorded.is_absolute() {
            recorded.to_path_buf()
        } else {
            self.root.join(recorded)
        }
    }
}

/// True for `summary_*.json` files, which live beside the per-entity records.
pub fn is_summary_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(SUMMARY_PREFIX))
}

/// `<id zero-padded to 3>_<sanitized name>`.
pub fn file_stem(id: u32, name: &str) -> String {
    format!("{:03}_{}", id, sanitize_name(name))
}

/// Restrict an upstream name to characters that are safe in a file name.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('-');
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned.to_string()
    }
}
