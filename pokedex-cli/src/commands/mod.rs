pub(crate) mod config;
pub(crate) mod download;
pub(crate) mod list;
pub(crate) mod load;
pub(crate) mod search;
pub(crate) mod show;
pub(crate) mod stats;

use std::path::{Path, PathBuf};

use pokedex_core::Config;
use pokedex_db::CatalogDb;

use crate::error::CliError;

/// `--db` if given, otherwise the configured database path.
pub(crate) fn db_path(config: &Config, db: Option<PathBuf>) -> PathBuf {
    db.unwrap_or_else(|| config.paths.db_path.clone())
}

/// Open an existing catalog for reading. Never creates a new file.
pub(crate) fn open_existing_db(path: &Path) -> Result<CatalogDb, CliError> {
    if !path.is_file() {
        return Err(CliError::not_found(format!(
            "catalog database {} (run `pokedex load` first)",
            path.display()
        )));
    }
    Ok(CatalogDb::open(path)?)
}

/// Human-readable byte count.
pub(crate) fn format_bytes(bytes: i64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
