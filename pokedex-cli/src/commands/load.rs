use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use pokedex_core::{ArtifactLayout, Config};
use pokedex_db::CatalogDb;
use pokedex_import::{LogProgress, load_metadata_dir};

use crate::error::CliError;

/// Load a metadata directory into the catalog, creating the database if
/// needed.
pub(crate) fn run_load(
    config: &Config,
    meta_dir: Option<PathBuf>,
    db: Option<PathBuf>,
) -> Result<(), CliError> {
    let meta_dir =
        meta_dir.unwrap_or_else(|| ArtifactLayout::new(&config.paths.out_dir).meta_dir());
    if !meta_dir.is_dir() {
        return Err(CliError::invalid_args(format!(
            "metadata directory does not exist: {}",
            meta_dir.display()
        )));
    }

    let db_path = super::db_path(config, db);
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let db = CatalogDb::open(&db_path)?;

    log::info!(
        "Loading {} into {}",
        meta_dir.display().if_supports_color(Stdout, |t| t.cyan()),
        db_path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    let stats = load_metadata_dir(&db, &meta_dir, &LogProgress)?;

    let mark = if stats.errors == 0 {
        "\u{2714}".if_supports_color(Stdout, |t| t.green()).to_string()
    } else {
        "\u{2718}".if_supports_color(Stdout, |t| t.red()).to_string()
    };
    log::info!(
        "{} {} rows upserted ({} new)",
        mark,
        stats.upserted().if_supports_color(Stdout, |t| t.bold()),
        stats.inserted,
    );
    Ok(())
}
