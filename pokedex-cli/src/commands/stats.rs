use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use pokedex_core::Config;

use crate::error::CliError;

use super::format_bytes;

pub(crate) fn run_stats(config: &Config, db: Option<PathBuf>) -> Result<(), CliError> {
    let db_path = super::db_path(config, db);
    let db = super::open_existing_db(&db_path)?;
    let stats = db.stats()?;

    log::info!(
        "{}",
        "Catalog Statistics".if_supports_color(Stdout, |t| t.bold())
    );
    log::info!(
        "  Database:       {} (schema v{})",
        db_path.display().if_supports_color(Stdout, |t| t.cyan()),
        db.schema_version()?
    );
    log::info!("  Entries:        {}", stats.entries);
    log::info!(
        "  With thumbnail: {} / {}",
        stats.with_thumbnail,
        stats.entries
    );
    log::info!("  Image bytes:    {}", format_bytes(stats.image_bytes));
    log::info!("  Thumb bytes:    {}", format_bytes(stats.thumb_bytes));

    if !stats.by_mime.is_empty() {
        log::info!("");
        log::info!("  {}", "By format".if_supports_color(Stdout, |t| t.bold()));
        for (mime, count) in &stats.by_mime {
            log::info!("    {:<16} {}", mime, count);
        }
    }
    if !stats.by_type.is_empty() {
        log::info!("");
        log::info!("  {}", "By type".if_supports_color(Stdout, |t| t.bold()));
        for (kind, count) in &stats.by_type {
            log::info!("    {:<16} {}", kind, count);
        }
    }
    Ok(())
}
