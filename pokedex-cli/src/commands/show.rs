use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use pokedex_core::Config;

use crate::error::CliError;

use super::format_bytes;

/// Print one entry; `meta` adds the stored metadata JSON.
pub(crate) fn run_show(
    config: &Config,
    id: u32,
    meta: bool,
    db: Option<PathBuf>,
) -> Result<(), CliError> {
    let db = super::open_existing_db(&super::db_path(config, db))?;

    let Some(entry) = db.entry(id)? else {
        return Err(CliError::not_found(format!("no catalog entry with id {}", id)));
    };

    log::info!(
        "{} {}",
        format!("#{}", entry.id).if_supports_color(Stdout, |t| t.dimmed()),
        entry.name.if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!(
        "  Types:     {}",
        if entry.types.is_empty() {
            "-".to_string()
        } else {
            entry.types.join(", ")
        }
    );
    log::info!(
        "  Image:     {} ({})",
        entry.image_mime,
        format_bytes(entry.image_size)
    );
    match db.thumb(id)? {
        Some(thumb) => log::info!(
            "  Thumbnail: {} ({})",
            thumb.mime,
            format_bytes(thumb.bytes.len() as i64)
        ),
        None => log::info!(
            "  Thumbnail: {}",
            "none".if_supports_color(Stdout, |t| t.yellow())
        ),
    }
    log::info!(
        "  Checksum:  {}",
        entry.checksum.if_supports_color(Stdout, |t| t.cyan())
    );
    log::info!("  Loaded:    {}", entry.created_at);

    if meta && let Some(json) = db.metadata_json(id)? {
        log::info!("");
        let pretty = serde_json::from_str::<serde_json::Value>(&json)
            .and_then(|v| serde_json::to_string_pretty(&v))
            .unwrap_or(json);
        log::info!("{}", pretty);
    }
    Ok(())
}
