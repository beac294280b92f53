use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use pokedex_core::Config;
use pokedex_db::{ListQuery, SortKey};

use crate::cli_types::{SearchArgs, SortArg};
use crate::error::CliError;

use super::format_bytes;

pub(crate) fn run_search(
    config: &Config,
    filter: SearchArgs,
    db: Option<PathBuf>,
) -> Result<(), CliError> {
    let db = super::open_existing_db(&super::db_path(config, db))?;

    let query = ListQuery {
        name_contains: filter.name,
        type_name: filter.type_name,
        sort: match filter.sort {
            SortArg::Id => SortKey::Id,
            SortArg::Name => SortKey::Name,
        },
        descending: filter.desc,
        limit: filter.limit,
        offset: filter.offset,
    };
    let page = db.list(&query)?;

    if page.entries.is_empty() {
        log::info!("No matching entries.");
        return Ok(());
    }

    for entry in &page.entries {
        let thumb = if entry.thumb_mime.is_some() { "" } else { " (no thumbnail)" };
        log::info!(
            "  {} {:<14} {:<18} {:>10}{}",
            format!("#{:>4}", entry.id).if_supports_color(Stdout, |t| t.dimmed()),
            entry.name.if_supports_color(Stdout, |t| t.bold()),
            entry.types.join("/"),
            format_bytes(entry.image_size),
            thumb.if_supports_color(Stdout, |t| t.yellow()),
        );
    }
    log::info!("");
    log::info!(
        "{}-{} of {} matching",
        query.offset as usize + 1,
        query.offset as usize + page.entries.len(),
        page.total
    );
    Ok(())
}
