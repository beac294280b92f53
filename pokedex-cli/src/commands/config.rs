use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use pokedex_core::{Config, config_path};

use crate::error::CliError;

/// Show the config file in use and the effective settings.
pub(crate) fn run_config_show(config: &Config, explicit: Option<&Path>) -> Result<(), CliError> {
    log::info!(
        "{}",
        "Pokédex Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    let path = explicit.map(Path::to_path_buf).or_else(config_path);
    match &path {
        Some(p) if p.exists() => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  Config file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    log::info!("");

    for line in config.to_toml_string().lines() {
        log::info!("  {}", line);
    }
    Ok(())
}

/// Print the config file path.
pub(crate) fn run_config_path(explicit: Option<&Path>) -> Result<(), CliError> {
    match explicit.map(Path::to_path_buf).or_else(config_path) {
        Some(path) => {
            log::info!("{}", path.display());
            Ok(())
        }
        None => Err(CliError::not_found("could not determine config directory")),
    }
}
