//! pokedex CLI
//!
//! Downloads Pokémon artwork into a local directory tree and loads it into
//! a SQLite catalog.

mod cli_types;
mod commands;
mod error;
mod logging;

use clap::Parser;

use pokedex_core::Config;

use cli_types::{Cli, Commands, ConfigAction};
use error::CliError;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.quiet, cli.logfile.as_deref()) {
        eprintln!("Failed to set up logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Config {
        action: ConfigAction::Path,
    } = cli.command
    {
        return commands::config::run_config_path(cli.config.as_deref());
    }

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Download(args) => commands::download::run_download(&config, args, cli.quiet),
        Commands::Load { meta_dir, db } => commands::load::run_load(&config, meta_dir, db),
        Commands::List {
            limit,
            offset,
            all,
            base_url,
        } => commands::list::run_list(&config, limit, offset, all, base_url),
        Commands::Search { filter, db } => commands::search::run_search(&config, filter, db),
        Commands::Show { id, meta, db } => commands::show::run_show(&config, id, meta, db),
        Commands::Stats { db } => commands::stats::run_stats(&config, db),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&config, cli.config.as_deref()),
            ConfigAction::Path => commands::config::run_config_path(cli.config.as_deref()),
        },
    }
}
