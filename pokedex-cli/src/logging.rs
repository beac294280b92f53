//! Logger setup: `log` records go to stdout and, optionally, a logfile.
//!
//! Normal output is the message alone. `--verbose` adds timestamps, levels
//! and debug records from the workspace crates. `RUST_LOG` overrides both.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use log::Level;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::error::CliError;

const CRATES: &[&str] = &[
    "pokedex",
    "pokedex_core",
    "pokedex_lib",
    "pokedex_fetch",
    "pokedex_db",
    "pokedex_import",
];

/// Writes everything to stdout and an ANSI-stripped copy to the logfile.
struct TeeWriter {
    file: Option<File>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(&strip_ansi_escapes::strip(buf))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

fn default_filter(verbose: bool, quiet: bool) -> String {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let mut filter = String::from("warn");
    for name in CRATES {
        filter.push_str(&format!(",{name}={level}"));
    }
    filter
}

pub(crate) fn init(verbose: bool, quiet: bool, logfile: Option<&Path>) -> Result<(), CliError> {
    let file = logfile.map(File::create).transpose()?;

    let env = env_logger::Env::default().default_filter_or(default_filter(verbose, quiet));
    env_logger::Builder::from_env(env)
        .format(move |buf, record| {
            if verbose {
                return writeln!(
                    buf,
                    "{} {:<5} {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    record.args()
                );
            }
            match record.level() {
                Level::Error => writeln!(
                    buf,
                    "{} {}",
                    "error:".if_supports_color(Stdout, |t| t.red()),
                    record.args()
                ),
                Level::Warn => writeln!(
                    buf,
                    "{} {}",
                    "warning:".if_supports_color(Stdout, |t| t.yellow()),
                    record.args()
                ),
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .target(env_logger::Target::Pipe(Box::new(TeeWriter { file })))
        .try_init()
        .map_err(|e| CliError::runtime(e.to_string()))
}
