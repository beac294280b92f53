use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tokio::sync::mpsc;

use pokedex_core::{ArtifactLayout, Config, EntityOutcome};
use pokedex_fetch::{
    AssetResolver, BackoffPolicy, CANCELLED, CancellationFlag, DownloadEvent, DownloadOptions,
    Fetcher, PokeApiClient, ReqwestTransport,
};
use pokedex_lib::{ArtifactProcessor, MetadataWriter, run_with_events};

use crate::cli_types::DownloadArgs;
use crate::error::CliError;

/// Run the download pass for `args.start..=args.end`.
///
/// Ctrl-C stops new entities from starting; in-flight ones finish and the
/// run summary is still written.
pub(crate) fn run_download(
    config: &Config,
    args: DownloadArgs,
    quiet: bool,
) -> Result<(), CliError> {
    if args.start > args.end {
        return Err(CliError::invalid_args(format!(
            "--start ({}) must not exceed --end ({})",
            args.start, args.end
        )));
    }

    let mut fetch = config.fetch.clone();
    if let Some(url) = args.base_url {
        fetch.base_url = url;
    }
    if let Some(n) = args.concurrency {
        fetch.concurrency = n as usize;
    }
    let mut thumbnail = config.thumbnail.clone();
    if let Some(format) = args.thumb_format {
        thumbnail.format = format;
    }
    let out_dir = args.out.unwrap_or_else(|| config.paths.out_dir.clone());

    let options = DownloadOptions::new(args.start, args.end, fetch.concurrency);
    options.validate()?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

    let transport = ReqwestTransport::new(&fetch)?;
    let fetcher = Fetcher::new(
        transport,
        fetch.concurrency,
        BackoffPolicy::from_settings(&fetch),
    );
    let resolver = AssetResolver::new(PokeApiClient::new(fetcher, fetch.base_url.as_str()));
    let processor = ArtifactProcessor::new(thumbnail);
    let writer = MetadataWriter::new(ArtifactLayout::new(&out_dir));
    let cancel = CancellationFlag::new();

    let pb = progress_bar(options.total() as u64, quiet);
    let (tx, rx) = mpsc::unbounded_channel();

    let report = rt.block_on(async {
        let watcher = {
            let cancel = cancel.clone();
            let pb = pb.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    pb.suspend(|| {
                        log::warn!("Interrupted: letting in-flight downloads finish");
                    });
                    cancel.cancel();
                }
            })
        };

        let task = pokedex_fetch::run_download(
            &resolver, &processor, &writer, &options, &cancel, tx,
        );
        let report = run_with_events(task, rx, |event| on_event(&pb, event)).await;
        watcher.abort();
        report
    });
    pb.finish_and_clear();
    let report = report?;

    let summary = &report.summary;
    let cancelled = summary
        .results
        .iter()
        .filter(|r| matches!(r, EntityOutcome::Failed { error, .. } if error == CANCELLED))
        .count();

    log::info!(
        "{} {} saved, {} failed{}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        summary.saved_count().if_supports_color(Stdout, |t| t.bold()),
        (summary.failed_count() - cancelled).if_supports_color(Stdout, |t| t.bold()),
        if cancelled > 0 {
            format!(", {} cancelled", cancelled)
        } else {
            String::new()
        },
    );

    let mut failures: Vec<(u32, &str)> = summary
        .results
        .iter()
        .filter_map(|r| match r {
            EntityOutcome::Failed { id, error } if error != CANCELLED => Some((*id, error.as_str())),
            _ => None,
        })
        .collect();
    failures.sort_by_key(|(id, _)| *id);
    for (id, error) in failures {
        log::warn!(
            "  {} #{}: {}",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
            id,
            error
        );
    }

    log::info!(
        "  Summary: {}",
        report
            .summary_path
            .display()
            .if_supports_color(Stdout, |t| t.cyan())
    );
    Ok(())
}

fn progress_bar(total: u64, quiet: bool) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if quiet {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.set_style(
        ProgressStyle::with_template("  {bar:40.cyan/blue} {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn on_event(pb: &ProgressBar, event: DownloadEvent) {
    match event {
        DownloadEvent::Started { total } => pb.set_length(total as u64),
        DownloadEvent::EntityStarted { id } => pb.set_message(format!("#{}", id)),
        DownloadEvent::EntitySaved {
            id,
            name,
            has_thumb,
            ..
        } => {
            pb.inc(1);
            if has_thumb {
                pb.set_message(format!("#{} {}", id, name));
            } else {
                pb.set_message(format!("#{} {} (no thumbnail)", id, name));
            }
        }
        DownloadEvent::EntityFailed { id, .. } => {
            pb.inc(1);
            pb.set_message(format!("#{} failed", id));
        }
        DownloadEvent::Done { .. } => pb.set_message("writing summary"),
    }
}
