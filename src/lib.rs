//! distinctpics - byte-identical duplicate finder and photo sorter
//!
//! Files are grouped by exact size, then every size group with two or more
//! members is partitioned into clusters of byte-identical files by direct
//! content comparison. No hashing is involved, so two files are reported
//! together only if every byte matches.
//!
//! The `sort` command files pictures into `<year>/<month>` folders, skipping
//! files that are already present with identical content.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod organize;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::{delete_duplicates, DeleteConfig, DeleteMode};
use crate::cli::{Cli, Commands, OutputFormat, ScanArgs, SortArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::organize::{Organizer, TransferMode};
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::{WalkErrorPolicy, WalkerConfig};
use crate::signal::ShutdownHandler;

/// Run the command described by `cli` and pick the exit code.
///
/// # Errors
///
/// Returns an error when the command cannot complete; use
/// [`ExitCode::for_error`] to map it to an exit code.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let Cli {
        verbose,
        quiet,
        no_color,
        command,
        ..
    } = cli;

    logging::init_logging(verbose, quiet, no_color);
    let handler = signal::install_handler()?;

    match command {
        Commands::Scan(args) => run_scan(args, quiet, &handler),
        Commands::Sort(args) => run_sort(args, quiet, &handler),
    }
}

fn run_scan(args: ScanArgs, quiet: bool, handler: &ShutdownHandler) -> Result<ExitCode> {
    let config = merge_scan_config(Config::load(args.config.as_deref())?, &args);

    let walker_config = WalkerConfig::new(if config.skip_unreadable {
        WalkErrorPolicy::Skip
    } else {
        WalkErrorPolicy::Abort
    });
    let finder_config = FinderConfig::default()
        .with_io_threads(config.io_threads)
        .with_walker_config(walker_config)
        .with_strict(config.strict)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(Arc::new(Progress::new(quiet)));

    let (clusters, summary) = DuplicateFinder::new(finder_config)
        .find_duplicates(&args.path)
        .with_context(|| format!("Scan of {} failed", args.path.display()))?;

    let deletion = args.delete.then(|| {
        let delete_config = DeleteConfig {
            mode: if config.permanent {
                DeleteMode::Permanent
            } else {
                DeleteMode::Trash
            },
            dry_run: args.dry_run,
        };
        delete_duplicates(&clusters, &delete_config)
    });

    let partial = summary.has_errors() || deletion.as_ref().is_some_and(|d| !d.all_succeeded());
    let exit_code = if partial {
        ExitCode::PartialSuccess
    } else if clusters.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => {
            let mut report = TextOutput::new(&clusters, &summary);
            if let Some(ref deletion) = deletion {
                report = report.with_deletion(deletion);
            }
            if quiet {
                report = report.paths_only();
            }
            report.write_to(&mut out)?;
        }
        OutputFormat::Json => {
            let mut report = JsonOutput::new(&clusters, &summary, exit_code);
            if let Some(deletion) = deletion {
                report = report.with_deletion(deletion);
            }
            report.write_to(&mut out, true)?;
        }
    }
    out.flush()?;

    Ok(exit_code)
}

/// CLI flags win over the file and environment layers.
fn merge_scan_config(mut config: Config, args: &ScanArgs) -> Config {
    if let Some(threads) = args.io_threads {
        config.io_threads = threads;
    }
    config.strict |= args.strict;
    config.skip_unreadable |= args.skip_unreadable;
    config.permanent |= args.permanent;
    config
}

fn run_sort(args: SortArgs, quiet: bool, handler: &ShutdownHandler) -> Result<ExitCode> {
    let mode = if args.copy {
        TransferMode::Copy
    } else {
        TransferMode::Move
    };
    let organizer = Organizer::new(mode)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(Arc::new(Progress::new(quiet)));

    let summary = organizer
        .run(&args.source, &args.destination)
        .context("Sort failed")?;

    if !quiet {
        println!("{summary}");
    }
    for (path, message) in &summary.failed {
        log::error!("{}: {}", path.display(), message);
    }

    Ok(if summary.failed.is_empty() {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    })
}
