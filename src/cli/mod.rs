//! # CLI Module
//!
//! Command-line interface for the photo ingester.
//!
//! ## Usage
//! ```bash
//! # Keep filing photos as they land in a drop folder
//! photo-ingest watch ~/Drop --dest ~/Photos --quarantine ~/Photos-Duplicates
//!
//! # One pass over whatever is already there
//! photo-ingest organize ~/Drop
//!
//! # Quarantine repeated content anywhere under a tree
//! photo-ingest dedup ~/Photos --quarantine ~/Photos-Duplicates
//!
//! # Machine-readable event stream
//! photo-ingest organize ~/Drop --output json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_ingest::config::IngestConfig;
use photo_ingest::core::dedup::{Deduplicator, ScanCounts};
use photo_ingest::core::pipeline::IngestionCoordinator;
use photo_ingest::error::{Result, WatchError};
use photo_ingest::events::{
    BatchEvent, BatchSummary, Event, EventChannel, EventReceiver, IngestOutcome, WatcherEvent,
};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Photo Ingest - file new photos by date, set duplicates aside
#[derive(Parser, Debug)]
#[command(name = "photo-ingest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch a folder and ingest photos as they arrive
    Watch {
        /// Folder to watch
        source: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Ingest the photos already in a folder, then exit
    Organize {
        /// Folder to ingest (subfolders are left alone)
        source: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Quarantine repeated content anywhere under a tree
    Dedup {
        /// Tree to scan recursively
        root: PathBuf,

        /// Where duplicates are moved
        #[arg(short, long)]
        quarantine: Option<PathBuf>,

        /// Settings file (defaults to the per-user config if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Root of the YYYY/MM/DD tree
    #[arg(short, long)]
    dest: Option<PathBuf>,

    /// Where duplicates are moved
    #[arg(short, long)]
    quarantine: Option<PathBuf>,

    /// Settings file (defaults to the per-user config if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl LayoutArgs {
    /// File settings with command-line overrides applied
    fn resolve(&self) -> Result<IngestConfig> {
        let mut config = IngestConfig::discover(self.config.as_deref())?;

        if let Some(dest) = &self.dest {
            config.destination = dest.clone();
        }
        if let Some(quarantine) = &self.quarantine {
            config.quarantine = quarantine.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// One JSON event per line
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            source,
            layout,
            output,
        } => run_watch(&source, layout.resolve()?, output),
        Commands::Organize {
            source,
            layout,
            output,
        } => run_organize(&source, layout.resolve()?, output),
        Commands::Dedup {
            root,
            quarantine,
            config,
            output,
        } => {
            let layout = LayoutArgs {
                dest: None,
                quarantine,
                config,
            };
            run_dedup(&root, layout.resolve()?, output)
        }
    }
}

fn run_organize(source: &Path, config: IngestConfig, output: OutputFormat) -> Result<()> {
    let term = Term::stderr();
    if matches!(output, OutputFormat::Pretty) {
        print_header(&term, &config);
    }

    let mut coordinator = IngestionCoordinator::from_config(&config);
    let (sender, receiver) = EventChannel::new();

    let progress = match output {
        OutputFormat::Pretty => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        }
        OutputFormat::Json => None,
    };

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || render_events(receiver, output, progress_clone));

    let result = coordinator.organize_directory(source, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let summary = result?;
    if matches!(output, OutputFormat::Pretty) {
        print_summary(&term, "Organize Complete", &summary);
    }

    Ok(())
}

fn run_watch(source: &Path, config: IngestConfig, output: OutputFormat) -> Result<()> {
    let term = Term::stderr();
    if matches!(output, OutputFormat::Pretty) {
        print_header(&term, &config);
    }

    let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
    ctrlc::set_handler(move || {
        let _ = stop_tx.try_send(());
    })
    .map_err(|e| WatchError::InitFailed(format!("cannot install interrupt handler: {}", e)))?;

    let mut coordinator = IngestionCoordinator::from_config(&config);
    let (sender, receiver) = EventChannel::new();
    let event_thread = thread::spawn(move || render_events(receiver, output, None));

    let result = coordinator.watch(source, &stop_rx, &sender);

    drop(sender);
    event_thread.join().ok();

    let summary = result?;
    if matches!(output, OutputFormat::Pretty) {
        print_summary(&term, "Watch Stopped", &summary);
    }

    Ok(())
}

fn run_dedup(root: &Path, config: IngestConfig, output: OutputFormat) -> Result<()> {
    let term = Term::stderr();
    let mut dedup =
        Deduplicator::new(&config.quarantine).with_max_name_probes(config.max_name_probes);

    let counts = dedup.scan_directory(root)?;

    match output {
        OutputFormat::Pretty => print_dedup_counts(&term, &config, &counts),
        OutputFormat::Json => {
            let failures: Vec<_> = counts
                .failures
                .iter()
                .map(|f| {
                    serde_json::json!({
                        "path": f.path,
                        "error": f.error.to_string(),
                    })
                })
                .collect();
            let summary = serde_json::json!({
                "unique": counts.unique,
                "duplicate": counts.duplicate,
                "skipped": counts.skipped,
                "failures": failures,
            });
            println!("{}", summary);
        }
    }

    Ok(())
}

/// Print events until every sender is gone
fn render_events(receiver: EventReceiver, output: OutputFormat, progress: Option<ProgressBar>) {
    for event in receiver.iter() {
        if matches!(output, OutputFormat::Json) {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!(error = %e, "cannot serialize event"),
            }
            continue;
        }

        match event {
            Event::Batch(BatchEvent::Started { total, .. }) => {
                if let Some(ref pb) = progress {
                    pb.set_length(total as u64);
                }
            }
            Event::Batch(BatchEvent::Completed { .. }) => {
                if let Some(ref pb) = progress {
                    pb.finish_and_clear();
                }
            }
            Event::Ingest(outcome) => {
                let line = describe_outcome(&outcome);
                match progress {
                    Some(ref pb) => {
                        pb.inc(1);
                        pb.set_message(file_name(outcome.source()));
                        pb.println(line);
                    }
                    None => println!("{}", line),
                }
            }
            Event::Watcher(WatcherEvent::Started { path }) => {
                println!(
                    "{} {} {}",
                    style("●").green(),
                    style("Watching").bold(),
                    path.display()
                );
                println!("{}", style("Press Ctrl-C to stop.").dim());
            }
            Event::Watcher(WatcherEvent::Error { message }) => {
                println!("{} {}", style("!").yellow().bold(), message);
            }
            Event::Watcher(_) => {}
        }
    }
}

fn describe_outcome(outcome: &IngestOutcome) -> String {
    match outcome {
        IngestOutcome::Organized {
            source,
            destination,
        } => format!(
            "  {} {} → {}",
            style("✓").green().bold(),
            file_name(source),
            destination.display()
        ),
        IngestOutcome::Quarantined {
            source,
            destination,
        } => format!(
            "  {} {} → {} {}",
            style("≡").yellow().bold(),
            file_name(source),
            destination.display(),
            style("(duplicate)").dim()
        ),
        IngestOutcome::Skipped { path } => format!(
            "  {} {} {}",
            style("○").dim(),
            file_name(path),
            style("(gone before it could be read)").dim()
        ),
        IngestOutcome::Failed {
            path,
            stage,
            message,
        } => format!(
            "  {} {} {} {}",
            style("✗").red().bold(),
            file_name(path),
            style(format!("[{}]", stage)).red(),
            message
        ),
    }
}

fn print_header(term: &Term, config: &IngestConfig) {
    term.write_line(&format!(
        "{} {}",
        style("Photo Ingest").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line(&format!(
        "  {} {}",
        style("destination").dim(),
        config.destination.display()
    ))
    .ok();
    term.write_line(&format!(
        "  {} {}",
        style("quarantine ").dim(),
        config.quarantine.display()
    ))
    .ok();
    term.write_line("").ok();
}

fn print_summary(term: &Term, title: &str, summary: &BatchSummary) {
    term.write_line("").ok();
    term.write_line(&format!("{} {}", style("✓").green().bold(), title))
        .ok();
    term.write_line(&format!(
        "  {} organized, {} quarantined, {} skipped, {} failed in {:.1}s",
        style(summary.organized).cyan(),
        style(summary.quarantined).yellow(),
        style(summary.skipped).dim(),
        style(summary.failed).red(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
}

fn print_dedup_counts(term: &Term, config: &IngestConfig, counts: &ScanCounts) {
    term.write_line(&format!(
        "{} Dedup Complete",
        style("✓").green().bold()
    ))
    .ok();
    term.write_line(&format!(
        "  {} unique, {} moved to {}, {} skipped",
        style(counts.unique).cyan(),
        style(counts.duplicate).yellow(),
        config.quarantine.display(),
        style(counts.skipped).dim()
    ))
    .ok();

    if !counts.failures.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Failures:").bold().underlined()))
            .ok();
        for failure in &counts.failures {
            term.write_line(&format!(
                "  {} {}: {}",
                style("✗").red(),
                failure.path.display(),
                failure.error
            ))
            .ok();
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
