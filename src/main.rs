use clap::{ArgGroup, Parser};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use ffdl::config::{self, ServiceConfig};
use ffdl::error::BoxError;
use ffdl::input::{self, UrlSource};
use ffdl::progress::{NoProgress, ProgressReporter, TerminalProgress};
use ffdl::{BatchOutcome, OutcomeStatus};

#[derive(Parser)]
#[command(name = "ffdl")]
#[command(about = "Client for multi download from https://fuckingfast.co/")]
#[command(version)]
#[command(group(ArgGroup::new("source").required(true).args(["input_file", "links"])))]
struct Cli {
    #[arg(short, long, help = "Destination directory for downloaded files")]
    save_path: Option<PathBuf>,
    #[arg(short, long, help = "Text file containing URLs to download (one per line)")]
    input_file: Option<PathBuf>,
    #[arg(
        short,
        long,
        help = "Comma-separated URLs (e.g. \"https://fuckingfast.co/a,https://fuckingfast.co/b\")"
    )]
    links: Option<String>,
    #[arg(long, help = "Maximum simultaneous transfers [default: unlimited]")]
    max_transfers: Option<NonZeroUsize>,
    #[arg(long, default_value_t = 30, help = "Connect timeout in seconds, 0 to disable")]
    connect_timeout: u64,
    #[arg(long, help = "Write a JSON summary of the batch to this file")]
    report: Option<PathBuf>,
    #[arg(long, help = "Do not draw progress bars")]
    no_progress: bool,
    #[arg(short, long, action = clap::ArgAction::Count, help = "More logging (-v, -vv)")]
    verbose: u8,
}

fn init_tracing(verbose: u8, bars: Option<&TerminalProgress>) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ffdl={}", level)));
    // log lines must not tear the progress bars sharing stderr
    let writer = match bars.map(TerminalProgress::writer) {
        Some(writer) => BoxMakeWriter::new(move || writer.clone()),
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init();
}

fn report(outcome: &BatchOutcome) {
    match outcome.status() {
        OutcomeStatus::AllSucceeded => {
            tracing::info!("All files were downloaded successfully!");
            return;
        }
        OutcomeStatus::AllFailed => tracing::error!("No file was downloaded!"),
        OutcomeStatus::Partial => tracing::error!(
            "{} out of {} were successfully downloaded!",
            outcome.succeeded,
            outcome.total
        ),
    }
    for failure in &outcome.failures {
        tracing::error!("{}", failure);
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let bars = (!cli.no_progress).then(TerminalProgress::new);
    init_tracing(cli.verbose, bars.as_ref());

    let save_path = match cli.save_path {
        Some(path) => path,
        None => config::default_download_dir()?,
    };
    let source = match (cli.input_file, cli.links) {
        (Some(path), _) => UrlSource::File(path),
        (None, Some(links)) => UrlSource::Links(links),
        (None, None) => unreachable!("clap requires one url source"),
    };
    let urls = input::read_urls(&source).await?;

    let mut service = ServiceConfig::default();
    service.max_transfers = cli.max_transfers.map(NonZeroUsize::get);
    service.connect_timeout = match cli.connect_timeout {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let progress: Box<dyn ProgressReporter> = match bars {
        Some(bars) => Box::new(bars),
        None => Box::new(NoProgress),
    };

    tracing::info!(count = urls.len(), dest = %save_path.display(), "starting batch");
    let outcome = ffdl::download(&urls, &save_path, service, progress.as_ref()).await?;
    report(&outcome);

    if let Some(path) = cli.report {
        let json = serde_json::to_vec_pretty(&outcome)?;
        tokio::fs::write(&path, json).await?;
        tracing::info!(path = %path.display(), "report written");
    }

    Ok(())
}
