use chrono::Utc;
use clap::{Parser, Subcommand};
use sdn_lookup_core::{
    DuplicatePolicy, RecordFilter, SanctionsService, ServiceError, ServiceOptions,
    DEFAULT_FEED_URL, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_FRESHNESS_HOURS, MATCH_THRESHOLD,
};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sdn-lookup", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SDN XML export URL
    #[arg(long, env = "SDN_FEED_URL", default_value = DEFAULT_FEED_URL)]
    feed_url: String,

    /// Where the downloaded SDN XML is kept
    #[arg(long, env = "SDN_DOCUMENT_PATH", default_value = "./public/data/sdn.xml")]
    document_path: PathBuf,

    /// Where the transformed record snapshot is kept
    #[arg(long, env = "SDN_SNAPSHOT_PATH", default_value = "./public/data/sdn_cache.json")]
    snapshot_path: PathBuf,

    /// Snapshot freshness window in hours
    #[arg(long, env = "SDN_FRESHNESS_HOURS", default_value_t = DEFAULT_FRESHNESS_HOURS)]
    freshness_hours: u64,

    /// Download timeout in seconds
    #[arg(long, env = "SDN_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    fetch_timeout_secs: u64,

    /// Minimum similarity for fuzzy matches
    #[arg(long, env = "SDN_MATCH_THRESHOLD", default_value_t = MATCH_THRESHOLD)]
    match_threshold: f64,

    /// Keep only the first entry when the feed repeats a uid
    #[arg(long, default_value_t = false)]
    first_wins: bool,
}

impl Cli {
    fn options(&self) -> ServiceOptions {
        ServiceOptions {
            feed_url: self.feed_url.clone(),
            document_path: self.document_path.clone(),
            snapshot_path: self.snapshot_path.clone(),
            freshness_window: Duration::from_secs(self.freshness_hours.saturating_mul(3600)),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            match_threshold: self.match_threshold,
            duplicate_policy: if self.first_wins {
                DuplicatePolicy::FirstWins
            } else {
                DuplicatePolicy::KeepAll
            },
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Download the SDN list and rebuild the snapshot.
    Update,
    /// List records, optionally filtered by name, id number and program.
    List {
        /// Substring of the record name
        #[arg(long)]
        query: Option<String>,
        /// Substring of any identifier number
        #[arg(long)]
        id_number: Option<String>,
        /// Substring of any sanctions program
        #[arg(long)]
        program: Option<String>,
    },
    /// Fuzzy-search record names.
    Search {
        /// Name to look for
        #[arg(long)]
        query: String,
    },
    /// Report the best match for a name across primary and alternate names.
    Check {
        /// Name to screen
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let options = cli.options();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        document = %options.document_path.display(),
        snapshot = %options.snapshot_path.display(),
        "sdn-lookup boot"
    );

    match run(cli.command, &options).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(Failure::Service(failure)) => {
            error!(error = %failure, status = failure.status_code(), "sdn-lookup command failed");
            eprintln!("{}", serde_json::to_string_pretty(&failure.to_body())?);
            Ok(ExitCode::FAILURE)
        }
        Err(Failure::Output(error)) => Err(error.into()),
    }
}

enum Failure {
    Service(ServiceError),
    Output(serde_json::Error),
}

impl From<ServiceError> for Failure {
    fn from(error: ServiceError) -> Self {
        Self::Service(error)
    }
}

impl From<serde_json::Error> for Failure {
    fn from(error: serde_json::Error) -> Self {
        Self::Output(error)
    }
}

async fn run(command: Command, options: &ServiceOptions) -> Result<Value, Failure> {
    let service = SanctionsService::from_options(options)?;

    let output = match command {
        Command::Update => {
            let update = service.update().await?;
            info!(entries = update.entries_count, checksum = %update.checksum, "sdn list updated");
            serde_json::to_value(update)?
        }
        Command::List {
            query,
            id_number,
            program,
        } => {
            let criteria = RecordFilter {
                query,
                id_number,
                program,
            };
            serde_json::to_value(service.list(&criteria)?)?
        }
        Command::Search { query } => serde_json::to_value(service.search(&query)?)?,
        Command::Check { name } => serde_json::to_value(service.check_name(&name)?)?,
    };

    Ok(output)
}
