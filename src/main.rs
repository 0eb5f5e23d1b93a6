use clap::{ArgAction, Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use fetch_dispatch::logging::{init_logging, LoggingConfig};
use fetch_dispatch::settings::{FetchConfig, FetchConfigError};
use fetch_dispatch::{
    Dispatcher, OutcomeKind, OutcomeSelector, ScriptedSelector, SeededSelector,
    SimulatedFetcher, TimeoutFetcher,
};

/// Exit code for configuration and output errors.
const EXIT_USAGE: u8 = 2;

/// Outcome to force instead of random selection
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutcome {
    /// The fetch succeeds
    Success,
    /// A temporary network error
    TemporaryNetwork,
    /// A permanent network error
    PermanentNetwork,
    /// The server returns an invalid response
    InvalidResponse,
    /// The server rate limits the request
    RateLimit,
    /// An unclassified error
    Unknown,
}

impl From<CliOutcome> for OutcomeKind {
    fn from(outcome: CliOutcome) -> Self {
        match outcome {
            CliOutcome::Success => OutcomeKind::Success,
            CliOutcome::TemporaryNetwork => OutcomeKind::TemporaryNetwork,
            CliOutcome::PermanentNetwork => OutcomeKind::PermanentNetwork,
            CliOutcome::InvalidResponse => OutcomeKind::InvalidResponse,
            CliOutcome::RateLimit => OutcomeKind::RateLimit,
            CliOutcome::Unknown => OutcomeKind::Unknown,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "fetch-dispatch")]
#[command(version)]
#[command(about = "Fetch data once, classify the outcome and react to the error kind")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Seed for random outcome selection
    #[arg(long)]
    seed: Option<u64>,

    /// Force the outcome of each attempt, in order (repeatable; the last one repeats)
    #[arg(long, short, value_enum, value_name = "KIND")]
    force: Vec<CliOutcome>,

    /// Wait carried by a rate limit error, in milliseconds
    #[arg(long, value_name = "MS")]
    retry_after_ms: Option<u64>,

    /// Simulated time each attempt takes, in milliseconds
    #[arg(long, value_name = "MS")]
    latency_ms: Option<u64>,

    /// Deadline for each attempt, in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Print the final report as JSON instead of status lines
    #[arg(long)]
    json: bool,

    /// Suppress all logs except errors
    #[arg(long, short)]
    quiet: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
}

impl Cli {
    /// Loads the configuration and applies command-line overrides on top.
    fn fetch_config(&self) -> Result<FetchConfig, FetchConfigError> {
        let mut config = match &self.config {
            Some(path) => FetchConfig::load(path)?,
            None => FetchConfig::from_env()?,
        };

        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(ms) = self.retry_after_ms {
            config = config.with_retry_after(Duration::from_millis(ms));
        }
        if let Some(ms) = self.latency_ms {
            config = config.with_latency(Duration::from_millis(ms));
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_attempt_timeout(Duration::from_millis(ms));
        }

        Ok(config)
    }

    fn selector(&self, config: &FetchConfig) -> Box<dyn OutcomeSelector> {
        if !self.force.is_empty() {
            let script = self.force.iter().copied().map(OutcomeKind::from);
            return Box::new(ScriptedSelector::new(script));
        }

        match config.seed {
            Some(seed) => Box::new(SeededSelector::new(seed)),
            None => Box::new(SeededSelector::from_entropy()),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(LoggingConfig::from_flags(cli.verbose, cli.quiet));

    let config = match cli.fetch_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let fetcher = TimeoutFetcher::new(
        SimulatedFetcher::from_config(cli.selector(&config), &config),
        config.attempt_timeout,
    );
    let mut dispatcher = Dispatcher::new(fetcher);

    let result = if cli.json {
        dispatcher.run(&mut io::sink()).await
    } else {
        dispatcher.run(&mut io::stdout().lock()).await
    };

    match result {
        Ok(report) => {
            if cli.json {
                if let Err(e) = report.write_json(&mut io::stdout().lock()) {
                    eprintln!("error: {}", e);
                    return ExitCode::from(EXIT_USAGE);
                }
            }
            ExitCode::from(report.status.exit_code())
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(EXIT_USAGE)
        }
    }
}
