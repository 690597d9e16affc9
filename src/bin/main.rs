use elevation_stress::model::DEFAULT_HOST;
use elevation_stress::*;

use anyhow::Context;
use clap::{ArgAction, Parser};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_help_flag = true)]
struct Args {
    /// Base URL of the test target
    #[arg(short = 'h', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Value of the 'Authorization' header, omitted when empty
    #[arg(short, long, default_value = "")]
    auth: String,

    /// Number of clients
    #[arg(short, long, default_value_t = 50)]
    clients: usize,

    /// Requests per client
    #[arg(short, long, default_value_t = 50)]
    requests: usize,

    /// Locations per request
    #[arg(short, long, default_value_t = 1000)]
    locations: usize,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Print the summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print().ok();
            return ExitCode::from(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // aborts are already reported by the aggregator
            if !matches!(
                e.downcast_ref::<StressError>(),
                Some(StressError::Aborted { .. })
            ) {
                tracing::error!("{:#}", e);
            }
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = RunConfig::new(args.host, args.clients, args.requests, args.locations)
        .with_auth(args.auth)
        .with_timeout(args.timeout.map(Duration::from_secs))
        .with_progress(!args.no_progress);

    let driver = LoadDriver::new(config)?;
    let summary = driver.run().await?;

    summary.log();
    if args.json {
        println!("{}", summary.to_json().context("failed to encode summary")?);
    }

    Ok(())
}
