use crate::report::render_assessment;
use crate::server;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tenant_risk::config::{AppConfig, ScoringConfig};
use tenant_risk::error::AppError;
use tenant_risk::scoring::{ApplicationRecord, HttpScoringClient, ScoringController};

#[derive(Parser, Debug)]
#[command(
    name = "Tenant Risk Assessment",
    about = "Serve the tenant risk assessment page or score applications from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score one application read as JSON and print a text report
    Score(ScoreArgs),
    /// Print a default application record as JSON
    Sample,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file with application fields; `-` reads standard input.
    /// Missing fields keep their form defaults.
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Override the scoring service base URL
    #[arg(long)]
    pub(crate) endpoint: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args).await,
        Command::Sample => print_sample(),
    }
}

async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs { input, endpoint } = args;
    let mut config = AppConfig::load()?;
    if let Some(base_url) = endpoint {
        config.scoring.endpoint = ScoringConfig::endpoint_for(&base_url)?;
    }

    let partial: Value = serde_json::from_str(&read_input(&input)?)?;
    let record = ApplicationRecord::overlay(&partial)?;

    let client = HttpScoringClient::new(&config.scoring)?;
    let controller = ScoringController::new(Arc::new(client));
    let outcome = controller.submit(record.clone()).await;

    print!(
        "{}",
        render_assessment(&record, &outcome, &config.scoring.thresholds)
    );
    Ok(())
}

fn read_input(path: &Path) -> Result<String, AppError> {
    if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn print_sample() -> Result<(), AppError> {
    let record = ApplicationRecord::new();
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
