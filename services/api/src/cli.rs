use crate::commands::{run_quick_pick, run_recommend, QuickPickArgs, RecommendArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use wheelchair_advisor::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Wheelchair Advisor",
    about = "Serve or query wheelchair recommendations from the command line",
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
    /// Recommend wheelchairs for a free-text request and explain the scores
    Recommend(RecommendArgs),
    /// Sample three products from a fixed category
    QuickPick(QuickPickArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the catalog CSV path
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Recommend(args) => run_recommend(args),
        Command::QuickPick(args) => run_quick_pick(args),
    }
}
