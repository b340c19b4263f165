use crate::commands::{run_check, run_fill, CheckArgs, FillArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use jurat::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "jurat",
    about = "Fill immigration form templates from applicant records",
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
    /// Fill a form from a JSON applicant record on disk
    Fill(FillArgs),
    /// Verify that templates contain every field their mapping table writes
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the directory holding `<FORM>.pdf` templates
    #[arg(long)]
    pub(crate) template_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Fill(args) => run_fill(args),
        Command::Check(args) => run_check(args),
    }
}
