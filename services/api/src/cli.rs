use crate::registry::{run_is_member, run_lookup, run_verify, LookupArgs, VerifyArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use utn_recruitment::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "UTN Recruitment",
    about = "Run the recruitment service or query the unicore membership registry",
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
    /// Query the unicore membership registry directly
    Unicore {
        #[command(subcommand)]
        command: UnicoreCommand,
    },
}

#[derive(Subcommand, Debug)]
enum UnicoreCommand {
    /// Resolve an identity number to the person on file
    Lookup(LookupArgs),
    /// Check whether an identity number belongs to a paying member
    IsMember(LookupArgs),
    /// Check membership for many identity numbers at once
    Verify(VerifyArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON file with the roles and positions open for applications
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
        Command::Unicore { command } => match command {
            UnicoreCommand::Lookup(args) => run_lookup(args).await,
            UnicoreCommand::IsMember(args) => run_is_member(args).await,
            UnicoreCommand::Verify(args) => run_verify(args).await,
        },
    }
}
