use crate::admin::{run_list, run_set_status, ListArgs, SetStatusArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use contact_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Contact Intake",
    about = "Run the contact-form intake service and administer stored submissions",
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
    /// Inspect and triage stored submissions in the configured store file
    Submissions {
        #[command(subcommand)]
        command: SubmissionsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SubmissionsCommand {
    /// List submissions, optionally filtered by status and date range
    List(ListArgs),
    /// Change the status of one submission
    SetStatus(SetStatusArgs),
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

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Submissions {
            command: SubmissionsCommand::List(args),
        } => run_list(args),
        Command::Submissions {
            command: SubmissionsCommand::SetStatus(args),
        } => run_set_status(args),
    }
}
