use crate::demo::{run_answers_check, run_answers_normalize, run_demo, AnswersArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use talent_screen::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Talent Screen",
    about = "Run and exercise the screening question engine from the command line",
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
    /// Walk one posting and one candidate through the whole screening flow
    Demo(DemoArgs),
    /// Work with candidate answer documents
    Answers {
        #[command(subcommand)]
        command: AnswersCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AnswersCommand {
    /// Convert an answer document to the canonical list for a question set
    Normalize(AnswersArgs),
    /// Report which questions are still missing a valid answer
    Check(AnswersArgs),
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
        Command::Demo(args) => run_demo(args).await,
        Command::Answers {
            command: AnswersCommand::Normalize(args),
        } => run_answers_normalize(args),
        Command::Answers {
            command: AnswersCommand::Check(args),
        } => run_answers_check(args),
    }
}
