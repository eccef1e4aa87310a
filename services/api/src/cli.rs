use crate::commands::{
    run_audit, run_correlation, run_lookup, run_notebook, run_readmission, run_reference,
    run_score, AuditArgs, CorrelationArgs, LookupArgs, NotebookCommand, ReadmissionArgs,
    ReferenceCommand, ScoreArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use vhn_readmission::config::AppConfig;
use vhn_readmission::error::AppError;
use vhn_readmission::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "vhn-readmission",
    about = "Score readmission risk, audit encounter extracts and maintain the analysis notebooks",
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
    /// Print the data-quality audit of a CSV extract
    Audit(AuditArgs),
    /// Score every encounter in a CSV extract
    Score(ScoreArgs),
    /// Reference identifier mapping utilities
    Reference {
        #[command(subcommand)]
        command: ReferenceCommand,
    },
    /// Patch or merge analysis notebooks
    Notebook {
        #[command(subcommand)]
        command: NotebookCommand,
    },
    /// Look up descriptions for diagnosis codes
    Lookup(LookupArgs),
    /// Early readmission rates (or outcome counts) grouped by a category column
    Readmission(ReadmissionArgs),
    /// Pearson correlation between numeric columns
    Correlation(CorrelationArgs),
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
        Command::Audit(args) => {
            init_command_logging()?;
            run_audit(args)
        }
        Command::Score(args) => {
            init_command_logging()?;
            run_score(args)
        }
        Command::Reference { command } => {
            init_command_logging()?;
            run_reference(command)
        }
        Command::Notebook { command } => {
            init_command_logging()?;
            run_notebook(command)
        }
        Command::Lookup(args) => {
            let config = init_command_logging()?;
            run_lookup(args, &config.lookup).await
        }
        Command::Readmission(args) => {
            init_command_logging()?;
            run_readmission(args)
        }
        Command::Correlation(args) => {
            init_command_logging()?;
            run_correlation(args)
        }
    }
}

fn init_command_logging() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_for_cli(&config.telemetry)?;
    Ok(config)
}
