use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxval::cli::setup::setup;
use fxval::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxval::AppCommand {
    fn from(cmd: Commands) -> fxval::AppCommand {
        match cmd {
            Commands::Summary => fxval::AppCommand::Summary,
            Commands::Convert { from, to, amount } => {
                fxval::AppCommand::Convert { from, to, amount }
            }
            Commands::Parse { text } => fxval::AppCommand::Parse { text },
            Commands::Currency { code } => fxval::AppCommand::Currency { code },
            Commands::Serve { port } => fxval::AppCommand::Serve { port },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display portfolio totals in the reporting currency
    Summary,
    /// Convert an amount between two currencies
    Convert {
        /// Source currency code, e.g. USD
        from: String,
        /// Target currency code, e.g. EUR
        to: String,
        /// Amount to convert; omit to print the rate only
        amount: Option<f64>,
    },
    /// Read a currency amount from free text, e.g. "EUR 12.50"
    Parse { text: String },
    /// Show or set the preferred reporting currency
    Currency { code: Option<String> },
    /// Serve the HTTP conversion endpoint
    Serve {
        /// Port to listen on (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fxval::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
