use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use ipsatrack::core::log::init_logging;

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

#[derive(Args)]
struct Selection {
    /// Instrument symbol, e.g. ^IPSA or COPEC.SN
    #[arg(short, long)]
    symbol: Option<String>,

    /// Chart period in days
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    days: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch and display current values once
    Show(Selection),
    /// Refresh every 5 minutes until interrupted
    Watch(Selection),
    /// List tracked instruments
    Symbols,
}

impl From<Commands> for ipsatrack::AppCommand {
    fn from(cmd: Commands) -> ipsatrack::AppCommand {
        match cmd {
            Commands::Show(s) => ipsatrack::AppCommand::Show {
                symbol: s.symbol,
                days: s.days,
            },
            Commands::Watch(s) => ipsatrack::AppCommand::Watch {
                symbol: s.symbol,
                days: s.days,
            },
            Commands::Symbols => ipsatrack::AppCommand::Symbols,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => ipsatrack::cli::setup::setup(),
        Some(cmd) => ipsatrack::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
