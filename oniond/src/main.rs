mod commands;
mod logging;
mod pidfile;
mod signals;

use clap::{Parser, Subcommand};
use onion_core::config::DEFAULT_CONFIG_PATH;
use onion_core::error::ErrorKind;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "oniond")]
#[command(about = "Active/passive high availability daemon")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the daemon (the default command)
    Start,
    /// Validate the configuration file and exit
    Check,
    /// Query a running daemon's cluster status
    Status,
    /// Print the version and exit
    Version,
    /// Print a short description and exit
    About,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Start);

    match command {
        Commands::Start => match commands::start::run(&cli.config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("oniond: {err}");
                exit_code_for(&err)
            }
        },
        Commands::Check => match commands::check::run(&cli.config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::from(1),
        },
        Commands::Status => match commands::status::run(&cli.config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("oniond: {err}");
                ExitCode::from(1)
            }
        },
        Commands::Version => {
            println!("oniond {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::About => {
            println!(concat!(
                "Onion HA — simple active/passive high availability for a cluster of nodes ",
                "sharing a virtual service."
            ));
            ExitCode::SUCCESS
        }
    }
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(onion_err) = cause.downcast_ref::<onion_core::OnionError>() {
            return match onion_err.kind() {
                ErrorKind::Recoverable => ExitCode::from(1),
                ErrorKind::Privilege => ExitCode::from(2),
            };
        }
    }
    ExitCode::from(1)
}
