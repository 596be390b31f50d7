mod cli;
mod commands;
mod config;
mod console;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, GlobalOpts, LogFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // The bridge is a service: it logs lifecycle at info by default.
    let base_level = usize::from(matches!(cli.command, Command::Run(_)));
    init_tracing(&cli.global, base_level);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(global: &GlobalOpts, base_level: usize) {
    const LEVELS: [&str; 4] = ["warn", "info", "debug", "trace"];
    let index = (base_level + usize::from(global.verbose)).min(LEVELS.len() - 1);
    let filter = LEVELS.get(index).copied().unwrap_or("trace");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match global.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a controller
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "autonomic", &mut std::io::stdout());
            Ok(())
        }

        Command::Run(args) => {
            let bridge = config::bridge_config(&cli.global)?;
            commands::run::handle(args, bridge).await
        }

        cmd => {
            let bridge = config::client_config(&cli.global)?;
            tracing::debug!(command = ?cmd, base_url = %bridge.base_url, "dispatching command");

            match cmd {
                Command::Zones => commands::zones::handle(&bridge, &cli.global).await,
                Command::Get { zone } => commands::power::get(&bridge, &zone, &cli.global).await,
                Command::Set { zone, state } => {
                    commands::power::set(&bridge, &zone, state, &cli.global).await
                }
                // Handled above
                Command::Run(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
            }
        }
    }
}
