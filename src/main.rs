mod application;
mod commands;
mod constants;
mod logging;
mod sysexits;

use crate::commands::Cli;
use clap::Parser;
use std::process;

/// Entry point for the snapkit CLI application.
/// Parses command-line arguments and dispatches to the appropriate command handler.
fn main() {
    let cli = Cli::parse();
    let commands = match cli.commands {
        Some(commands) => commands,
        None => {
            eprintln!(
                "snapkit requires at least one command to execute. See 'snapkit --help' for usage."
            );
            process::exit(sysexits::EX_KEYWORD);
        }
    };

    logging::init(logging::level(cli.verbose, cli.quiet));

    if let Err(e) = commands::execute(commands) {
        eprintln!("Error: {e:#}");
        process::exit(commands::exit_code(&e));
    }
}
