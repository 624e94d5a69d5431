pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "smokesignal",
    about = "Smokesignal operator CLI",
    long_about = "Register the Discord slash commands and inspect the effective configuration.",
    after_help = "Examples:\n  smokesignal register --dry-run\n  smokesignal payload\n  smokesignal config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Overwrite the application's slash commands with /smoketime and /smoke")]
    Register {
        #[arg(long, help = "Validate credentials and print the target without calling Discord")]
        dry_run: bool,
    },
    #[command(about = "Print the command registration payload as JSON")]
    Payload,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Register { dry_run } => commands::register::run(dry_run),
        Command::Payload => commands::payload::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
