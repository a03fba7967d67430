mod cli;

use clap::{Parser, Subcommand};
use tracing::Level;

use cli::check::{cmd_check, CheckArgs};
use cli::fmt::{cmd_fmt, FmtArgs};

#[derive(Parser)]
#[command(
    name = "lea",
    version,
    about = "Parser and canonical formatter for the Lea pipe language"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Format .lea source files
    Fmt(FmtArgs),
    /// Parse .lea source files and report syntax errors
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fmt(args) => cmd_fmt(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
