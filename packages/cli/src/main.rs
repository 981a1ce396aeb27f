mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{init, paths, replay, InitArgs, PathsArgs, ReplayArgs};
use tracing_subscriber::EnvFilter;

/// Sitedit CLI - headless driver for the live page editor
#[derive(Parser, Debug)]
#[command(name = "sitedit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sitedit.config.json with the default settings
    Init(InitArgs),

    /// Print the node path of every element in a page
    Paths(PathsArgs),

    /// Replay a scripted editing session against a page
    Replay(ReplayArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match std::env::current_dir() {
        Ok(cwd) => match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Paths(args) => paths(args),
            Command::Replay(args) => replay(args, &cwd).await,
        },
        Err(e) => Err(anyhow::anyhow!("Cannot get current directory: {e}")),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
