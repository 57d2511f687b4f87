mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imgcompare", about = "Side-by-side image comparison tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the visible regions of two images
    Compare(commands::compare::CompareArgs),
    /// Show image file dimensions
    Info(commands::info::InfoArgs),
    /// Print or save the default settings
    Config(commands::config::ConfigArgs),
    /// Rotate an image file in place by 90 degrees
    Rotate(commands::transform::RotateArgs),
    /// Mirror an image file in place
    Flip(commands::transform::FlipArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Compare(args) => commands::compare::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Rotate(args) => commands::transform::run_rotate(args),
        Commands::Flip(args) => commands::transform::run_flip(args),
    }
}
