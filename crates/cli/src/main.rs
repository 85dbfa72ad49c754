//! minion CLI: the main entry point.
//!
//! Commands:
//! - `ask`:    One question to the travel persona
//! - `news`:   Same-day technology news with web search
//! - `recipe`: Recipe assistant (extract, normalize, shopping list)
//! - `doctor`: Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "minion",
    about = "minion: small agents on hosted language models",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.minion/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model deployment to use for every agent without an override
    #[arg(short, long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the travel agent one question
    Ask {
        /// The question (defaults to a snowy vacation request)
        prompt: Option<String>,

        /// Replace the travel persona's instructions
        #[arg(short, long)]
        instructions: Option<String>,
    },

    /// Get today's news for a product or technology
    News,

    /// Extract recipes from URLs and build shopping lists
    Recipe,

    /// Show configuration and check connectivity
    Doctor {
        /// Also send a request to the endpoint
        #[arg(long)]
        ping: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr and stay quiet unless asked for
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let opts = commands::GlobalOpts {
        config: cli.config,
        model: cli.model,
    };

    match cli.command {
        Commands::Ask {
            prompt,
            instructions,
        } => commands::ask::run(&opts, prompt, instructions).await?,
        Commands::News => commands::news::run(&opts).await?,
        Commands::Recipe => commands::recipe::run(&opts).await?,
        Commands::Doctor { ping } => commands::doctor::run(&opts, ping).await?,
    }

    Ok(())
}
