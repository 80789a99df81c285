mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, generate::GenerateSubcommand, mermaid::MermaidSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "companion",
    about = "SDLC Companion — generate specs, designs, code, tests, pipelines and docs with an LLM",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./companion.yaml if present)
    #[arg(long, global = true, env = "COMPANION_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to listen on (default: from config, 3141)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (default: from config, 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Generate one artifact and print it
    Generate {
        #[command(subcommand)]
        subcommand: GenerateSubcommand,
    },

    /// Repair Mermaid diagrams
    Mermaid {
        #[command(subcommand)]
        subcommand: MermaidSubcommand,
    },

    /// Inspect and validate configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// List LLM providers and whether they are configured
    Providers,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Serve { port, bind } => cmd::serve::run(config_path, port, bind),
        Commands::Generate { subcommand } => cmd::generate::run(config_path, subcommand, cli.json),
        Commands::Mermaid { subcommand } => cmd::mermaid::run(subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(config_path, subcommand, cli.json),
        Commands::Providers => cmd::providers::run(config_path, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
