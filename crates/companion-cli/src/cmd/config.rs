use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use companion_core::config::{Config, WarnLevel, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Validate the effective config (file + environment)
    Check,

    /// Print the effective config with API keys redacted
    Show,

    /// Write a default config file
    Init {
        /// Destination (default: --config or ./companion.yaml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config_path: Option<&Path>, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Check => check(config_path, json),
        ConfigSubcommand::Show => show(config_path, json),
        ConfigSubcommand::Init { path, force } => {
            let dest = path
                .or_else(|| config_path.map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            init(&dest, force, json)
        }
    }
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

fn check(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load(config_path).context("failed to load config")?;
    for provider in [&mut config.llm.anthropic, &mut config.llm.openai] {
        if provider.has_key() {
            provider.api_key = Some("***".to_string());
        }
    }
    if config.database.url.is_some() {
        config.database.url = Some("***".to_string());
    }

    if json {
        print_json(&config)
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(dest: &Path, force: bool, json: bool) -> anyhow::Result<()> {
    if dest.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            dest.display()
        );
    }
    Config::default()
        .save(dest)
        .with_context(|| format!("failed to write {}", dest.display()))?;

    if json {
        print_json(&serde_json::json!({ "path": dest.display().to_string() }))?;
    } else {
        println!("Wrote {}", dest.display());
    }
    Ok(())
}
