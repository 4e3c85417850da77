//! Hanzi CLI - Character lookup and seed generation
//!
//! Queries a running Hanzi server, or generates seed files directly
//! against the configured model.

mod api;
mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use api::HanziClient;
use config::{mask_secret, Config};
use hanzi::backfill::response::to_batch_json;
use hanzi::{split_glyphs, BackfillConfig, CharacterBackfill, OpenAiProvider};

#[derive(Parser)]
#[command(name = "hanzi")]
#[command(about = "Hanzi CLI - Chinese character lookup", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a character on the server
    Lookup {
        /// A single Chinese character
        character: String,
    },

    /// Show the most visited characters
    Popular {
        /// Max results (server caps at 60)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Generate a seed file from a list of characters
    Generate {
        /// Text file with the characters to generate
        #[arg(short, long)]
        input: PathBuf,
        /// JSON file to write
        #[arg(short, long)]
        output: PathBuf,
        /// Characters per model request
        #[arg(short, long, default_value = "10")]
        batch_size: usize,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set the server URL
    SetUrl {
        /// e.g. http://localhost:3000
        url: String,
    },
    /// Set generative API settings
    SetLlm {
        #[arg(long)]
        api_base: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hanzi=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup { character } => cmd_lookup(&character).await,
        Commands::Popular { limit } => cmd_popular(limit).await,
        Commands::Generate {
            input,
            output,
            batch_size,
        } => cmd_generate(input, output, batch_size).await,
        Commands::Config { action } => cmd_config(action),
    }
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_lookup(character: &str) -> Result<()> {
    let config = Config::load()?;
    let client = HanziClient::new(&config.base_url);

    let record = client.lookup(character.trim()).await?;

    println!("{}  {}", record.character.bold(), record.pinyin.cyan());
    println!("  Radical: {}", record.radical);
    println!("  Strokes: {}", record.strokes);
    if !record.meaning.is_empty() {
        println!("  Meaning: {}", record.meaning.join("; "));
    }
    if !record.words.is_empty() {
        println!("  Words:   {}", record.words.join(" "));
    }
    if !record.similar.is_empty() {
        println!("  Similar: {}", record.similar.join(" "));
    }

    Ok(())
}

async fn cmd_popular(limit: Option<usize>) -> Result<()> {
    let config = Config::load()?;
    let client = HanziClient::new(&config.base_url);

    let popular = client.popular(limit).await?;

    if popular.characters.is_empty() {
        println!("{}", "No visits recorded yet".yellow());
        return Ok(());
    }

    println!("{}", "Most visited:".bold());
    for (rank, entry) in popular.characters.iter().enumerate() {
        println!(
            "  {:>2}. {}  {}",
            rank + 1,
            entry.character.bold(),
            entry.visit_count.to_string().dimmed()
        );
    }

    Ok(())
}

async fn cmd_generate(input: PathBuf, output: PathBuf, batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        bail!("--batch-size must be at least 1");
    }

    let config = Config::load()?;
    let api_key = match config.llm.api_key.as_deref() {
        Some(key) if !key.is_empty() => key,
        _ => bail!("No API key configured. Run: hanzi config set-llm --api-key <KEY>"),
    };

    let text =
        fs::read_to_string(&input).with_context(|| format!("Failed to read {:?}", input))?;
    let glyphs = split_glyphs(&text);
    if glyphs.is_empty() {
        bail!("No characters found in {:?}", input);
    }

    let backfill_config = BackfillConfig {
        batch_size,
        ..BackfillConfig::default()
    };
    let provider = OpenAiProvider::new(api_key)
        .with_api_base(&config.llm.api_base)
        .with_model(&config.llm.model)
        .with_timeout(backfill_config.request_timeout)
        .context("Failed to build model client")?;
    let backfill = CharacterBackfill::new(Arc::new(provider), Some(backfill_config));

    println!(
        "Generating {} characters with {} ({} per request)...",
        glyphs.len(),
        config.llm.model.cyan(),
        batch_size
    );

    let report = backfill.generate_batch(&glyphs).await;

    let json = serde_json::to_string_pretty(&to_batch_json(&report.records))
        .context("Failed to serialize records")?;
    fs::write(&output, json).with_context(|| format!("Failed to write {:?}", output))?;

    println!(
        "{} Wrote {} of {} characters to {:?}",
        "✓".green(),
        report.records.len(),
        glyphs.len(),
        output
    );

    for (group, error) in &report.failed_groups {
        let label: String = group.iter().map(|g| g.as_str()).collect();
        println!("{} {}: {}", "✗".red(), label, error);
    }

    let missing = glyphs.len().saturating_sub(report.records.len());
    if missing > 0 {
        println!(
            "{}",
            format!("{} characters missing; rerun with the missing ones to retry", missing)
                .yellow()
        );
    }

    Ok(())
}

fn cmd_config(action: Option<ConfigAction>) -> Result<()> {
    let mut config = Config::load()?;

    match action {
        Some(ConfigAction::SetUrl { url }) => {
            config.set_base_url(&url);
            config.save()?;
            println!("{} Server URL set to {}", "✓".green(), config.base_url);
        }
        Some(ConfigAction::SetLlm {
            api_base,
            api_key,
            model,
        }) => {
            if api_base.is_none() && api_key.is_none() && model.is_none() {
                bail!("Nothing to set. Use --api-base, --api-key or --model");
            }
            config.set_llm(api_base, api_key, model);
            config.save()?;
            println!("{} LLM settings saved", "✓".green());
        }
        None => {
            println!("{}", "Configuration:".bold());
            println!("  Path: {:?}", Config::config_path()?);
            println!("  Server URL: {}", config.base_url);
            println!("  LLM API base: {}", config.llm.api_base);
            println!("  LLM model: {}", config.llm.model.cyan());
            println!(
                "  LLM API key: {}",
                match config.llm.api_key.as_deref() {
                    Some(key) => mask_secret(key).green(),
                    None => "Not set".red(),
                }
            );
        }
    }

    Ok(())
}
