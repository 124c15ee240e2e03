//! Local setup helper: writes the Gemini settings into `.env` and verifies
//! that the backend can reach its database and provider.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use backend::config::{Config, DEFAULT_DATABASE_URL, DEFAULT_EMBEDDING_MODEL, DEFAULT_LLM_MODEL};
use backend::db;
use backend::llm_client::{build_providers, EMBEDDING_DIMENSION};

#[derive(Parser)]
#[command(name = "setup")]
#[command(about = "Configure and verify the Resume Matcher backend")]
struct SetupCli {
    #[command(subcommand)]
    command: SetupCommand,
}

#[derive(Subcommand)]
enum SetupCommand {
    /// Write Gemini settings into an env file
    Init {
        #[arg(long)]
        api_key: String,
        #[arg(long, default_value = DEFAULT_LLM_MODEL)]
        model: String,
        #[arg(long, default_value = DEFAULT_EMBEDDING_MODEL)]
        embedding_model: String,
        #[arg(long, default_value = DEFAULT_DATABASE_URL)]
        database_url: String,
        #[arg(long, default_value = ".env")]
        env_file: PathBuf,
        /// Overwrite values already present in the env file
        #[arg(long)]
        force: bool,
    },
    /// Check that the configuration is usable
    Check {
        /// Also send one completion and one embedding request to Gemini
        #[arg(long)]
        live: bool,
        /// Read settings from this file instead of `.env`
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match SetupCli::parse().command {
        SetupCommand::Init {
            api_key,
            model,
            embedding_model,
            database_url,
            env_file,
            force,
        } => {
            let values = [
                ("LLM_PROVIDER", "gemini".to_string()),
                ("GEMINI_API_KEY", api_key),
                ("LL_MODEL", model),
                ("EMBEDDING_MODEL", embedding_model),
                ("DATABASE_URL", database_url),
            ];
            write_env_file(&env_file, &values, force)?;
            println!("✅ Wrote Gemini settings to {}", env_file.display());
            Ok(())
        }
        SetupCommand::Check { live, env_file } => {
            let config = match env_file {
                Some(path) => config_from_env_file(&path)?,
                None => Config::from_env()?,
            };
            run_checks(config, live).await
        }
    }
}

fn write_env_file(path: &Path, values: &[(&str, String)], force: bool) -> Result<()> {
    let existing = if path.exists() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    } else {
        String::new()
    };
    let merged = merge_env(&existing, values, force)?;
    std::fs::write(path, merged).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Env file updated");
    Ok(())
}

/// Merges `values` into env-file text. Unrelated lines and comments are kept.
/// Blank placeholders are filled in. A key already set to a different value
/// is an error unless `force` is set.
fn merge_env(existing: &str, values: &[(&str, String)], force: bool) -> Result<String> {
    let mut lines: Vec<String> = existing.lines().map(String::from).collect();
    let mut conflicts = Vec::new();

    for (key, value) in values {
        let assignment = format!("{key}={value}");
        let position = lines.iter().position(|line| env_key(line) == Some(*key));
        match position {
            Some(i) if env_value(&lines[i]) == value.as_str() => {}
            Some(i) if env_value(&lines[i]).is_empty() => lines[i] = assignment,
            Some(i) if force => lines[i] = assignment,
            Some(_) => conflicts.push(*key),
            None => lines.push(assignment),
        }
    }

    if !conflicts.is_empty() {
        bail!(
            "{} already set in the env file; re-run with --force to overwrite",
            conflicts.join(", ")
        );
    }

    let mut merged = lines.join("\n");
    merged.push('\n');
    Ok(merged)
}

fn env_key(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    line.split_once('=').map(|(k, _)| k.trim())
}

fn env_value(line: &str) -> &str {
    line.split_once('=')
        .map(|(_, v)| v.trim().trim_matches('"'))
        .unwrap_or("")
}

/// Settings in `path` take precedence over the process environment.
fn config_from_env_file(path: &Path) -> Result<Config> {
    let file: HashMap<String, String> = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read {}", path.display()))?
        .collect::<Result<_, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    info!(path = %path.display(), "Loaded settings from env file");
    Config::from_lookup(|key| {
        file.get(key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .or_else(|| std::env::var(key).ok())
    })
}

async fn run_checks(config: Config, live: bool) -> Result<()> {
    println!("✅ LLM provider: {}", config.llm_provider);

    ensure!(
        config.gemini_api_key.is_some(),
        "GEMINI_API_KEY is not set (run `setup init --api-key ...`)"
    );
    println!("✅ Gemini API key configured");
    println!("✅ Completion model: {}", config.llm_model);
    println!("✅ Embedding model: {}", config.embedding_model);

    let pool = db::create_pool(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    if db::is_reachable(&pool).await {
        println!("✅ Database reachable: {}", config.database_url);
    } else {
        warn!("Database opened but did not answer a test query");
        bail!("Database {} is not reachable", config.database_url);
    }

    if !live {
        println!("Skipping live provider checks (pass --live to run them)");
        return Ok(());
    }

    let (llm, embedder) = build_providers(&config)?;

    let reply = llm
        .complete("Reply with the single word OK.")
        .await
        .context("Completion request failed")?;
    ensure!(!reply.trim().is_empty(), "Completion returned empty text");
    println!("✅ Completion ({}) returned text", llm.model());

    let vector = embedder
        .embed("Senior Rust engineer with Axum and SQLx experience")
        .await
        .context("Embedding request failed")?;
    ensure!(
        vector.len() == EMBEDDING_DIMENSION,
        "Expected a {EMBEDDING_DIMENSION}-dimension embedding, got {}",
        vector.len()
    );
    println!("✅ Embedding ({}) returned {} values", embedder.model(), vector.len());

    Ok(())
}
