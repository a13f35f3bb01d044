//! Lineup CLI
//!
//! Command-line front end over the `of_lineup` JSON API: preset layouts,
//! chemistry reports and replay of recorded drag interactions.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use of_lineup::api::{
    apply_interaction_json, compute_chemistry_json, formation_preset_json, list_presets_json,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lineup")]
#[command(about = "Formation positioning and chemistry tools", long_about = None)]
#[command(version = of_lineup::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in formation presets
    Presets,

    /// Print an empty formation for a preset
    Preset {
        /// Preset id or display name (e.g. "T433", "4-3-3")
        name: String,

        /// Write the formation here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Score a lineup file (formation + relationship records)
    Chemistry {
        /// ChemistryRequest JSON file
        #[arg(long)]
        input: PathBuf,
    },

    /// Replay a recorded drag interaction against a formation
    Replay {
        /// InteractionRequest JSON file
        #[arg(long)]
        input: PathBuf,

        /// Resolve a trailing conflict with this outcome
        /// (swap, replace, find_alternative, cancel)
        #[arg(long)]
        outcome: Option<String>,

        /// Write the full response here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Presets => {
            let data = unwrap_response(&list_presets_json())?;
            for preset in data.as_array().into_iter().flatten() {
                println!(
                    "{:<18} {}",
                    preset["id"].as_str().unwrap_or_default(),
                    preset["display_name"].as_str().unwrap_or_default()
                );
            }
        }

        Commands::Preset { name, out } => {
            let request = serde_json::json!({ "preset": name });
            let data = unwrap_response(&formation_preset_json(&request.to_string()))?;
            emit(&data, out.as_deref())?;
        }

        Commands::Chemistry { input } => {
            let request = read_input(&input)?;
            let data = unwrap_response(&compute_chemistry_json(&request))?;
            println!("Formation average: {:.1}", data["formation_average"].as_f64().unwrap_or(0.0));
            for edge in data["pair_scores"].as_array().into_iter().flatten() {
                println!(
                    "  {:<12} {:<12} {:>3}",
                    edge["a"].as_str().unwrap_or_default(),
                    edge["b"].as_str().unwrap_or_default(),
                    edge["score"]
                );
            }
        }

        Commands::Replay { input, outcome, out } => {
            let mut request: Value = serde_json::from_str(&read_input(&input)?)
                .with_context(|| format!("{} is not valid JSON", input.display()))?;
            if let Some(outcome) = outcome {
                debug!("Overriding trailing outcome with {}", outcome);
                request["outcome"] = Value::String(outcome);
            }
            let data = unwrap_response(&apply_interaction_json(&request.to_string()))?;
            println!("Status: {}", data["status"].as_str().unwrap_or("unknown"));
            if let Some(options) = data["options"].as_array().filter(|o| !o.is_empty()) {
                let menu: Vec<String> = options
                    .iter()
                    .map(|o| {
                        let name = o["outcome"].as_str().unwrap_or_default();
                        if o["recommended"].as_bool().unwrap_or(false) {
                            format!("{name} (recommended)")
                        } else {
                            name.to_string()
                        }
                    })
                    .collect();
                println!("Options: {}", menu.join(", "));
            }
            emit(&data, out.as_deref())?;
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    info!("Reading {}", path.display());
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Pull `data` out of an `ApiResponse`, turning an API error into a CLI error
fn unwrap_response(response: &str) -> Result<Value> {
    let mut envelope: Value = serde_json::from_str(response).context("malformed API response")?;
    if envelope["success"].as_bool() != Some(true) {
        let error = &envelope["error"];
        anyhow::bail!(
            "{}: {}",
            error["code"].as_str().unwrap_or("UNKNOWN"),
            error["message"].as_str().unwrap_or("no message")
        );
    }
    Ok(envelope["data"].take())
}

fn emit(data: &Value, out: Option<&Path>) -> Result<()> {
    let pretty = serde_json::to_string_pretty(data)?;
    match out {
        Some(path) => {
            std::fs::write(path, pretty).with_context(|| format!("failed to write {}", path.display()))?;
            println!("Saved to {}", path.display());
        }
        None => println!("{pretty}"),
    }
    Ok(())
}
