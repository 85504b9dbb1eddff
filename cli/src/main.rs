//! # stylegen CLI
//!
//! Command-line interface for stylegen - style rewriting of short texts with a
//! local MLX model driven through `mlx_lm.generate`.
//!
//! ## Usage
//!
//! - `stylegen generate "prompt"` - Run a raw prompt
//! - `stylegen rewrite "text"` - Rewrite a passage in formal written style
//! - `stylegen imitate 鲁迅` - Write a short story in the style of an author
//! - `stylegen show-command "prompt"` - Print the command line without running it

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

mod commands;
mod config;
mod prompt;

use commands::{generate_command, imitate_command, rewrite_command, show_command};
use config::CliConfigLoader;

/// stylegen - rewrite short texts in a target style with a local MLX model
#[derive(Parser)]
#[command(name = "stylegen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rewrite short texts in a target style through mlx_lm.generate")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Interpreter that hosts mlx_lm (e.g. ~/.venv/bin/python)
    #[arg(long, global = true)]
    executable: Option<String>,

    /// Model name or path override
    #[arg(long, global = true)]
    model: Option<String>,

    /// Fine-tuned adapter directory
    #[arg(long, global = true)]
    adapter_path: Option<PathBuf>,

    /// Maximum number of tokens to generate
    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    /// Sampling temperature
    #[arg(long, global = true)]
    temp: Option<f32>,

    /// Top-p sampling threshold
    #[arg(long, global = true)]
    top_p: Option<f32>,

    /// Random seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Do not pass a seed (non-deterministic sampling)
    #[arg(long, global = true, conflicts_with = "seed")]
    no_seed: bool,

    /// Extra flag passed verbatim to mlx_lm.generate (repeatable)
    #[arg(long = "extra-arg", global = true, allow_hyphen_values = true)]
    extra_args: Vec<String>,

    /// Leave the command line out of error reports
    #[arg(long, global = true)]
    no_echo_command: bool,

    /// Give up after this many seconds
    #[arg(long, global = true, value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a raw prompt and print the generated text
    Generate {
        /// Prompt passed to --prompt
        prompt: String,
    },

    /// Rewrite a passage in formal written style
    Rewrite {
        /// Text to rewrite
        text: String,

        /// Handlebars template file replacing the built-in prompt ({{text}})
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Write a short story imitating an author or genre
    Imitate {
        /// Style to imitate, e.g. 鲁迅
        style: String,

        /// Handlebars template file replacing the built-in prompt ({{style}})
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Print the command line that would be run, one argument per line
    ShowCommand {
        /// Prompt passed to --prompt
        prompt: String,
    },
}

fn parse_timeout(value: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err("timeout must be a positive number of seconds".to_string());
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| format!("'{}' is not a valid timeout: {}", value, e))
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(executable) = &cli.executable {
        loader = loader.with_executable_override(executable.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    if let Some(adapter_path) = &cli.adapter_path {
        loader = loader.with_adapter_path_override(adapter_path.clone());
    }

    if let Some(max_tokens) = cli.max_tokens {
        loader = loader.with_max_tokens_override(max_tokens);
    }

    if let Some(temp) = cli.temp {
        loader = loader.with_temperature_override(temp);
    }

    if let Some(top_p) = cli.top_p {
        loader = loader.with_top_p_override(top_p);
    }

    if let Some(seed) = cli.seed {
        loader = loader.with_seed_override(Some(seed));
    } else if cli.no_seed {
        loader = loader.with_seed_override(None);
    }

    loader
        .with_extra_args(cli.extra_args.clone())
        .with_no_echo_command(cli.no_echo_command)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for generated text
    let filter = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config_loader = build_config_loader(&cli);
    let timeout = cli.timeout;

    match cli.command {
        Commands::Generate { prompt } => generate_command(prompt, config_loader, timeout).await,
        Commands::Rewrite { text, template } => {
            rewrite_command(text, template, config_loader, timeout).await
        }
        Commands::Imitate { style, template } => {
            imitate_command(style, template, config_loader, timeout).await
        }
        Commands::ShowCommand { prompt } => show_command(prompt, config_loader).await,
    }
}
