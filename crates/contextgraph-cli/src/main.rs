use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use contextgraph_core::{ConfigManager, ContextGraphConfig, LoggingConfig};
use contextgraph_tracker::{ContextAnalyzer, ContextTracker};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "contextgraph")]
#[command(about = "ContextGraph CLI - domain context extraction and change tracking", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Configuration file (defaults to <root>/.contextgraph.toml, then ~/.contextgraph/config.toml)
    #[arg(long, global = true, env = "CONTEXTGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract a domain context capture from a tree
    Extract {
        /// Tree root
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Dependency graph analysis: cycles, clusters and metrics
    Analyze {
        /// Tree root
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Capture the tree and record significant changes
    Track {
        /// Tree root
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// List persisted versions
    History {
        /// Tree root
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Structural diff between two persisted versions
    Diff {
        /// Tree root
        root: PathBuf,

        /// Older version id
        from: String,

        /// Newer version id
        to: String,
    },

    /// Write a default configuration file
    InitConfig {
        /// Destination path
        #[arg(default_value = ".contextgraph.toml")]
        path: PathBuf,
    },
}

impl Commands {
    fn root(&self) -> Option<&Path> {
        match self {
            Commands::Extract { root }
            | Commands::Analyze { root }
            | Commands::Track { root }
            | Commands::History { root }
            | Commands::Diff { root, .. } => Some(root.as_path()),
            Commands::InitConfig { .. } => None,
        }
    }
}

#[derive(Serialize)]
struct InitConfigResult {
    path: String,
    status: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    init_tracing(&config.logging, cli.verbose);

    match execute_command(&cli, &config) {
        Ok(output) => {
            print_output(&cli.output, &output)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> Result<ContextGraphConfig> {
    let manager = match (&cli.config, cli.command.root()) {
        (Some(path), _) => ConfigManager::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        (None, Some(root)) => ConfigManager::load(root).context("Failed to load configuration")?,
        (None, None) => ConfigManager::load(Path::new(".")).context("Failed to load configuration")?,
    };
    Ok(manager.into_config())
}

/// `RUST_LOG` directives win; otherwise the configured level, or `debug`
/// with `--verbose`.
fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(e) = result {
        eprintln!("{} {}", "Warning:".yellow(), e);
    }
}

fn execute_command(cli: &Cli, config: &ContextGraphConfig) -> Result<serde_json::Value> {
    debug!(command = ?cli.command, "executing command");
    match &cli.command {
        Commands::Extract { root } => {
            let context = ContextAnalyzer::new(config.extraction.clone())
                .capture(root)
                .context("Failed to extract domain context")?;
            Ok(serde_json::to_value(context)?)
        }
        Commands::Analyze { root } => {
            let analysis = ContextAnalyzer::new(config.extraction.clone())
                .analyze(root)
                .context("Failed to analyze dependencies")?;
            Ok(serde_json::to_value(analysis)?)
        }
        Commands::Track { root } => {
            let outcome = ContextTracker::open(root, config)
                .track()
                .context("Failed to track changes")?;
            Ok(serde_json::to_value(outcome)?)
        }
        Commands::History { root } => {
            let history = ContextTracker::open(root, config)
                .history()
                .context("Failed to list history")?;
            Ok(serde_json::to_value(history)?)
        }
        Commands::Diff { root, from, to } => {
            let diff = ContextTracker::open(root, config)
                .get_diff(from, to)
                .with_context(|| format!("Failed to diff {} and {}", from, to))?;
            Ok(serde_json::to_value(diff)?)
        }
        Commands::InitConfig { path } => {
            ConfigManager::create_default_config(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            let result = InitConfigResult {
                path: path.display().to_string(),
                status: "created".to_string(),
            };
            Ok(serde_json::to_value(result)?)
        }
    }
}

fn print_output(format: &OutputFormat, value: &serde_json::Value) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Pretty => {
            print_pretty(value, 0)?;
        }
    }
    Ok(())
}

fn print_pretty(value: &serde_json::Value, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                let key_colored = key.cyan().bold();
                match val {
                    serde_json::Value::String(s) => {
                        println!("{}{}: {}", indent, key_colored, s.green());
                    }
                    serde_json::Value::Number(n) => {
                        println!("{}{}: {}", indent, key_colored, n.to_string().yellow());
                    }
                    serde_json::Value::Bool(b) => {
                        let val_colored = if *b {
                            "true".green()
                        } else {
                            "false".red()
                        };
                        println!("{}{}: {}", indent, key_colored, val_colored);
                    }
                    serde_json::Value::Null => {
                        println!("{}{}: {}", indent, key_colored, "-".dimmed());
                    }
                    serde_json::Value::Array(arr) if arr.is_empty() => {
                        println!("{}{}: {}", indent, key_colored, "[]".dimmed());
                    }
                    _ => {
                        println!("{}{}:", indent, key_colored);
                        print_pretty(val, depth + 1)?;
                    }
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                match item {
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        println!("{}{}{}:", indent, "Item ".cyan(), (i + 1).to_string().yellow());
                        print_pretty(item, depth + 1)?;
                    }
                    _ => println!("{}- {}", indent, item),
                }
            }
        }
        _ => {
            println!("{}{}", indent, value);
        }
    }
    Ok(())
}
