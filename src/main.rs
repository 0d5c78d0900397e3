// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Sources CLI - availability and list views for integration sources

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use sources_console::commands::{self, list::ListArgs, OutputOptions};
use sources_console::config::{default_config_path, Settings};

#[derive(Parser)]
#[command(name = "sources")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "SOURCES_CONSOLE_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Directory holding the JSON snapshots
    #[arg(long, env = "SOURCES_CONSOLE_DATA_DIR", global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sources with filters, sorting and paging
    List(ListArgs),

    /// Show one source with its status breakdown
    Show {
        /// Source id
        id: String,
    },

    /// List source types and application types
    Types,

    /// Get or set configuration
    Config {
        /// Configuration key
        key: String,

        /// Value to set (omit to get)
        value: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(default_config_path);
    let mut settings = Settings::load(config_path.as_deref()).context("Failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir {
        settings.data_dir = data_dir;
    }

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => settings.log_level.parse().unwrap_or(tracing::Level::INFO),
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // The configured level is only known once settings are loaded
    tracing::debug!(
        config = ?config_path,
        data_dir = %settings.data_dir.display(),
        "configuration loaded"
    );

    let output = OutputOptions {
        json: cli.json,
        color: !cli.no_color,
    };

    // Execute command
    match cli.command {
        Commands::List(args) => commands::list::run(&settings, &args, output).await,
        Commands::Show { id } => commands::show::run(&settings, &id, output).await,
        Commands::Types => commands::types::run(&settings, output).await,
        Commands::Config { key, value } => {
            commands::config::run(&settings, config_path.as_deref(), &key, value)
        }
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    }
}
