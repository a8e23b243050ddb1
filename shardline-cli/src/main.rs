//! Shardline CLI
//!
//! Command-line tool for erasure-coded objects on a set of local disks.
//!
//! # Commands
//! - `put` - Encode a file across the disks
//! - `get` - Read a byte range of an object
//! - `digest` - Hash each disk's shard file
//! - `verify` - Check shard files against known checksums
//! - `config` - Show or initialize configuration
//!
//! # Configuration
//! Config file: ~/.shardline/config.toml

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use shardline_core::{ErasureConfig, HashAlgorithm};
use std::path::PathBuf;

mod commands;
mod config;
mod symbols;

use commands::{digest, get, put, verify, DiskContext};

#[derive(Parser)]
#[command(name = "shardline")]
#[command(about = "Erasure-coded object storage over local disks")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.shardline/config.toml)
    #[arg(long, global = true, env = "SHARDLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Comma-separated disk directories in shard order (overrides config file)
    #[arg(long, global = true)]
    disks: Option<String>,

    /// Volume name (overrides config file)
    #[arg(long, global = true)]
    volume: Option<String>,

    /// Hash algorithm for digests (overrides config file)
    #[arg(long, global = true)]
    algorithm: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file across the disks
    Put {
        /// Local file to store
        file: PathBuf,

        /// Object key (defaults to the file name)
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Read a byte range of an object
    Get {
        /// Object key
        key: String,

        /// Object size in bytes, as printed by `put`
        #[arg(short, long)]
        size: u64,

        /// First byte to read
        #[arg(long, default_value = "0")]
        offset: u64,

        /// Number of bytes to read (defaults to the rest of the object)
        #[arg(short, long)]
        length: Option<u64>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Hash each disk's shard file for an object
    Digest {
        /// Object key
        key: String,
    },

    /// Check shard files against checksums printed by `put`
    Verify {
        /// Object key
        key: String,

        /// Hex checksums in disk order
        #[arg(required = true)]
        checksums: Vec<String>,
    },

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => config::config_file_path()?,
    };
    let cfg = config::load_config(&config_path)?;

    let ctx = disk_context(&cli, &cfg);

    match cli.command {
        Commands::Put { file, key } => {
            let key = match key {
                Some(key) => key,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| anyhow::anyhow!("Cannot derive a key from {}", file.display()))?,
            };
            put::run(&ctx?, put::PutConfig { file, key })?;
        }

        Commands::Get {
            key,
            size,
            offset,
            length,
            output,
        } => {
            let config = get::GetConfig {
                key,
                size,
                offset,
                length,
                output,
            };
            get::run(&ctx?, config)?;
        }

        Commands::Digest { key } => {
            digest::run(&ctx?, digest::DigestConfig { key })?;
        }

        Commands::Verify { key, checksums } => {
            verify::run(&ctx?, verify::VerifyConfig { key, checksums })?;
        }

        Commands::Config { command } => {
            handle_config_command(command, &config_path, &cfg)?;
        }
    }

    Ok(())
}

/// Resolve disk settings; CLI args override the config file
fn disk_context(cli: &Cli, cfg: &config::ShardlineConfig) -> Result<DiskContext> {
    Ok(DiskContext {
        disks: cli
            .disks
            .as_deref()
            .map(config::parse_disk_list)
            .unwrap_or_else(|| cfg.storage.disks.clone()),
        volume: cli
            .volume
            .clone()
            .unwrap_or_else(|| cfg.storage.volume.clone()),
        erasure: ErasureConfig::new(cfg.erasure.data_shards, cfg.erasure.parity_shards)?,
        block_size: cfg.erasure.block_size,
        algorithm: HashAlgorithm::from_name(
            cli.algorithm.as_deref().unwrap_or(&cfg.hash.algorithm),
        ),
    })
}

/// Handle config subcommands
fn handle_config_command(
    command: Option<ConfigCommands>,
    path: &std::path::Path,
    cfg: &config::ShardlineConfig,
) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("{}", style("Shardline Configuration").bold().underlined());
            println!();
            println!("{}", style("[storage]").cyan());
            println!("  volume = \"{}\"", cfg.storage.volume);
            for (index, disk) in cfg.storage.disks.iter().enumerate() {
                println!("  disk{} = \"{}\"", index, disk.display());
            }
            println!();
            println!("{}", style("[erasure]").cyan());
            println!("  data_shards = {}", cfg.erasure.data_shards);
            println!("  parity_shards = {}", cfg.erasure.parity_shards);
            println!("  block_size = {}", cfg.erasure.block_size);
            println!();
            println!("{}", style("[hash]").cyan());
            println!("  algorithm = \"{}\"", cfg.hash.algorithm);
            println!();
            println!("{} {}", style("Config file:").dim(), path.display());
            if !path.exists() {
                println!(
                    "{} Run '{}' to create it",
                    style("(not created yet)").yellow(),
                    style("shardline config init").green()
                );
            }
        }

        Some(ConfigCommands::Path) => {
            println!("{}", path.display());
        }

        Some(ConfigCommands::Init { force }) => {
            if path.exists() && !force {
                println!(
                    "{} Config file already exists at {}",
                    style("!").yellow(),
                    path.display()
                );
                println!("Use --force to overwrite");
                return Ok(());
            }

            config::save_config(path, &config::ShardlineConfig::default())?;
            println!(
                "{} Config file created at {}",
                style(symbols::CHECK).green(),
                path.display()
            );
        }
    }

    Ok(())
}
