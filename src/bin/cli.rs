//! StashKV CLI
//!
//! Command-line interface for inspecting and editing a store.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use stashkv::config::{DEFAULT_MAX_BYTES, DEFAULT_STORE_DIR, DEFAULT_STORE_NAME};
use stashkv::{Config, EvictionPolicy, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// StashKV CLI
#[derive(Parser, Debug)]
#[command(name = "stashkv-cli")]
#[command(about = "CLI for StashKV file-backed stores")]
#[command(version)]
struct Args {
    /// Store directory
    #[arg(short, long, default_value = DEFAULT_STORE_DIR)]
    dir: PathBuf,

    /// Store name
    #[arg(short, long, default_value = DEFAULT_STORE_NAME)]
    name: String,

    /// Soft byte budget
    #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_BYTES)]
    max_bytes: usize,

    /// What to do when a write exceeds the budget
    #[arg(short, long, value_enum, default_value_t = Policy::Advisory)]
    policy: Policy,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Policy {
    Advisory,
    Enforce,
}

impl From<Policy> for EvictionPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Advisory => EvictionPolicy::Advisory,
            Policy::Enforce => EvictionPolicy::Enforce,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key and write the store
    Set {
        /// The key to set
        key: String,

        /// The value (parsed as JSON, stored as a string otherwise)
        value: String,
    },

    /// Remove keys
    Rm {
        /// The keys to remove
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Print the whole store as JSON
    Dump,

    /// Write the store out as a directory tree
    Export {
        /// Target directory
        target: PathBuf,
    },

    /// Print store counters
    Stats,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stashkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .store_dir(&args.dir)
        .name(&args.name)
        .max_bytes(args.max_bytes)
        .eviction_policy(args.policy.into())
        .build();

    let store = match Store::open(config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&store, args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(store: &Store, command: Commands) -> stashkv::Result<()> {
    match command {
        Commands::Get { key } => match store.get(&key)? {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => {
                tracing::warn!("Key '{}' not found", key);
                std::process::exit(2);
            }
        },
        Commands::Set { key, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let outcome = store.set(key, value).write()?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Rm { keys } => {
            let removed = store.remove(&keys)?;
            println!("removed {}", removed);
        }
        Commands::Dump => println!("{}", store.json()?),
        Commands::Export { target } => store.export_dir(&target)?,
        Commands::Stats => println!("{}", serde_json::to_string_pretty(&store.stats())?),
    }
    Ok(())
}
