//! Finweb main entry point

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use finweb_api::{start_server, AppState};
use finweb_config::{Config, ConfigError};
use finweb_core::{CloudStoreRef, CloudSync, FileKeyValueStore, HttpDocumentStore, Tracker};

#[derive(Parser, Debug)]
#[command(name = "finweb")]
#[command(author = "Finweb Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight personal finance tracker for cards, cash and debts", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Write a default configuration file and exit
    #[arg(long)]
    init: bool,
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Cloud sync when it is enabled and fully configured, otherwise a disabled one
fn build_sync(config: &Config) -> CloudSync {
    let sync = &config.sync;
    if !config.is_feature_enabled("sync") || sync.base_url.trim().is_empty() || sync.user_id.trim().is_empty() {
        log::info!("Cloud sync disabled");
        return CloudSync::disabled();
    }
    match HttpDocumentStore::from_config(sync) {
        Ok(store) => {
            log::info!("Cloud sync enabled for user {} at {}", sync.user_id, sync.base_url);
            let store: CloudStoreRef = Arc::new(store);
            CloudSync::new(Some(store), Some(sync.user_id.clone()))
        }
        Err(e) => {
            log::error!("Failed to build cloud sync client: {}", e);
            CloudSync::disabled()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.init {
        init_logging("info");
        if Config::init_file(&args.config).await? {
            log::info!("Wrote default configuration to {}", args.config.display());
        } else {
            log::warn!("{} already exists, leaving it untouched", args.config.display());
        }
        return Ok(());
    }

    let loaded = Config::load(args.config.clone());
    let config = match loaded {
        Ok(config) => {
            init_logging(&config.logging.level);
            log::info!("Config loaded from {}", args.config.display());
            config
        }
        Err(ConfigError::FileNotFound { path }) => {
            let config = Config::default();
            init_logging(&config.logging.level);
            log::warn!("Config file {} not found, using defaults (run with --init to create one)", path);
            config
        }
        Err(e) => return Err(e).context(format!("failed to load {}", args.config.display())),
    };

    let store = FileKeyValueStore::open(&config.data.path)
        .with_context(|| format!("failed to open data directory {}", config.data.path.display()))?;
    log::info!("Data directory: {}", config.data.path.display());

    let tracker = Tracker::open(config.clone(), Arc::new(store));
    log::info!(
        "Loaded {} accounts and {} movements",
        tracker.accounts().len(),
        tracker.movements().len()
    );

    let sync = build_sync(&config);
    start_server(AppState::new(config, tracker, sync)).await
}
