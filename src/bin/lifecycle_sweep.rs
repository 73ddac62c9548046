//! lifecycle-sweep: reconcile every account in a snapshot file.
//!
//! Reads directory credentials from a secret directory (`api`, `id`,
//! `secret`) or, failing that, from env vars:
//!   LIFECYCLE_DIRECTORY_API   directory user-search endpoint
//!   LIFECYCLE_APP_ID          application id
//!   LIFECYCLE_APP_SECRET      application secret
//!
//! Usage:
//!   lifecycle-sweep --accounts accounts.json
//!   lifecycle-sweep --accounts accounts.json --mode lock-only --interval-secs 3600

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use account_lifecycle::config::DEFAULT_SECRET_DIR;
use account_lifecycle::{
    AccountStore, AssumeActive, DirectoryClient, DirectoryConfig, IdentityVerifier,
    LifecycleReconciler, MemoryAccountStore, ReconcileMode, SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "lifecycle-sweep", about = "Lock and retire inactive accounts")]
struct Args {
    /// JSON array of accounts; rewritten after each pass
    #[arg(long, env = "LIFECYCLE_ACCOUNTS")]
    accounts: PathBuf,

    /// Directory holding the `api`, `id` and `secret` files
    #[arg(long, env = "LIFECYCLE_CONFIG_DIR", default_value = DEFAULT_SECRET_DIR)]
    config_dir: PathBuf,

    /// `full` or `lock-only`
    #[arg(long, env = "LIFECYCLE_MODE", default_value = "full")]
    mode: ReconcileMode,

    /// Repeat the sweep every N seconds instead of running once
    #[arg(long)]
    interval_secs: Option<u64>,
}

fn load_directory_config(dir: &Path) -> Result<DirectoryConfig> {
    match DirectoryConfig::from_secret_dir(dir) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!(
                dir = %dir.display(),
                error = %e,
                "Secret directory unusable, trying environment"
            );
            DirectoryConfig::from_env().context("No directory configuration available")
        }
    }
}

async fn sweep(args: &Args, verifier: Arc<dyn IdentityVerifier>) -> Result<()> {
    let store = Arc::new(
        MemoryAccountStore::load_snapshot(&args.accounts, Arc::new(SystemClock))
            .await
            .with_context(|| format!("Failed to load {}", args.accounts.display()))?,
    );
    let reconciler = LifecycleReconciler::new(store.clone(), verifier).with_mode(args.mode);

    let mut summary: BTreeMap<&'static str, usize> = BTreeMap::new();
    for account in store.list().await? {
        match reconciler.reconcile(&account.identifier).await {
            Ok(outcome) => *summary.entry(outcome.label()).or_default() += 1,
            Err(e) => {
                error!(identifier = %account.identifier, error = %e, "Reconciliation failed");
                *summary.entry("failed").or_default() += 1;
            }
        }
    }

    store
        .save_snapshot(&args.accounts)
        .await
        .with_context(|| format!("Failed to write {}", args.accounts.display()))?;
    info!(?summary, "Sweep complete");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,account_lifecycle=debug".into()),
        )
        .init();

    let args = Args::parse();

    let verifier: Arc<dyn IdentityVerifier> = match args.mode {
        ReconcileMode::Full => {
            let config = load_directory_config(&args.config_dir)?;
            info!(
                api = %config.api_url,
                timeout = ?config.timeout,
                "Directory verification enabled"
            );
            Arc::new(DirectoryClient::new(config).context("Failed to create HTTP client")?)
        }
        ReconcileMode::LockOnly => Arc::new(AssumeActive),
    };

    info!(
        mode = %args.mode,
        accounts = %args.accounts.display(),
        "Starting lifecycle sweep"
    );

    let Some(secs) = args.interval_secs else {
        return sweep(&args, verifier).await;
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));
    loop {
        ticker.tick().await;
        if let Err(e) = sweep(&args, verifier.clone()).await {
            error!(error = %e, "Sweep failed");
        }
    }
}
