//! Account lifecycle controller
//!
//! Retires stale identity accounts on a recurring basis. Each reconciliation
//! cross-checks the account against an external identity directory, then
//! applies two inactivity policies:
//!
//! - lock: active accounts unused for three months are disabled
//! - deletion: disabled accounts unused for six months are removed
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use account_lifecycle::{
//!     DirectoryClient, DirectoryConfig, LifecycleReconciler, MemoryAccountStore,
//! };
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = DirectoryConfig::from_secret_dir("/etc/config")?;
//! let reconciler = LifecycleReconciler::new(
//!     Arc::new(MemoryAccountStore::new()),
//!     Arc::new(DirectoryClient::new(config)?),
//! );
//! let outcome = reconciler.reconcile("alice").await?;
//! println!("{}", outcome.label());
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

pub mod account;
pub mod clock;
pub mod config;

// Inactivity rules
pub mod policy;

// External identity directory
pub mod verifier;

pub mod reconciler;
pub mod store;

pub use account::{Account, AccountState, AccountTimes};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DirectoryConfig, ReconcileMode};
pub use error::{ConfigError, LifecycleError, StoreError, VerifyError};
pub use policy::{
    DeletionDecision, DeletionPolicyEvaluator, LockDecision, LockPolicyEvaluator,
};
pub use reconciler::{DeletionReason, LifecycleReconciler, ReconcileOutcome};
pub use store::{AccountStore, MemoryAccountStore};
pub use verifier::{AssumeActive, DirectoryClient, DirectoryVerdict, IdentityVerifier};
