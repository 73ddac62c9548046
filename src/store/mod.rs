//! Account storage boundary
//!
//! The reconciler operates exclusively through this trait. Stores are
//! expected to enforce per-record optimistic concurrency: an update carrying a
//! stale `resource_version` must fail with `StoreError::Conflict`.

pub mod memory;

pub use memory::MemoryAccountStore;

use async_trait::async_trait;

use crate::account::Account;
use crate::error::StoreResult;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, identifier: &str) -> StoreResult<Account>;

    /// Persist `account`. Returns the stored record with its new version.
    async fn update(&self, account: &Account) -> StoreResult<Account>;

    async fn delete(&self, account: &Account) -> StoreResult<()>;

    async fn list(&self) -> StoreResult<Vec<Account>>;
}
