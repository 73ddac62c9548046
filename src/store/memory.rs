//! In-memory account store with optimistic concurrency.
//!
//! Plays the part of the surrounding platform: it bumps `resource_version`
//! on every update and stamps `last_transition_time` when `state` changes.
//! Snapshots can be loaded from and written to a JSON file.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::AccountStore;
use crate::account::Account;
use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, StoreResult};

pub struct MemoryAccountStore {
    accounts: RwLock<BTreeMap<String, Account>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: RwLock::new(BTreeMap::new()),
            clock,
        }
    }

    pub fn from_accounts(
        accounts: impl IntoIterator<Item = Account>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|account| (account.identifier.clone(), account))
            .collect();
        Self {
            accounts: RwLock::new(accounts),
            clock,
        }
    }

    /// Load a JSON array of accounts
    pub async fn load_snapshot(
        path: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
    ) -> StoreResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await.map_err(|e| StoreError::Backend {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let accounts: Vec<Account> =
            serde_json::from_slice(&raw).map_err(|e| StoreError::Backend {
                message: format!("failed to parse {}: {}", path.display(), e),
            })?;
        debug!(path = %path.display(), count = accounts.len(), "Loaded account snapshot");
        Ok(Self::from_accounts(accounts, clock))
    }

    /// Write all accounts as a pretty-printed JSON array
    pub async fn save_snapshot(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let accounts: Vec<Account> = self.accounts.read().await.values().cloned().collect();
        let json = serde_json::to_vec_pretty(&accounts).map_err(|e| StoreError::Backend {
            message: format!("failed to serialize accounts: {}", e),
        })?;
        tokio::fs::write(path, json).await.map_err(|e| StoreError::Backend {
            message: format!("failed to write {}: {}", path.display(), e),
        })
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn get(&self, identifier: &str) -> StoreResult<Account> {
        self.accounts
            .read()
            .await
            .get(identifier)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                identifier: identifier.to_string(),
            })
    }

    async fn update(&self, account: &Account) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .get(&account.identifier)
            .ok_or_else(|| StoreError::NotFound {
                identifier: account.identifier.clone(),
            })?;

        if stored.resource_version != account.resource_version {
            return Err(StoreError::Conflict {
                identifier: account.identifier.clone(),
                expected: account.resource_version,
                found: stored.resource_version,
            });
        }

        let mut next = account.clone();
        if next.state != stored.state {
            next.last_transition_time = Some(self.clock.now());
        }
        next.resource_version = stored.resource_version + 1;
        accounts.insert(next.identifier.clone(), next.clone());
        Ok(next)
    }

    async fn delete(&self, account: &Account) -> StoreResult<()> {
        self.accounts
            .write()
            .await
            .remove(&account.identifier)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                identifier: account.identifier.clone(),
            })
    }

    async fn list(&self) -> StoreResult<Vec<Account>> {
        Ok(self.accounts.read().await.values().cloned().collect())
    }
}
