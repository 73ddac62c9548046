//! Account lifecycle reconciliation
//!
//! One invocation handles one account end to end:
//!
//! 1. Directory veto: an explicit inactive match deletes the account.
//! 2. Active, non-admin accounts past the lock policy are disabled.
//! 3. Disabled, non-admin accounts past the deletion policy are deleted.
//!
//! Each step issues at most one store mutation. Nothing is cached between
//! invocations and nothing is retried here; a returned error is the hosting
//! runtime's cue to redeliver.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::account::{Account, AccountState};
use crate::clock::{Clock, SystemClock};
use crate::config::ReconcileMode;
use crate::error::{LifecycleResult, StoreError};
use crate::policy::{
    DeletionDecision, DeletionPolicyEvaluator, LockDecision, LockPolicyEvaluator,
};
use crate::store::AccountStore;
use crate::verifier::IdentityVerifier;

/// Why an account was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeletionReason {
    /// The directory reported the linked identity inactive
    DirectoryInactive,
    /// Disabled and inactive past the deletion window
    Inactivity { rule: &'static str },
}

/// What a reconciliation did
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReconcileOutcome {
    /// The account no longer exists
    Gone,
    Unchanged,
    Disabled { rule: &'static str },
    Deleted { reason: DeletionReason },
}

impl ReconcileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileOutcome::Gone => "gone",
            ReconcileOutcome::Unchanged => "unchanged",
            ReconcileOutcome::Disabled { .. } => "disabled",
            ReconcileOutcome::Deleted {
                reason: DeletionReason::DirectoryInactive,
            } => "deleted-directory",
            ReconcileOutcome::Deleted {
                reason: DeletionReason::Inactivity { .. },
            } => "deleted-inactive",
        }
    }
}

pub struct LifecycleReconciler {
    store: Arc<dyn AccountStore>,
    verifier: Arc<dyn IdentityVerifier>,
    clock: Arc<dyn Clock>,
    mode: ReconcileMode,
    lock_policy: LockPolicyEvaluator,
    deletion_policy: DeletionPolicyEvaluator,
}

impl LifecycleReconciler {
    pub fn new(store: Arc<dyn AccountStore>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            store,
            verifier,
            clock: Arc::new(SystemClock),
            mode: ReconcileMode::Full,
            lock_policy: LockPolicyEvaluator,
            deletion_policy: DeletionPolicyEvaluator,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_mode(mut self, mode: ReconcileMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reconcile the account named `identifier`
    pub async fn reconcile(&self, identifier: &str) -> LifecycleResult<ReconcileOutcome> {
        let account = match self.store.get(identifier).await {
            Ok(account) => account,
            Err(StoreError::NotFound { .. }) => {
                debug!(identifier, "Account no longer exists");
                return Ok(ReconcileOutcome::Gone);
            }
            Err(e) => return Err(e.into()),
        };

        debug!(identifier, state = %account.state, "Checking account");
        let correlation_key = account.correlation_key()?;

        if self.mode == ReconcileMode::Full && !self.verifier.verify(correlation_key).await {
            // The directory veto is not subject to the admin exemption.
            if account.is_admin() {
                warn!(identifier, "Directory reports admin account inactive");
            }
            info!(
                identifier,
                correlation_key,
                description = account.description(),
                "Directory account inactive, deleting"
            );
            self.delete(&account).await?;
            return Ok(ReconcileOutcome::Deleted {
                reason: DeletionReason::DirectoryInactive,
            });
        }

        if account.is_admin() {
            return Ok(ReconcileOutcome::Unchanged);
        }

        let now = self.clock.now();
        let times = account.times();

        match account.state {
            AccountState::Active => {
                let evaluation = self.lock_policy.evaluate(&times, now);
                debug!(
                    identifier,
                    rule = evaluation.rule,
                    decision = ?evaluation.decision,
                    "Lock policy evaluated"
                );
                if evaluation.decision == LockDecision::Lock {
                    let mut disabled = account.clone();
                    disabled.state = AccountState::Disabled;
                    self.store.update(&disabled).await?;
                    info!(
                        identifier,
                        rule = evaluation.rule,
                        "Account disabled for inactivity"
                    );
                    return Ok(ReconcileOutcome::Disabled {
                        rule: evaluation.rule,
                    });
                }
            }
            AccountState::Disabled if self.mode == ReconcileMode::Full => {
                let evaluation = self.deletion_policy.evaluate(&times, now);
                debug!(
                    identifier,
                    rule = evaluation.rule,
                    decision = ?evaluation.decision,
                    "Deletion policy evaluated"
                );
                if evaluation.decision == DeletionDecision::Delete {
                    self.delete(&account).await?;
                    info!(
                        identifier,
                        correlation_key,
                        description = account.description(),
                        rule = evaluation.rule,
                        "Account inactive for six months, deleted"
                    );
                    return Ok(ReconcileOutcome::Deleted {
                        reason: DeletionReason::Inactivity {
                            rule: evaluation.rule,
                        },
                    });
                }
            }
            AccountState::Disabled => {}
        }

        Ok(ReconcileOutcome::Unchanged)
    }

    /// Delete, treating an already-absent record as done
    async fn delete(&self, account: &Account) -> LifecycleResult<()> {
        match self.store.delete(account).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => {
                debug!(identifier = %account.identifier, "Account already deleted");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
