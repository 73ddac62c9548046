//! Account records as seen by the lifecycle controller
//!
//! The controller only reads these and asks the store for mutations. The
//! transition and login timestamps are owned by the surrounding platform.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;

/// Label carrying the phone number used to correlate with the directory
pub const CORRELATION_LABEL: &str = "iam.kubesphere.io/origin-uid";

/// Annotation with a human readable account description, logged on deletion
pub const DESCRIPTION_ANNOTATION: &str = "kubesphere.io/description";

/// Accounts with this identifier are never locked or deleted for inactivity
pub const ADMIN_IDENTIFIER: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountState {
    Active,
    Disabled,
}

impl fmt::Display for AccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountState::Active => write!(f, "Active"),
            AccountState::Disabled => write!(f, "Disabled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub identifier: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    pub state: AccountState,
    pub creation_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub last_login_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_transition_time: Option<DateTime<Utc>>,
    /// Optimistic concurrency token, bumped by the store on every update
    #[serde(default)]
    pub resource_version: u64,
}

impl Account {
    pub fn new(identifier: impl Into<String>, creation_timestamp: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.into(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            state: AccountState::Active,
            creation_timestamp,
            last_login_time: None,
            last_transition_time: None,
            resource_version: 0,
        }
    }

    pub fn with_correlation_key(mut self, phone: impl Into<String>) -> Self {
        self.labels.insert(CORRELATION_LABEL.to_string(), phone.into());
        self
    }

    pub fn with_state(mut self, state: AccountState) -> Self {
        self.state = state;
        self
    }

    pub fn with_last_login(mut self, at: DateTime<Utc>) -> Self {
        self.last_login_time = Some(at);
        self
    }

    pub fn with_last_transition(mut self, at: DateTime<Utc>) -> Self {
        self.last_transition_time = Some(at);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.annotations
            .insert(DESCRIPTION_ANNOTATION.to_string(), description.into());
        self
    }

    /// Phone number from the correlation label. Absence aborts reconciliation.
    pub fn correlation_key(&self) -> Result<&str, LifecycleError> {
        self.labels
            .get(CORRELATION_LABEL)
            .map(String::as_str)
            .ok_or_else(|| LifecycleError::MissingCorrelationKey {
                identifier: self.identifier.clone(),
                label: CORRELATION_LABEL.to_string(),
            })
    }

    pub fn description(&self) -> &str {
        self.annotations
            .get(DESCRIPTION_ANNOTATION)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_admin(&self) -> bool {
        self.identifier == ADMIN_IDENTIFIER
    }

    /// The three timestamps the policy evaluators look at
    pub fn times(&self) -> AccountTimes {
        AccountTimes {
            creation: self.creation_timestamp,
            last_login: self.last_login_time,
            last_transition: self.last_transition_time,
        }
    }
}

/// Policy input: creation time plus the two optional activity stamps.
///
/// `None` means "never recorded", which is distinct from any real instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountTimes {
    pub creation: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub last_transition: Option<DateTime<Utc>>,
}
