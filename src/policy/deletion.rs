//! Deletion policy: keep a disabled account, or remove it.
//!
//! No grace period and no creation/transition tie-break; every stamp that is
//! recorded must be older than the deletion window.

use chrono::{DateTime, Utc};

use super::{
    always, evaluate_rules, months_elapsed, Evaluation, PolicyRule, Presence,
    DELETE_WINDOW_MONTHS,
};
use crate::account::AccountTimes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeletionDecision {
    #[default]
    Keep,
    Delete,
}

impl DeletionDecision {
    fn when(condition: bool) -> Self {
        if condition {
            DeletionDecision::Delete
        } else {
            DeletionDecision::Keep
        }
    }
}

pub type DeletionEvaluation = Evaluation<DeletionDecision>;

static DELETION_RULES: &[PolicyRule<DeletionDecision>] = &[
    PolicyRule {
        name: "never-active",
        presence: Presence::Neither,
        guard: always,
        decide: creation_window_elapsed,
    },
    PolicyRule {
        name: "transition-inactive",
        presence: Presence::TransitionOnly,
        guard: always,
        decide: transition_window_elapsed,
    },
    PolicyRule {
        name: "login-inactive",
        presence: Presence::LoginOnly,
        guard: always,
        decide: login_window_elapsed,
    },
    PolicyRule {
        name: "login-and-transition-inactive",
        presence: Presence::Both,
        guard: always,
        decide: both_windows_elapsed,
    },
];

fn stale(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    at.is_some_and(|at| months_elapsed(at, DELETE_WINDOW_MONTHS, now))
}

fn creation_window_elapsed(times: &AccountTimes, now: DateTime<Utc>) -> DeletionDecision {
    DeletionDecision::when(months_elapsed(times.creation, DELETE_WINDOW_MONTHS, now))
}

fn transition_window_elapsed(times: &AccountTimes, now: DateTime<Utc>) -> DeletionDecision {
    DeletionDecision::when(stale(times.last_transition, now))
}

fn login_window_elapsed(times: &AccountTimes, now: DateTime<Utc>) -> DeletionDecision {
    DeletionDecision::when(stale(times.last_login, now))
}

fn both_windows_elapsed(times: &AccountTimes, now: DateTime<Utc>) -> DeletionDecision {
    DeletionDecision::when(stale(times.last_transition, now) && stale(times.last_login, now))
}

/// Decides whether a disabled account should be removed
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletionPolicyEvaluator;

impl DeletionPolicyEvaluator {
    pub fn evaluate(&self, times: &AccountTimes, now: DateTime<Utc>) -> DeletionEvaluation {
        evaluate_rules(DELETION_RULES, times, now)
    }
}
