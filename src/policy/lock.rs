//! Lock policy: keep an active account, or disable it for inactivity.

use chrono::{DateTime, Utc};

use super::{
    always, days_elapsed, evaluate_rules, months_elapsed, Evaluation, PolicyRule, Presence,
    GRACE_PERIOD_DAYS, LOCK_WINDOW_MONTHS,
};
use crate::account::AccountTimes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockDecision {
    #[default]
    KeepActive,
    Lock,
}

impl LockDecision {
    fn when(condition: bool) -> Self {
        if condition {
            LockDecision::Lock
        } else {
            LockDecision::KeepActive
        }
    }
}

pub type LockEvaluation = Evaluation<LockDecision>;

static LOCK_RULES: &[PolicyRule<LockDecision>] = &[
    PolicyRule {
        name: "never-active",
        presence: Presence::Neither,
        guard: always,
        decide: creation_window_elapsed,
    },
    PolicyRule {
        name: "transition-stamped-at-creation",
        presence: Presence::TransitionOnly,
        guard: stamped_at_creation_and_window_elapsed,
        decide: lock,
    },
    PolicyRule {
        name: "transitioned-after-creation",
        presence: Presence::TransitionOnly,
        guard: transitioned_later_and_grace_elapsed,
        decide: creation_window_elapsed,
    },
    PolicyRule {
        name: "transition-pending",
        presence: Presence::TransitionOnly,
        guard: always,
        decide: keep_active,
    },
    PolicyRule {
        name: "login-inactive",
        presence: Presence::LoginOnly,
        guard: always,
        decide: login_window_elapsed,
    },
    PolicyRule {
        name: "login-inactive-past-grace",
        presence: Presence::Both,
        guard: always,
        decide: login_window_and_grace_elapsed,
    },
];

fn lock(_: &AccountTimes, _: DateTime<Utc>) -> LockDecision {
    LockDecision::Lock
}

fn keep_active(_: &AccountTimes, _: DateTime<Utc>) -> LockDecision {
    LockDecision::KeepActive
}

fn creation_window_elapsed(times: &AccountTimes, now: DateTime<Utc>) -> LockDecision {
    LockDecision::when(months_elapsed(times.creation, LOCK_WINDOW_MONTHS, now))
}

fn stamped_at_creation_and_window_elapsed(times: &AccountTimes, now: DateTime<Utc>) -> bool {
    let Some(transition) = times.last_transition else {
        return false;
    };
    months_elapsed(transition, LOCK_WINDOW_MONTHS, now) && times.creation == transition
}

fn transitioned_later_and_grace_elapsed(times: &AccountTimes, now: DateTime<Utc>) -> bool {
    let Some(transition) = times.last_transition else {
        return false;
    };
    days_elapsed(transition, GRACE_PERIOD_DAYS, now) && times.creation != transition
}

fn login_window_elapsed(times: &AccountTimes, now: DateTime<Utc>) -> LockDecision {
    LockDecision::when(
        times
            .last_login
            .is_some_and(|login| months_elapsed(login, LOCK_WINDOW_MONTHS, now)),
    )
}

fn login_window_and_grace_elapsed(times: &AccountTimes, now: DateTime<Utc>) -> LockDecision {
    let grace_elapsed = times
        .last_transition
        .is_some_and(|transition| days_elapsed(transition, GRACE_PERIOD_DAYS, now));
    LockDecision::when(login_window_elapsed(times, now) == LockDecision::Lock && grace_elapsed)
}

/// Decides whether an active account should be disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct LockPolicyEvaluator;

impl LockPolicyEvaluator {
    pub fn evaluate(&self, times: &AccountTimes, now: DateTime<Utc>) -> LockEvaluation {
        evaluate_rules(LOCK_RULES, times, now)
    }
}
