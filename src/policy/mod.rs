//! Inactivity policies
//!
//! Both evaluators are ordered rule tables over the same input: the account's
//! creation time, its optional last-login and last-transition stamps, and the
//! current instant. The first rule whose presence pattern and guard match
//! decides the outcome. Evaluation is pure; callers apply the decision.

pub mod deletion;
pub mod lock;

pub use deletion::{DeletionDecision, DeletionEvaluation, DeletionPolicyEvaluator};
pub use lock::{LockDecision, LockEvaluation, LockPolicyEvaluator};

use chrono::{DateTime, Datelike, Duration, Months, Utc};

use crate::account::AccountTimes;

/// Inactivity after which an active account is disabled
pub const LOCK_WINDOW_MONTHS: u32 = 3;

/// Shorter window applied to the transition stamp before locking
pub const GRACE_PERIOD_DAYS: i64 = 7;

/// Inactivity after which a disabled account is removed
pub const DELETE_WINDOW_MONTHS: u32 = 6;

/// Which of the two optional activity stamps are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    Neither,
    TransitionOnly,
    LoginOnly,
    Both,
}

impl Presence {
    pub fn of(times: &AccountTimes) -> Self {
        match (times.last_login.is_some(), times.last_transition.is_some()) {
            (false, false) => Presence::Neither,
            (false, true) => Presence::TransitionOnly,
            (true, false) => Presence::LoginOnly,
            (true, true) => Presence::Both,
        }
    }
}

/// One row of a policy table
pub struct PolicyRule<D: 'static> {
    pub name: &'static str,
    pub presence: Presence,
    pub guard: fn(&AccountTimes, DateTime<Utc>) -> bool,
    pub decide: fn(&AccountTimes, DateTime<Utc>) -> D,
}

/// Decision plus the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation<D> {
    pub decision: D,
    pub rule: &'static str,
}

pub(crate) fn evaluate_rules<D: Copy + Default>(
    rules: &'static [PolicyRule<D>],
    times: &AccountTimes,
    now: DateTime<Utc>,
) -> Evaluation<D> {
    let presence = Presence::of(times);
    rules
        .iter()
        .find(|rule| rule.presence == presence && (rule.guard)(times, now))
        .map(|rule| Evaluation {
            decision: (rule.decide)(times, now),
            rule: rule.name,
        })
        .unwrap_or(Evaluation {
            decision: D::default(),
            rule: "no-match",
        })
}

/// `at + months` in calendar months, keeping day of month and time of day.
///
/// A day past the end of the target month rolls into the following month
/// (Nov 30 + 3 months is Mar 1 in a leap year). Saturates at the maximum
/// representable instant.
pub(crate) fn add_months(at: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    let overflow = Duration::days(i64::from(at.day0()));
    at.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(months)))
        .and_then(|deadline| deadline.checked_add_signed(overflow))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// True once `at + months` lies strictly before `now`
pub(crate) fn months_elapsed(at: DateTime<Utc>, months: u32, now: DateTime<Utc>) -> bool {
    add_months(at, months) < now
}

/// True once `at + days` lies strictly before `now`
pub(crate) fn days_elapsed(at: DateTime<Utc>, days: i64, now: DateTime<Utc>) -> bool {
    at.checked_add_signed(Duration::days(days))
        .map(|deadline| deadline < now)
        .unwrap_or(false)
}

pub(crate) fn always(_: &AccountTimes, _: DateTime<Utc>) -> bool {
    true
}
