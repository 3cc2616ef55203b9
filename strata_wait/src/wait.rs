// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The polling loop.

use std::cell::Cell;
use std::fmt;
use std::time::Duration;

use crate::condition::Condition;
use crate::config::WaitConfig;
use crate::error::WaitError;

/// Number of sampled-state summaries kept for failure reports.
const SUMMARY_HISTORY: usize = 2;

type Supplier<T> = Box<dyn FnMut() -> T>;
type StateHook<T> = Box<dyn FnMut(&T)>;
type RetryHook = Box<dyn FnMut(u32, &str)>;
type StartHook = Box<dyn FnMut(&str)>;
type EndHook = Box<dyn FnMut(WaitStatus)>;
type Summary<T> = Box<dyn Fn(&T) -> String>;
type Sleeper = Box<dyn FnMut(Duration)>;

thread_local! {
    static WAITING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside a wait loop until dropped, including
/// during unwinding.
struct WaitScope;

impl WaitScope {
    fn enter(description: &str) -> Self {
        WAITING.with(|waiting| {
            assert!(
                !waiting.get(),
                "nested wait for {description} started while another wait is running on this thread"
            );
            waiting.set(true);
        });
        Self
    }
}

impl Drop for WaitScope {
    fn drop(&mut self) {
        WAITING.with(|waiting| waiting.set(false));
    }
}

/// Externally observable state of a [`WaitCondition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaitStatus {
    /// Not finished: either never run or currently sampling.
    Polling,
    /// All conditions held on the last attempt.
    Succeeded,
    /// Every attempt failed.
    Exhausted,
}

/// Repeatedly samples state until every registered condition holds.
///
/// Each attempt pulls a fresh snapshot from the supplier and evaluates the
/// conditions in registration order, stopping at the first that fails. On
/// success the loop stops; on failure it sleeps for the retry interval and
/// tries again, up to the retry limit. No sleep follows the final attempt.
///
/// Panics raised by the supplier or a condition propagate unchanged and end
/// the wait.
///
/// ```
/// use strata_wait::{WaitCondition, WaitConfig};
///
/// let mut counter = 0;
/// let mut wait = WaitCondition::builder(move || {
///     counter += 1;
///     counter
/// })
/// .with_config(WaitConfig::immediate(5))
/// .with_condition("counter reached 3", |&n| n >= 3)
/// .build();
///
/// assert!(wait.wait_for());
/// assert_eq!(wait.attempts(), 3);
/// ```
pub struct WaitCondition<T> {
    supplier: Supplier<T>,
    conditions: Vec<Condition<T>>,
    config: WaitConfig,
    on_success: Vec<StateHook<T>>,
    on_failure: Vec<StateHook<T>>,
    on_retry: Vec<RetryHook>,
    on_start: Vec<StartHook>,
    on_end: Vec<EndHook>,
    summary: Option<Summary<T>>,
    sleeper: Sleeper,

    status: WaitStatus,
    attempts: u32,
    last_failure: Option<String>,
    last_state: Option<T>,
    summaries: Vec<String>,
}

impl<T: 'static> WaitCondition<T> {
    /// Starts building a wait over snapshots produced by `supplier`.
    pub fn builder(supplier: impl FnMut() -> T + 'static) -> WaitConditionBuilder<T> {
        WaitConditionBuilder {
            inner: Self {
                supplier: Box::new(supplier),
                conditions: Vec::new(),
                config: WaitConfig::default(),
                on_success: Vec::new(),
                on_failure: Vec::new(),
                on_retry: Vec::new(),
                on_start: Vec::new(),
                on_end: Vec::new(),
                summary: None,
                sleeper: Box::new(std::thread::sleep),
                status: WaitStatus::Polling,
                attempts: 0,
                last_failure: None,
                last_state: None,
                summaries: Vec::new(),
            },
        }
    }

    /// Runs the polling loop. Returns `true` once every condition holds on
    /// one snapshot, `false` after the retry limit is reached.
    ///
    /// # Panics
    ///
    /// Panics if another wait is already running on this thread, such as a
    /// wait started from one of this wait's hooks.
    pub fn wait_for(&mut self) -> bool {
        let description = self.describe();
        let _scope = WaitScope::enter(&description);

        self.status = WaitStatus::Polling;
        self.attempts = 0;
        self.last_failure = None;
        self.last_state = None;
        self.summaries.clear();

        for hook in &mut self.on_start {
            hook(&description);
        }
        let attempts = self.config.attempts();
        log::debug!(
            "waiting for {description}: {attempts} attempts, {:?} apart",
            self.config.retry_interval
        );

        for attempt in 1..=attempts {
            self.attempts = attempt;
            let state = (self.supplier)();
            let failed = self
                .conditions
                .iter()
                .find(|condition| !condition.is_satisfied(&state))
                .map(|condition| condition.name().to_owned());
            if let Some(summary) = &self.summary {
                if self.summaries.len() == SUMMARY_HISTORY {
                    self.summaries.remove(0);
                }
                self.summaries.push(summary(&state));
            }

            let Some(failed) = failed else {
                log::debug!("{description} satisfied on attempt {attempt}");
                for hook in &mut self.on_success {
                    hook(&state);
                }
                self.last_state = Some(state);
                self.finish(WaitStatus::Succeeded);
                return true;
            };

            log::debug!("attempt {attempt}/{attempts} failed: {failed}");
            for hook in &mut self.on_failure {
                hook(&state);
            }
            self.last_state = Some(state);
            if attempt < attempts {
                for hook in &mut self.on_retry {
                    hook(attempt, &failed);
                }
                (self.sleeper)(self.config.retry_interval);
            }
            self.last_failure = Some(failed);
        }

        log::warn!(
            "gave up waiting for {description} after {attempts} attempts; last failure: {}",
            self.last_failure.as_deref().unwrap_or("none")
        );
        self.finish(WaitStatus::Exhausted);
        false
    }

    /// Like [`wait_for`](Self::wait_for), but turns exhaustion into an
    /// error carrying the last failure and the last two state summaries.
    ///
    /// # Errors
    ///
    /// Returns [`WaitError::Exhausted`] if every attempt failed.
    ///
    /// # Panics
    ///
    /// See [`wait_for`](Self::wait_for).
    pub fn wait_for_and_verify(&mut self) -> Result<(), WaitError> {
        if self.wait_for() {
            return Ok(());
        }
        Err(WaitError::Exhausted {
            description: self.describe(),
            last_failure: self.last_failure.clone().unwrap_or_default(),
            attempts: self.attempts,
            summaries: self.summaries.clone(),
        })
    }

    fn finish(&mut self, status: WaitStatus) {
        self.status = status;
        for hook in &mut self.on_end {
            hook(status);
        }
    }
}

impl<T> WaitCondition<T> {
    /// Current status.
    #[must_use]
    pub fn status(&self) -> WaitStatus {
        self.status
    }

    /// Attempts made by the last run.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Name of the condition that failed most recently in the last run.
    #[must_use]
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// The last sampled snapshot.
    #[must_use]
    pub fn last_state(&self) -> Option<&T> {
        self.last_state.as_ref()
    }

    /// Summaries of the last (up to two) sampled snapshots, oldest first.
    ///
    /// Empty unless a summary function was registered.
    #[must_use]
    pub fn last_summaries(&self) -> &[String] {
        &self.summaries
    }

    /// The registered condition names joined with `and`.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.conditions.is_empty() {
            return String::from("no conditions");
        }
        self.conditions
            .iter()
            .map(Condition::name)
            .collect::<Vec<_>>()
            .join(" and ")
    }

    /// The polling cadence.
    #[must_use]
    pub fn config(&self) -> WaitConfig {
        self.config
    }
}

impl<T> fmt::Debug for WaitCondition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitCondition")
            .field("conditions", &self.conditions)
            .field("config", &self.config)
            .field("status", &self.status)
            .field("attempts", &self.attempts)
            .field("last_failure", &self.last_failure)
            .finish_non_exhaustive()
    }
}

/// Builder for [`WaitCondition`].
pub struct WaitConditionBuilder<T> {
    inner: WaitCondition<T>,
}

impl<T: 'static> WaitConditionBuilder<T> {
    /// Sets the polling cadence.
    #[must_use]
    pub fn with_config(mut self, config: WaitConfig) -> Self {
        self.inner.config = config;
        self
    }

    /// Sets the number of attempts.
    #[must_use]
    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.inner.config.retry_limit = retry_limit;
        self
    }

    /// Sets the delay between attempts.
    #[must_use]
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.inner.config.retry_interval = retry_interval;
        self
    }

    /// Adds a named predicate.
    #[must_use]
    pub fn with_condition(
        self,
        name: impl Into<String>,
        predicate: impl Fn(&T) -> bool + 'static,
    ) -> Self {
        self.add_condition(Condition::new(name, predicate))
    }

    /// Adds a prebuilt condition.
    #[must_use]
    pub fn add_condition(mut self, condition: Condition<T>) -> Self {
        self.inner.conditions.push(condition);
        self
    }

    /// Called with the satisfying snapshot.
    #[must_use]
    pub fn on_success(mut self, hook: impl FnMut(&T) + 'static) -> Self {
        self.inner.on_success.push(Box::new(hook));
        self
    }

    /// Called with every snapshot that fails a condition.
    #[must_use]
    pub fn on_failure(mut self, hook: impl FnMut(&T) + 'static) -> Self {
        self.inner.on_failure.push(Box::new(hook));
        self
    }

    /// Called before sleeping with the failed attempt number and the name
    /// of the failing condition.
    #[must_use]
    pub fn on_retry(mut self, hook: impl FnMut(u32, &str) + 'static) -> Self {
        self.inner.on_retry.push(Box::new(hook));
        self
    }

    /// Called with the description when a run starts.
    #[must_use]
    pub fn on_start(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.inner.on_start.push(Box::new(hook));
        self
    }

    /// Called with the final status when a run ends.
    #[must_use]
    pub fn on_end(mut self, hook: impl FnMut(WaitStatus) + 'static) -> Self {
        self.inner.on_end.push(Box::new(hook));
        self
    }

    /// Summarizes snapshots for failure reports.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Fn(&T) -> String + 'static) -> Self {
        self.inner.summary = Some(Box::new(summary));
        self
    }

    /// Replaces [`std::thread::sleep`] between attempts.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: impl FnMut(Duration) + 'static) -> Self {
        self.inner.sleeper = Box::new(sleeper);
        self
    }

    /// Finishes building.
    #[must_use]
    pub fn build(self) -> WaitCondition<T> {
        self.inner
    }
}

impl<T> fmt::Debug for WaitConditionBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitConditionBuilder")
            .field("inner", &self.inner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Instant;

    use super::*;

    fn counter() -> impl FnMut() -> u32 {
        let mut n = 0;
        move || {
            n += 1;
            n
        }
    }

    fn recording_sleeper() -> (Rc<RefCell<Vec<Duration>>>, impl FnMut(Duration)) {
        let sleeps = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&sleeps);
        (sleeps, move |d| sink.borrow_mut().push(d))
    }

    #[test]
    fn immediate_success_does_not_sleep() {
        let (sleeps, sleeper) = recording_sleeper();
        let mut wait = WaitCondition::builder(|| 7)
            .with_condition("is seven", |&v| v == 7)
            .with_sleeper(sleeper)
            .build();

        assert!(wait.wait_for());
        assert_eq!(wait.status(), WaitStatus::Succeeded);
        assert_eq!(wait.attempts(), 1);
        assert!(sleeps.borrow().is_empty(), "no sleep on first-attempt success");
        assert_eq!(wait.last_state(), Some(&7));
    }

    #[test]
    fn exhausts_after_exact_attempts() {
        let (sleeps, sleeper) = recording_sleeper();
        let interval = Duration::from_millis(250);
        let mut wait = WaitCondition::builder(counter())
            .with_retry_limit(4)
            .with_retry_interval(interval)
            .with_condition("never", |_| false)
            .with_sleeper(sleeper)
            .build();

        assert!(!wait.wait_for());
        assert_eq!(wait.status(), WaitStatus::Exhausted);
        assert_eq!(wait.attempts(), 4);
        assert_eq!(wait.last_state(), Some(&4));
        assert_eq!(wait.last_failure(), Some("never"));
        assert_eq!(*sleeps.borrow(), [interval; 3]);
    }

    #[test]
    fn real_sleep_spans_retry_intervals() {
        let interval = Duration::from_millis(5);
        let mut wait = WaitCondition::builder(|| ())
            .with_retry_limit(3)
            .with_retry_interval(interval)
            .with_condition("never", |_| false)
            .build();

        let start = Instant::now();
        assert!(!wait.wait_for());
        assert!(start.elapsed() >= interval * 2, "slept between attempts");
    }

    #[test]
    fn short_circuits_on_first_failure() {
        let evaluated = Rc::new(Cell::new(0));
        let seen = Rc::clone(&evaluated);
        let mut wait = WaitCondition::builder(|| 1)
            .with_config(WaitConfig::immediate(1))
            .with_condition("fails", |_| false)
            .with_condition("counted", move |_| {
                seen.set(seen.get() + 1);
                true
            })
            .build();

        assert!(!wait.wait_for());
        assert_eq!(evaluated.get(), 0);
        assert_eq!(wait.last_failure(), Some("fails"));
    }

    #[test]
    fn hooks_fire_in_order() {
        let log = Rc::new(RefCell::new(Vec::<String>::new()));
        let (a, b, c, d, e) = (
            Rc::clone(&log),
            Rc::clone(&log),
            Rc::clone(&log),
            Rc::clone(&log),
            Rc::clone(&log),
        );
        let mut wait = WaitCondition::builder(counter())
            .with_config(WaitConfig::immediate(5))
            .with_condition("at least 2", |&n| n >= 2)
            .on_start(move |desc| a.borrow_mut().push(format!("start {desc}")))
            .on_failure(move |n| b.borrow_mut().push(format!("fail {n}")))
            .on_retry(move |attempt, why| c.borrow_mut().push(format!("retry {attempt} {why}")))
            .on_success(move |n| d.borrow_mut().push(format!("ok {n}")))
            .on_end(move |status| e.borrow_mut().push(format!("end {status:?}")))
            .build();

        assert!(wait.wait_for());
        assert_eq!(
            *log.borrow(),
            [
                "start at least 2",
                "fail 1",
                "retry 1 at least 2",
                "ok 2",
                "end Succeeded"
            ]
        );
    }

    #[test]
    fn verify_reports_last_two_summaries() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut wait = WaitCondition::builder(counter())
            .with_config(WaitConfig::immediate(3))
            .with_condition("above ten", |&n| n > 10)
            .with_summary(|n| format!("n={n}"))
            .build();

        let err = wait.wait_for_and_verify().unwrap_err();
        assert_eq!(
            err,
            WaitError::Exhausted {
                description: "above ten".into(),
                last_failure: "above ten".into(),
                attempts: 3,
                summaries: vec!["n=2".into(), "n=3".into()],
            }
        );
        assert_eq!(wait.last_summaries(), ["n=2", "n=3"]);
    }

    #[test]
    fn verify_passes_when_satisfied() {
        let mut wait = WaitCondition::builder(|| true)
            .with_condition("true", |&b| b)
            .build();
        assert_eq!(wait.wait_for_and_verify(), Ok(()));
    }

    #[test]
    fn zero_retry_limit_still_samples_once() {
        let mut wait = WaitCondition::builder(counter())
            .with_retry_limit(0)
            .with_condition("never", |_| false)
            .build();
        assert!(!wait.wait_for());
        assert_eq!(wait.attempts(), 1);
    }

    fn report<T>(wait: &WaitCondition<T>) -> (String, WaitStatus, u32) {
        (wait.describe(), wait.status(), wait.attempts())
    }

    #[test]
    fn accessors_work_in_generic_code() {
        let wait = WaitCondition::builder(|| 0_u8)
            .with_condition("zero", |&n| n == 0)
            .with_condition("small", |&n| n < 10)
            .build();
        assert_eq!(
            report(&wait),
            ("zero and small".to_owned(), WaitStatus::Polling, 0)
        );
    }

    #[test]
    fn no_conditions_succeeds_immediately() {
        let mut wait = WaitCondition::builder(|| 0_u8).build();
        assert_eq!(wait.describe(), "no conditions");
        assert!(wait.wait_for());
    }

    #[test]
    fn rerun_resets_state() {
        let mut wait = WaitCondition::builder(counter())
            .with_config(WaitConfig::immediate(2))
            .with_condition("at least 3", |&n| n >= 3)
            .build();
        assert!(!wait.wait_for());
        assert!(wait.wait_for(), "counter keeps rising across runs");
        assert_eq!(wait.attempts(), 1);
        assert_eq!(wait.last_failure(), None);
    }

    #[test]
    #[should_panic(expected = "nested wait for inner started while another wait is running")]
    fn nested_wait_panics() {
        let mut inner = WaitCondition::builder(|| 1)
            .with_condition("inner", |&n| n == 1)
            .build();
        let mut outer = WaitCondition::builder(|| 1)
            .with_condition("outer", |&n| n == 1)
            .on_success(move |_| {
                inner.wait_for();
            })
            .build();
        outer.wait_for();
    }

    #[test]
    fn scope_resets_after_panic() {
        let result = std::panic::catch_unwind(|| {
            let mut wait = WaitCondition::builder(|| -> u8 { panic!("supplier broke") })
                .with_condition("anything", |_| true)
                .build();
            wait.wait_for()
        });
        assert!(result.is_err(), "supplier panic propagates");

        let mut wait = WaitCondition::builder(|| 1)
            .with_condition("one", |&n| n == 1)
            .build();
        assert!(wait.wait_for(), "a later wait on the same thread still runs");
    }
}
