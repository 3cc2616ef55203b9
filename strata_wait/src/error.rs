// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synchronization failures.

use std::fmt::Write as _;

use thiserror::Error;

/// Returned by [`WaitCondition::wait_for_and_verify`](crate::WaitCondition::wait_for_and_verify).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WaitError {
    /// Every attempt failed.
    #[error(
        "gave up waiting for {description} after {attempts} attempts; last failure: {last_failure}{}",
        render_summaries(.summaries)
    )]
    Exhausted {
        /// The conditions that were waited for.
        description: String,
        /// Name of the condition that failed on the final attempt.
        last_failure: String,
        /// Number of attempts made.
        attempts: u32,
        /// Summaries of the last (up to two) sampled states, oldest first.
        summaries: Vec<String>,
    },
}

fn render_summaries(summaries: &[String]) -> String {
    let mut out = String::new();
    for (i, summary) in summaries.iter().enumerate() {
        let _ = write!(out, "\n  state[-{}]: {summary}", summaries.len() - i);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_includes_reason_and_states() {
        let err = WaitError::Exhausted {
            description: "app is visible".into(),
            last_failure: "app is visible".into(),
            attempts: 3,
            summaries: vec!["t=1 []".into(), "t=2 [Launcher]".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("after 3 attempts"), "{msg}");
        assert!(msg.contains("state[-2]: t=1 []"), "{msg}");
        assert!(msg.ends_with("state[-1]: t=2 [Launcher]"), "{msg}");
    }
}
