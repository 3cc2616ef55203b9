// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named predicates over a state snapshot.

use std::fmt;
use std::ops::Not;

/// A named, side-effect-free predicate over a state snapshot of type `T`.
///
/// The name is what failure reports show, so it should read as the
/// expectation (`"Launcher is visible"`), not as the check.
pub struct Condition<T> {
    name: String,
    predicate: Box<dyn Fn(&T) -> bool>,
}

impl<T: 'static> Condition<T> {
    /// Creates a condition.
    pub fn new(name: impl Into<String>, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Both conditions hold.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let (a, b) = (self.predicate, other.predicate);
        Self {
            name: format!("({} and {})", self.name, other.name),
            predicate: Box::new(move |state| a(state) && b(state)),
        }
    }

    /// Either condition holds.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let (a, b) = (self.predicate, other.predicate);
        Self {
            name: format!("({} or {})", self.name, other.name),
            predicate: Box::new(move |state| a(state) || b(state)),
        }
    }

    /// Renames the condition.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<T> Condition<T> {
    /// The condition's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn is_satisfied(&self, state: &T) -> bool {
        (self.predicate)(state)
    }
}

impl<T: 'static> Not for Condition<T> {
    type Output = Self;

    fn not(self) -> Self {
        let inner = self.predicate;
        Self {
            name: format!("not {}", self.name),
            predicate: Box::new(move |state| !inner(state)),
        }
    }
}

impl<T> fmt::Debug for Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positive() -> Condition<i32> {
        Condition::new("positive", |&v| v > 0)
    }

    fn even() -> Condition<i32> {
        Condition::new("even", |&v| v % 2 == 0)
    }

    #[test]
    fn combinators() {
        let both = positive().and(even());
        assert_eq!(both.name(), "(positive and even)");
        assert!(both.is_satisfied(&4));
        assert!(!both.is_satisfied(&3));

        let either = positive().or(even());
        assert!(either.is_satisfied(&-2));
        assert!(!either.is_satisfied(&-3));

        let negated = !positive();
        assert_eq!(negated.name(), "not positive");
        assert!(negated.is_satisfied(&-1));
    }

    fn names_of<T>(conditions: &[Condition<T>]) -> Vec<&str> {
        conditions.iter().map(Condition::name).collect()
    }

    #[test]
    fn accessors_need_no_static_bound() {
        let conditions = [positive(), even()];
        assert_eq!(names_of(&conditions), ["positive", "even"]);
        assert!(conditions[1].is_satisfied(&2), "2 is even");
    }

    #[test]
    fn display_and_rename() {
        let c = positive().named("above zero");
        assert_eq!(c.to_string(), "above zero");
        assert_eq!(format!("{c:?}"), "Condition { name: \"above zero\", .. }");
    }
}
