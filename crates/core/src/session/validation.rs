//! Booking validation

use std::fmt;

use smallvec::SmallVec;

/// A booking precondition that does not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Violation {
    /// Per-piece booking with no items.
    EmptyCart,

    /// Per-kg booking with no weight.
    MissingWeight,

    /// No live location captured.
    MissingLocation,

    /// Custom pickup address left blank.
    IncompleteAddress,

    /// No pickup time chosen.
    MissingSchedule,

    /// Pickup time already passed.
    ScheduleInPast,
}

impl Violation {
    /// Stable identifier.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmptyCart => "empty-cart",
            Self::MissingWeight => "missing-weight",
            Self::MissingLocation => "missing-location",
            Self::IncompleteAddress => "incomplete-address",
            Self::MissingSchedule => "missing-schedule",
            Self::ScheduleInPast => "schedule-in-past",
        }
    }

    /// Prompt for the customer.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmptyCart => "please add at least one item",
            Self::MissingWeight => "please enter weight",
            Self::MissingLocation => "please allow location access to proceed",
            Self::IncompleteAddress => "please enter complete pickup address",
            Self::MissingSchedule => "please choose a pickup date and time",
            Self::ScheduleInPast => "pickup time must not be in the past",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Every violated precondition, in check order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(SmallVec<[Violation; 4]>);

impl Violations {
    /// No violations.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, violation: Violation) {
        if !self.contains(violation) {
            self.0.push(violation);
        }
    }

    /// Check if the violation is present.
    pub fn contains(&self, violation: Violation) -> bool {
        self.0.contains(&violation)
    }

    /// Check if every precondition holds.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the violations.
    pub fn iter(&self) -> impl Iterator<Item = Violation> + '_ {
        self.0.iter().copied()
    }
}

impl From<Violation> for Violations {
    fn from(violation: Violation) -> Self {
        let mut violations = Self::new();
        violations.push(violation);
        violations
    }
}

impl FromIterator<Violation> for Violations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        let mut violations = Self::new();

        for violation in iter {
            violations.push(violation);
        }

        violations
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, violation) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str("; ")?;
            }

            write!(f, "{violation}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_ignores_duplicates() {
        let violations: Violations = [Violation::EmptyCart, Violation::EmptyCart].into_iter().collect();

        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn display_joins_messages() {
        let violations: Violations = [Violation::MissingLocation, Violation::EmptyCart]
            .into_iter()
            .collect();

        assert_eq!(
            violations.to_string(),
            "please allow location access to proceed; please add at least one item"
        );
    }
}
