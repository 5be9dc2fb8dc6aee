//! Ordered setup phases.
//!
//! The hosting application walks these phases while driving the setup
//! wizard. Progress is monotonic unless `restart_setup` resets it, and
//! navigation only ever moves to an adjacent phase.

use serde::{Deserialize, Serialize};

/// Phases of the federation setup flow, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetupProgress {
    /// Role selection and terms.
    Start,
    /// Federation name, password, and local parameters.
    SetConfiguration,
    /// Waiting for all guardians to connect.
    ConnectGuardians,
    /// Distributed key generation.
    RunDkg,
    /// Cross-verification of config hashes.
    VerifyGuardians,
    /// Setup finished; consensus can be started.
    SetupComplete,
}

/// All phases in wizard order.
pub const PROGRESS_ORDER: [SetupProgress; 6] = [
    SetupProgress::Start,
    SetupProgress::SetConfiguration,
    SetupProgress::ConnectGuardians,
    SetupProgress::RunDkg,
    SetupProgress::VerifyGuardians,
    SetupProgress::SetupComplete,
];

impl SetupProgress {
    /// Zero-based position of this phase in the wizard order.
    #[must_use]
    pub fn index(self) -> usize {
        PROGRESS_ORDER.iter().position(|p| *p == self).unwrap_or(0)
    }

    /// The next phase, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        PROGRESS_ORDER.get(self.index() + 1).copied()
    }

    /// The previous phase, if any.
    #[must_use]
    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| PROGRESS_ORDER[i])
    }

    /// Whether moving to `target` is a legal single-step navigation.
    #[must_use]
    pub fn is_adjacent(self, target: Self) -> bool {
        self.next() == Some(target) || self.prev() == Some(target)
    }

    /// Whether setup has finished.
    #[must_use]
    pub fn is_complete(self) -> bool {
        self == Self::SetupComplete
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_starts_and_ends_correctly() {
        assert_eq!(PROGRESS_ORDER[0], SetupProgress::Start);
        assert_eq!(PROGRESS_ORDER[5], SetupProgress::SetupComplete);
    }

    #[test]
    fn next_walks_the_full_order() {
        let mut phase = SetupProgress::Start;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            seen.push(next);
            phase = next;
        }
        assert_eq!(seen, PROGRESS_ORDER);
    }

    #[test]
    fn prev_of_start_is_none() {
        assert_eq!(SetupProgress::Start.prev(), None);
    }

    #[test]
    fn next_of_complete_is_none() {
        assert_eq!(SetupProgress::SetupComplete.next(), None);
    }

    #[test]
    fn adjacency_is_single_step_only() {
        assert!(SetupProgress::RunDkg.is_adjacent(SetupProgress::VerifyGuardians));
        assert!(SetupProgress::RunDkg.is_adjacent(SetupProgress::ConnectGuardians));
        assert!(!SetupProgress::Start.is_adjacent(SetupProgress::RunDkg));
        assert!(!SetupProgress::Start.is_adjacent(SetupProgress::Start));
    }

    #[test]
    fn complete_is_terminal() {
        assert!(SetupProgress::SetupComplete.is_complete());
        assert!(!SetupProgress::VerifyGuardians.is_complete());
    }
}
