//! Overall verdict over per-node confirmation events.

use ledger_types::{ConfirmationEvent, ConfirmationOutcome};

/// Summary of a confirmation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfirmationVerdict {
    pub committed: usize,
    pub invalid: usize,
    pub timed_out: usize,
}

impl ConfirmationVerdict {
    pub fn tally(events: &[ConfirmationEvent]) -> Self {
        events.iter().fold(Self::default(), |mut verdict, event| {
            match event.outcome() {
                ConfirmationOutcome::Committed => verdict.committed += 1,
                ConfirmationOutcome::Invalid => verdict.invalid += 1,
                ConfirmationOutcome::TimedOut => verdict.timed_out += 1,
            }
            verdict
        })
    }

    /// One valid commit proves the transaction reached the ledger.
    pub fn is_confirmed(&self) -> bool {
        self.committed > 0
    }

    pub fn total(&self) -> usize {
        self.committed + self.invalid + self.timed_out
    }

    /// Failure reason for an unconfirmed round.
    pub fn reason(&self) -> String {
        match (self.invalid, self.timed_out) {
            (0, 0) => "no confirmation sources".to_string(),
            (0, t) => format!("all {} nodes timed out waiting for commit", t),
            (i, 0) => format!("all {} nodes reported an invalid commit", i),
            (i, t) => format!("no valid commit: {} invalid, {} timed out", i, t),
        }
    }
}
