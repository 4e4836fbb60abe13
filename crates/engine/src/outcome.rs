//! Results of a successful run.

use stake_mirror_db::job::StateUpdate;
use stake_mirror_primitives::{job::JobState, types::EpochIndex};

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every completed epoch is already mirrored.
    NoEpochDue {
        /// The stored state, unchanged.
        state: JobState,

        /// The latest completed epoch, if any epoch has completed yet.
        last_completed: Option<EpochIndex>,
    },

    /// The root of `epoch` is not finalized yet. Nothing was written.
    RootNotPublished {
        /// The stored state, unchanged.
        state: JobState,

        /// The first epoch of the run whose root is missing.
        epoch: EpochIndex,
    },

    /// The epochs were mirrored and the state advanced.
    Mirrored(MirrorReport),
}

impl RunOutcome {
    /// The job state after the run.
    pub fn state(&self) -> &JobState {
        match self {
            RunOutcome::NoEpochDue { state, .. } | RunOutcome::RootNotPublished { state, .. } => {
                state
            }
            RunOutcome::Mirrored(report) => &report.state,
        }
    }
}

/// What a run that mirrored at least one epoch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    /// First mirrored epoch.
    pub from_epoch: EpochIndex,

    /// Last mirrored epoch.
    pub to_epoch: EpochIndex,

    /// Staking transactions found in the epochs.
    pub transactions: usize,

    /// Stakes submitted to the destination chain.
    pub submitted: usize,

    /// Stakes that were already mirrored or had already ended.
    pub skipped: usize,

    /// Address bindings registered.
    pub bindings: usize,

    /// Result of the state advance. [`StateUpdate::Unchanged`] means that a concurrent run got
    /// there first.
    pub update: StateUpdate,

    /// The job state after the run.
    pub state: JobState,
}

/// Counters of a single epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct EpochReport {
    pub(crate) transactions: usize,
    pub(crate) submitted: usize,
    pub(crate) skipped: usize,
    pub(crate) bindings: usize,
}
