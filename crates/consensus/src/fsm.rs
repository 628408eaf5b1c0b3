use ledger_types::{PipelineStage, TransactionId};
use std::fmt;
use thiserror::Error;
use tracing::info;

/// States of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Proposal being sent to endorsers
    Proposing,
    /// Endorsement responses being checked against the quorum policy
    Evaluating,
    /// Endorsed transaction handed to the ordering service
    Committing,
    /// Waiting on per-node commit notifications
    Confirming,
    /// Pipeline finished, verdict available
    Done,
    /// Stopped at the given stage
    Aborted(PipelineStage),
}

impl PipelineState {
    /// Stage a live state corresponds to. `None` for terminal states.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineState::Proposing => Some(PipelineStage::Proposing),
            PipelineState::Evaluating => Some(PipelineStage::Evaluating),
            PipelineState::Committing => Some(PipelineStage::Committing),
            PipelineState::Confirming => Some(PipelineStage::Confirming),
            PipelineState::Done | PipelineState::Aborted(_) => None,
        }
    }

    /// Last stage the run entered, terminal states included.
    pub fn last_stage(&self) -> PipelineStage {
        match self {
            PipelineState::Aborted(stage) => *stage,
            PipelineState::Done => PipelineStage::Confirming,
            live => live.stage().unwrap_or(PipelineStage::Proposing),
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Done => write!(f, "done"),
            PipelineState::Aborted(stage) => write!(f, "aborted({})", stage),
            live => match live.stage() {
                Some(stage) => write!(f, "{}", stage),
                None => Ok(()),
            },
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FsmError {
    #[error("invalid state transition for tx_id={tx_id}: {from} -> {to}")]
    InvalidTransition {
        tx_id: String,
        from: PipelineState,
        to: PipelineState,
    },
}

/// Forward-only state machine for a pipeline run.
///
/// Valid transitions:
/// - Proposing -> Evaluating -> Committing -> Confirming -> Done
/// - any live state -> Aborted(that stage)
///
/// Done and Aborted are absorbing.
#[derive(Debug)]
pub struct PipelineFsm {
    current_state: PipelineState,
    tx_id: TransactionId,
}

impl PipelineFsm {
    /// Start a run in Proposing.
    pub fn new(tx_id: TransactionId) -> Self {
        Self {
            current_state: PipelineState::Proposing,
            tx_id,
        }
    }

    pub fn current_state(&self) -> PipelineState {
        self.current_state
    }

    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    pub fn start_evaluating(&mut self) -> Result<(), FsmError> {
        self.transition(PipelineState::Evaluating, &[PipelineState::Proposing])
    }

    pub fn start_committing(&mut self) -> Result<(), FsmError> {
        self.transition(PipelineState::Committing, &[PipelineState::Evaluating])
    }

    pub fn start_confirming(&mut self) -> Result<(), FsmError> {
        self.transition(PipelineState::Confirming, &[PipelineState::Committing])
    }

    pub fn finish(&mut self) -> Result<(), FsmError> {
        self.transition(PipelineState::Done, &[PipelineState::Confirming])
    }

    /// Abort at the current stage. Returns the stage that failed.
    pub fn abort(&mut self) -> Result<PipelineStage, FsmError> {
        let from = self.current_state;
        match from.stage() {
            Some(stage) => {
                self.transition(PipelineState::Aborted(stage), &[from])?;
                Ok(stage)
            }
            None => Err(FsmError::InvalidTransition {
                tx_id: self.tx_id.to_string(),
                from: self.current_state,
                to: PipelineState::Aborted(PipelineStage::Proposing),
            }),
        }
    }

    fn transition(&mut self, new_state: PipelineState, allowed_from: &[PipelineState]) -> Result<(), FsmError> {
        if !allowed_from.contains(&self.current_state) {
            return Err(FsmError::InvalidTransition {
                tx_id: self.tx_id.to_string(),
                from: self.current_state,
                to: new_state,
            });
        }

        info!(
            "State transition for tx_id={}: {} -> {}",
            self.tx_id, self.current_state, new_state
        );

        self.current_state = new_state;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.current_state, PipelineState::Done | PipelineState::Aborted(_))
    }
}
