//! Transaction Coordinator
//!
//! Drives one invocation through the full lifecycle:
//!
//! 1. **Enrolling**: resolve the caller identity into a client handle
//! 2. **Proposing**: mint the transaction id and broadcast the proposal
//! 3. **Evaluating**: apply the strict-AND endorsement quorum
//! 4. **Committing**: hand the endorsed transaction to the orderer
//! 5. **Confirming**: wait for per-node commit notifications
//!
//! The first failing stage ends the run with `PipelineResult::Failure`.
//! Nothing is retried.

use chrono::Utc;
use ledger_consensus::{ConfirmationVerdict, EndorsementEvaluator, FsmError, PipelineFsm};
use ledger_network::{ChannelProfile, IdentityProvider, LedgerQuery, NodeGateway};
use ledger_types::{
    ConfirmationEvent, PipelineFailure, PipelineResult, PipelineStage, ProposedOperation,
    TransactionId, TransactionReceipt,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::broadcaster::ProposalBroadcaster;
use crate::confirmation::ConfirmationAggregator;
use crate::metrics::{self, ActivePipelineGuard};
use crate::submitter::CommitSubmitter;

/// Static settings of a coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Channel all operations run on
    pub channel: String,
    /// Chaincode invoked by submit and query
    pub chaincode: String,
    /// Per-node wait for a commit notification
    pub confirm_timeout: Duration,
    /// Per-endorser wait for a proposal response
    pub endorse_timeout: Duration,
    /// Identity used for chain-info and block queries
    pub admin_identity: String,
    pub admin_secret: String,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            channel: "mychannel".to_string(),
            chaincode: "fabcar".to_string(),
            confirm_timeout: Duration::from_millis(3000),
            endorse_timeout: Duration::from_secs(30),
            admin_identity: "admin".to_string(),
            admin_secret: String::new(),
        }
    }
}

/// Why a stage stopped the run.
struct StageFailure {
    reason: String,
    events: Vec<ConfirmationEvent>,
}

impl StageFailure {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            events: Vec::new(),
        }
    }
}

impl From<FsmError> for StageFailure {
    fn from(err: FsmError) -> Self {
        StageFailure::new(err.to_string())
    }
}

pub struct TransactionCoordinator {
    pub(crate) identities: Arc<dyn IdentityProvider>,
    pub(crate) gateway: Arc<dyn NodeGateway>,
    pub(crate) ledger: Arc<dyn LedgerQuery>,
    pub(crate) settings: CoordinatorSettings,
    broadcaster: ProposalBroadcaster,
    evaluator: EndorsementEvaluator,
    submitter: CommitSubmitter,
    aggregator: ConfirmationAggregator,
}

impl TransactionCoordinator {
    pub fn new(
        identities: Arc<dyn IdentityProvider>,
        gateway: Arc<dyn NodeGateway>,
        ledger: Arc<dyn LedgerQuery>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            broadcaster: ProposalBroadcaster::new(Arc::clone(&gateway), settings.endorse_timeout),
            evaluator: EndorsementEvaluator::new(),
            submitter: CommitSubmitter::new(Arc::clone(&gateway)),
            aggregator: ConfirmationAggregator::new(Arc::clone(&gateway)),
            identities,
            gateway,
            ledger,
            settings,
        }
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Run a state-changing chaincode invocation to confirmation.
    pub async fn submit_transaction(
        &self,
        identity: &str,
        secret: &str,
        function: &str,
        args: Vec<String>,
    ) -> PipelineResult {
        let _active = ActivePipelineGuard::enter();
        let start = Instant::now();

        let result = self.run_pipeline(identity, secret, function, args).await;

        let stage = match result.failed_stage() {
            Some(stage) => stage.to_string(),
            None => "done".to_string(),
        };
        metrics::record_pipeline_result(&stage, result.is_success(), start.elapsed().as_secs_f64());
        result
    }

    async fn run_pipeline(&self, identity: &str, secret: &str, function: &str, args: Vec<String>) -> PipelineResult {
        let client = match self.identities.get_or_enroll(identity, secret).await {
            Ok(client) => client,
            Err(e) => {
                warn!("Identity resolution failed for {}: {}", identity, e);
                return PipelineResult::failure(PipelineStage::Enrolling, e.to_string(), None);
            }
        };

        let tx_id = TransactionId::mint(&client.creator());
        info!("Assigned transaction id {} to {} invocation by {}", tx_id, function, identity);

        let mut fsm = PipelineFsm::new(tx_id.clone());

        let channel = match client.channel(&self.settings.channel) {
            Some(channel) => channel.clone(),
            None => {
                return self.abort(
                    &mut fsm,
                    StageFailure::new(format!(
                        "channel {} was not defined in the network profile",
                        self.settings.channel
                    )),
                )
            }
        };

        let operation = ProposedOperation {
            tx_id: tx_id.clone(),
            channel: self.settings.channel.clone(),
            chaincode: self.settings.chaincode.clone(),
            function: function.to_string(),
            args,
            targets: channel.endorsers.clone(),
        };

        match self.drive(&mut fsm, &client, &channel, &operation).await {
            Ok(receipt) => {
                info!(
                    "Transaction {} committed, confirmed by {} of {} nodes",
                    tx_id,
                    receipt.valid_confirmations(),
                    receipt.events.len()
                );
                PipelineResult::Success(receipt)
            }
            Err(failure) => self.abort(&mut fsm, failure),
        }
    }

    async fn drive(
        &self,
        fsm: &mut PipelineFsm,
        client: &ledger_network::ClientHandle,
        channel: &ChannelProfile,
        operation: &ProposedOperation,
    ) -> Result<TransactionReceipt, StageFailure> {
        let tx_id = &operation.tx_id;

        // Proposing
        let broadcast = self
            .broadcaster
            .broadcast(client, operation)
            .await
            .map_err(|e| StageFailure::new(e.to_string()))?;

        // Evaluating
        fsm.start_evaluating()?;
        let outcome = self.evaluator.evaluate(broadcast.responses, broadcast.proposal);
        if !outcome.approved {
            let rejected: Vec<String> = outcome
                .rejections()
                .map(|r| format!("{} (status {})", r.source_node, r.status_code))
                .collect();
            let reason = if rejected.is_empty() {
                "no endorsement responses".to_string()
            } else {
                format!("endorsement rejected by {}", rejected.join(", "))
            };
            return Err(StageFailure::new(reason));
        }
        let payload = outcome.payload().map(<[u8]>::to_vec).unwrap_or_default();

        // Committing
        fsm.start_committing()?;
        let commit = self
            .submitter
            .submit(tx_id, &channel.orderer, &outcome)
            .await
            .map_err(|e| StageFailure::new(e.to_string()))?;
        if !commit.accepted {
            return Err(StageFailure::new(format!(
                "orderer rejected transaction with status {}",
                commit.status_code
            )));
        }

        // Confirming
        fsm.start_confirming()?;
        let events = self
            .aggregator
            .confirm(&operation.channel, tx_id, channel.event_sources(), self.settings.confirm_timeout)
            .await;

        let verdict = ConfirmationVerdict::tally(&events);
        if !verdict.is_confirmed() {
            return Err(StageFailure {
                reason: verdict.reason(),
                events,
            });
        }

        fsm.finish()?;
        Ok(TransactionReceipt {
            tx_id: tx_id.clone(),
            commit_status: commit.status_code,
            payload,
            events,
            completed_at: Utc::now(),
        })
    }

    fn abort(&self, fsm: &mut PipelineFsm, failure: StageFailure) -> PipelineResult {
        let stage = abort_stage(fsm);
        warn!("Transaction {} failed at {}: {}", fsm.tx_id(), stage, failure.reason);
        PipelineResult::Failure(PipelineFailure {
            stage,
            reason: failure.reason,
            tx_id: Some(fsm.tx_id().clone()),
            events: failure.events,
        })
    }
}

/// Stage to report for a failed run. A machine that is already terminal
/// keeps the stage it last entered.
fn abort_stage(fsm: &mut PipelineFsm) -> PipelineStage {
    match fsm.abort() {
        Ok(stage) => stage,
        Err(e) => {
            error!("{}", e);
            fsm.current_state().last_stage()
        }
    }
}
