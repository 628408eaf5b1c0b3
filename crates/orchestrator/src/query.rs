//! Read path of the coordinator. None of these touch the pipeline state machine.

use ledger_network::ClientHandle;
use ledger_types::{Block, ChainInfo, NodeAddress, ProposedOperation, TransactionId};
use tracing::{debug, error};

use crate::coordinator::TransactionCoordinator;
use crate::error::{QueryError, QueryResult};

impl TransactionCoordinator {
    /// Evaluate a chaincode function on every endorser without ordering it.
    ///
    /// Returns one `query: <args> result: <payload>` line per endorser.
    pub async fn query_chaincode(
        &self,
        identity: &str,
        secret: &str,
        function: &str,
        args: Vec<String>,
    ) -> QueryResult<Vec<String>> {
        let client = self.identities.get_or_enroll(identity, secret).await?;
        let channel = client
            .channel(&self.settings.channel)
            .ok_or_else(|| QueryError::ChannelNotFound(self.settings.channel.clone()))?;
        if channel.endorsers.is_empty() {
            return Err(QueryError::NoPeers(self.settings.channel.clone()));
        }

        let operation = ProposedOperation {
            tx_id: TransactionId::mint(&client.creator()),
            channel: self.settings.channel.clone(),
            chaincode: self.settings.chaincode.clone(),
            function: function.to_string(),
            args,
            targets: channel.endorsers.clone(),
        };

        let responses = self.gateway.query_chaincode(&client, &operation).await?;

        let joined = operation.args.join(",");
        responses
            .iter()
            .map(|response| {
                if !response.is_success() {
                    error!(
                        "Query {} rejected by {} with status {}",
                        function, response.source_node, response.status_code
                    );
                    return Err(QueryError::Rejected {
                        node: response.source_node.to_string(),
                        status: response.status_code,
                    });
                }
                Ok(format!(
                    "query: {} result: {}",
                    joined,
                    String::from_utf8_lossy(&response.payload)
                ))
            })
            .collect()
    }

    /// Latest height and tip hashes of the configured channel.
    pub async fn get_chain_info(&self) -> QueryResult<ChainInfo> {
        let (client, peer) = self.admin_session().await?;
        self.ledger
            .query_chain_info(&client, &peer, &self.settings.channel)
            .await
            .map_err(QueryError::from)
    }

    pub async fn get_block_by_number(&self, number: u64) -> QueryResult<Block> {
        let (client, peer) = self.admin_session().await?;
        self.ledger
            .query_block(&client, &peer, &self.settings.channel, number)
            .await
            .map_err(QueryError::from)
    }

    /// `hash` is hex encoded. It is validated before any network call.
    pub async fn get_block_by_hash(&self, hash: &str) -> QueryResult<Block> {
        if hash.is_empty() {
            return Err(QueryError::InvalidHash("empty hash".to_string()));
        }
        let raw = hex::decode(hash).map_err(|e| QueryError::InvalidHash(format!("{}: {}", hash, e)))?;

        let (client, peer) = self.admin_session().await?;
        self.ledger
            .query_block_by_hash(&client, &peer, &self.settings.channel, &raw)
            .await
            .map_err(QueryError::from)
    }

    async fn admin_session(&self) -> QueryResult<(ClientHandle, NodeAddress)> {
        let client = self
            .identities
            .get_or_enroll(&self.settings.admin_identity, &self.settings.admin_secret)
            .await?;

        let peer = client
            .channel(&self.settings.channel)
            .ok_or_else(|| QueryError::ChannelNotFound(self.settings.channel.clone()))?
            .query_peer()
            .cloned()
            .ok_or_else(|| QueryError::NoPeers(self.settings.channel.clone()))?;

        debug!("Querying ledger of {} through {}", self.settings.channel, peer);
        Ok((client, peer))
    }
}
