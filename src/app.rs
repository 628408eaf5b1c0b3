use crate::config::AppConfig;
use ledger_api::AppState;
use ledger_network::{HttpNodeGateway, StaticIdentityProvider};
use ledger_orchestrator::TransactionCoordinator;
use ledger_types::PipelineResult;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Gateway process wiring: HTTP transport, identities and the coordinator.
pub struct GatewayApp {
    config: AppConfig,
    coordinator: TransactionCoordinator,
}

impl GatewayApp {
    /// Expects a config that already passed [`AppConfig::validate`].
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        info!("Initializing ledger gateway");
        info!("  Channel:   {}", config.ledger.channel);
        info!("  Chaincode: {}", config.ledger.chaincode);
        info!("  MSP:       {}", config.network.msp_id);

        let profile = Arc::new(config.network_profile());
        let identities = StaticIdentityProvider::new(
            config.network.msp_id.clone(),
            Arc::clone(&profile),
            config.credentials(),
        );
        let gateway = Arc::new(HttpNodeGateway::new(config.gateway_config())?);

        let coordinator = TransactionCoordinator::new(
            Arc::new(identities),
            gateway.clone(),
            gateway,
            config.coordinator_settings(),
        );

        Ok(Self { config, coordinator })
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.config.listen_addr()?;
        ledger_api::start_server(AppState::new(self.coordinator), addr).await
    }

    pub async fn invoke(&self, user: &str, secret: &str, fcn: &str, args: Vec<String>) -> PipelineResult {
        self.coordinator.submit_transaction(user, secret, fcn, args).await
    }

    pub async fn query(&self, user: &str, secret: &str, fcn: &str, args: Vec<String>) -> anyhow::Result<Vec<String>> {
        Ok(self.coordinator.query_chaincode(user, secret, fcn, args).await?)
    }

    pub async fn chain_info(&self) -> anyhow::Result<ledger_types::ChainInfo> {
        Ok(self.coordinator.get_chain_info().await?)
    }

    pub async fn block(&self, number: Option<u64>, hash: Option<&str>) -> anyhow::Result<ledger_types::Block> {
        match (number, hash) {
            (Some(number), _) => Ok(self.coordinator.get_block_by_number(number).await?),
            (None, Some(hash)) => Ok(self.coordinator.get_block_by_hash(hash).await?),
            (None, None) => anyhow::bail!("either a block number or a block hash is required"),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
