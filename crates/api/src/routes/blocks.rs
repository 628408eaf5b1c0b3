//! Ledger read endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use ledger_types::{Block, ChainInfo};

use crate::{state::AppState, ApiResult};

/// GET /blocks - Latest chain height and tip hashes
pub async fn chain_info(State(state): State<AppState>) -> ApiResult<Json<ChainInfo>> {
    Ok(Json(state.coordinator.get_chain_info().await?))
}

/// GET /blocks/:number
pub async fn block_by_number(State(state): State<AppState>, Path(number): Path<u64>) -> ApiResult<Json<Block>> {
    Ok(Json(state.coordinator.get_block_by_number(number).await?))
}

/// GET /transactions/:hash - Block containing the given hex hash
pub async fn block_by_hash(State(state): State<AppState>, Path(hash): Path<String>) -> ApiResult<Json<Block>> {
    Ok(Json(state.coordinator.get_block_by_hash(&hash).await?))
}
