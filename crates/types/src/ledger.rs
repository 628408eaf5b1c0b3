//! Read-path types returned by ledger queries.

use serde::{Deserialize, Serialize};

/// Latest ledger height and tip hashes of a channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainInfo {
    pub height: u64,
    pub current_block_hash: String,
    pub previous_block_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockTransaction {
    pub tx_id: String,
    pub validation_code: String,
}

/// A committed block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub number: u64,
    pub previous_hash: String,
    pub data_hash: String,
    #[serde(default)]
    pub transactions: Vec<BlockTransaction>,
}
