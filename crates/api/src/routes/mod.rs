pub mod blocks;
pub mod chaincode;
pub mod health;
pub mod metrics;
