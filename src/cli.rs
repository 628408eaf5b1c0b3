use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ledger-gateway")]
#[command(version, about = "Transaction gateway for permissioned ledger networks", long_about = None)]
#[command(author = "Ledger Gateway Team")]
pub struct Cli {
    /// Config file (defaults to config/default.toml when present)
    #[arg(short, long, global = true, env = "GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the REST gateway (default mode)
    Serve,

    /// Submit a transaction and wait for commit confirmation
    Invoke(ChaincodeArgs),

    /// Evaluate a chaincode function on the endorsing peers
    Query(ChaincodeArgs),

    /// Show chain height and tip hashes
    Info,

    /// Fetch a block by number or by hash
    Block {
        #[arg(short, long, conflicts_with = "hash", required_unless_present = "hash", help = "Block number")]
        number: Option<u64>,

        #[arg(long, help = "Hex-encoded block hash")]
        hash: Option<String>,
    },

    /// Print the effective configuration with secrets masked
    Config,
}

#[derive(Args)]
pub struct ChaincodeArgs {
    #[arg(short, long, help = "Enrolled identity name")]
    pub user: String,

    #[arg(short, long, env = "GATEWAY_SECRET", hide_env_values = true, help = "Enrollment secret")]
    pub secret: String,

    #[arg(short, long, help = "Chaincode function")]
    pub fcn: String,

    #[arg(short = 'a', long = "arg", help = "Function argument, repeatable")]
    pub args: Vec<String>,
}
