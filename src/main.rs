mod app;
mod cli;
mod config;

use app::{print_json, GatewayApp};
use clap::Parser;
use cli::{ChaincodeArgs, Cli, Commands};
use config::AppConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Application error: {:#}", e);
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns the process exit code.
async fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    init_tracing(&config.logging.level, &config.logging.format);

    info!("===================================");
    info!("Ledger Gateway");
    info!("===================================");

    match cli.command {
        Some(Commands::Serve) | None => {
            GatewayApp::new(config)?.serve().await?;
        }
        Some(Commands::Invoke(args)) => {
            return invoke(config, args).await;
        }
        Some(Commands::Query(args)) => {
            let app = GatewayApp::new(config)?;
            let responses = app.query(&args.user, &args.secret, &args.fcn, args.args).await?;
            print_json(&responses)?;
        }
        Some(Commands::Info) => {
            let app = GatewayApp::new(config)?;
            print_json(&app.chain_info().await?)?;
        }
        Some(Commands::Block { number, hash }) => {
            let app = GatewayApp::new(config)?;
            print_json(&app.block(number, hash.as_deref()).await?)?;
        }
        Some(Commands::Config) => {
            print_json(&config.redacted())?;
        }
    }

    Ok(0)
}

async fn invoke(config: AppConfig, args: ChaincodeArgs) -> anyhow::Result<i32> {
    let app = GatewayApp::new(config)?;
    let result = app.invoke(&args.user, &args.secret, &args.fcn, args.args).await;
    print_json(&result)?;

    match result.failed_stage() {
        Some(stage) => {
            warn!("Transaction failed at {:?}", stage);
            Ok(1)
        }
        None => Ok(0),
    }
}

fn init_tracing(level: &str, format: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
