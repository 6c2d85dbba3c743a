use std::process::ExitCode;

use clap::Parser;
use eyre::WrapErr;
use permit2_deployer::{
    command::Cli,
    handle::{
        enter_failed, enter_stage, interrupt_signal, interruptible, load_config, run_deployment,
        Stage,
    },
    DeployConfig, DeployError, DeploymentResult, StarknetChain,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    if dotenvy::dotenv().is_err() {
        println!("⚠️  No .env file found, using environment variables");
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("permit2_deployer=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            let code = report
                .downcast_ref::<DeployError>()
                .map(DeployError::exit_code)
                .unwrap_or(2);
            eprintln!("❌ {report:#}");
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> eyre::Result<()> {
    println!("🚀 Permit2 Contract Deployment Script");
    println!("=====================================");
    enter_stage(Stage::Init);

    let config = load_config(cli)?;
    enter_stage(Stage::CredentialsLoaded);

    println!("📋 Network: Starknet {}", config.network);
    println!("📋 RPC URL: {}", config.rpc_url);
    println!("📋 Account: {:#x}", config.credentials.account_address);

    interruptible(connect_and_deploy(&config), interrupt_signal())
        .await
        .wrap_err("Permit2 deployment failed")?;

    println!("\n🎉 Permit2 deployment completed successfully!");
    enter_stage(Stage::Done);
    Ok(())
}

async fn connect_and_deploy(config: &DeployConfig) -> Result<DeploymentResult, DeployError> {
    let chain = StarknetChain::connect(config.rpc_url.clone(), &config.credentials)
        .await
        .inspect_err(enter_failed)?;
    println!("✅ Connected to Starknet RPC");
    enter_stage(Stage::Connected);
    run_deployment(&chain, config).await
}
