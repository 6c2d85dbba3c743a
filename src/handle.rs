use std::{fmt::Display, future::Future};

use chrono::Utc;
use starknet::core::types::Felt;

use crate::{
    address::{random_salt, udc_deploy_call, udc_deployed_address, UDC_ADDRESS},
    artifact::load_artifacts,
    chain::{Chain, ChainError},
    command::Cli,
    config::DeployConfig,
    error::DeployError,
    object::{ContractArtifacts, DeploymentRecord, DeploymentResult},
    receipt::wait_for_receipt,
    report::{save_deployment_record, write_report},
};

/// Where a deployment run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    CredentialsLoaded,
    Connected,
    Declared,
    Deployed,
    Reported,
    Done,
    Failed,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::CredentialsLoaded => "credentials-loaded",
            Stage::Connected => "connected",
            Stage::Declared => "declared",
            Stage::Deployed => "deployed",
            Stage::Reported => "reported",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub fn enter_stage(stage: Stage) {
    tracing::info!(%stage, "deployment stage reached");
}

/// Log the transition into [`Stage::Failed`] caused by `err`
pub fn enter_failed(err: &DeployError) {
    tracing::error!(stage = %Stage::Failed, error = %err, "deployment aborted");
}

/// Validate the command line, printing the credential help when some are missing
pub fn load_config(cli: Cli) -> Result<DeployConfig, DeployError> {
    DeployConfig::from_cli(cli).inspect_err(|err| {
        if let DeployError::ConfigMissing(_) = err {
            println!("❌ Missing required environment variables:");
            println!("   STARKNET_DEPLOYER_ADDRESS: Your Starknet account address");
            println!("   STARKNET_DEPLOYER_PRIVATE_KEY: Your private key");
            println!("   STARKNET_DEPLOYER_PUBLIC_KEY: Your public key");
        }
        enter_failed(err);
    })
}

/// Resolves on the first Ctrl-C delivered to the process.
///
/// The handler replaces the default SIGINT behavior for the rest of the process, so
/// it is registered once and raced against the whole run with [`interruptible`].
pub async fn interrupt_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "unable to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Run `work` until it finishes or `interrupt` resolves, whichever comes first
pub async fn interruptible<T, W, I>(work: W, interrupt: I) -> Result<T, DeployError>
where
    W: Future<Output = Result<T, DeployError>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        biased;

        () = interrupt => {
            let err = DeployError::Interrupted;
            enter_failed(&err);
            Err(err)
        }
        result = work => result,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    pub class_hash: Felt,
    /// `None` when the class was already on chain and nothing was submitted
    pub transaction_hash: Option<Felt>,
    pub already_declared: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub deployed_address: Felt,
    pub transaction_hash: Felt,
    pub salt: Felt,
}

/// Declare the contract class, or reuse it if the network already knows it
pub async fn declare_contract<C: Chain + ?Sized>(
    chain: &C,
    artifacts: &ContractArtifacts,
    config: &DeployConfig,
) -> Result<Declaration, DeployError> {
    println!("📤 Declaring contract...");
    match chain.declare(artifacts).await {
        Ok(outcome) => {
            println!(
                "⏳ Waiting for declaration confirmation... (tx {:#x})",
                outcome.transaction_hash
            );
            wait_for_receipt(chain, outcome.transaction_hash, &config.receipt).await?;
            Ok(Declaration {
                class_hash: outcome.class_hash,
                transaction_hash: Some(outcome.transaction_hash),
                already_declared: false,
            })
        }
        Err(ChainError::ClassAlreadyDeclared) => {
            println!("✅ Contract already declared, extracting class hash...");
            let class_hash = artifacts
                .sierra_class
                .class_hash()
                .map_err(|e| DeployError::DeclareFailed(format!("cannot compute class hash: {e}")))?;
            if config.verify_declared_class && !chain.is_class_declared(class_hash).await? {
                return Err(DeployError::DeclaredClassNotFound {
                    class_hash: format!("{:#x}", class_hash),
                });
            }
            tracing::info!(
                class_hash = format!("{:#x}", class_hash),
                verified = config.verify_declared_class,
                "reusing declared class"
            );
            Ok(Declaration {
                class_hash,
                transaction_hash: None,
                already_declared: true,
            })
        }
        Err(err) => Err(DeployError::DeclareFailed(err.to_string())),
    }
}

/// Deploy an instance of `class_hash`, a `0x`-prefixed hex string, through the UDC
/// and wait for it to land
pub async fn deploy_contract<C: Chain + ?Sized>(
    chain: &C,
    class_hash: &str,
    config: &DeployConfig,
) -> Result<Deployment, DeployError> {
    let invalid = |reason: String| DeployError::InvalidClassHash {
        value: class_hash.to_string(),
        reason,
    };
    if !class_hash.starts_with("0x") {
        return Err(invalid("expected 0x-prefixed hex".into()));
    }
    let class_hash = Felt::from_hex(class_hash).map_err(|e| invalid(e.to_string()))?;
    // Permit2 has no constructor arguments
    let constructor_calldata: Vec<Felt> = Vec::new();
    let salt = config.salt.unwrap_or_else(random_salt);

    println!("📤 Sending deployment transaction...");
    let transaction_hash = chain
        .execute(udc_deploy_call(class_hash, salt, &constructor_calldata))
        .await
        .map_err(|e| DeployError::DeploySubmissionFailed(e.to_string()))?;
    println!("⏳ Transaction sent! Hash: {:#x}", transaction_hash);
    println!("⏳ Waiting for transaction confirmation...");

    let receipt = wait_for_receipt(chain, transaction_hash, &config.receipt).await?;
    println!("✅ Transaction confirmed!");
    println!("   Execution Status: {:?}", receipt.execution);
    println!("   Finality Status: {}", receipt.finality);

    let deployed_address = udc_deployed_address(
        class_hash,
        salt,
        &constructor_calldata,
        UDC_ADDRESS,
        chain.account_address(),
    );
    Ok(Deployment {
        deployed_address,
        transaction_hash,
        salt,
    })
}

/// Run the declare, deploy and report steps against a connected chain.
///
/// Writing the report or the history record is best effort: a failure is logged
/// and the deployment is still returned.
pub async fn run_deployment<C: Chain + ?Sized>(
    chain: &C,
    config: &DeployConfig,
) -> Result<DeploymentResult, DeployError> {
    let (result, declaration, deployment) = declare_and_deploy(chain, config)
        .await
        .inspect_err(enter_failed)?;

    println!("\n📋 Step 3: Saving deployment information...");
    let deployer_address = chain.account_address();
    match write_report(&result, deployer_address, &config.report_path) {
        Ok(()) => println!(
            "✅ Deployment information saved to {}",
            config.report_path.display()
        ),
        Err(err) => {
            println!("⚠️  Failed to save deployment info: {err}");
            tracing::warn!(error = %err, "report not written");
        }
    }
    if let Some(history_path) = &config.history_path {
        let record = DeploymentRecord::new(
            &config.network,
            deployer_address,
            &result,
            deployment.salt,
            declaration.already_declared,
        );
        if let Err(err) = save_deployment_record(history_path, record) {
            tracing::warn!(error = %err, "deployment record not saved");
        }
    }
    enter_stage(Stage::Reported);
    Ok(result)
}

async fn declare_and_deploy<C: Chain + ?Sized>(
    chain: &C,
    config: &DeployConfig,
) -> Result<(DeploymentResult, Declaration, Deployment), DeployError> {
    println!("\n📋 Step 1: Declaring Permit2 contract...");
    println!("📋 Loading contract files:");
    println!("   Sierra: {}", config.sierra_path.display());
    println!("   Casm: {}", config.casm_path.display());
    let artifacts = load_artifacts(&config.sierra_path, &config.casm_path)?;
    let declaration = declare_contract(chain, &artifacts, config).await?;
    drop(artifacts);
    let class_hash = format!("{:#x}", declaration.class_hash);
    println!("✅ Contract declaration completed! Class Hash: {class_hash}");
    enter_stage(Stage::Declared);

    println!("\n📋 Step 2: Deploying Permit2 contract...");
    let deployment = deploy_contract(chain, &class_hash, config).await?;
    let result = DeploymentResult {
        class_hash,
        deployed_address: format!("{:#x}", deployment.deployed_address),
        transaction_hash: format!("{:#x}", deployment.transaction_hash),
        deployment_time: Utc::now(),
    };
    println!("✅ Contract deployed successfully!");
    println!("   Deployed Address: {}", result.deployed_address);
    println!("   Transaction Hash: {}", result.transaction_hash);
    enter_stage(Stage::Deployed);
    Ok((result, declaration, deployment))
}
