use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_SIERRA_PATH: &str = "../target/dev/permit2_Permit2.contract_class.json";
pub const DEFAULT_CASM_PATH: &str = "../target/dev/permit2_Permit2.compiled_contract_class.json";
pub const DEFAULT_REPORT_PATH: &str = "LATEST_DEPLOYMENT.md";

#[derive(Parser, Debug, Clone, Default)]
#[command(version, about = "Declare and deploy the Permit2 contract on Starknet", long_about = None)]
pub struct Cli {
    /// Address of the deployer account contract, in hex
    #[arg(long, env = "STARKNET_DEPLOYER_ADDRESS", hide_env_values = true)]
    pub account_address: Option<String>,
    /// Private key of the deployer account, in hex or decimal
    #[arg(long, env = "STARKNET_DEPLOYER_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
    /// Public key of the deployer account, must match the private key
    #[arg(long, env = "STARKNET_DEPLOYER_PUBLIC_KEY", hide_env_values = true)]
    pub public_key: Option<String>,

    /// The network connect to, options are `mainnet`, `sepolia`, `http://localhost:5050`
    #[arg(short, long, env = "STARKNET_NETWORK", default_value_t = String::from("sepolia"))]
    pub network: String,
    /// Explicit RPC endpoint, overrides the endpoint picked by `--network`
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Sierra contract class produced by the Cairo compiler
    #[arg(long, env = "PERMIT2_SIERRA_PATH", default_value = DEFAULT_SIERRA_PATH)]
    pub sierra_path: PathBuf,
    /// CASM compiled contract class produced by the Cairo compiler
    #[arg(long, env = "PERMIT2_CASM_PATH", default_value = DEFAULT_CASM_PATH)]
    pub casm_path: PathBuf,
    /// Markdown report overwritten after every successful deployment
    #[arg(long, env = "DEPLOYMENT_REPORT_PATH", default_value = DEFAULT_REPORT_PATH)]
    pub report_path: PathBuf,
    /// JSON file that keeps every deployment record, nothing is kept if omitted
    #[arg(long, env = "DEPLOYMENT_HISTORY_PATH")]
    pub history: Option<PathBuf>,

    /// Deployment salt in hex, a random one is generated if omitted
    #[arg(long, env = "DEPLOY_SALT")]
    pub salt: Option<String>,
    /// Delay between two receipt queries
    #[arg(long, env = "RECEIPT_POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,
    /// Give up waiting for a receipt after this many seconds, `0` waits forever
    #[arg(long, env = "RECEIPT_TIMEOUT_SECS", default_value_t = 300)]
    pub receipt_timeout_secs: u64,
    /// Trust the locally computed class hash when the class is already declared
    #[arg(long, env = "SKIP_CLASS_VERIFICATION", default_value_t = false)]
    pub skip_class_verification: bool,
}
