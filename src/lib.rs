pub mod address;
pub mod artifact;
pub mod chain;
pub mod command;
pub mod config;
pub mod error;
pub mod handle;
pub mod object;
pub mod receipt;
pub mod report;

pub use chain::{Chain, ChainError, StarknetChain};
pub use config::{DeployConfig, ReceiptPolicy};
pub use error::DeployError;
pub use handle::{declare_contract, deploy_contract, interruptible, run_deployment, Stage};
pub use object::{DeploymentRecord, DeploymentResult, Network};

/// Load the latest Permit2 deployment record from a history file
pub fn load_latest_deployment(history_path: &std::path::Path) -> eyre::Result<DeploymentRecord> {
    report::load_deployment_record(history_path)
}
