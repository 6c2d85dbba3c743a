use std::{fs, path::Path};

use starknet::core::types::Felt;

use crate::{
    error::DeployError,
    object::{DeploymentRecord, DeploymentResult},
};

pub fn render_report(result: &DeploymentResult, deployer_address: Felt) -> String {
    format!(
        r#"# Latest Permit2 Deployment Details

## Deployment Information

- **Deployer Contract Address**: {:#x}
- **Deployment Transaction Hash**: {}
- **Class Hash**: {}
- **Deployed Contract Address**: {}
- **Deployment Time**: {}

## Notes

This contract was deployed using the permit2-deployer script. The Permit2 contract has no constructor arguments and was deployed using the Universal Deployer Contract (UDC).
"#,
        deployer_address,
        result.transaction_hash,
        result.class_hash,
        result.deployed_address,
        result.rfc3339_time(),
    )
}

/// Overwrite the markdown report at `path`
pub fn write_report(
    result: &DeploymentResult,
    deployer_address: Felt,
    path: &Path,
) -> Result<(), DeployError> {
    fs::write(path, render_report(result, deployer_address)).map_err(|source| {
        DeployError::ReportWriteFailed {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Append `record` to the json array kept at `path`, creating parent directories on the way
pub fn save_deployment_record(path: &Path, record: DeploymentRecord) -> Result<(), DeployError> {
    let write_failed = |source: std::io::Error| DeployError::ReportWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }
    let mut records: Vec<DeploymentRecord> = if path.exists() {
        let content = fs::read(path).map_err(write_failed)?;
        serde_json::from_slice(&content).map_err(|e| write_failed(e.into()))?
    } else {
        Vec::new()
    };
    records.push(record);
    let new_content = serde_json::to_string_pretty(&records).map_err(|e| write_failed(e.into()))?;
    fs::write(path, new_content).map_err(write_failed)
}

/// Newest record of a history file written by [`save_deployment_record`]
pub fn load_deployment_record(path: &Path) -> eyre::Result<DeploymentRecord> {
    let file = fs::File::open(path)?;
    let records: Vec<DeploymentRecord> = serde_json::from_reader(file)?;
    records.last().cloned().ok_or(eyre::eyre!("empty record"))
}
