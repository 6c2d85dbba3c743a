use std::{fs, path::Path};

use serde::de::DeserializeOwned;

use crate::{
    error::{ArtifactKind, DeployError},
    object::ContractArtifacts,
};

/// Load the sierra and casm classes of the contract.
///
/// Both files are checked for existence before either is parsed, so a missing
/// casm file is reported even when the sierra file is broken.
pub fn load_artifacts(sierra_path: &Path, casm_path: &Path) -> Result<ContractArtifacts, DeployError> {
    ensure_exists(ArtifactKind::Sierra, sierra_path)?;
    ensure_exists(ArtifactKind::Casm, casm_path)?;
    let casm_class = load_json(ArtifactKind::Casm, casm_path)?;
    let sierra_class = load_json(ArtifactKind::Sierra, sierra_path)?;
    Ok(ContractArtifacts {
        sierra_class,
        casm_class,
    })
}

fn ensure_exists(kind: ArtifactKind, path: &Path) -> Result<(), DeployError> {
    if !path.exists() {
        return Err(DeployError::ArtifactNotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(kind: ArtifactKind, path: &Path) -> Result<T, DeployError> {
    let content = fs::read(path).map_err(|source| DeployError::ArtifactRead {
        kind,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| DeployError::ArtifactParse {
        kind,
        path: path.to_path_buf(),
        source,
    })
}
