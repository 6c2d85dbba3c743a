use std::{fmt::Display, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::chain::ChainError;

/// Which of the two compiled artifacts an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Sierra,
    Casm,
}

impl Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Sierra => write!(f, "sierra"),
            ArtifactKind::Casm => write!(f, "casm"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    ConfigMissing(Vec<&'static str>),
    #[error("invalid value for {name}: {reason}")]
    ConfigInvalid { name: &'static str, reason: String },
    #[error("{kind} contract file not found: {}", .path.display())]
    ArtifactNotFound { kind: ArtifactKind, path: PathBuf },
    #[error("failed to read {kind} contract {}: {source}", .path.display())]
    ArtifactRead {
        kind: ArtifactKind,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {kind} contract {}: {source}", .path.display())]
    ArtifactParse {
        kind: ArtifactKind,
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("error connecting to rpc provider: {0}")]
    Connect(String),
    #[error("declare transaction failed: {0}")]
    DeclareFailed(String),
    #[error("class {class_hash} reported as already declared but not found on chain")]
    DeclaredClassNotFound { class_hash: String },
    #[error("invalid class hash {value}: {reason}")]
    InvalidClassHash { value: String, reason: String },
    #[error("failed to deploy contract: {0}")]
    DeploySubmissionFailed(String),
    #[error("transaction {tx_hash} failed: {reason}")]
    ReceiptFailed { tx_hash: String, reason: String },
    #[error("no receipt for transaction {tx_hash} after {waited:?}")]
    ReceiptTimeout { tx_hash: String, waited: Duration },
    #[error("interrupted by Ctrl-C")]
    Interrupted,
    #[error("failed to write deployment file {}: {source}", .path.display())]
    ReportWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl DeployError {
    /// Process exit status for a run that ended with this error
    pub fn exit_code(&self) -> u8 {
        match self {
            DeployError::ConfigMissing(_) | DeployError::ConfigInvalid { .. } => 1,
            DeployError::Interrupted => 130,
            _ => 2,
        }
    }
}
