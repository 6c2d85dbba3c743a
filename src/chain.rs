use std::sync::Arc;

use starknet::{
    accounts::{Account, AccountError, ConnectedAccount, ExecutionEncoding, SingleOwnerAccount},
    core::types::{BlockId, BlockTag, Call, ExecutionResult, Felt, StarknetError},
    providers::{
        jsonrpc::{HttpTransport, JsonRpcClient},
        Provider, ProviderError,
    },
    signers::{LocalWallet, SigningKey},
};
use thiserror::Error;
use url::Url;

use crate::{
    error::DeployError,
    object::{ContractArtifacts, Credentials},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("class is already declared")]
    ClassAlreadyDeclared,
    #[error("invalid contract artifact: {0}")]
    InvalidArtifact(String),
    #[error("transaction rejected: {0}")]
    Rejected(String),
    #[error("provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclareOutcome {
    pub transaction_hash: Felt,
    pub class_hash: Felt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Succeeded,
    Reverted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptInfo {
    pub execution: ExecutionOutcome,
    pub finality: String,
}

/// The signing account on a Starknet network, as seen by the deployment workflow
#[async_trait::async_trait]
pub trait Chain: Send + Sync {
    /// Address of the account that signs and pays for every transaction
    fn account_address(&self) -> Felt;

    async fn declare(&self, artifacts: &ContractArtifacts) -> Result<DeclareOutcome, ChainError>;

    /// Submit an invoke transaction and return its hash
    async fn execute(&self, call: Call) -> Result<Felt, ChainError>;

    /// `Ok(None)` while the node does not know the transaction yet
    async fn transaction_receipt(&self, tx_hash: Felt) -> Result<Option<ReceiptInfo>, ChainError>;

    async fn is_class_declared(&self, class_hash: Felt) -> Result<bool, ChainError>;
}

type RpcAccount = SingleOwnerAccount<JsonRpcClient<HttpTransport>, LocalWallet>;

pub struct StarknetChain {
    account: RpcAccount,
}

impl StarknetChain {
    /// Build the json-rpc client and the single owner account on top of it
    pub async fn connect(rpc_url: Url, credentials: &Credentials) -> Result<Self, DeployError> {
        let provider = JsonRpcClient::new(HttpTransport::new(rpc_url));
        let chain_id = provider
            .chain_id()
            .await
            .map_err(|e| DeployError::Connect(e.to_string()))?;
        tracing::debug!(chain_id = format!("{:#x}", chain_id), "fetched chain id");
        let signer = LocalWallet::from(SigningKey::from_secret_scalar(credentials.private_key));
        let account = SingleOwnerAccount::new(
            provider,
            signer,
            credentials.account_address,
            chain_id,
            ExecutionEncoding::New,
        );
        Ok(Self { account })
    }
}

#[async_trait::async_trait]
impl Chain for StarknetChain {
    fn account_address(&self) -> Felt {
        self.account.address()
    }

    async fn declare(&self, artifacts: &ContractArtifacts) -> Result<DeclareOutcome, ChainError> {
        let flattened = artifacts
            .sierra_class
            .clone()
            .flatten()
            .map_err(|e| ChainError::InvalidArtifact(e.to_string()))?;
        let compiled_class_hash = artifacts
            .casm_class
            .class_hash()
            .map_err(|e| ChainError::InvalidArtifact(e.to_string()))?;
        let result = self
            .account
            .declare_v3(Arc::new(flattened), compiled_class_hash)
            .send()
            .await
            .map_err(|e| classify_declare_error(&e))?;
        Ok(DeclareOutcome {
            transaction_hash: result.transaction_hash,
            class_hash: result.class_hash,
        })
    }

    async fn execute(&self, call: Call) -> Result<Felt, ChainError> {
        let result = self
            .account
            .execute_v3(vec![call])
            .send()
            .await
            .map_err(|e| match e {
                AccountError::Provider(e) => ChainError::Provider(e.to_string()),
                other => ChainError::Rejected(other.to_string()),
            })?;
        Ok(result.transaction_hash)
    }

    async fn transaction_receipt(&self, tx_hash: Felt) -> Result<Option<ReceiptInfo>, ChainError> {
        let fetched = self.account.provider().get_transaction_receipt(tx_hash).await;
        let Some(receipt) = receipt_or_pending(fetched)? else {
            return Ok(None);
        };
        let receipt = receipt.receipt;
        let execution = match receipt.execution_result() {
            ExecutionResult::Succeeded => ExecutionOutcome::Succeeded,
            ExecutionResult::Reverted { reason } => ExecutionOutcome::Reverted(reason.clone()),
        };
        Ok(Some(ReceiptInfo {
            execution,
            finality: format!("{:?}", receipt.finality_status()),
        }))
    }

    async fn is_class_declared(&self, class_hash: Felt) -> Result<bool, ChainError> {
        let fetched = self
            .account
            .provider()
            .get_class(BlockId::Tag(BlockTag::Latest), class_hash)
            .await;
        class_found(fetched)
    }
}

/// A transaction the node does not know yet is still pending, any other error is fatal
fn receipt_or_pending<T>(fetched: Result<T, ProviderError>) -> Result<Option<T>, ChainError> {
    match fetched {
        Ok(receipt) => Ok(Some(receipt)),
        Err(ProviderError::StarknetError(StarknetError::TransactionHashNotFound)) => Ok(None),
        Err(e) => Err(ChainError::Provider(e.to_string())),
    }
}

fn class_found<T>(fetched: Result<T, ProviderError>) -> Result<bool, ChainError> {
    match fetched {
        Ok(_) => Ok(true),
        Err(ProviderError::StarknetError(StarknetError::ClassHashNotFound)) => Ok(false),
        Err(e) => Err(ChainError::Provider(e.to_string())),
    }
}

/// Decide whether a failed declare means the class is already on chain.
///
/// The provider's error code is trusted first, the message text is only a fallback
/// for nodes that wrap the code into a generic validation failure.
pub fn classify_declare_error<S: std::fmt::Display>(err: &AccountError<S>) -> ChainError {
    match err {
        AccountError::Provider(ProviderError::StarknetError(StarknetError::ClassAlreadyDeclared)) => {
            ChainError::ClassAlreadyDeclared
        }
        other => classify_declare_message(other.to_string()),
    }
}

pub fn classify_declare_message(message: String) -> ChainError {
    if message.to_lowercase().contains("already declared") {
        ChainError::ClassAlreadyDeclared
    } else {
        ChainError::Rejected(message)
    }
}
