use starknet::core::types::Felt;

use crate::{
    chain::{Chain, ExecutionOutcome, ReceiptInfo},
    config::ReceiptPolicy,
    error::DeployError,
};

/// Wait for the receipt of `tx_hash`, giving up once the policy's deadline passes
pub async fn wait_for_receipt<C: Chain + ?Sized>(
    chain: &C,
    tx_hash: Felt,
    policy: &ReceiptPolicy,
) -> Result<ReceiptInfo, DeployError> {
    let poll = poll_receipt(chain, tx_hash, policy);
    match policy.timeout {
        Some(timeout) => match tokio::time::timeout(timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(DeployError::ReceiptTimeout {
                tx_hash: format!("{:#x}", tx_hash),
                waited: timeout,
            }),
        },
        None => poll.await,
    }
}

async fn poll_receipt<C: Chain + ?Sized>(
    chain: &C,
    tx_hash: Felt,
    policy: &ReceiptPolicy,
) -> Result<ReceiptInfo, DeployError> {
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if let Some(receipt) = chain.transaction_receipt(tx_hash).await? {
            tracing::debug!(
                tx_hash = format!("{:#x}", tx_hash),
                attempts,
                finality = %receipt.finality,
                "receipt received"
            );
            return match &receipt.execution {
                ExecutionOutcome::Succeeded => Ok(receipt),
                ExecutionOutcome::Reverted(reason) => Err(DeployError::ReceiptFailed {
                    tx_hash: format!("{:#x}", tx_hash),
                    reason: reason.clone(),
                }),
            };
        }
        tokio::time::sleep(policy.poll_interval).await;
    }
}
