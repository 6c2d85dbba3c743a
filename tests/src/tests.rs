#![cfg(test)]

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use permit2_deployer::{
    address::{UDC_ADDRESS, UDC_DEPLOY_SELECTOR},
    artifact::load_artifacts,
    chain::{classify_declare_message, DeclareOutcome, ExecutionOutcome, ReceiptInfo},
    deploy_contract, interruptible,
    object::{ContractArtifacts, Credentials},
    run_deployment, Chain, ChainError, DeployConfig, DeployError, Network, ReceiptPolicy,
};
use starknet::core::types::{Call, Felt};

const DECLARE_TX: Felt = Felt::from_hex_unchecked("0xdec1");
const DEPLOY_TX: Felt = Felt::from_hex_unchecked("0xde91");
const DEPLOYER: Felt = Felt::from_hex_unchecked("0xabc");
const SERVICE_CLASS_HASH: Felt = Felt::from_hex_unchecked("0x123");
// unique UDC deployment of class 0x123 with salt 0x1 by 0xabc
const EXPECTED_ADDRESS: &str = "0xd11cf07d320c5ea4163876859d2293075e73e4cfa6c1c7e3d3f89ff2368391";

enum DeclareBehavior {
    Succeed,
    Fail(ChainError),
}

struct FakeChain {
    declare: DeclareBehavior,
    known_classes: Vec<Felt>,
    deploy_revert: Option<String>,
    stall_execute: bool,
    declare_attempts: AtomicUsize,
    calls: Mutex<Vec<Call>>,
}

impl FakeChain {
    fn new(declare: DeclareBehavior) -> Self {
        Self {
            declare,
            known_classes: Vec::new(),
            deploy_revert: None,
            stall_execute: false,
            declare_attempts: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn executed(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Chain for FakeChain {
    fn account_address(&self) -> Felt {
        DEPLOYER
    }

    async fn declare(&self, _: &ContractArtifacts) -> Result<DeclareOutcome, ChainError> {
        self.declare_attempts.fetch_add(1, Ordering::SeqCst);
        match &self.declare {
            DeclareBehavior::Succeed => Ok(DeclareOutcome {
                transaction_hash: DECLARE_TX,
                class_hash: SERVICE_CLASS_HASH,
            }),
            DeclareBehavior::Fail(err) => Err(err.clone()),
        }
    }

    async fn execute(&self, call: Call) -> Result<Felt, ChainError> {
        self.calls.lock().unwrap().push(call);
        if self.stall_execute {
            std::future::pending::<()>().await;
        }
        Ok(DEPLOY_TX)
    }

    async fn transaction_receipt(&self, tx_hash: Felt) -> Result<Option<ReceiptInfo>, ChainError> {
        let execution = match (&self.deploy_revert, tx_hash == DEPLOY_TX) {
            (Some(reason), true) => ExecutionOutcome::Reverted(reason.clone()),
            _ => ExecutionOutcome::Succeeded,
        };
        Ok(Some(ReceiptInfo {
            execution,
            finality: "AcceptedOnL2".into(),
        }))
    }

    async fn is_class_declared(&self, class_hash: Felt) -> Result<bool, ChainError> {
        Ok(self.known_classes.contains(&class_hash))
    }
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

fn local_class_hash() -> Felt {
    let artifacts = load_artifacts(
        &fixture("permit2_Permit2.contract_class.json"),
        &fixture("permit2_Permit2.compiled_contract_class.json"),
    )
    .unwrap();
    artifacts.sierra_class.class_hash().unwrap()
}

fn config(dir: &Path) -> DeployConfig {
    DeployConfig {
        credentials: Credentials {
            account_address: DEPLOYER,
            public_key: Felt::TWO,
            private_key: Felt::ONE,
        },
        network: Network::Sepolia,
        rpc_url: "http://localhost:5050".parse().unwrap(),
        sierra_path: fixture("permit2_Permit2.contract_class.json"),
        casm_path: fixture("permit2_Permit2.compiled_contract_class.json"),
        report_path: dir.join("LATEST_DEPLOYMENT.md"),
        history_path: None,
        salt: Some(Felt::ONE),
        receipt: ReceiptPolicy {
            poll_interval: Duration::from_millis(10),
            timeout: Some(Duration::from_secs(5)),
        },
        verify_declared_class: true,
    }
}

#[tokio::test]
async fn test_fresh_declare_and_deploy() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let chain = FakeChain::new(DeclareBehavior::Succeed);

    let result = run_deployment(&chain, &config).await.unwrap();
    assert_eq!(result.class_hash, "0x123");
    assert_eq!(result.deployed_address, EXPECTED_ADDRESS);
    assert_eq!(result.transaction_hash, format!("{:#x}", DEPLOY_TX));

    let calls = chain.executed();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].to, UDC_ADDRESS);
    assert_eq!(calls[0].selector, UDC_DEPLOY_SELECTOR);
    assert_eq!(
        calls[0].calldata,
        vec![SERVICE_CLASS_HASH, Felt::ONE, Felt::ONE, Felt::ZERO]
    );

    let report = std::fs::read_to_string(&config.report_path).unwrap();
    assert!(report.contains(&format!("- **Deployed Contract Address**: {EXPECTED_ADDRESS}")));
    assert!(report.contains("- **Deployer Contract Address**: 0xabc"));
    assert!(report.contains(&format!("- **Deployment Time**: {}", result.rfc3339_time())));
}

#[tokio::test]
async fn test_already_declared_reuses_local_class_hash() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let mut chain = FakeChain::new(DeclareBehavior::Fail(ChainError::ClassAlreadyDeclared));
    chain.known_classes.push(local_class_hash());

    let result = run_deployment(&chain, &config).await.unwrap();
    assert_eq!(result.class_hash, format!("{:#x}", local_class_hash()));
    assert_eq!(chain.executed()[0].calldata[0], local_class_hash());
}

#[tokio::test]
async fn test_already_declared_detected_from_message() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let declare_error =
        classify_declare_message("Class with hash 0x5 is already declared.".to_string());
    let mut chain = FakeChain::new(DeclareBehavior::Fail(declare_error));
    chain.known_classes.push(local_class_hash());

    let result = run_deployment(&chain, &config).await.unwrap();
    assert_eq!(result.class_hash, format!("{:#x}", local_class_hash()));
}

#[tokio::test]
async fn test_already_declared_class_must_exist_on_chain() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    let chain = FakeChain::new(DeclareBehavior::Fail(ChainError::ClassAlreadyDeclared));

    let err = run_deployment(&chain, &config).await.unwrap_err();
    assert!(matches!(err, DeployError::DeclaredClassNotFound { .. }));
    assert!(chain.executed().is_empty());

    config.verify_declared_class = false;
    let result = run_deployment(&chain, &config).await.unwrap();
    assert_eq!(result.class_hash, format!("{:#x}", local_class_hash()));
}

#[tokio::test]
async fn test_declare_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let chain = FakeChain::new(DeclareBehavior::Fail(ChainError::Rejected(
        "insufficient max fee".into(),
    )));

    let err = run_deployment(&chain, &config).await.unwrap_err();
    match &err {
        DeployError::DeclareFailed(message) => assert!(message.contains("insufficient max fee")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), 2);
    assert!(chain.executed().is_empty());
    assert!(!config.report_path.exists());
}

#[tokio::test]
async fn test_missing_artifact_stops_before_declare() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.casm_path = dir.path().join("missing.json");
    let chain = FakeChain::new(DeclareBehavior::Succeed);

    let err = run_deployment(&chain, &config).await.unwrap_err();
    assert!(err.to_string().starts_with("casm contract file not found"));
    assert_eq!(chain.declare_attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_report_failure_keeps_run_successful() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.report_path = dir.path().join("no-such-dir").join("LATEST_DEPLOYMENT.md");
    let chain = FakeChain::new(DeclareBehavior::Succeed);

    let result = run_deployment(&chain, &config).await.unwrap();
    assert_eq!(result.deployed_address, EXPECTED_ADDRESS);
    assert!(!config.report_path.exists());
}

#[tokio::test]
async fn test_reverted_deployment_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let mut chain = FakeChain::new(DeclareBehavior::Succeed);
    chain.deploy_revert = Some("UDC: class not declared".into());

    let err = run_deployment(&chain, &config).await.unwrap_err();
    match err {
        DeployError::ReceiptFailed { tx_hash, reason } => {
            assert_eq!(tx_hash, format!("{:#x}", DEPLOY_TX));
            assert_eq!(reason, "UDC: class not declared");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!config.report_path.exists());
}

#[tokio::test]
async fn test_invalid_class_hash() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let chain = FakeChain::new(DeclareBehavior::Succeed);

    let err = deploy_contract(&chain, "not-a-hash", &config).await.unwrap_err();
    assert!(matches!(err, DeployError::InvalidClassHash { .. }));
    assert!(chain.executed().is_empty());
}

#[tokio::test]
async fn test_class_hash_requires_hex_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let chain = FakeChain::new(DeclareBehavior::Succeed);

    let err = deploy_contract(&chain, "123", &config).await.unwrap_err();
    match err {
        DeployError::InvalidClassHash { value, .. } => assert_eq!(value, "123"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(chain.executed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_during_deploy_submission() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let mut chain = FakeChain::new(DeclareBehavior::Succeed);
    chain.stall_execute = true;

    // the declare receipt wait is already over when the interrupt arrives
    let interrupt = tokio::time::sleep(Duration::from_secs(60));
    let err = interruptible(run_deployment(&chain, &config), interrupt)
        .await
        .unwrap_err();
    assert!(matches!(err, DeployError::Interrupted));
    assert_eq!(err.exit_code(), 130);
    assert_eq!(chain.executed().len(), 1);
    assert!(!config.report_path.exists());
}

#[tokio::test]
async fn test_uninterrupted_run_completes() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let chain = FakeChain::new(DeclareBehavior::Succeed);

    let result = interruptible(run_deployment(&chain, &config), std::future::pending())
        .await
        .unwrap();
    assert_eq!(result.deployed_address, EXPECTED_ADDRESS);
}

#[tokio::test]
async fn test_random_salt_changes_address() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.salt = None;
    let chain = FakeChain::new(DeclareBehavior::Succeed);

    let first = deploy_contract(&chain, "0x123", &config).await.unwrap();
    let second = deploy_contract(&chain, "0x123", &config).await.unwrap();
    assert_ne!(first.salt, second.salt);
    assert_ne!(first.deployed_address, second.deployed_address);
}

#[tokio::test]
async fn test_history_record_is_appended() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    let history = dir.path().join("deployments").join("sepolia.json");
    config.history_path = Some(history.clone());
    let chain = FakeChain::new(DeclareBehavior::Succeed);

    run_deployment(&chain, &config).await.unwrap();
    run_deployment(&chain, &config).await.unwrap();

    let latest = permit2_deployer::load_latest_deployment(&history).unwrap();
    assert_eq!(latest.network, "sepolia");
    assert_eq!(latest.deployed_address, EXPECTED_ADDRESS);
    assert_eq!(latest.salt, "0x1");
    assert!(!latest.already_declared);
}
