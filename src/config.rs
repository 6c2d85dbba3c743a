use std::{path::PathBuf, time::Duration};

use starknet::{core::types::Felt, signers::SigningKey};
use url::Url;

use crate::{
    command::Cli,
    error::DeployError,
    object::{Credentials, Network},
};

/// How long and how often to ask the node for a transaction receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolicy {
    pub poll_interval: Duration,
    /// `None` waits until the node answers, however long that takes
    pub timeout: Option<Duration>,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(300)),
        }
    }
}

/// Everything one deployment run needs, validated up front
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub credentials: Credentials,
    pub network: Network,
    pub rpc_url: Url,
    pub sierra_path: PathBuf,
    pub casm_path: PathBuf,
    pub report_path: PathBuf,
    pub history_path: Option<PathBuf>,
    pub salt: Option<Felt>,
    pub receipt: ReceiptPolicy,
    pub verify_declared_class: bool,
}

impl DeployConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, DeployError> {
        let credentials = load_credentials(
            cli.account_address.as_deref(),
            cli.private_key.as_deref(),
            cli.public_key.as_deref(),
        )?;
        let network: Network = cli.network.try_into()?;
        let rpc_url = match non_empty(cli.rpc_url.as_deref()) {
            Some(url) => url.parse().map_err(|e: url::ParseError| DeployError::ConfigInvalid {
                name: "RPC_URL",
                reason: e.to_string(),
            })?,
            None => network.default_rpc_url()?,
        };
        let salt = non_empty(cli.salt.as_deref())
            .map(|salt| parse_felt("DEPLOY_SALT", salt))
            .transpose()?;
        if cli.poll_interval_ms == 0 {
            return Err(DeployError::ConfigInvalid {
                name: "RECEIPT_POLL_INTERVAL_MS",
                reason: "must be greater than zero".into(),
            });
        }
        let timeout = match cli.receipt_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(Self {
            credentials,
            network,
            rpc_url,
            sierra_path: cli.sierra_path,
            casm_path: cli.casm_path,
            report_path: cli.report_path,
            history_path: cli.history,
            salt,
            receipt: ReceiptPolicy {
                poll_interval: Duration::from_millis(cli.poll_interval_ms),
                timeout,
            },
            verify_declared_class: !cli.skip_class_verification,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Check the three deployer values before anything touches the network.
/// Every missing variable is reported at once.
pub fn load_credentials(
    account_address: Option<&str>,
    private_key: Option<&str>,
    public_key: Option<&str>,
) -> Result<Credentials, DeployError> {
    let account_address = non_empty(account_address);
    let private_key = non_empty(private_key);
    let public_key = non_empty(public_key);
    let missing: Vec<&'static str> = [
        ("STARKNET_DEPLOYER_ADDRESS", account_address.is_none()),
        ("STARKNET_DEPLOYER_PRIVATE_KEY", private_key.is_none()),
        ("STARKNET_DEPLOYER_PUBLIC_KEY", public_key.is_none()),
    ]
    .into_iter()
    .filter_map(|(name, absent)| absent.then_some(name))
    .collect();
    let (Some(account_address), Some(private_key), Some(public_key)) =
        (account_address, private_key, public_key)
    else {
        return Err(DeployError::ConfigMissing(missing));
    };

    let account_address = parse_felt("STARKNET_DEPLOYER_ADDRESS", account_address)?;
    let private_key = parse_felt("STARKNET_DEPLOYER_PRIVATE_KEY", private_key)?;
    let public_key = parse_felt("STARKNET_DEPLOYER_PUBLIC_KEY", public_key)?;

    let derived = SigningKey::from_secret_scalar(private_key)
        .verifying_key()
        .scalar();
    if derived != public_key {
        return Err(DeployError::ConfigInvalid {
            name: "STARKNET_DEPLOYER_PUBLIC_KEY",
            reason: "does not match the private key".into(),
        });
    }
    Ok(Credentials {
        account_address,
        public_key,
        private_key,
    })
}

/// Accepts `0x` prefixed hex or plain decimal
pub fn parse_felt(name: &'static str, value: &str) -> Result<Felt, DeployError> {
    let parsed = if value.starts_with("0x") || value.starts_with("0X") {
        Felt::from_hex(value).map_err(|e| e.to_string())
    } else {
        Felt::from_dec_str(value).map_err(|e| e.to_string())
    };
    parsed.map_err(|reason| DeployError::ConfigInvalid { name, reason })
}
