//! Calls into the Universal Deployer Contract and the address it will assign.

use starknet::{
    core::{
        types::{Call, Felt},
        utils::{get_udc_deployed_address, UdcUniqueSettings, UdcUniqueness},
    },
    macros::{felt, selector},
};

/// The legacy (Cairo 0) UDC, deployed at the same address on every public network
pub const UDC_ADDRESS: Felt =
    felt!("0x041a78e741e5af2fec34b695679bc6891742439f7afb8484ecd7766661ad02bf");
pub const UDC_DEPLOY_SELECTOR: Felt = selector!("deployContract");

/// Build a unique `deployContract` call, the deployer address is mixed into the salt
pub fn udc_deploy_call(class_hash: Felt, salt: Felt, constructor_calldata: &[Felt]) -> Call {
    let calldata = [
        vec![
            class_hash,
            salt,
            Felt::ONE,
            Felt::from(constructor_calldata.len()),
        ],
        constructor_calldata.to_vec(),
    ]
    .concat();
    Call {
        to: UDC_ADDRESS,
        selector: UDC_DEPLOY_SELECTOR,
        calldata,
    }
}

/// Address the network assigns to a unique deployment made by `caller` through `udc_address`
pub fn udc_deployed_address(
    class_hash: Felt,
    salt: Felt,
    constructor_calldata: &[Felt],
    udc_address: Felt,
    caller: Felt,
) -> Felt {
    get_udc_deployed_address(
        salt,
        class_hash,
        &UdcUniqueness::Unique(UdcUniqueSettings {
            deployer_address: caller,
            udc_contract_address: udc_address,
        }),
        constructor_calldata,
    )
}

/// A fresh salt below 2^248, so it is always a valid felt
pub fn random_salt() -> Felt {
    Felt::from_bytes_be_slice(&rand::random::<[u8; 31]>())
}
