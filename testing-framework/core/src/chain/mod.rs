mod http;
mod units;

use async_trait::async_trait;
pub use http::{GET_BALANCE, HttpChainClient, SEND_TRANSACTION};
use serde::{Deserialize, Serialize};
use sha3::{Digest as _, Keccak256};
use thiserror::Error;
pub use units::{DEFAULT_DECIMALS, DEFAULT_SYMBOL, Denomination, MAX_DECIMALS};

use crate::accounts::{Address, PrivateKey};

#[derive(Debug, Error)]
pub enum ChainError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("chain node answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("chain client unavailable: {message}")]
    Unavailable { message: String },
}

/// Result of a transfer submission. A `false` result means the node did not
/// accept the transfer yet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub result: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
}

impl SendReceipt {
    #[must_use]
    pub const fn accepted() -> Self {
        Self {
            result: true,
            txid: None,
        }
    }

    #[must_use]
    pub const fn rejected() -> Self {
        Self {
            result: false,
            txid: None,
        }
    }
}

/// Narrow view of a development chain: address derivation, balance reads and
/// transfers signed by the well-known funder key.
///
/// Only `get_balance` and `send_transaction` suspend; everything else is
/// local and deterministic.
#[async_trait]
pub trait ChainClient: Send + Sync {
    fn address_from_private_key(&self, key: &PrivateKey) -> Address;

    /// Key of the pre-funded account that pays for every funding transfer.
    fn default_private_key(&self) -> &PrivateKey;

    fn denomination(&self) -> &Denomination;

    async fn get_balance(&self, address: &Address) -> Result<u128, ChainError>;

    /// Transfers `amount` base units from the funder to `to`.
    async fn send_transaction(&self, to: &Address, amount: u128)
    -> Result<SendReceipt, ChainError>;

    fn default_address(&self) -> Address {
        self.address_from_private_key(self.default_private_key())
    }

    fn to_base_units(&self, display_amount: u64) -> u128 {
        self.denomination().to_base_units(display_amount)
    }

    fn from_base_units(&self, amount: u128) -> String {
        self.denomination().from_base_units(amount)
    }

    fn address_to_hex(&self, address: &Address) -> String {
        address.to_hex()
    }
}

/// Address scheme of the development chain: the last 20 bytes of the
/// Keccak-256 digest of the key material.
#[must_use]
pub fn derive_address(key: &PrivateKey) -> Address {
    let digest = Keccak256::digest(key.key_bytes());

    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::from_bytes(bytes)
}
