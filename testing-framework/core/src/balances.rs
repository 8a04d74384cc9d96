use tracing::debug;

use crate::{
    accounts::{AccountSet, Address},
    chain::{ChainClient, ChainError},
};

/// Addresses of every account in canonical order (primary cohort, then each
/// extension in append order).
pub fn flattened_addresses<C>(chain: &C, accounts: &AccountSet) -> Vec<Address>
where
    C: ChainClient + ?Sized,
{
    accounts
        .private_keys()
        .map(|key| chain.address_from_private_key(key))
        .collect()
}

/// Current on-chain balance of every account, index-aligned with
/// [`flattened_addresses`]. Reads once per address with no waiting or retry.
pub async fn all_balances<C>(chain: &C, accounts: &AccountSet) -> Result<Vec<u128>, ChainError>
where
    C: ChainClient + ?Sized,
{
    let addresses = flattened_addresses(chain, accounts);
    let mut balances = Vec::with_capacity(addresses.len());
    for address in &addresses {
        balances.push(chain.get_balance(address).await?);
    }

    debug!(accounts = balances.len(), "collected balances");
    Ok(balances)
}
