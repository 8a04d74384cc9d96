use std::{collections::BTreeSet, future::Future, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    accounts::Address,
    chain::{ChainError, SendReceipt},
};

/// Outcome of a guarded funding attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FundOutcome {
    /// The address was already marked; nothing was sent.
    AlreadyFunded,
    /// The node accepted the transfer and the address is now marked.
    Sent(SendReceipt),
    /// The node answered with a falsy result; the address stays unmarked.
    Rejected,
}

/// Addresses that have been sent a funding transfer during this process.
///
/// Entries are never evicted. Clones share the same underlying set.
#[derive(Clone, Debug, Default)]
pub struct FundingTracker {
    funded: Arc<Mutex<BTreeSet<Address>>>,
}

impl FundingTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_funded(&self, address: &Address) -> bool {
        self.funded.lock().await.contains(address)
    }

    /// Returns `true` when the address was not marked before.
    pub async fn mark_funded(&self, address: Address) -> bool {
        self.funded.lock().await.insert(address)
    }

    pub async fn len(&self) -> usize {
        self.funded.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.funded.lock().await.is_empty()
    }

    pub async fn funded_addresses(&self) -> Vec<Address> {
        self.funded.lock().await.iter().copied().collect()
    }

    /// Runs `send` unless `address` is already marked, marking it on an
    /// accepted receipt.
    ///
    /// The check, the submission and the mark happen under one lock, so two
    /// concurrent reconciliations never both fund the same address.
    pub async fn fund_once<F, Fut>(
        &self,
        address: &Address,
        send: F,
    ) -> Result<FundOutcome, ChainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SendReceipt, ChainError>>,
    {
        let mut funded = self.funded.lock().await;
        if funded.contains(address) {
            return Ok(FundOutcome::AlreadyFunded);
        }

        let receipt = send().await?;
        if !receipt.result {
            return Ok(FundOutcome::Rejected);
        }

        funded.insert(*address);
        Ok(FundOutcome::Sent(receipt))
    }
}
