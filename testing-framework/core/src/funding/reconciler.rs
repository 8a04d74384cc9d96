use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info};

use super::{FundOutcome, FundingState, FundingTracker};
use crate::{
    accounts::{AccountSet, Address},
    chain::{ChainClient, ChainError},
};

/// Funding amount, in display units, when none is configured.
pub const DEFAULT_TARGET_AMOUNT: u64 = 10_000;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Who pays and how much each account receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconciliationTarget {
    pub default_address: Address,
    /// Display units; converted through the chain client before sending.
    pub target_amount: u64,
}

impl ReconciliationTarget {
    /// A zero amount falls back to [`DEFAULT_TARGET_AMOUNT`].
    #[must_use]
    pub const fn new(default_address: Address, target_amount: u64) -> Self {
        Self {
            default_address,
            target_amount,
        }
        .normalized()
    }

    /// Target funded by the chain's default key, falling back to
    /// [`DEFAULT_TARGET_AMOUNT`] when unset or zero.
    #[must_use]
    pub fn for_chain<C>(chain: &C, target_amount: Option<u64>) -> Self
    where
        C: ChainClient + ?Sized,
    {
        Self::new(
            chain.default_address(),
            target_amount.unwrap_or(DEFAULT_TARGET_AMOUNT),
        )
    }

    /// Amount actually sent; never zero.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        if self.target_amount == 0 {
            DEFAULT_TARGET_AMOUNT
        } else {
            self.target_amount
        }
    }

    const fn normalized(mut self) -> Self {
        self.target_amount = self.amount();
        self
    }
}

/// Confirmed balances of the active cohort, in cohort order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceSnapshot {
    balances: Vec<u128>,
    rounds: usize,
}

impl BalanceSnapshot {
    #[must_use]
    pub fn balances(&self) -> &[u128] {
        &self.balances
    }

    #[must_use]
    pub fn into_balances(self) -> Vec<u128> {
        self.balances
    }

    /// Number of funding/polling passes it took to settle.
    #[must_use]
    pub const fn rounds(&self) -> usize {
        self.rounds
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

struct TrackedAccount {
    address: Address,
    state: FundingState,
}

/// Drives the active cohort of an [`AccountSet`] to confirmed, nonzero
/// balances.
///
/// One chain call is outstanding at a time. Rounds repeat every poll interval
/// until every account is confirmed; there is no overall timeout and no
/// cancellation. Any chain error aborts the whole reconciliation.
pub struct BalanceReconciler<C: ?Sized> {
    chain: Arc<C>,
    tracker: FundingTracker,
    poll_interval: Duration,
}

impl<C> BalanceReconciler<C>
where
    C: ChainClient + ?Sized,
{
    #[must_use]
    pub fn new(chain: Arc<C>, tracker: FundingTracker) -> Self {
        Self {
            chain,
            tracker,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub const fn tracker(&self) -> &FundingTracker {
        &self.tracker
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub async fn reconcile(
        &self,
        accounts: &AccountSet,
        target: &ReconciliationTarget,
    ) -> Result<BalanceSnapshot, ReconcileError> {
        let cohort = accounts.active_cohort();
        let mut ledger = cohort
            .private_keys()
            .map(|key| {
                let address = self.chain.address_from_private_key(key);
                TrackedAccount {
                    address,
                    state: FundingState::initial(address == target.default_address),
                }
            })
            .collect::<Vec<_>>();

        let display_amount = target.amount();
        let amount = self.chain.to_base_units(display_amount);
        info!(
            cohort = ?accounts.active_cohort_id(),
            accounts = ledger.len(),
            amount = display_amount,
            "loading the accounts and waiting for the node to mine the transactions"
        );

        let mut rounds = 0;
        loop {
            rounds += 1;
            info!(round = rounds, "waiting for receipts");

            for account in &mut ledger {
                self.advance(account, display_amount, amount).await?;
            }

            let ready = ledger
                .iter()
                .filter(|account| account.state.is_confirmed())
                .count();
            if ready == ledger.len() {
                break;
            }

            debug!(
                round = rounds,
                ready,
                pending = ledger.len() - ready,
                poll_ms = self.poll_interval.as_millis(),
                "cohort not settled yet"
            );
            sleep(self.poll_interval).await;
        }

        info!(rounds, accounts = ledger.len(), "accounts funded");

        let balances = ledger
            .iter()
            .map(|account| account.state.balance().unwrap_or_default())
            .collect();
        Ok(BalanceSnapshot { balances, rounds })
    }

    async fn advance(
        &self,
        account: &mut TrackedAccount,
        display_amount: u64,
        amount: u128,
    ) -> Result<(), ChainError> {
        if account.state == FundingState::Unfunded {
            let address = account.address;
            let outcome = self
                .tracker
                .fund_once(&address, || self.chain.send_transaction(&address, amount))
                .await?;

            match outcome {
                FundOutcome::Sent(receipt) => {
                    info!(
                        amount = display_amount,
                        symbol = %self.chain.denomination().symbol,
                        %address,
                        txid = receipt.txid.as_deref().unwrap_or_default(),
                        "sending funds"
                    );
                    account.state = FundingState::FundingSent;
                    return Ok(());
                }
                FundOutcome::Rejected => {
                    debug!(%address, "funding transfer not accepted; retrying next round");
                    return Ok(());
                }
                FundOutcome::AlreadyFunded => {
                    debug!(%address, "address already funded in this process");
                    account.state = FundingState::FundingSent;
                }
            }
        }

        if account.state == FundingState::FundingSent {
            let balance = self.chain.get_balance(&account.address).await?;
            account.state = account.state.observe(balance);
            if let Some(balance) = account.state.balance() {
                debug!(address = %account.address, balance, "balance confirmed");
            }
        }

        Ok(())
    }
}
