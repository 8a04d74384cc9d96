//! Deterministic test-account provisioning for development chains.
//!
//! Accounts are generated from HD metadata ([`accounts`]), funded from the
//! chain's pre-funded account until every balance of the newest cohort is
//! confirmed ([`funding`]), and rendered for operators ([`report`]).

pub mod accounts;
pub mod balances;
pub mod chain;
pub mod config;
pub mod funding;
pub mod report;

pub use accounts::{Account, AccountGenerator, AccountSet, Address, Cohort, CohortId, PrivateKey};
pub use balances::{all_balances, flattened_addresses};
pub use chain::{ChainClient, ChainError, Denomination, HttpChainClient, SendReceipt};
pub use config::SparkConfig;
pub use funding::{
    BalanceReconciler, BalanceSnapshot, FundingTracker, ReconcileError, ReconciliationTarget,
};
pub use report::{AddressFormat, Reporter};
