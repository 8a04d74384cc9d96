mod reconciler;
mod state;
mod tracker;

pub use reconciler::{
    BalanceReconciler, BalanceSnapshot, DEFAULT_POLL_INTERVAL, DEFAULT_TARGET_AMOUNT,
    ReconcileError, ReconciliationTarget,
};
pub use state::FundingState;
pub use tracker::{FundOutcome, FundingTracker};
