use std::{collections::HashMap, sync::Arc};

use spark_core::{
    AccountSet, AddressFormat, BalanceReconciler, BalanceSnapshot, ChainClient, FundingTracker,
    HttpChainClient, ReconciliationTarget, Reporter, SparkConfig, all_balances,
    config::ConfigError,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::AdminError;

/// Builds the chain client for a configuration. Called again whenever the
/// node, funder or denomination settings change.
pub type ChainFactory =
    Arc<dyn Fn(&SparkConfig) -> Result<Arc<dyn ChainClient>, ConfigError> + Send + Sync>;

/// Connects to `config.node_url` over HTTP.
pub fn connect_http(config: &SparkConfig) -> Result<Arc<dyn ChainClient>, ConfigError> {
    Ok(Arc::new(HttpChainClient::from_config(config)?))
}

fn same_chain(current: &SparkConfig, next: &SparkConfig) -> bool {
    current.node_url == next.node_url
        && current.funder_key() == next.funder_key()
        && current.denomination() == next.denomination()
}

struct Live {
    config: SparkConfig,
    chain: Arc<dyn ChainClient>,
}

/// Process-wide admin state.
///
/// Holds the single current [`AccountSet`], the live configuration with the
/// chain client built from it, and the one [`FundingTracker`] shared by
/// every request.
pub struct AdminState {
    connect: ChainFactory,
    tracker: FundingTracker,
    live: RwLock<Live>,
    accounts: RwLock<Option<AccountSet>>,
}

impl AdminState {
    pub fn new(config: SparkConfig, connect: ChainFactory) -> Result<Self, AdminError> {
        let chain = connect(&config)?;
        Ok(Self {
            connect,
            tracker: FundingTracker::new(),
            live: RwLock::new(Live { config, chain }),
            accounts: RwLock::new(None),
        })
    }

    /// State backed by [`HttpChainClient`].
    pub fn http(config: SparkConfig) -> Result<Self, AdminError> {
        Self::new(config, Arc::new(connect_http))
    }

    pub async fn chain(&self) -> Arc<dyn ChainClient> {
        Arc::clone(&self.live.read().await.chain)
    }

    #[must_use]
    pub const fn tracker(&self) -> &FundingTracker {
        &self.tracker
    }

    pub async fn config(&self) -> SparkConfig {
        self.live.read().await.config.clone()
    }

    async fn snapshot(&self) -> (SparkConfig, Arc<dyn ChainClient>) {
        let live = self.live.read().await;
        (live.config.clone(), Arc::clone(&live.chain))
    }

    /// Current account set, or [`AdminError::NotGenerated`] before the first
    /// generation.
    pub async fn current_accounts(&self) -> Result<AccountSet, AdminError> {
        self.accounts
            .read()
            .await
            .clone()
            .ok_or(AdminError::NotGenerated)
    }

    /// Merges overrides into the live configuration and reconnects when the
    /// chain settings changed. Nothing is applied when any recognised value
    /// is invalid or the new chain client cannot be built.
    pub async fn update_config(
        &self,
        overrides: &HashMap<String, String>,
    ) -> Result<SparkConfig, AdminError> {
        let mut live = self.live.write().await;
        let updated = with_overrides(live.config.clone(), overrides)?;
        if !same_chain(&live.config, &updated) {
            live.chain = (self.connect)(&updated)?;
            info!(
                node = %updated.node_url,
                funder = %live.chain.default_address(),
                "chain client rebuilt"
            );
        }
        live.config = updated.clone();
        Ok(updated)
    }

    /// Replaces the current set with a fresh primary cohort and funds it.
    pub async fn generate_accounts(&self) -> Result<AccountSet, AdminError> {
        let (config, chain) = self.snapshot().await;
        let accounts = config.account_generator().generate(config.accounts)?;
        *self.accounts.write().await = Some(accounts.clone());
        self.fund_active_cohort(&accounts, &config, chain).await?;
        Ok(accounts)
    }

    /// Appends an extension cohort sized by the request's view of the config
    /// and funds it. Generates a fresh set when none exists.
    pub async fn extend_accounts(
        &self,
        overrides: &HashMap<String, String>,
    ) -> Result<AccountSet, AdminError> {
        let (live_config, live_chain) = self.snapshot().await;
        let config = with_overrides(live_config.clone(), overrides)?;
        let chain = if same_chain(&live_config, &config) {
            live_chain
        } else {
            (self.connect)(&config)?
        };
        let count = config.extension_size();

        let accounts = {
            let mut current = self.accounts.write().await;
            match current.as_mut() {
                Some(accounts) => {
                    config.account_generator().extend(accounts, count)?;
                    accounts.clone()
                }
                None => {
                    info!("no account set yet; generating a fresh one");
                    let accounts = config.account_generator().generate(count)?;
                    *current = Some(accounts.clone());
                    accounts
                }
            }
        };

        self.fund_active_cohort(&accounts, &config, chain).await?;
        Ok(accounts)
    }

    /// Reads every balance of `accounts` and renders the operator report.
    pub async fn render_report(
        &self,
        accounts: &AccountSet,
        format: AddressFormat,
    ) -> Result<String, AdminError> {
        let chain = self.chain().await;
        let balances = all_balances(chain.as_ref(), accounts).await?;
        Ok(Reporter::new(chain.as_ref()).render_text(accounts, &balances, format)?)
    }

    async fn fund_active_cohort(
        &self,
        accounts: &AccountSet,
        config: &SparkConfig,
        chain: Arc<dyn ChainClient>,
    ) -> Result<BalanceSnapshot, AdminError> {
        let target = ReconciliationTarget::for_chain(chain.as_ref(), Some(config.default_balance));
        let reconciler = BalanceReconciler::new(chain, self.tracker.clone())
            .with_poll_interval(config.poll_interval());
        Ok(reconciler.reconcile(accounts, &target).await?)
    }
}

fn with_overrides(
    mut config: SparkConfig,
    overrides: &HashMap<String, String>,
) -> Result<SparkConfig, AdminError> {
    let applied = config.apply_overrides(
        overrides
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str())),
    )?;
    debug!(applied, "config overrides applied");
    Ok(config)
}
