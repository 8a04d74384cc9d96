use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    accounts::{AccountGenerator, DEFAULT_HD_PATH, DEFAULT_MNEMONIC, PrivateKey, derive_private_key},
    chain::{DEFAULT_DECIMALS, DEFAULT_SYMBOL, Denomination, MAX_DECIMALS},
    funding::{DEFAULT_POLL_INTERVAL, DEFAULT_TARGET_AMOUNT},
};

pub const DEFAULT_NODE_URL: &str = "http://127.0.0.1:8090";
pub const DEFAULT_ACCOUNTS: usize = 10;
pub const DEFAULT_ADMIN_PORT: u16 = 9090;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value `{value}` for `{key}`: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Runtime settings. Sources apply in order: defaults, YAML file, `SPARK_*`
/// environment variables, then per-request overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SparkConfig {
    pub node_url: String,
    /// Size of the primary cohort on a fresh generation.
    pub accounts: usize,
    /// Size of a temporary extension cohort; defaults to `accounts`.
    pub add_accounts: Option<usize>,
    /// Funding amount per account, in display units.
    pub default_balance: u64,
    pub mnemonic: String,
    pub hd_path: String,
    /// Funder key; the mnemonic's first account when unset.
    pub funder_private_key: Option<PrivateKey>,
    pub symbol: String,
    pub decimals: u32,
    pub poll_interval_secs: u64,
    pub admin_port: u16,
}

impl Default for SparkConfig {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.to_owned(),
            accounts: DEFAULT_ACCOUNTS,
            add_accounts: None,
            default_balance: DEFAULT_TARGET_AMOUNT,
            mnemonic: DEFAULT_MNEMONIC.to_owned(),
            hd_path: DEFAULT_HD_PATH.to_owned(),
            funder_private_key: None,
            symbol: DEFAULT_SYMBOL.to_owned(),
            decimals: DEFAULT_DECIMALS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            admin_port: DEFAULT_ADMIN_PORT,
        }
    }
}

type EnvReader = fn() -> Option<String>;

const ENV_KEYS: &[(&str, EnvReader)] = &[
    ("nodeUrl", spark_env::spark_node_url),
    ("accounts", spark_env::spark_accounts),
    ("addAccounts", spark_env::spark_add_accounts),
    ("defaultBalance", spark_env::spark_default_balance),
    ("mnemonic", spark_env::spark_mnemonic),
    ("hdPath", spark_env::spark_hd_path),
    ("funderPrivateKey", spark_env::spark_funder_private_key),
    ("symbol", spark_env::spark_symbol),
    ("decimals", spark_env::spark_decimals),
    ("pollIntervalSecs", spark_env::spark_poll_interval_secs),
    ("adminPort", spark_env::spark_admin_port),
];

impl SparkConfig {
    /// Defaults, then the optional file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would stall or corrupt funding: empty cohorts, a
    /// zero funding amount, or a denomination wider than `u128`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("accounts", self.accounts)?;
        if let Some(add_accounts) = self.add_accounts {
            ensure_positive("addAccounts", add_accounts)?;
        }
        ensure_positive("defaultBalance", self.default_balance)?;
        ensure_decimals("decimals", self.decimals)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        for (key, read) in ENV_KEYS {
            if let Some(value) = read() {
                self.set(key, &value)?;
            }
        }
        Ok(())
    }

    /// Applies camelCase key/value overrides, returning how many keys were
    /// recognised. Unknown keys are ignored.
    pub fn apply_overrides<'a, I>(&mut self, overrides: I) -> Result<usize, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut applied = 0;
        for (key, value) in overrides {
            if self.set(key, value)? {
                applied += 1;
            } else {
                debug!(key, "ignoring unknown config key");
            }
        }
        Ok(applied)
    }

    /// Sets one field by its camelCase key. Returns `false` for unknown keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "nodeUrl" => self.node_url = value.to_owned(),
            "accounts" => self.accounts = parse_positive(key, value)?,
            "addAccounts" => self.add_accounts = Some(parse_positive(key, value)?),
            "defaultBalance" => self.default_balance = parse_positive(key, value)?,
            "mnemonic" => self.mnemonic = value.to_owned(),
            "hdPath" => self.hd_path = value.to_owned(),
            "funderPrivateKey" => self.funder_private_key = Some(PrivateKey::new(value)),
            "symbol" => self.symbol = value.to_owned(),
            "decimals" => {
                let decimals = parse(key, value)?;
                ensure_decimals(key, decimals)?;
                self.decimals = decimals;
            }
            "pollIntervalSecs" => self.poll_interval_secs = parse(key, value)?,
            "adminPort" => self.admin_port = parse(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    #[must_use]
    pub fn denomination(&self) -> Denomination {
        Denomination::new(&self.symbol, self.decimals)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn extension_size(&self) -> usize {
        self.add_accounts.unwrap_or(self.accounts)
    }

    #[must_use]
    pub fn funder_key(&self) -> PrivateKey {
        self.funder_private_key
            .clone()
            .unwrap_or_else(|| derive_private_key(&self.mnemonic, &self.hd_path, 0))
    }

    #[must_use]
    pub fn account_generator(&self) -> AccountGenerator {
        AccountGenerator::new(&self.mnemonic, &self.hd_path)
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|err: T::Err| ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
        reason: err.to_string(),
    })
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq + Display,
    T::Err: Display,
{
    let parsed = parse(key, value)?;
    ensure_positive(key, parsed)
}

fn ensure_positive<T>(key: &str, value: T) -> Result<T, ConfigError>
where
    T: Default + PartialEq + Display,
{
    if value == T::default() {
        return Err(ConfigError::InvalidValue {
            key: key.to_owned(),
            value: value.to_string(),
            reason: "must be at least 1".to_owned(),
        });
    }
    Ok(value)
}

fn ensure_decimals(key: &str, decimals: u32) -> Result<(), ConfigError> {
    if decimals > MAX_DECIMALS {
        return Err(ConfigError::InvalidValue {
            key: key.to_owned(),
            value: decimals.to_string(),
            reason: format!("at most {MAX_DECIMALS} decimals are supported"),
        });
    }
    Ok(())
}
