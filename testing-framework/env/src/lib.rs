use std::{env, path::PathBuf};

#[must_use]
pub fn spark_config_path() -> Option<PathBuf> {
    env::var("SPARK_CONFIG").ok().map(PathBuf::from)
}

#[must_use]
pub fn spark_node_url() -> Option<String> {
    env::var("SPARK_NODE_URL").ok()
}

#[must_use]
pub fn spark_accounts() -> Option<String> {
    env::var("SPARK_ACCOUNTS").ok()
}

#[must_use]
pub fn spark_add_accounts() -> Option<String> {
    env::var("SPARK_ADD_ACCOUNTS").ok()
}

#[must_use]
pub fn spark_default_balance() -> Option<String> {
    env::var("SPARK_DEFAULT_BALANCE").ok()
}

#[must_use]
pub fn spark_mnemonic() -> Option<String> {
    env::var("SPARK_MNEMONIC").ok()
}

#[must_use]
pub fn spark_hd_path() -> Option<String> {
    env::var("SPARK_HD_PATH").ok()
}

#[must_use]
pub fn spark_funder_private_key() -> Option<String> {
    env::var("SPARK_FUNDER_PRIVATE_KEY").ok()
}

#[must_use]
pub fn spark_symbol() -> Option<String> {
    env::var("SPARK_SYMBOL").ok()
}

#[must_use]
pub fn spark_decimals() -> Option<String> {
    env::var("SPARK_DECIMALS").ok()
}

#[must_use]
pub fn spark_poll_interval_secs() -> Option<String> {
    env::var("SPARK_POLL_INTERVAL_SECS").ok()
}

#[must_use]
pub fn spark_admin_port() -> Option<String> {
    env::var("SPARK_ADMIN_PORT").ok()
}
