mod generation;

use std::{fmt, str::FromStr};

pub use generation::{AccountGenerator, DEFAULT_HD_PATH, DEFAULT_MNEMONIC, derive_private_key};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountsError {
    #[error("an account cohort must contain at least one account")]
    EmptyCohort,
    #[error("hd index space exhausted: cannot derive {requested} accounts after index {next}")]
    IndexOverflow { next: u32, requested: usize },
    #[error("invalid address `{value}`: {reason}")]
    InvalidAddress { value: String, reason: String },
}

/// Hex-encoded secret key of a generated account.
///
/// `Debug` is redacted; `Display` prints the key because the operator report
/// lists it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivateKey(String);

impl PrivateKey {
    #[must_use]
    pub fn new(hex_key: impl Into<String>) -> Self {
        Self(hex_key.into())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(hex::encode(bytes))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw key material. Keys that are not valid hex are used verbatim.
    #[must_use]
    pub fn key_bytes(&self) -> Vec<u8> {
        let trimmed = self.0.trim_start_matches("0x");
        hex::decode(trimmed).unwrap_or_else(|_| self.0.as_bytes().to_vec())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const ADDRESS_LEN: usize = 20;
const HEX_ADDRESS_PREFIX: &str = "41";

/// On-chain account address (20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Network-prefixed hex form used by the node's raw APIs.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{HEX_ADDRESS_PREFIX}{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AccountsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| AccountsError::InvalidAddress {
            value: value.to_owned(),
            reason,
        };

        let digits = match value.strip_prefix("0x") {
            Some(digits) => digits,
            None if value.len() == 2 * ADDRESS_LEN + HEX_ADDRESS_PREFIX.len() => value
                .strip_prefix(HEX_ADDRESS_PREFIX)
                .ok_or_else(|| invalid("unknown network prefix".into()))?,
            None => value,
        };

        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|err| invalid(err.to_string()))?;
        Ok(Self(bytes))
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl TryFrom<String> for Address {
    type Error = AccountsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A generated account. The address is not stored: it is derived through the
/// chain client whenever it is needed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    hd_index: u32,
    private_key: PrivateKey,
}

impl Account {
    #[must_use]
    pub const fn new(hd_index: u32, private_key: PrivateKey) -> Self {
        Self {
            hd_index,
            private_key,
        }
    }

    #[must_use]
    pub const fn hd_index(&self) -> u32 {
        self.hd_index
    }

    #[must_use]
    pub const fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}

/// One batch of accounts generated together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cohort {
    accounts: Vec<Account>,
}

impl Cohort {
    pub fn new(accounts: Vec<Account>) -> Result<Self, AccountsError> {
        if accounts.is_empty() {
            return Err(AccountsError::EmptyCohort);
        }
        Ok(Self { accounts })
    }

    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn private_keys(&self) -> impl Iterator<Item = &PrivateKey> {
        self.accounts.iter().map(Account::private_key)
    }

    fn next_index(&self) -> Option<u32> {
        self.accounts
            .iter()
            .map(Account::hd_index)
            .max()
            .and_then(|max| max.checked_add(1))
    }
}

impl Serialize for Cohort {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct CohortJson<'a> {
            private_keys: Vec<&'a PrivateKey>,
        }

        CohortJson {
            private_keys: self.private_keys().collect(),
        }
        .serialize(serializer)
    }
}

/// Identifies a cohort inside an [`AccountSet`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CohortId {
    #[default]
    Primary,
    Extension(usize),
}

/// The generated account pool: a primary cohort plus extensions appended over
/// time.
///
/// The flattened order (primary first, then each extension in append order)
/// is the canonical index for balances and reports and is never re-sorted.
/// The most recently added cohort is tracked explicitly as the active cohort.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSet {
    #[serde(flatten)]
    primary: Cohort,
    #[serde(rename = "more")]
    extensions: Vec<Cohort>,
    mnemonic: String,
    hd_path: String,
    #[serde(skip)]
    active: CohortId,
}

impl AccountSet {
    #[must_use]
    pub fn new(primary: Cohort, mnemonic: impl Into<String>, hd_path: impl Into<String>) -> Self {
        Self {
            primary,
            extensions: Vec::new(),
            mnemonic: mnemonic.into(),
            hd_path: hd_path.into(),
            active: CohortId::Primary,
        }
    }

    #[must_use]
    pub const fn primary(&self) -> &Cohort {
        &self.primary
    }

    #[must_use]
    pub fn extensions(&self) -> &[Cohort] {
        &self.extensions
    }

    #[must_use]
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    #[must_use]
    pub fn hd_path(&self) -> &str {
        &self.hd_path
    }

    #[must_use]
    pub const fn active_cohort_id(&self) -> CohortId {
        self.active
    }

    /// The cohort that still needs reconciling.
    #[must_use]
    pub fn active_cohort(&self) -> &Cohort {
        self.cohort(self.active).unwrap_or(&self.primary)
    }

    #[must_use]
    pub fn cohort(&self, id: CohortId) -> Option<&Cohort> {
        match id {
            CohortId::Primary => Some(&self.primary),
            CohortId::Extension(idx) => self.extensions.get(idx),
        }
    }

    /// Appends an extension cohort and makes it the active cohort.
    pub fn push_extension(&mut self, cohort: Cohort) -> CohortId {
        self.extensions.push(cohort);
        self.active = CohortId::Extension(self.extensions.len() - 1);
        self.active
    }

    /// Every account in canonical order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        std::iter::once(&self.primary)
            .chain(self.extensions.iter())
            .flat_map(|cohort| cohort.accounts().iter())
    }

    pub fn private_keys(&self) -> impl Iterator<Item = &PrivateKey> {
        self.accounts().map(Account::private_key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.primary.len() + self.extensions.iter().map(Cohort::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First HD index not used by any cohort.
    #[must_use]
    pub fn next_hd_index(&self) -> Option<u32> {
        std::iter::once(&self.primary)
            .chain(self.extensions.iter())
            .map(Cohort::next_index)
            .try_fold(0u32, |acc, next| next.map(|next| acc.max(next)))
    }
}
