use sha3::{Digest as _, Keccak256};
use tracing::{debug, info};

use super::{Account, AccountSet, AccountsError, Cohort, CohortId, PrivateKey};

/// Well-known development mnemonic; never holds real funds.
pub const DEFAULT_MNEMONIC: &str = "test test test test test test test test test test test junk";
pub const DEFAULT_HD_PATH: &str = "m/44'/195'/0'/0/";

/// Derives the private key at `index` below `hd_path` for `mnemonic`.
///
/// This is a deterministic Keccak-256 stand-in for the chain's wallet
/// derivation; the same inputs always produce the same key.
#[must_use]
pub fn derive_private_key(mnemonic: &str, hd_path: &str, index: u32) -> PrivateKey {
    let mut hasher = Keccak256::new();
    hasher.update(mnemonic.as_bytes());
    hasher.update([0u8]);
    hasher.update(hd_path.as_bytes());
    hasher.update(index.to_string().as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    PrivateKey::from_bytes(bytes)
}

/// Produces fresh account sets and extension cohorts from HD metadata.
#[derive(Clone, Debug)]
pub struct AccountGenerator {
    mnemonic: String,
    hd_path: String,
}

impl AccountGenerator {
    #[must_use]
    pub fn new(mnemonic: impl Into<String>, hd_path: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            hd_path: hd_path.into(),
        }
    }

    #[must_use]
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    #[must_use]
    pub fn hd_path(&self) -> &str {
        &self.hd_path
    }

    /// Generates a new set whose primary cohort covers indexes `0..count`.
    pub fn generate(&self, count: usize) -> Result<AccountSet, AccountsError> {
        let primary = derive_cohort(&self.mnemonic, &self.hd_path, 0, count)?;
        info!(
            accounts = count,
            hd_path = %self.hd_path,
            "generated primary account cohort"
        );
        Ok(AccountSet::new(primary, &self.mnemonic, &self.hd_path))
    }

    /// Appends `count` accounts after the highest index already in `set`.
    ///
    /// Derivation uses the set's own mnemonic and path so extensions stay
    /// consistent with the primary cohort.
    pub fn extend(&self, set: &mut AccountSet, count: usize) -> Result<CohortId, AccountsError> {
        let start = set.next_hd_index().ok_or(AccountsError::IndexOverflow {
            next: u32::MAX,
            requested: count,
        })?;
        let cohort = derive_cohort(set.mnemonic(), set.hd_path(), start, count)?;
        let id = set.push_extension(cohort);
        info!(
            accounts = count,
            first_index = start,
            extensions = set.extensions().len(),
            "appended extension account cohort"
        );
        Ok(id)
    }
}

fn derive_cohort(
    mnemonic: &str,
    hd_path: &str,
    start: u32,
    count: usize,
) -> Result<Cohort, AccountsError> {
    let overflow = || AccountsError::IndexOverflow {
        next: start,
        requested: count,
    };
    let count_u32 = u32::try_from(count).map_err(|_| overflow())?;
    let end = start.checked_add(count_u32).ok_or_else(overflow)?;

    let accounts = (start..end)
        .map(|index| {
            debug!(index, "deriving account key");
            Account::new(index, derive_private_key(mnemonic, hd_path, index))
        })
        .collect();

    Cohort::new(accounts)
}
