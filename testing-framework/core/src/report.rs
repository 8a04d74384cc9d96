use std::{fmt::Write as _, str::FromStr};

use serde::Serialize;
use thiserror::Error;

use crate::{accounts::AccountSet, balances::flattened_addresses, chain::ChainClient};

const UNDERLINE: &str = "==================";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("balance list has {balances} entries but the account set has {accounts}")]
    Misaligned { accounts: usize, balances: usize },
}

/// How addresses appear in the account listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddressFormat {
    #[default]
    Plain,
    /// Hex form instead of the address.
    Hex,
    /// Address followed by an indented hex line.
    All,
}

impl FromStr for AddressFormat {
    type Err = std::convert::Infallible;

    /// Unknown values fall back to [`AddressFormat::Plain`].
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "hex" => Self::Hex,
            "all" => Self::All,
            _ => Self::Plain,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountEntry {
    pub index: usize,
    pub address: String,
    pub hex: String,
    pub balance: String,
    pub private_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsReport {
    pub accounts: Vec<AccountEntry>,
    pub symbol: String,
    pub mnemonic: String,
    pub hd_path: String,
}

/// Renders an account set and its aligned balances for the operator.
pub struct Reporter<'a, C: ?Sized> {
    chain: &'a C,
}

impl<'a, C> Reporter<'a, C>
where
    C: ChainClient + ?Sized,
{
    #[must_use]
    pub const fn new(chain: &'a C) -> Self {
        Self { chain }
    }

    pub fn report(
        &self,
        accounts: &AccountSet,
        balances: &[u128],
    ) -> Result<AccountsReport, ReportError> {
        if accounts.len() != balances.len() {
            return Err(ReportError::Misaligned {
                accounts: accounts.len(),
                balances: balances.len(),
            });
        }

        let entries = flattened_addresses(self.chain, accounts)
            .into_iter()
            .zip(accounts.private_keys())
            .zip(balances)
            .enumerate()
            .map(|(index, ((address, key), balance))| AccountEntry {
                index,
                address: address.to_string(),
                hex: self.chain.address_to_hex(&address),
                balance: self.chain.from_base_units(*balance),
                private_key: key.to_string(),
            })
            .collect();

        Ok(AccountsReport {
            accounts: entries,
            symbol: self.chain.denomination().symbol.clone(),
            mnemonic: accounts.mnemonic().to_owned(),
            hd_path: accounts.hd_path().to_owned(),
        })
    }

    pub fn render_text(
        &self,
        accounts: &AccountSet,
        balances: &[u128],
        format: AddressFormat,
    ) -> Result<String, ReportError> {
        Ok(render_report(&self.report(accounts, balances)?, format))
    }
}

/// Plain-text layout printed to the console and served to operators.
#[must_use]
pub fn render_report(report: &AccountsReport, format: AddressFormat) -> String {
    let mut out = format!("Available Accounts\n{UNDERLINE}\n\n");
    for entry in &report.accounts {
        let shown = match format {
            AddressFormat::Hex => &entry.hex,
            AddressFormat::Plain | AddressFormat::All => &entry.address,
        };
        let _ = writeln!(
            out,
            "({}) {shown} ({} {})",
            entry.index, entry.balance, report.symbol
        );
        if format == AddressFormat::All {
            let _ = writeln!(out, "    {}", entry.hex);
        }
    }

    let _ = write!(out, "\nPrivate Keys\n{UNDERLINE}\n\n");
    for entry in &report.accounts {
        let _ = writeln!(out, "({}) {}", entry.index, entry.private_key);
    }

    let _ = write!(
        out,
        "\nHD Wallet\n{UNDERLINE}\nMnemonic:      {}\nBase HD Path:  {}{{account_index}}\n",
        report.mnemonic, report.hd_path
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AccountsReport {
        AccountsReport {
            accounts: vec![
                AccountEntry {
                    index: 0,
                    address: "0xaa".into(),
                    hex: "41aa".into(),
                    balance: "10000".into(),
                    private_key: "k0".into(),
                },
                AccountEntry {
                    index: 1,
                    address: "0xbb".into(),
                    hex: "41bb".into(),
                    balance: "1.5".into(),
                    private_key: "k1".into(),
                },
            ],
            symbol: "EARTH".into(),
            mnemonic: "alpha beta".into(),
            hd_path: "m/44'/195'/0'/0/".into(),
        }
    }

    #[test]
    fn plain_layout_matches_operator_format() {
        let text = render_report(&sample(), AddressFormat::Plain);
        let expected = "Available Accounts\n==================\n\n\
            (0) 0xaa (10000 EARTH)\n\
            (1) 0xbb (1.5 EARTH)\n\
            \nPrivate Keys\n==================\n\n\
            (0) k0\n\
            (1) k1\n\
            \nHD Wallet\n==================\n\
            Mnemonic:      alpha beta\n\
            Base HD Path:  m/44'/195'/0'/0/{account_index}\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn hex_layout_replaces_addresses() {
        let text = render_report(&sample(), AddressFormat::Hex);
        assert!(text.contains("(0) 41aa (10000 EARTH)\n"));
        assert!(!text.contains("0xaa"));
    }

    #[test]
    fn all_layout_adds_indented_hex_line() {
        let text = render_report(&sample(), AddressFormat::All);
        assert!(text.contains("(1) 0xbb (1.5 EARTH)\n    41bb\n"));
    }

    #[test]
    fn unknown_format_falls_back_to_plain() {
        assert_eq!("json".parse::<AddressFormat>(), Ok(AddressFormat::Plain));
        assert_eq!("hex".parse::<AddressFormat>(), Ok(AddressFormat::Hex));
    }
}
