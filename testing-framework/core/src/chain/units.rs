use serde::{Deserialize, Serialize};

pub const DEFAULT_SYMBOL: &str = "EARTH";
pub const DEFAULT_DECIMALS: u32 = 6;
/// Largest exponent for which `10^decimals` fits in a `u128`.
pub const MAX_DECIMALS: u32 = 38;

/// Display denomination of the chain's native token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denomination {
    pub symbol: String,
    pub decimals: u32,
}

impl Default for Denomination {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_owned(),
            decimals: DEFAULT_DECIMALS,
        }
    }
}

impl Denomination {
    #[must_use]
    pub fn new(symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Saturates past [`MAX_DECIMALS`]; config loading rejects such values.
    fn scale(&self) -> u128 {
        10u128.saturating_pow(self.decimals)
    }

    /// Saturates at `u128::MAX`.
    #[must_use]
    pub fn to_base_units(&self, display_amount: u64) -> u128 {
        u128::from(display_amount).saturating_mul(self.scale())
    }

    /// Renders base units in display units, trimming trailing fractional
    /// zeros (`1500000` with 6 decimals is `1.5`).
    #[must_use]
    pub fn from_base_units(&self, amount: u128) -> String {
        let scale = self.scale();
        let whole = amount / scale;
        let fraction = amount % scale;
        if fraction == 0 {
            return whole.to_string();
        }

        let width = self.decimals as usize;
        let fraction = format!("{fraction:0width$}");
        format!("{whole}.{}", fraction.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_display_amounts_to_base_units() {
        let denomination = Denomination::default();
        assert_eq!(denomination.to_base_units(10_000), 10_000_000_000);
        assert_eq!(denomination.to_base_units(0), 0);
    }

    #[test]
    fn renders_fractional_balances() {
        let denomination = Denomination::default();
        assert_eq!(denomination.from_base_units(10_000_000_000), "10000");
        assert_eq!(denomination.from_base_units(1_500_000), "1.5");
        assert_eq!(denomination.from_base_units(1), "0.000001");
        assert_eq!(denomination.from_base_units(0), "0");
    }

    #[test]
    fn widest_supported_denomination_is_exact() {
        let denomination = Denomination::new("WIDE", MAX_DECIMALS);
        assert_eq!(denomination.to_base_units(1), 10u128.pow(MAX_DECIMALS));
        assert_eq!(denomination.from_base_units(10u128.pow(MAX_DECIMALS)), "1");
    }

    #[test]
    fn zero_decimals_is_identity() {
        let denomination = Denomination::new("WEI", 0);
        assert_eq!(denomination.to_base_units(42), 42);
        assert_eq!(denomination.from_base_units(42), "42");
    }
}
