/// Per-account progress through a reconciliation.
///
/// `Unfunded -> FundingSent -> Confirmed`. The funder account and accounts
/// already marked in the tracker start at `FundingSent` and are only polled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FundingState {
    Unfunded,
    FundingSent,
    Confirmed { balance: u128 },
}

impl FundingState {
    #[must_use]
    pub const fn initial(exempt: bool) -> Self {
        if exempt {
            Self::FundingSent
        } else {
            Self::Unfunded
        }
    }

    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    #[must_use]
    pub const fn balance(&self) -> Option<u128> {
        match self {
            Self::Confirmed { balance } => Some(*balance),
            Self::Unfunded | Self::FundingSent => None,
        }
    }

    /// Applies an observed balance; only a positive balance confirms.
    #[must_use]
    pub const fn observe(self, balance: u128) -> Self {
        match self {
            Self::FundingSent if balance > 0 => Self::Confirmed { balance },
            other => other,
        }
    }
}
