use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// The currencies a transaction can be recorded in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Chilean peso. Has no minor unit.
    #[default]
    Clp,
    Usd,
    Eur,
}

serde_plain::derive_display_from_serialize!(Currency);
serde_plain::derive_fromstr_from_deserialize!(Currency);

impl Currency {
    /// All currencies, in the order they are offered to the user.
    pub const ALL: [Currency; 3] = [Currency::Clp, Currency::Usd, Currency::Eur];

    /// Number of digits after the decimal point used when showing amounts.
    pub fn decimals(&self) -> u32 {
        match self {
            Currency::Clp => 0,
            Currency::Usd | Currency::Eur => 2,
        }
    }

    /// Formats `amount` with thousands separators, e.g. `CLP 12,500` or `USD 1,234.50`.
    pub fn format(&self, amount: &Amount) -> String {
        let n = amount.to_f64();
        let num = match self.decimals() {
            0 => format_num::format_num!(",.0f", n),
            _ => format_num::format_num!(",.2f", n),
        };
        format!("{self} {num}")
    }
}
