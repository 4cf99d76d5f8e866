use serde::{Deserialize, Serialize};

/// Identifier of the built-in bank account.
pub const BANK: &str = "bank";

/// Identifier of the built-in cash account.
pub const CASH: &str = "cash";

/// Color used for a user account that has none set.
pub const DEFAULT_ACCOUNT_COLOR: &str = "#6B7280";

/// The kind of a user-defined account.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Bank,
    Cash,
    CreditCard,
    Investment,
    #[default]
    Other,
}

serde_plain::derive_display_from_serialize!(AccountType);
serde_plain::derive_fromstr_from_deserialize!(AccountType);

impl AccountType {
    pub fn icon(&self) -> &'static str {
        match self {
            AccountType::Bank => "🏦",
            AccountType::Cash => "💵",
            AccountType::CreditCard => "💳",
            AccountType::Investment => "📈",
            AccountType::Other => "💼",
        }
    }
}

/// An account defined by the user in the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

/// One selectable account in the transaction form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountChoice {
    /// The value written to the transaction's `account` field.
    pub value: String,
    pub label: String,
    pub icon: &'static str,
    pub color: Option<String>,
    /// Shown as a tooltip.
    pub title: String,
}

/// Lists the accounts a transaction may be recorded against: the built-in `bank` and `cash`
/// accounts followed by `accounts` in their given order. User accounts are selected by name.
pub fn account_choices(accounts: &[UserAccount]) -> Vec<AccountChoice> {
    let built_in = [(BANK, "Bank", AccountType::Bank), (CASH, "Cash", AccountType::Cash)]
        .into_iter()
        .map(|(value, label, kind)| AccountChoice {
            value: value.to_string(),
            label: label.to_string(),
            icon: kind.icon(),
            color: None,
            title: label.to_string(),
        });

    let custom = accounts.iter().map(|account| AccountChoice {
        value: account.name.clone(),
        label: account.name.clone(),
        icon: account.account_type.icon(),
        color: Some(
            account
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_ACCOUNT_COLOR.to_string()),
        ),
        title: account
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| account.name.clone()),
    });

    built_in.chain(custom).collect()
}
