use crate::date_entry::CanonicalDate;
use crate::model::{Amount, Currency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether money went out or came in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Expense,
    Income,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    pub fn icon(&self) -> &'static str {
        match self {
            TransactionType::Expense => "💸",
            TransactionType::Income => "💰",
        }
    }
}

/// A validated transaction, ready to be sent to a `TransactionStore`.
///
/// `category` and `account` are names; resolving them to foreign keys is left to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Amount,
    pub currency: Currency,
    pub category: String,
    pub account: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub transaction_date: CanonicalDate,
}

/// A transaction as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub transaction_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Amount,
    pub currency: Currency,
    /// Flat category name.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    /// Flat account name.
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub transaction_date: CanonicalDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// A one-line summary such as `💸 2024-03-15 Lunch (Food, bank) CLP 12,500`.
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} ({}, {}) {}",
            self.transaction_type.icon(),
            self.transaction_date,
            self.title,
            self.category.as_deref().unwrap_or("-"),
            self.account.as_deref().unwrap_or("-"),
            self.currency.format(&self.amount)
        )
    }
}
