//! Types that represent the core data model, such as `Transaction` and `UserAccount`.
mod account;
mod amount;
mod category;
mod currency;
mod time_entry;
mod transaction;

pub use account::{
    account_choices, AccountChoice, AccountType, UserAccount, BANK, CASH, DEFAULT_ACCOUNT_COLOR,
};
pub use amount::{Amount, AmountError};
pub use category::{ExpenseCategory, HobbyCategory, DEFAULT_CATEGORY_ICON};
pub use currency::Currency;
pub use time_entry::{format_elapsed, FinishTimeEntry, NewTimeEntry, TimeEntry};
pub use transaction::{NewTransaction, Transaction, TransactionType};
