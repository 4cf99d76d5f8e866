use crate::api::{self, Mode};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{account_choices, AccountChoice, ExpenseCategory, Transaction};
use crate::{Config, Result};
use anyhow::Context;

/// Lists up to `limit` transactions, newest transaction date first.
pub async fn transactions(
    config: Config,
    mode: Mode,
    limit: usize,
) -> Result<Out<Vec<Transaction>>> {
    let backend = api::backend(&config, mode).pub_result(ErrorType::Config)?;
    let transactions = backend
        .list_recent(limit)
        .await
        .context("Unable to list transactions")
        .pub_result(ErrorType::Request)?;
    let mut message = format!("Found {} transactions", transactions.len());
    for transaction in &transactions {
        message.push_str("\n  ");
        message.push_str(&transaction.summary());
    }
    Ok(Out::new(message, transactions))
}

/// Lists the expense categories in the order the form offers them.
pub async fn categories(config: Config, mode: Mode) -> Result<Out<Vec<ExpenseCategory>>> {
    let backend = api::backend(&config, mode).pub_result(ErrorType::Config)?;
    let categories = backend
        .list_available()
        .await
        .context("Unable to list categories")
        .pub_result(ErrorType::Request)?;
    let labels: Vec<_> = categories.iter().map(ExpenseCategory::label).collect();
    Ok(Out::new(
        format!("Found {} categories: {}", categories.len(), labels.join(", ")),
        categories,
    ))
}

/// Lists the accounts a transaction can be booked against, built-in ones first.
pub async fn accounts(config: Config, mode: Mode) -> Result<Out<Vec<AccountChoice>>> {
    let backend = api::backend(&config, mode).pub_result(ErrorType::Config)?;
    let accounts = backend
        .list_for_user()
        .await
        .context("Unable to list accounts")
        .pub_result(ErrorType::Request)?;
    let choices = account_choices(&accounts);
    let labels: Vec<_> = choices
        .iter()
        .map(|c| format!("{} {}", c.icon, c.label))
        .collect();
    Ok(Out::new(
        format!("Found {} accounts: {}", choices.len(), labels.join(", ")),
        choices,
    ))
}
