use crate::api::{self, Mode};
use crate::args::AddArgs;
use crate::commands::Out;
use crate::date_entry;
use crate::error::{ErrorType, IntoResult};
use crate::form::{TransactionForm, CREATE_FAILED};
use crate::model::Transaction;
use crate::{Config, Error, Result};
use anyhow::anyhow;
use tracing::debug;

/// Fills in a `TransactionForm` from `args` and submits it.
///
/// Options not given on the command line keep the form's defaults: today's date, the first
/// category and the currency and account from `config.json`. `--date` is fed through the date
/// field exactly as typed, so `15032024` and `15/03/2024` are both accepted.
///
/// # Errors
/// - `ErrorType::Validation` with the form's message when the form is incomplete.
/// - `ErrorType::Request` when the categories cannot be loaded or the backend rejects the
///   transaction.
pub async fn add_transaction(
    config: Config,
    mode: Mode,
    args: AddArgs,
) -> Result<Out<Transaction>> {
    let backend = api::backend(&config, mode).pub_result(ErrorType::Config)?;
    let today = date_entry::today();

    let mut form =
        TransactionForm::with_defaults(config.default_currency(), config.default_account(), today);
    form.load_options(&*backend, &*backend, today).await;
    if let Some(message) = form.error() {
        return Err(Error::new(ErrorType::Request, anyhow!(message.to_string())));
    }

    form.set_type(args.transaction_type());
    form.set_amount_input(args.amount());
    form.set_title(args.title());
    if let Some(currency) = args.currency() {
        form.set_currency(currency);
    }
    if let Some(category) = args.category() {
        form.set_category(category);
    }
    if let Some(account) = args.account() {
        form.set_account(account);
    }
    if let Some(description) = args.description() {
        form.set_description(description);
    }
    if let Some(raw) = args.date() {
        let (_, shown) = form.on_date_input(raw);
        debug!("Date input '{raw}' displayed as '{shown}'");
    }

    form.validate().pub_result(ErrorType::Validation)?;

    match form.submit(&*backend, today).await {
        Some(transaction) => Ok(Out::new(
            format!("Added {}", transaction.summary()),
            transaction,
        )),
        None => Err(Error::new(
            ErrorType::Request,
            anyhow!(form.error().unwrap_or(CREATE_FAILED).to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Currency, TransactionType};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_add_with_typed_date() {
        let env = TestEnv::new().await;
        let args = AddArgs::new("12500", "Lunch")
            .with_category("Food")
            .with_date("15032024");
        let out = add_transaction(env.config(), Mode::Testing, args)
            .await
            .unwrap();
        let transaction = out.structure().unwrap();
        assert_eq!(transaction.transaction_date.as_str(), "2024-03-15");
        assert_eq!(transaction.transaction_type, TransactionType::Expense);
        assert_eq!(transaction.currency, Currency::Clp);
        assert_eq!(transaction.account.as_deref(), Some("bank"));
        assert!(out.message().starts_with("Added 💸 2024-03-15 Lunch"));
    }

    #[tokio::test]
    async fn test_add_defaults_to_today_and_first_category() {
        let env = TestEnv::new().await;
        let args = AddArgs::new("10", "Salary")
            .with_type(TransactionType::Income)
            .with_currency(Currency::Usd)
            .with_account("cash");
        let out = add_transaction(env.config(), Mode::Testing, args)
            .await
            .unwrap();
        let transaction = out.structure().unwrap();
        assert_eq!(transaction.category.as_deref(), Some("Food"));
        assert_eq!(
            transaction.transaction_date.as_str(),
            date_entry::today().format("%Y-%m-%d").to_string()
        );
    }

    #[tokio::test]
    async fn test_add_incomplete_date_fails_validation() {
        let env = TestEnv::new().await;
        let args = AddArgs::new("10", "Bus").with_date("1503");
        let err = add_transaction(env.config(), Mode::Testing, args)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert_eq!(err.to_string(), "Transaction date is required");
    }

    #[tokio::test]
    async fn test_add_zero_amount_fails_validation() {
        let env = TestEnv::new().await;
        let args = AddArgs::new("abc", "Bus");
        let err = add_transaction(env.config(), Mode::Testing, args)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Amount must be greater than 0");
    }
}
