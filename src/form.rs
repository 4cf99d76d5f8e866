//! The add-transaction form.
//!
//! `TransactionForm` holds what the user has entered so far, validates it and submits it to a
//! `TransactionStore`. Submission moves through `SubmitState`:
//!
//! ```text
//! Idle | Error ──submit──▶ Loading ──▶ Success   (fields reset for the next entry)
//!                                  └─▶ Error     (fields kept so the user can retry)
//! ```
//!
//! Any edit clears a previous `Error` or `Success` back to `Idle`.

use crate::api::{AccountRegistry, CategoryCatalog, TransactionStore};
use crate::date_entry::{CanonicalDate, DateEntryField};
use crate::model::{
    account_choices, AccountChoice, Amount, Currency, ExpenseCategory, NewTransaction,
    Transaction, TransactionType, UserAccount, BANK,
};
use chrono::NaiveDate;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::{debug, error, info};

/// Shown when the store rejects a transaction.
pub const CREATE_FAILED: &str = "Failed to create transaction";

/// Shown when the category or account lists cannot be fetched.
pub const LOAD_FAILED: &str = "Failed to load categories and accounts";

/// Where the form is in its submission cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum SubmitState {
    #[default]
    Idle,
    Loading,
    Success,
    /// A single user-facing message.
    Error(String),
}

/// The first check that a form failed. `Display` is the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    AmountNotPositive,
    TitleRequired,
    CategoryRequired,
    DateRequired,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ValidationError::AmountNotPositive => "Amount must be greater than 0",
            ValidationError::TitleRequired => "Title is required",
            ValidationError::CategoryRequired => "Category is required",
            ValidationError::DateRequired => "Transaction date is required",
        })
    }
}

impl std::error::Error for ValidationError {}

/// The state of an add-transaction form.
#[derive(Debug, Clone)]
pub struct TransactionForm {
    transaction_type: TransactionType,
    amount: Amount,
    currency: Currency,
    category: String,
    account: String,
    title: String,
    description: String,
    date: DateEntryField,
    categories: Vec<ExpenseCategory>,
    accounts: Vec<UserAccount>,
    default_currency: Currency,
    default_account: String,
    state: SubmitState,
}

impl TransactionForm {
    /// Creates an empty expense form in CLP against the bank account, dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self::with_defaults(Currency::default(), BANK, today)
    }

    /// Creates an empty expense form preselecting `currency` and `account`, dated `today`.
    pub fn with_defaults(currency: Currency, account: &str, today: NaiveDate) -> Self {
        Self {
            transaction_type: TransactionType::default(),
            amount: Amount::ZERO,
            currency,
            category: String::new(),
            account: account.to_string(),
            title: String::new(),
            description: String::new(),
            date: DateEntryField::initialize_on(today),
            categories: Vec::new(),
            accounts: Vec::new(),
            default_currency: currency,
            default_account: account.to_string(),
            state: SubmitState::Idle,
        }
    }

    /// Fetches the categories and accounts to choose from.
    ///
    /// When at least one category exists, the first one is selected, the account goes back to its
    /// default and the date to `today`. A failure leaves the lists untouched and puts the form in
    /// the `Error` state.
    pub async fn load_options<C, A>(&mut self, catalog: &C, registry: &A, today: NaiveDate)
    where
        C: CategoryCatalog + ?Sized,
        A: AccountRegistry + ?Sized,
    {
        match tokio::try_join!(catalog.list_available(), registry.list_for_user()) {
            Ok((categories, accounts)) => {
                debug!(
                    "Loaded {} categories and {} accounts",
                    categories.len(),
                    accounts.len()
                );
                if let Some(first) = categories.first() {
                    self.category = first.name.clone();
                    self.account = self.default_account.clone();
                    self.date.reset_on(today);
                }
                self.categories = categories;
                self.accounts = accounts;
            }
            Err(e) => {
                error!("Error loading categories and accounts: {e:#}");
                self.state = SubmitState::Error(LOAD_FAILED.to_string());
            }
        }
    }

    pub fn set_type(&mut self, transaction_type: TransactionType) {
        self.touch();
        self.transaction_type = transaction_type;
    }

    pub fn set_amount(&mut self, amount: Amount) {
        self.touch();
        self.amount = amount;
    }

    /// Sets the amount from the text of an input field. Unparseable text counts as zero.
    pub fn set_amount_input(&mut self, raw: &str) {
        self.set_amount(Amount::from_str(raw).unwrap_or(Amount::ZERO));
    }

    pub fn set_currency(&mut self, currency: Currency) {
        self.touch();
        self.currency = currency;
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.touch();
        self.category = category.into();
    }

    pub fn set_account(&mut self, account: impl Into<String>) {
        self.touch();
        self.account = account.into();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.touch();
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.touch();
        self.description = description.into();
    }

    /// Passes the raw text of the date input to the date field.
    pub fn on_date_input(&mut self, raw: &str) -> (Option<&CanonicalDate>, &str) {
        self.touch();
        self.date.on_raw_input(raw)
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> &DateEntryField {
        &self.date
    }

    pub fn categories(&self) -> &[ExpenseCategory] {
        &self.categories
    }

    /// The built-in accounts followed by the loaded user accounts.
    pub fn account_choices(&self) -> Vec<AccountChoice> {
        account_choices(&self.accounts)
    }

    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SubmitState::Loading
    }

    /// The message to show, if the last load or submission failed.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SubmitState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Checks the form in order: amount, title, category, date. The first failure is returned.
    pub fn validate(&self) -> Result<NewTransaction, ValidationError> {
        if !self.amount.is_positive() {
            return Err(ValidationError::AmountNotPositive);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::TitleRequired);
        }
        if self.category.is_empty() {
            return Err(ValidationError::CategoryRequired);
        }
        let transaction_date = self
            .date
            .canonical()
            .cloned()
            .ok_or(ValidationError::DateRequired)?;

        Ok(NewTransaction {
            transaction_type: self.transaction_type,
            amount: self.amount,
            currency: self.currency,
            category: self.category.clone(),
            account: self.account.clone(),
            title: self.title.clone(),
            description: Some(self.description.clone()).filter(|d| !d.trim().is_empty()),
            transaction_date,
        })
    }

    /// Validates the form and sends it to `store`.
    ///
    /// Returns the stored transaction on success, after resetting the form for the next entry
    /// (dated `today`). Otherwise the form is left as it was, in the `Error` state. If the
    /// returned future is dropped before the store answers, the form goes back to `Idle` with its
    /// fields untouched.
    pub async fn submit<S>(&mut self, store: &S, today: NaiveDate) -> Option<Transaction>
    where
        S: TransactionStore + ?Sized,
    {
        let record = match self.validate() {
            Ok(record) => record,
            Err(e) => {
                debug!("Transaction form is invalid: {e}");
                self.state = SubmitState::Error(e.to_string());
                return None;
            }
        };

        let result = {
            let _pending = Pending::begin(&mut self.state);
            store.create(&record).await
        };

        match result {
            Ok(transaction) => {
                info!("Created transaction {}", transaction.transaction_id);
                self.clear_fields(today);
                self.state = SubmitState::Success;
                Some(transaction)
            }
            Err(e) => {
                error!("Error creating transaction: {e:#}");
                self.state = SubmitState::Error(CREATE_FAILED.to_string());
                None
            }
        }
    }

    /// Clears everything the user entered and any error, dating the form `today`.
    pub fn reset(&mut self, today: NaiveDate) {
        self.clear_fields(today);
        self.state = SubmitState::Idle;
    }

    fn clear_fields(&mut self, today: NaiveDate) {
        self.transaction_type = TransactionType::default();
        self.amount = Amount::ZERO;
        self.currency = self.default_currency;
        self.category = self
            .categories
            .first()
            .map(|c| c.name.clone())
            .unwrap_or_default();
        self.account = self.default_account.clone();
        self.title.clear();
        self.description.clear();
        self.date.reset_on(today);
    }

    fn touch(&mut self) {
        if matches!(self.state, SubmitState::Error(_) | SubmitState::Success) {
            self.state = SubmitState::Idle;
        }
    }
}

/// Holds a form in `Loading` while a request is pending. Dropping it without a result, e.g. when
/// the request future is cancelled, puts the form back to `Idle`.
struct Pending<'a>(&'a mut SubmitState);

impl<'a> Pending<'a> {
    fn begin(state: &'a mut SubmitState) -> Self {
        *state = SubmitState::Loading;
        Self(state)
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if *self.0 == SubmitState::Loading {
            *self.0 = SubmitState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryBackend;
    use crate::error::Res;
    use anyhow::bail;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()
    }

    async fn loaded_form(backend: &MemoryBackend) -> TransactionForm {
        let mut form = TransactionForm::new(today());
        form.load_options(backend, backend, today()).await;
        form
    }

    fn fill(form: &mut TransactionForm) {
        form.set_amount_input("12,500");
        form.set_title("Groceries");
        form.on_date_input("15032024");
    }

    struct Unavailable;

    /// A store whose writes never complete.
    struct Unresponsive;

    #[async_trait::async_trait]
    impl TransactionStore for Unresponsive {
        async fn create(&self, _record: &NewTransaction) -> Res<Transaction> {
            std::future::pending().await
        }

        async fn list_recent(&self, _limit: usize) -> Res<Vec<Transaction>> {
            Ok(Vec::new())
        }
    }

    #[async_trait::async_trait]
    impl CategoryCatalog for Unavailable {
        async fn list_available(&self) -> Res<Vec<ExpenseCategory>> {
            bail!("connection refused")
        }
    }

    #[test]
    fn test_new_form_defaults() {
        let form = TransactionForm::new(today());
        assert_eq!(form.transaction_type(), TransactionType::Expense);
        assert_eq!(form.currency(), Currency::Clp);
        assert_eq!(form.account(), "bank");
        assert!(form.amount().is_zero());
        assert_eq!(form.date().display(), "10/02/2025");
        assert_eq!(form.state(), &SubmitState::Idle);
    }

    #[tokio::test]
    async fn test_load_options_selects_first_category() {
        let backend = MemoryBackend::seeded();
        let form = loaded_form(&backend).await;
        assert_eq!(form.category(), "Food");
        assert_eq!(form.categories().len(), 6);
        let choices: Vec<_> = form
            .account_choices()
            .into_iter()
            .map(|c| c.value)
            .collect();
        assert_eq!(choices, vec!["bank", "cash", "Visa", "Broker"]);
    }

    #[tokio::test]
    async fn test_load_options_without_categories() {
        let backend = MemoryBackend::new(Vec::new(), Vec::new());
        let mut form = TransactionForm::new(today());
        form.set_account("cash");
        form.load_options(&backend, &backend, today()).await;
        assert_eq!(form.category(), "");
        assert_eq!(form.account(), "cash");
        assert_eq!(form.account_choices().len(), 2);
    }

    #[tokio::test]
    async fn test_load_options_failure() {
        let backend = MemoryBackend::seeded();
        let mut form = TransactionForm::new(today());
        form.load_options(&Unavailable, &backend, today()).await;
        assert_eq!(form.error(), Some(LOAD_FAILED));
        assert!(form.categories().is_empty());
    }

    #[tokio::test]
    async fn test_validation_order() {
        let backend = MemoryBackend::seeded();
        let mut form = TransactionForm::new(today());
        form.on_date_input("1503");

        assert_eq!(form.validate(), Err(ValidationError::AmountNotPositive));
        form.set_amount_input("-5");
        assert_eq!(form.validate(), Err(ValidationError::AmountNotPositive));
        form.set_amount_input("5");
        assert_eq!(form.validate(), Err(ValidationError::TitleRequired));
        form.set_title("   ");
        assert_eq!(form.validate(), Err(ValidationError::TitleRequired));
        form.set_title("Bus");
        assert_eq!(form.validate(), Err(ValidationError::CategoryRequired));
        form.load_options(&backend, &backend, today()).await;
        // Loading options re-seeds the date with today.
        assert!(form.validate().is_ok());
        form.on_date_input("1503");
        assert_eq!(form.validate(), Err(ValidationError::DateRequired));
        form.on_date_input("15032024");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::AmountNotPositive.to_string(),
            "Amount must be greater than 0"
        );
        assert_eq!(ValidationError::TitleRequired.to_string(), "Title is required");
        assert_eq!(
            ValidationError::CategoryRequired.to_string(),
            "Category is required"
        );
        assert_eq!(
            ValidationError::DateRequired.to_string(),
            "Transaction date is required"
        );
    }

    #[test]
    fn test_unparseable_amount_is_zero() {
        let mut form = TransactionForm::new(today());
        form.set_amount_input("abc");
        assert!(form.amount().is_zero());
    }

    #[tokio::test]
    async fn test_submit_success_resets_form() {
        let backend = MemoryBackend::seeded();
        let mut form = loaded_form(&backend).await;
        fill(&mut form);
        form.set_type(TransactionType::Income);
        form.set_currency(Currency::Usd);
        form.set_category("Salary");
        form.set_account("Visa");
        form.set_description("  ");

        let next_day = NaiveDate::from_ymd_opt(2025, 2, 11).unwrap();
        let created = form.submit(&backend, next_day).await.unwrap();
        assert_eq!(created.transaction_type, TransactionType::Income);
        assert_eq!(created.transaction_date.as_str(), "2024-03-15");
        assert_eq!(created.currency, Currency::Usd);
        assert_eq!(created.description, None);

        assert_eq!(form.state(), &SubmitState::Success);
        assert_eq!(form.transaction_type(), TransactionType::Expense);
        assert_eq!(form.currency(), Currency::Clp);
        assert_eq!(form.category(), "Food");
        assert_eq!(form.account(), "bank");
        assert_eq!(form.title(), "");
        assert!(form.amount().is_zero());
        assert_eq!(form.date().display(), "11/02/2025");
        assert_eq!(backend.transactions().unwrap().len(), 1);

        form.set_title("next");
        assert_eq!(form.state(), &SubmitState::Idle);
    }

    #[tokio::test]
    async fn test_submit_invalid_reports_first_error() {
        let backend = MemoryBackend::seeded();
        let mut form = loaded_form(&backend).await;
        form.set_title("No amount");
        form.on_date_input("99");

        assert!(form.submit(&backend, today()).await.is_none());
        assert_eq!(form.error(), Some("Amount must be greater than 0"));
        assert!(backend.transactions().unwrap().is_empty());

        form.set_amount_input("10");
        assert_eq!(form.error(), None);
        assert!(form.submit(&backend, today()).await.is_none());
        assert_eq!(form.error(), Some("Transaction date is required"));
    }

    #[tokio::test]
    async fn test_submit_remote_failure_keeps_fields() {
        let backend = MemoryBackend::seeded();
        backend.reject_writes(Some("row level security")).unwrap();
        let mut form = loaded_form(&backend).await;
        fill(&mut form);

        assert!(form.submit(&backend, today()).await.is_none());
        assert_eq!(form.error(), Some(CREATE_FAILED));
        assert_eq!(form.title(), "Groceries");
        assert_eq!(form.date().display(), "15/03/2024");
        assert_eq!(form.amount(), Amount::from_str("12500").unwrap());

        // Retry without re-entering anything.
        backend.reject_writes(None).unwrap();
        assert!(form.submit(&backend, today()).await.is_some());
        assert_eq!(form.state(), &SubmitState::Success);
    }

    #[tokio::test]
    async fn test_reset_clears_error_and_fields() {
        let backend = MemoryBackend::seeded();
        let mut form = loaded_form(&backend).await;
        fill(&mut form);
        form.submit(&MemoryBackend::seeded(), today()).await;
        form.set_title("typed");
        form.on_date_input("01132024");
        assert!(form.submit(&backend, today()).await.is_none());
        assert!(form.error().is_some());

        form.reset(today());
        assert_eq!(form.state(), &SubmitState::Idle);
        assert_eq!(form.title(), "");
        assert_eq!(form.category(), "Food");
        assert_eq!(form.date().display(), "10/02/2025");
        assert!(form.date().is_complete());
    }

    #[test]
    fn test_with_defaults() {
        let form = TransactionForm::with_defaults(Currency::Eur, "cash", today());
        assert_eq!(form.currency(), Currency::Eur);
        assert_eq!(form.account(), "cash");
    }

    #[tokio::test]
    async fn test_cancelled_submit_can_be_retried() {
        let backend = MemoryBackend::seeded();
        let mut form = loaded_form(&backend).await;
        fill(&mut form);

        let cancelled = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            form.submit(&Unresponsive, today()),
        )
        .await;
        assert!(cancelled.is_err());
        assert_eq!(form.state(), &SubmitState::Idle);
        assert_eq!(form.title(), "Groceries");
        assert_eq!(form.date().display(), "15/03/2024");

        assert!(form.submit(&backend, today()).await.is_some());
        assert_eq!(form.state(), &SubmitState::Success);
        assert_eq!(backend.transactions().unwrap().len(), 1);
    }
}
