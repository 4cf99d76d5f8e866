//! Implements the store traits with in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a hosted backend.

use crate::api::{AccountRegistry, CategoryCatalog, TimeEntryStore, TransactionStore};
use crate::error::Res;
use crate::model::{
    ExpenseCategory, HobbyCategory, NewTimeEntry, NewTransaction, TimeEntry, Transaction,
    UserAccount,
};
use crate::utils::generate_id;
use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::error;

/// A backend that holds all of its data in memory. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    transactions: Vec<Transaction>,
    categories: Vec<ExpenseCategory>,
    accounts: Vec<UserAccount>,
    time_entries: Vec<TimeEntry>,
    hobby_categories: Vec<HobbyCategory>,
    /// When set, every write fails with this message.
    reject_writes: Option<String>,
}

impl MemoryBackend {
    /// Creates a backend holding only the given categories and accounts.
    pub fn new(categories: Vec<ExpenseCategory>, accounts: Vec<UserAccount>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                categories,
                accounts,
                ..State::default()
            })),
        }
    }

    /// Creates a backend with the built-in seed data.
    pub fn seeded() -> Self {
        let backend = Self::new(seed(CATEGORY_DATA), seed(ACCOUNT_DATA));
        if let Ok(mut state) = backend.lock() {
            state.hobby_categories = seed(HOBBY_CATEGORY_DATA);
        }
        backend
    }

    /// Makes every subsequent write fail with `message`, or succeed again with `None`.
    pub fn reject_writes(&self, message: Option<&str>) -> Res<()> {
        self.lock()?.reject_writes = message.map(str::to_string);
        Ok(())
    }

    /// A copy of the stored transactions, in insertion order.
    pub fn transactions(&self) -> Res<Vec<Transaction>> {
        Ok(self.lock()?.transactions.clone())
    }

    fn lock(&self) -> Res<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("The in-memory backend state is poisoned"))
    }
}

impl State {
    fn check_writable(&self) -> Res<()> {
        match &self.reject_writes {
            Some(message) => bail!("{message}"),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl TransactionStore for MemoryBackend {
    async fn create(&self, record: &NewTransaction) -> Res<Transaction> {
        let mut state = self.lock()?;
        state.check_writable()?;
        let category_id = state
            .categories
            .iter()
            .find(|c| c.name == record.category)
            .map(|c| c.id.clone());
        let account_id = state
            .accounts
            .iter()
            .find(|a| a.name == record.account)
            .map(|a| a.id.clone());
        let now = Utc::now();
        let transaction = Transaction {
            id: generate_id(),
            transaction_id: generate_id(),
            transaction_type: record.transaction_type,
            amount: record.amount,
            currency: record.currency,
            category: Some(record.category.clone()),
            category_id,
            account: Some(record.account.clone()),
            account_id,
            title: record.title.clone(),
            description: record.description.clone(),
            transaction_date: record.transaction_date.clone(),
            created_at: now,
            updated_at: now,
        };
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn list_recent(&self, limit: usize) -> Res<Vec<Transaction>> {
        let mut transactions = self.lock()?.transactions.clone();
        transactions.sort_by(|a, b| {
            b.transaction_date
                .cmp(&a.transaction_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        transactions.truncate(limit);
        Ok(transactions)
    }
}

#[async_trait::async_trait]
impl CategoryCatalog for MemoryBackend {
    async fn list_available(&self) -> Res<Vec<ExpenseCategory>> {
        Ok(self.lock()?.categories.clone())
    }
}

#[async_trait::async_trait]
impl AccountRegistry for MemoryBackend {
    async fn list_for_user(&self) -> Res<Vec<UserAccount>> {
        Ok(self
            .lock()?
            .accounts
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl TimeEntryStore for MemoryBackend {
    async fn start(&self, entry: &NewTimeEntry) -> Res<TimeEntry> {
        let mut state = self.lock()?;
        state.check_writable()?;
        let category_id = entry.category.as_ref().and_then(|name| {
            state
                .hobby_categories
                .iter()
                .find(|c| &c.name == name)
                .map(|c| c.id.clone())
        });
        let time_entry = TimeEntry {
            id: generate_id(),
            entry_id: entry.entry_id.clone(),
            name: entry.name.clone(),
            description: entry.description.clone(),
            category: entry.category.clone(),
            category_id,
            start_time: entry.start_time,
            end_time: None,
            elapsed_time: None,
        };
        state.time_entries.push(time_entry.clone());
        Ok(time_entry)
    }

    async fn running(&self) -> Res<Option<TimeEntry>> {
        Ok(self
            .lock()?
            .time_entries
            .iter()
            .filter(|e| e.is_running())
            .max_by_key(|e| e.start_time)
            .cloned())
    }

    async fn finish(&self, id: &str, end_time: DateTime<Utc>, elapsed: i64) -> Res<TimeEntry> {
        let mut state = self.lock()?;
        state.check_writable()?;
        let entry = state
            .time_entries
            .iter_mut()
            .find(|e| e.id == id)
            .with_context(|| format!("Time entry '{id}' not found"))?;
        entry.end_time = Some(end_time);
        entry.elapsed_time = Some(elapsed);
        Ok(entry.clone())
    }

    async fn list_categories(&self) -> Res<Vec<HobbyCategory>> {
        let mut categories = self.lock()?.hobby_categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

/// Parses CSV seed data, logging and skipping it if it is malformed.
fn seed<T>(csv_data: &str) -> Vec<T>
where
    T: DeserializeOwned,
{
    load_csv(csv_data).unwrap_or_else(|e| {
        error!("Unable to load seed data: {e:#}");
        Vec::new()
    })
}

/// Loads rows of type `T` from a CSV-formatted string with a header row.
fn load_csv<T>(csv_data: &str) -> Res<Vec<T>>
where
    T: DeserializeOwned,
{
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());
    rdr.deserialize()
        .map(|row| row.context("Unable to parse a seed data row"))
        .collect()
}

/// Seed expense category data.
const CATEGORY_DATA: &str = r##"id,name,emoji
cat-food,Food,🍔
cat-transport,Transport,🚌
cat-home,Home,🏠
cat-leisure,Leisure,🎬
cat-salary,Salary,💼
cat-misc,Misc,
"##;

/// Seed user account data.
const ACCOUNT_DATA: &str = r##"id,name,type,color,description,is_active
acct-visa,Visa,credit_card,#1A1F71,Everyday credit card,true
acct-broker,Broker,investment,,,true
acct-old,Old Savings,bank,#10B981,Closed account,false
"##;

/// Seed hobby category data.
const HOBBY_CATEGORY_DATA: &str = r##"id,name,color
hobby-music,Music,#8B5CF6
hobby-reading,Reading,#F59E0B
hobby-coding,Coding,#3B82F6
"##;
