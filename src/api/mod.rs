//! Access to the hosted backend.
//!
//! The rest of the crate talks to the backend only through the traits in this module. There are
//! two implementations: `RemoteDataClient`, which speaks the PostgREST dialect exposed by the
//! hosted service, and `MemoryBackend`, which keeps everything in memory and is used in tests and
//! in test mode.

mod memory;
mod remote;

use crate::error::Res;
use crate::model::{
    ExpenseCategory, HobbyCategory, NewTimeEntry, NewTransaction, TimeEntry, Transaction,
    UserAccount,
};
use crate::Config;
use chrono::{DateTime, Utc};
use tracing::debug;

pub use memory::MemoryBackend;
pub use remote::RemoteDataClient;

/// Env variable that, when set to a non-empty value, switches to the in-memory backend.
pub const TEST_MODE_ENV: &str = "POCKETBOOK_IN_TEST_MODE";

/// Creates and reads transactions.
#[async_trait::async_trait]
pub trait TransactionStore: Send + Sync {
    /// Stores `record` and returns it as the backend saved it.
    async fn create(&self, record: &NewTransaction) -> Res<Transaction>;

    /// Returns up to `limit` transactions, newest transaction date first.
    async fn list_recent(&self, limit: usize) -> Res<Vec<Transaction>>;
}

/// Lists the expense categories available to the user.
#[async_trait::async_trait]
pub trait CategoryCatalog: Send + Sync {
    async fn list_available(&self) -> Res<Vec<ExpenseCategory>>;
}

/// Lists the accounts the user has defined. The built-in `bank` and `cash` accounts are not
/// stored and are not returned here; see `model::account_choices`.
#[async_trait::async_trait]
pub trait AccountRegistry: Send + Sync {
    async fn list_for_user(&self) -> Res<Vec<UserAccount>>;
}

/// Stores hobby time entries.
#[async_trait::async_trait]
pub trait TimeEntryStore: Send + Sync {
    async fn start(&self, entry: &NewTimeEntry) -> Res<TimeEntry>;

    /// The most recently started entry that has not been stopped, if any.
    async fn running(&self) -> Res<Option<TimeEntry>>;

    async fn finish(&self, id: &str, end_time: DateTime<Utc>, elapsed: i64) -> Res<TimeEntry>;

    async fn list_categories(&self) -> Res<Vec<HobbyCategory>>;
}

/// Everything the commands need from a backend.
pub trait Backend: TransactionStore + CategoryCatalog + AccountRegistry + TimeEntryStore {}

impl<T> Backend for T where T: TransactionStore + CategoryCatalog + AccountRegistry + TimeEntryStore
{}

/// Whether requests go to the hosted backend or to the in-memory one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Remote,
    Testing,
}

impl Mode {
    /// `Mode::Testing` if `POCKETBOOK_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Remote`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Remote,
        }
    }
}

/// Creates the backend selected by `mode`.
pub fn backend(config: &Config, mode: Mode) -> Res<Box<dyn Backend>> {
    debug!("Using the {mode:?} backend");
    Ok(match mode {
        Mode::Remote => Box::new(RemoteDataClient::new(config)?),
        Mode::Testing => Box::new(MemoryBackend::seeded()),
    })
}
