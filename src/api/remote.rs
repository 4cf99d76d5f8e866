//! Implements the store traits against the hosted backend's REST interface.
//!
//! Tables are addressed as `{backend_url}/rest/v1/{table}` with PostgREST query syntax, e.g.
//! `?end_time=is.null&order=start_time.desc`. Every request carries the anon key in the `apikey`
//! header and a bearer token, which is the user's access token when configured.

use crate::api::{AccountRegistry, CategoryCatalog, TimeEntryStore, TransactionStore};
use crate::error::Res;
use crate::model::{
    ExpenseCategory, FinishTimeEntry, HobbyCategory, NewTimeEntry, NewTransaction, TimeEntry,
    Transaction, UserAccount,
};
use crate::utils::generate_id;
use crate::Config;
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{trace, warn};
use url::Url;

const REST_PATH: &str = "rest/v1/";
const TRANSACTIONS: &str = "transactions";
const EXPENSE_CATEGORIES: &str = "user_expense_categories";
const ACCOUNTS: &str = "user_accounts";
const TIME_ENTRIES: &str = "time_entries";
const HOBBY_CATEGORIES: &str = "hobby_categories";

/// An authenticated request/response transport to the hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteDataClient {
    http: reqwest::Client,
    base: Url,
    anon_key: String,
    bearer: String,
}

/// The body of a transaction insert: the record plus a client-generated identifier.
#[derive(Debug, Serialize)]
struct TransactionRow<'a> {
    transaction_id: String,
    #[serde(flatten)]
    record: &'a NewTransaction,
}

impl RemoteDataClient {
    pub fn new(config: &Config) -> Res<Self> {
        let base = config
            .backend_url()
            .join(REST_PATH)
            .context("Unable to build the REST endpoint URL")?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("pocketbook/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self {
            http,
            base,
            anon_key: config.anon_key().to_string(),
            bearer: config
                .access_token()
                .unwrap_or(config.anon_key())
                .to_string(),
        })
    }

    fn table_url(&self, table: &str) -> Res<Url> {
        self.base
            .join(table)
            .with_context(|| format!("Unable to build the URL for table '{table}'"))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.bearer)
    }

    async fn select<T>(&self, table: &str, query: &[(&str, String)]) -> Res<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.table_url(table)?;
        trace!("GET {url} {query:?}");
        let response = self
            .request(Method::GET, url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request for {table}"))?;
        let rows: Vec<Value> = read_json(table, response).await?;
        Ok(parse_rows(table, rows))
    }

    async fn insert<B, T>(&self, table: &str, body: &B) -> Res<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.table_url(table)?;
        trace!("POST {url}");
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send insert request for {table}"))?;
        first_row(table, read_json(table, response).await?)
    }

    async fn update<B, T>(&self, table: &str, id: &str, body: &B) -> Res<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.table_url(table)?;
        trace!("PATCH {url} id={id}");
        let response = self
            .request(Method::PATCH, url)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send update request for {table}"))?;
        first_row(table, read_json(table, response).await?)
    }
}

/// Checks the status of `response` and parses its JSON body.
async fn read_json<T>(table: &str, response: Response) -> Res<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());
        bail!("Request for {table} failed with status {status}: {body}");
    }
    response
        .json()
        .await
        .with_context(|| format!("Failed to parse the {table} response"))
}

/// Parses each row on its own, logging and skipping any row that does not match `T`, so one bad
/// record does not hide the rest.
fn parse_rows<T>(table: &str, rows: Vec<Value>) -> Vec<T>
where
    T: DeserializeOwned,
{
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping unreadable {table} row: {e}");
                None
            }
        })
        .collect()
}

fn first_row<T>(table: &str, rows: Vec<T>) -> Res<T> {
    rows.into_iter()
        .next()
        .with_context(|| format!("The backend returned no {table} row"))
}

fn select_all() -> (&'static str, String) {
    ("select", "*".to_string())
}

#[async_trait::async_trait]
impl TransactionStore for RemoteDataClient {
    async fn create(&self, record: &NewTransaction) -> Res<Transaction> {
        let row = TransactionRow {
            transaction_id: generate_id(),
            record,
        };
        self.insert(TRANSACTIONS, &row).await
    }

    async fn list_recent(&self, limit: usize) -> Res<Vec<Transaction>> {
        self.select(
            TRANSACTIONS,
            &[
                select_all(),
                ("order", "transaction_date.desc,created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}

#[async_trait::async_trait]
impl CategoryCatalog for RemoteDataClient {
    async fn list_available(&self) -> Res<Vec<ExpenseCategory>> {
        self.select(
            EXPENSE_CATEGORIES,
            &[select_all(), ("order", "created_at.asc".to_string())],
        )
        .await
    }
}

#[async_trait::async_trait]
impl AccountRegistry for RemoteDataClient {
    async fn list_for_user(&self) -> Res<Vec<UserAccount>> {
        self.select(
            ACCOUNTS,
            &[
                select_all(),
                ("is_active", "eq.true".to_string()),
                ("order", "created_at.asc".to_string()),
            ],
        )
        .await
    }
}

#[async_trait::async_trait]
impl TimeEntryStore for RemoteDataClient {
    async fn start(&self, entry: &NewTimeEntry) -> Res<TimeEntry> {
        self.insert(TIME_ENTRIES, entry).await
    }

    async fn running(&self) -> Res<Option<TimeEntry>> {
        let rows: Vec<TimeEntry> = self
            .select(
                TIME_ENTRIES,
                &[
                    select_all(),
                    ("end_time", "is.null".to_string()),
                    ("order", "start_time.desc".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn finish(&self, id: &str, end_time: DateTime<Utc>, elapsed: i64) -> Res<TimeEntry> {
        let body = FinishTimeEntry {
            end_time,
            elapsed_time: elapsed,
        };
        self.update(TIME_ENTRIES, id, &body).await
    }

    async fn list_categories(&self) -> Res<Vec<HobbyCategory>> {
        self.select(
            HOBBY_CATEGORIES,
            &[select_all(), ("order", "name.asc".to_string())],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_entry::CanonicalDate;
    use crate::model::{Amount, Currency, TransactionType};
    use crate::test::TestEnv;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_table_url() {
        let env = TestEnv::new().await;
        let client = RemoteDataClient::new(&env.config()).unwrap();
        assert_eq!(
            client.table_url(TRANSACTIONS).unwrap().as_str(),
            "https://example.supabase.co/rest/v1/transactions"
        );
    }

    #[tokio::test]
    async fn test_bearer_defaults_to_anon_key() {
        let env = TestEnv::new().await;
        let client = RemoteDataClient::new(&env.config()).unwrap();
        assert_eq!(client.bearer, client.anon_key);
    }

    #[test]
    fn test_transaction_row_flattens_record() {
        let record = NewTransaction {
            transaction_type: TransactionType::Income,
            amount: Amount::from_str("10").unwrap(),
            currency: Currency::Usd,
            category: "Salary".to_string(),
            account: "bank".to_string(),
            title: "Pay".to_string(),
            description: None,
            transaction_date: CanonicalDate::from_str("2024-01-31").unwrap(),
        };
        let row = TransactionRow {
            transaction_id: "abc".to_string(),
            record: &record,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["transaction_id"], "abc");
        assert_eq!(json["type"], "income");
        assert_eq!(json["transaction_date"], "2024-01-31");
    }

    #[test]
    fn test_parse_rows_skips_bad_dates() {
        let row = |id: &str, date: &str| {
            serde_json::json!({
                "id": id,
                "transaction_id": format!("t-{id}"),
                "type": "expense",
                "amount": 1500,
                "currency": "CLP",
                "title": "Coffee",
                "transaction_date": date,
                "created_at": "2024-03-15T12:00:00Z",
                "updated_at": "2024-03-15T12:00:00Z"
            })
        };
        let rows = vec![
            row("1", "2024-03-15"),
            row("2", "1850-01-01"),
            row("3", "2024-13-01"),
            row("4", "2024-03-14"),
        ];
        let parsed: Vec<Transaction> = parse_rows(TRANSACTIONS, rows);
        let ids: Vec<_> = parsed.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_first_row_empty() {
        let err = first_row::<u8>(TRANSACTIONS, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("no transactions row"));
    }
}
