//! These structs provide the CLI interface for the pocketbook CLI.

use crate::model::{Currency, TransactionType};
use crate::timer::StartTimer;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// pocketbook: Record expenses, income and hobby time from the command line.
///
/// Data is kept in a hosted backend. Run `pocketbook init` once with the backend URL and its
/// public anon key, then use the other commands to add and list records.
///
/// Set POCKETBOOK_IN_TEST_MODE to any non-empty value to use a seeded in-memory backend instead
/// of the network.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and its config.json.
    ///
    /// Both values are shown in the API settings of the hosted backend project. They can later be
    /// overridden with POCKETBOOK_BACKEND_URL and POCKETBOOK_ANON_KEY.
    Init(InitArgs),
    /// Add an expense or income.
    Add(AddArgs),
    /// List the most recent transactions.
    Transactions(TransactionsArgs),
    /// List the expense categories.
    Categories,
    /// List the accounts a transaction can be booked against.
    Accounts,
    /// Start, stop or check the hobby timer.
    Timer(TimerArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration is held. Defaults to ~/pocketbook
    #[arg(long, env = "POCKETBOOK_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// (Not shown): Args for the `pocketbook init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the hosted backend, e.g. https://abcdefgh.supabase.co
    #[arg(long)]
    backend_url: String,

    /// The public anon key of the hosted backend.
    #[arg(long)]
    anon_key: String,
}

impl InitArgs {
    pub fn new(backend_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            anon_key: anon_key.into(),
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }
}

/// (Not shown): Args for the `pocketbook add` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct AddArgs {
    /// expense or income
    #[arg(long = "type", default_value_t = TransactionType::Expense)]
    transaction_type: TransactionType,

    /// The amount, e.g. 12500 or 1,234.50. Must be greater than 0.
    #[arg(long)]
    amount: String,

    /// CLP, USD or EUR. Defaults to default_currency in config.json.
    #[arg(long)]
    currency: Option<Currency>,

    /// The category name. Defaults to the first category.
    #[arg(long)]
    category: Option<String>,

    /// bank, cash or the name of one of your accounts. Defaults to default_account in
    /// config.json.
    #[arg(long)]
    account: Option<String>,

    #[arg(long)]
    title: String,

    #[arg(long)]
    description: Option<String>,

    /// The transaction date as typed, e.g. 15032024 or 15/03/2024. Defaults to today.
    #[arg(long)]
    date: Option<String>,
}

impl AddArgs {
    pub fn new(amount: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

/// (Not shown): Args for the `pocketbook transactions` command.
#[derive(Debug, Parser, Clone)]
pub struct TransactionsArgs {
    /// How many transactions to show.
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

impl TransactionsArgs {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// (Not shown): Args for the `pocketbook timer` command.
#[derive(Debug, Parser, Clone)]
pub struct TimerArgs {
    #[command(subcommand)]
    action: TimerSubcommand,
}

impl TimerArgs {
    pub fn new(action: TimerSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &TimerSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum TimerSubcommand {
    /// Start timing a hobby session.
    Start(TimerStartArgs),
    /// Stop the running session and record its duration.
    Stop,
    /// Show the running session, if any.
    Status,
}

/// (Not shown): Args for the `pocketbook timer start` command.
#[derive(Debug, Parser, Clone)]
pub struct TimerStartArgs {
    /// What you are doing, e.g. Guitar practice.
    #[arg(long)]
    name: String,

    /// The hobby category name.
    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    description: Option<String>,
}

impl TimerStartArgs {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            description: None,
        }
    }

    pub fn to_request(&self) -> StartTimer {
        StartTimer {
            name: self.name.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
        }
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("pocketbook"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or POCKETBOOK_HOME instead of relying on the default \
                pocketbook home directory.",
            );
            PathBuf::from("pocketbook")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from([
            "pocketbook",
            "--home",
            "/tmp/pb",
            "add",
            "--type",
            "income",
            "--amount",
            "1,234.50",
            "--currency",
            "USD",
            "--title",
            "Refund",
            "--date",
            "15/03/2024",
        ])
        .unwrap();
        assert_eq!(args.common().home().path(), Path::new("/tmp/pb"));
        let Command::Add(add) = args.command() else {
            panic!("expected add, got {:?}", args.command());
        };
        assert_eq!(add.transaction_type(), TransactionType::Income);
        assert_eq!(add.amount(), "1,234.50");
        assert_eq!(add.currency(), Some(Currency::Usd));
        assert_eq!(add.date(), Some("15/03/2024"));
        assert_eq!(add.account(), None);
    }

    #[test]
    fn test_parse_add_defaults_to_expense() {
        let args =
            Args::try_parse_from(["pocketbook", "add", "--amount", "5", "--title", "Bus"]).unwrap();
        let Command::Add(add) = args.command() else {
            panic!("expected add");
        };
        assert_eq!(add.transaction_type(), TransactionType::Expense);
    }

    #[test]
    fn test_parse_timer_start() {
        let args = Args::try_parse_from([
            "pocketbook",
            "timer",
            "start",
            "--name",
            "Guitar",
            "--category",
            "Music",
        ])
        .unwrap();
        let Command::Timer(timer) = args.command() else {
            panic!("expected timer");
        };
        let TimerSubcommand::Start(start) = timer.action() else {
            panic!("expected start");
        };
        assert_eq!(start.to_request().category.as_deref(), Some("Music"));
    }

    #[test]
    fn test_parse_log_level() {
        let args = Args::try_parse_from(["pocketbook", "--log-level", "debug", "categories"])
            .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
    }

    #[test]
    fn test_bad_type_is_rejected() {
        assert!(Args::try_parse_from([
            "pocketbook",
            "add",
            "--type",
            "transfer",
            "--amount",
            "1",
            "--title",
            "x"
        ])
        .is_err());
    }
}
