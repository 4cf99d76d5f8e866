use clap::Parser;
use pocketbook::args::{Args, Command, TimerSubcommand};
use pocketbook::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // When POCKETBOOK_IN_TEST_MODE is set and non-empty, a seeded in-memory backend stands in
    // for the hosted one.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.backend_url(), init_args.anon_key())
                .await?
                .print()
        }

        Command::Add(add_args) => {
            let config = load(home).await?;
            commands::add_transaction(config, mode, add_args.clone())
                .await?
                .print()
        }

        Command::Transactions(list_args) => {
            let config = load(home).await?;
            commands::transactions(config, mode, list_args.limit())
                .await?
                .print()
        }

        Command::Categories => commands::categories(load(home).await?, mode)
            .await?
            .print(),

        Command::Accounts => commands::accounts(load(home).await?, mode).await?.print(),

        Command::Timer(timer_args) => {
            let config = load(home).await?;
            match timer_args.action() {
                TimerSubcommand::Start(start_args) => {
                    commands::timer_start(config, mode, start_args.to_request())
                        .await?
                        .print()
                }
                TimerSubcommand::Stop => commands::timer_stop(config, mode).await?.print(),
                TimerSubcommand::Status => commands::timer_status(config, mode).await?.print(),
            }
        }
    };
    Ok(())
}

async fn load(home: &std::path::Path) -> Result<Config> {
    Config::load(home)
        .await
        .map_err(|e| pocketbook::Error::new(pocketbook::ErrorType::Config, e))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        // RUST_LOG exists; use it.
        Some(_) => EnvFilter::from_default_env(),
        // RUST_LOG does not exist; use the given level for this crate only.
        None => EnvFilter::new(format!(
            "{}={},{}={}",
            env!("CARGO_CRATE_NAME"),
            level,
            env!("CARGO_BIN_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
