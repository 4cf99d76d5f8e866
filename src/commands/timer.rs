use crate::api::{self, Mode};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{format_elapsed, HobbyCategory, TimeEntry};
use crate::timer::{HobbyTimer, StartTimer};
use crate::{Config, Error, Result};
use anyhow::{anyhow, Context};
use chrono::Utc;
use serde::Serialize;

/// What `pocketbook timer status` reports.
#[derive(Debug, Clone, Serialize)]
pub struct TimerStatus {
    pub running: Option<TimeEntry>,
    /// Seconds since the running entry started.
    pub elapsed: Option<i64>,
    /// The categories a new entry can be filed under.
    pub categories: Vec<HobbyCategory>,
}

/// Starts timing a hobby session. Fails if one is already running.
pub async fn timer_start(
    config: Config,
    mode: Mode,
    request: StartTimer,
) -> Result<Out<TimeEntry>> {
    let backend = api::backend(&config, mode).pub_result(ErrorType::Config)?;
    let mut timer = HobbyTimer::restore(&*backend)
        .await
        .pub_result(ErrorType::Request)?;

    if let Some(category) = request.category.as_deref() {
        let categories = backend
            .list_categories()
            .await
            .context("Unable to list hobby categories")
            .pub_result(ErrorType::Request)?;
        if !categories.iter().any(|c| c.name == category) {
            return Err(Error::new(
                ErrorType::Validation,
                anyhow!("Unknown hobby category '{category}'"),
            ));
        }
    }

    let error_type = if timer.is_running() || request.name.trim().is_empty() {
        ErrorType::Validation
    } else {
        ErrorType::Request
    };
    let started = timer
        .start(&*backend, request, Utc::now())
        .await
        .pub_result(error_type)?
        .clone();
    Ok(Out::new(format!("Started '{}'", started.name), started))
}

/// Stops the running session and records how long it took.
pub async fn timer_stop(config: Config, mode: Mode) -> Result<Out<TimeEntry>> {
    let backend = api::backend(&config, mode).pub_result(ErrorType::Config)?;
    let mut timer = HobbyTimer::restore(&*backend)
        .await
        .pub_result(ErrorType::Request)?;
    if !timer.is_running() {
        return Err(Error::new(
            ErrorType::Validation,
            anyhow!("No timer is running"),
        ));
    }
    let finished = timer
        .stop(&*backend, Utc::now())
        .await
        .pub_result(ErrorType::Request)?;
    let elapsed = format_elapsed(finished.elapsed_time.unwrap_or_default());
    Ok(Out::new(
        format!("Stopped '{}' after {elapsed}", finished.name),
        finished,
    ))
}

/// Reports the running session, if any, and the available hobby categories.
pub async fn timer_status(config: Config, mode: Mode) -> Result<Out<TimerStatus>> {
    let backend = api::backend(&config, mode).pub_result(ErrorType::Config)?;
    let (timer, categories) = tokio::try_join!(HobbyTimer::restore(&*backend), async {
        backend
            .list_categories()
            .await
            .context("Unable to list hobby categories")
    })
    .pub_result(ErrorType::Request)?;

    let running = timer.current().cloned();
    let elapsed = running.as_ref().map(|e| e.elapsed_at(Utc::now()));
    let message = match (&running, elapsed) {
        (Some(entry), Some(secs)) => {
            format!("'{}' has been running for {}", entry.name, format_elapsed(secs))
        }
        _ => "No timer is running".to_string(),
    };
    Ok(Out::new(
        message,
        TimerStatus {
            running,
            elapsed,
            categories,
        },
    ))
}
