//! A start/stop timer for hobby sessions.

use crate::api::TimeEntryStore;
use crate::error::Res;
use crate::model::{NewTimeEntry, TimeEntry};
use crate::utils::generate_id;
use anyhow::{bail, ensure, Context};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// What to record when starting a timer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StartTimer {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Tracks the running time entry, if any, and whether a request is in flight.
#[derive(Debug, Default, Clone)]
pub struct HobbyTimer {
    current: Option<TimeEntry>,
    loading: bool,
}

impl HobbyTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up the entry left running by an earlier session.
    pub async fn restore<S>(store: &S) -> Res<Self>
    where
        S: TimeEntryStore + ?Sized,
    {
        let current = store
            .running()
            .await
            .context("Unable to check for a running timer")?;
        if let Some(entry) = &current {
            debug!("Restored running timer '{}'", entry.name);
        }
        Ok(Self {
            current,
            loading: false,
        })
    }

    pub fn current(&self) -> Option<&TimeEntry> {
        self.current.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The label for the start/stop button.
    pub fn button_label(&self) -> &'static str {
        match (self.is_running(), self.loading) {
            (true, _) => "Stop",
            (false, true) => "Starting...",
            (false, false) => "Start",
        }
    }

    /// Starts a new entry at `now`. If the returned future is dropped before the store answers,
    /// the timer stays stopped and can be started again.
    pub async fn start<S>(
        &mut self,
        store: &S,
        request: StartTimer,
        now: DateTime<Utc>,
    ) -> Res<&TimeEntry>
    where
        S: TimeEntryStore + ?Sized,
    {
        if let Some(running) = &self.current {
            bail!("A timer is already running for '{}'", running.name);
        }
        let name = request.name.trim();
        ensure!(!name.is_empty(), "Hobby name is required");

        let entry = NewTimeEntry {
            entry_id: generate_id(),
            name: name.to_string(),
            description: request.description.filter(|d| !d.trim().is_empty()),
            category: request.category.filter(|c| !c.is_empty()),
            start_time: now,
        };

        let result = {
            let _in_flight = InFlight::begin(&mut self.loading);
            store.start(&entry).await
        };

        let started = result.context("Unable to start the timer")?;
        info!("Started timer '{}'", started.name);
        let current: &TimeEntry = self.current.insert(started);
        Ok(current)
    }

    /// Stops the running entry at `now`, recording the whole seconds elapsed.
    pub async fn stop<S>(&mut self, store: &S, now: DateTime<Utc>) -> Res<TimeEntry>
    where
        S: TimeEntryStore + ?Sized,
    {
        let running = self.current.as_ref().context("No timer is running")?;
        let id = running.id.clone();
        let elapsed = running.elapsed_at(now);

        let result = {
            let _in_flight = InFlight::begin(&mut self.loading);
            store.finish(&id, now, elapsed).await
        };

        let finished = result.context("Unable to stop the timer")?;
        info!("Stopped timer '{}' after {elapsed}s", finished.name);
        self.current = None;
        Ok(finished)
    }
}

/// Sets the loading flag for as long as it lives, including when the request future is
/// cancelled.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn begin(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}
