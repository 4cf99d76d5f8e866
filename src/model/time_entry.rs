use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A block of time spent on a hobby. `end_time` and `elapsed_time` are set once it is stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub entry_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Flat category name.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Whole seconds between start and end.
    #[serde(default)]
    pub elapsed_time: Option<i64>,
}

impl TimeEntry {
    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Seconds elapsed as of `now`, or the recorded total once stopped.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> i64 {
        match self.elapsed_time {
            Some(secs) => secs,
            None => (now - self.start_time).num_seconds().max(0),
        }
    }
}

/// A time entry being started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimeEntry {
    pub entry_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub start_time: DateTime<Utc>,
}

/// The fields written when a running entry is stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishTimeEntry {
    pub end_time: DateTime<Utc>,
    pub elapsed_time: i64,
}

/// Formats seconds as `H:MM:SS`.
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_elapsed_running_and_stopped() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let mut entry = TimeEntry {
            id: "1".to_string(),
            entry_id: "e1".to_string(),
            name: "Guitar".to_string(),
            description: None,
            category: None,
            category_id: None,
            start_time: start,
            end_time: None,
            elapsed_time: None,
        };
        let later = Utc.with_ymd_and_hms(2025, 1, 1, 10, 30, 15).unwrap();
        assert!(entry.is_running());
        assert_eq!(entry.elapsed_at(later), 1815);

        entry.end_time = Some(later);
        entry.elapsed_time = Some(60);
        assert!(!entry.is_running());
        assert_eq!(entry.elapsed_at(later), 60);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0:00:00");
        assert_eq!(format_elapsed(1815), "0:30:15");
        assert_eq!(format_elapsed(36_061), "10:01:01");
    }
}
