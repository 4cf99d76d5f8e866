//! Keystroke-driven date entry.
//!
//! Dates are typed by the user as `DD/MM/YYYY` (the display form) and stored as `YYYY-MM-DD`
//! (the canonical form). The display value is rebuilt from the digits of whatever the user typed,
//! so separators are inserted automatically. A canonical value only exists once the display value
//! is a complete, numerically valid date.
//!
//! Only numeric ranges are checked: day in `1..=31`, month in `1..=12`, year `>= 1900`. Calendar
//! validity is not, so `31/02/2024` becomes `2024-02-31`.
//!
//! # Example
//!
//! ```
//! # use pocketbook::date_entry::DateEntryField;
//! # use chrono::NaiveDate;
//! let today = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
//! let mut field = DateEntryField::initialize_on(today);
//! assert_eq!(field.display(), "09/01/2025");
//!
//! field.on_raw_input("1503");
//! assert_eq!(field.display(), "15/03");
//! assert!(!field.is_complete());
//!
//! field.on_raw_input("15032024");
//! assert_eq!(field.display(), "15/03/2024");
//! assert_eq!(field.canonical().unwrap().as_str(), "2024-03-15");
//! ```

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::trace;

/// Earliest year accepted in either date form.
pub const MIN_YEAR: u32 = 1900;

/// Length of a fully typed `DD/MM/YYYY` value.
pub const DISPLAY_LEN: usize = 10;

/// Only the first eight digits of the raw input take part in the display value.
const MAX_DIGITS: usize = 8;

/// A `YYYY-MM-DD` date whose components are within the accepted numeric ranges.
///
/// The only ways to obtain one are through range-checked constructors, so holding a
/// `CanonicalDate` means it is safe to send to the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalDate(String);

impl CanonicalDate {
    /// Builds a canonical date from numeric components, or `None` if any is out of range.
    pub fn from_parts(year: u32, month: u32, day: u32) -> Option<Self> {
        if !(1..=31).contains(&day) || !(1..=12).contains(&month) || year < MIN_YEAR {
            return None;
        }
        Some(Self(format!("{year:04}-{month:02}-{day:02}")))
    }

    /// Builds a canonical date from a calendar date. Returns `None` for years before 1900.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        let year = u32::try_from(date.year()).ok()?;
        Self::from_parts(year, date.month(), date.day())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders this date as `DD/MM/YYYY`.
    pub fn to_display(&self) -> String {
        to_display(&self.0)
    }
}

impl Display for CanonicalDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalDate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The error returned when a string is not a valid `YYYY-MM-DD` canonical date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalDateError(String);

impl Display for CanonicalDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not a valid YYYY-MM-DD date", self.0)
    }
}

impl std::error::Error for CanonicalDateError {}

impl FromStr for CanonicalDate {
    type Err = CanonicalDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CanonicalDateError(s.to_string());
        let parts: [&str; 3] = s
            .split('-')
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| err())?;
        let [year, month, day] = parts;
        let year = parse_part(year).ok_or_else(err)?;
        let month = parse_part(month).ok_or_else(err)?;
        let day = parse_part(day).ok_or_else(err)?;
        Self::from_parts(year, month, day).ok_or_else(err)
    }
}

impl<'de> Deserialize<'de> for CanonicalDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CanonicalDate::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Rebuilds a `DD/MM/YYYY` display value from raw keystroke text.
///
/// Non-digit characters are discarded and only the first eight digits are used. A separator is
/// only written together with the digit that follows it, so `"150"` becomes `"15/0"` and `"15"`
/// stays `"15"`.
pub fn format_display(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DIGITS)
        .collect();
    let len = digits.len();

    let mut formatted = String::with_capacity(DISPLAY_LEN);
    formatted.push_str(&digits[..len.min(2)]);
    if len >= 3 {
        formatted.push('/');
        formatted.push_str(&digits[2..len.min(4)]);
    }
    if len >= 5 {
        formatted.push('/');
        formatted.push_str(&digits[4..]);
    }
    formatted
}

/// Converts a `DD/MM/YYYY` display value to its canonical form.
///
/// Returns `None` unless the value has exactly three `/`-separated integer parts within range.
/// Day and month may be a single digit; they are zero padded in the result.
pub fn to_canonical(display: &str) -> Option<CanonicalDate> {
    let parts: [&str; 3] = display.split('/').collect::<Vec<_>>().try_into().ok()?;
    let [day, month, year] = parts;
    let day = parse_part(day)?;
    let month = parse_part(month)?;
    let year = parse_part(year)?;
    CanonicalDate::from_parts(year, month, day)
}

/// Parses one date part. Only ASCII digits are accepted, so signs and whitespace are rejected.
fn parse_part(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Converts a `YYYY-MM-DD` value to `DD/MM/YYYY` by reordering its parts.
///
/// Returns an empty string for empty input or input that does not have three `-`-separated parts.
pub fn to_display(canonical: &str) -> String {
    if canonical.is_empty() {
        return String::new();
    }
    match canonical.split('-').collect::<Vec<_>>().as_slice() {
        [year, month, day] => format!("{day}/{month}/{year}"),
        _ => String::new(),
    }
}

/// Today's system-local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Where a `DateEntryField` stands with respect to its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    /// Fewer than ten display characters have been typed.
    Incomplete,
    /// A full display value that converted to a canonical date.
    CompleteValid,
    /// A full display value with an out-of-range component.
    CompleteInvalid,
}

/// Holds the display and canonical values of a date being typed into a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateEntryField {
    canonical: Option<CanonicalDate>,
    display: String,
}

impl DateEntryField {
    /// Creates a field seeded with today's date.
    pub fn initialize() -> Self {
        Self::initialize_on(today())
    }

    /// Creates a field seeded with `today`.
    pub fn initialize_on(today: NaiveDate) -> Self {
        let canonical = CanonicalDate::from_date(today);
        let display = canonical
            .as_ref()
            .map(CanonicalDate::to_display)
            .unwrap_or_default();
        Self { canonical, display }
    }

    /// Recomputes both values from the raw text of the input element and returns them.
    pub fn on_raw_input(&mut self, raw: &str) -> (Option<&CanonicalDate>, &str) {
        self.display = format_display(raw);
        self.canonical = if self.display.len() == DISPLAY_LEN {
            to_canonical(&self.display)
        } else {
            None
        };
        trace!(
            "date input '{raw}' -> display '{}', canonical {:?}",
            self.display,
            self.canonical
        );
        (self.canonical.as_ref(), &self.display)
    }

    /// Puts the field back to today's date.
    pub fn reset(&mut self) {
        self.reset_on(today())
    }

    /// Puts the field back to `today`.
    pub fn reset_on(&mut self, today: NaiveDate) {
        *self = Self::initialize_on(today);
    }

    pub fn canonical(&self) -> Option<&CanonicalDate> {
        self.canonical.as_ref()
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// True when a canonical value is available, i.e. the form may be submitted.
    pub fn is_complete(&self) -> bool {
        self.canonical.is_some()
    }

    pub fn state(&self) -> EntryState {
        match (self.display.len() == DISPLAY_LEN, self.is_complete()) {
            (false, _) => EntryState::Incomplete,
            (true, true) => EntryState::CompleteValid,
            (true, false) => EntryState::CompleteInvalid,
        }
    }
}

impl Default for DateEntryField {
    fn default() -> Self {
        Self::initialize()
    }
}
