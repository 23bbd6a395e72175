// File: ./src/model/event.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn default_selected() -> bool {
    true
}

// --- RECURRING DATES ---

/// An annual recurring date. Whatever year the source string carried has
/// already been discarded by the time one of these exists.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Validates the pair against a leap year, so Feb 29 is accepted here
    /// while impossible dates (Feb 30, month 13) are not. A Feb 29 event
    /// only yields an occurrence in leap years.
    pub fn new(month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(2000, month, day).map(|_| Self { month, day })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// The concrete date this event falls on in `year`, if that date exists.
    pub fn occurrence_in(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    Birthday,
    Holiday,
}

// --- CONTACTS ---

/// The cheap listing shape: id and display name only. Birthday and notes
/// live on the full `Contact` record, fetched per id.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContactSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    /// Raw date string: `YYYY-MM-DD`, `--MM-DD`, or `MM-DD`.
    pub birthday: Option<String>,
    pub notes: Option<String>,
}

impl Contact {
    pub fn summary(&self) -> ContactSummary {
        ContactSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

// --- HOLIDAYS ---

/// A catalog holiday. `name` is the unique identity in the store. An empty
/// `date` means the date varies year to year and has not been supplied yet;
/// such entries are kept but never produce reminders.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    pub name: String,
    pub date: String,
    #[serde(default = "default_selected")]
    pub is_selected: bool,
}

impl Holiday {
    pub fn new(name: &str, date: &str, is_selected: bool) -> Self {
        Self {
            name: name.to_string(),
            date: date.to_string(),
            is_selected,
        }
    }
}

// --- GIFT IDEAS ---

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GiftIdea {
    pub name: String,
    pub description: String,
    pub shopping_link: Option<String>,
}

// --- REMINDER FIRINGS ---

/// One reminder ready for dispatch. Ephemeral: firings are produced by an
/// evaluation pass and handed to a notifier, never persisted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReminderFiring {
    /// Stable per-event id, so the platform notifier can replace instead of
    /// stacking when the same event fires again.
    pub notification_id: u32,
    pub identity: String,
    pub kind: EventKind,
    pub title: String,
    pub body: String,
}
