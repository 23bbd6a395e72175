// Due-date evaluation and the reminder orchestrator.
//
// The evaluator answers one question: is this annual event exactly
// `lead_days` away from the reference date? The orchestrator runs that
// question over both event sources (contacts, selected holidays) in a
// single pass and returns the firings; dispatching them to a notifier is a
// separate, injected step, so the whole pass stays side-effect free and
// testable with any "today".
use crate::contacts::ContactSource;
use crate::model::parser::parse_event_date;
use crate::model::{EventKind, MonthDay, ReminderFiring};
use crate::storage::HolidayStore;
use crate::system::Notifier;
use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use std::sync::Arc;

/// Days before an event's annual occurrence at which its reminder fires.
pub const LEAD_DAYS: i64 = 14;

/// True iff the occurrence, taken in `today`'s year, lies exactly
/// `lead_days` ahead of `today`.
///
/// The comparison is (year, day-of-year) on plain dates, so time-of-day can
/// never affect the result. The candidate year is always today's year:
/// events in the first `lead_days` of a year never match, because their
/// trigger date lands in the previous December. Tests pin this boundary
/// behavior down.
pub fn is_due_today(occurrence: MonthDay, today: NaiveDate, lead_days: i64) -> bool {
    let Some(candidate) = occurrence.occurrence_in(today.year()) else {
        // Feb 29 in a non-leap year: no occurrence, nothing due.
        return false;
    };
    let trigger = candidate - Duration::days(lead_days);
    trigger.year() == today.year() && trigger.ordinal() == today.ordinal()
}

/// Stable notification id for an event, derived from kind and identity so
/// the same event always maps to the same id and the platform notifier can
/// replace rather than stack.
pub fn notification_id(kind: EventKind, identity: &str) -> u32 {
    // FNV-1a. The std hasher is randomized per process, which would defeat
    // the replace semantics across runs.
    let mut hash: u32 = 0x811c_9dc5;
    for byte in format!("{}_{}", kind, identity).bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Walks both event sources and produces the reminders due on a given day.
pub struct ReminderEngine {
    contacts: Arc<dyn ContactSource>,
    holidays: HolidayStore,
}

impl ReminderEngine {
    pub fn new(contacts: Arc<dyn ContactSource>, holidays: HolidayStore) -> Self {
        Self { contacts, holidays }
    }

    /// Single evaluation pass. Per-event problems (missing detail, blank or
    /// unparsable date) are skipped; only source faults (storage
    /// unreachable) abort the run.
    pub fn run(&self, today: NaiveDate) -> Result<Vec<ReminderFiring>> {
        let mut firings = self.birthday_firings(today)?;
        firings.extend(self.holiday_firings(today)?);
        Ok(firings)
    }

    fn birthday_firings(&self, today: NaiveDate) -> Result<Vec<ReminderFiring>> {
        let mut firings = Vec::new();

        for summary in self.contacts.list_contacts()? {
            // Two-phase fetch: the listing has no birthday, the detail does.
            let Some(detail) = self.contacts.contact_details(&summary.id)? else {
                log::debug!("Contact {} listed but detail absent, skipping", summary.id);
                continue;
            };
            let Some(month_day) = detail.birthday.as_deref().and_then(parse_event_date) else {
                continue;
            };

            if is_due_today(month_day, today, LEAD_DAYS) {
                firings.push(ReminderFiring {
                    notification_id: notification_id(EventKind::Birthday, &detail.id),
                    identity: detail.id.clone(),
                    kind: EventKind::Birthday,
                    title: "Birthday Reminder!".to_string(),
                    body: format!("{}'s birthday is in {} days!", detail.name, LEAD_DAYS),
                });
            }
        }
        Ok(firings)
    }

    fn holiday_firings(&self, today: NaiveDate) -> Result<Vec<ReminderFiring>> {
        let mut firings = Vec::new();

        // Deselected holidays are filtered at the store; the evaluator
        // never sees them.
        for holiday in self.holidays.list_selected()? {
            let Some(month_day) = parse_event_date(&holiday.date) else {
                continue;
            };

            if is_due_today(month_day, today, LEAD_DAYS) {
                firings.push(ReminderFiring {
                    notification_id: notification_id(EventKind::Holiday, &holiday.name),
                    identity: holiday.name.clone(),
                    kind: EventKind::Holiday,
                    title: "Holiday Reminder!".to_string(),
                    body: format!("{} is in {} days!", holiday.name, LEAD_DAYS),
                });
            }
        }
        Ok(firings)
    }

    /// Hands every firing to the notifier, fire-and-forget.
    pub fn dispatch(firings: &[ReminderFiring], notifier: &dyn Notifier) {
        for firing in firings {
            notifier.notify(firing.notification_id, &firing.title, &firing.body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(month: u32, day: u32) -> MonthDay {
        MonthDay::new(month, day).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_due_exactly_lead_days_ahead() {
        assert!(is_due_today(md(3, 17), date(2025, 3, 3), LEAD_DAYS));
        assert!(!is_due_today(md(3, 18), date(2025, 3, 3), LEAD_DAYS));
        assert!(!is_due_today(md(3, 16), date(2025, 3, 3), LEAD_DAYS));
    }

    #[test]
    fn test_zero_lead_means_due_on_the_day() {
        assert!(is_due_today(md(7, 4), date(2025, 7, 4), 0));
        assert!(!is_due_today(md(7, 4), date(2025, 7, 3), 0));
    }

    #[test]
    fn test_notification_id_is_stable_and_kind_scoped() {
        let a = notification_id(EventKind::Birthday, "42");
        let b = notification_id(EventKind::Birthday, "42");
        let c = notification_id(EventKind::Holiday, "42");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
