// File: src/model/parser.rs
use crate::model::MonthDay;
use chrono::format::{Parsed, StrftimeItems, parse};

/// Accepted event-date shapes, tried in order. The first two come from the
/// contact provider (full date, or the vCard "no year" marker); the bare
/// `MM-DD` shape is how the holiday catalog stores fixed dates.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "--%m-%d", "%m-%d"];

/// Normalizes a raw event date string to a recurring month/day.
///
/// Any year in the input is discarded; recurrence comparison only ever uses
/// month and day. Blank input and input matching none of the accepted shapes
/// yield `None` — "date unknown", which callers treat as "skip", never as
/// today. Impossible calendar values (`02-30`) are rejected the same way
/// rather than rolled over.
pub fn parse_event_date(raw: &str) -> Option<MonthDay> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        let mut parsed = Parsed::new();
        if parse(&mut parsed, trimmed, StrftimeItems::new(format)).is_ok()
            && let (Some(month), Some(day)) = (parsed.month, parsed.day)
            && let Some(month_day) = MonthDay::new(month, day)
        {
            return Some(month_day);
        }
    }
    None
}
