pub mod event;
pub mod parser;

pub use event::{
    Contact, ContactSummary, EventKind, GiftIdea, Holiday, MonthDay, ReminderFiring,
};
