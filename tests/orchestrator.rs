// Tests for the reminder orchestrator: one pass over both event sources,
// skip semantics, stable notification ids, and dispatch.
use anyhow::Result;
use chrono::NaiveDate;
use noubli::contacts::ContactSource;
use noubli::context::TestContext;
use noubli::model::{Contact, ContactSummary, EventKind, Holiday};
use noubli::reminder::{ReminderEngine, notification_id};
use noubli::storage::HolidayStore;
use noubli::system::Notifier;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

struct StaticContacts {
    contacts: Vec<Contact>,
    /// Ids that appear in the listing but whose detail fetch comes back
    /// absent.
    detail_absent: HashSet<String>,
}

impl StaticContacts {
    fn new(contacts: Vec<Contact>) -> Self {
        Self {
            contacts,
            detail_absent: HashSet::new(),
        }
    }
}

impl ContactSource for StaticContacts {
    fn list_contacts(&self) -> Result<Vec<ContactSummary>> {
        Ok(self.contacts.iter().map(Contact::summary).collect())
    }

    fn contact_details(&self, id: &str) -> Result<Option<Contact>> {
        if self.detail_absent.contains(id) {
            return Ok(None);
        }
        Ok(self.contacts.iter().find(|c| c.id == id).cloned())
    }
}

/// A contact source whose backing storage is unreachable.
struct BrokenContacts;

impl ContactSource for BrokenContacts {
    fn list_contacts(&self) -> Result<Vec<ContactSummary>> {
        anyhow::bail!("contact storage unreachable")
    }

    fn contact_details(&self, _id: &str) -> Result<Option<Contact>> {
        anyhow::bail!("contact storage unreachable")
    }
}

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<(u32, String, String)>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, id: u32, title: &str, body: &str) {
        self.seen
            .lock()
            .unwrap()
            .push((id, title.to_string(), body.to_string()));
    }
}

fn contact(id: &str, name: &str, birthday: Option<&str>) -> Contact {
    Contact {
        id: id.to_string(),
        name: name.to_string(),
        birthday: birthday.map(str::to_string),
        notes: None,
    }
}

fn seeded_store(ctx: &TestContext) -> HolidayStore {
    let store = HolidayStore::new(ctx).unwrap();
    store.seed_default_catalog().unwrap();
    store
}

fn today() -> NaiveDate {
    // 14 days before March 17.
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

#[test]
fn test_birthday_fires_with_original_wording() {
    let ctx = TestContext::new();
    let contacts = StaticContacts::new(vec![contact("7", "Marie", Some("--03-17"))]);
    let engine = ReminderEngine::new(Arc::new(contacts), HolidayStore::new(&ctx).unwrap());

    let firings = engine.run(today()).unwrap();
    assert_eq!(firings.len(), 1);
    assert_eq!(firings[0].kind, EventKind::Birthday);
    assert_eq!(firings[0].title, "Birthday Reminder!");
    assert_eq!(firings[0].body, "Marie's birthday is in 14 days!");
    assert_eq!(
        firings[0].notification_id,
        notification_id(EventKind::Birthday, "7")
    );
}

#[test]
fn test_selected_holiday_fires_and_deselected_never_does() {
    let ctx = TestContext::new();
    let store = seeded_store(&ctx);

    // St. Patrick's Day (03-17) is due today but seeded deselected.
    let engine = ReminderEngine::new(
        Arc::new(StaticContacts::new(vec![])),
        store.clone(),
    );
    assert!(engine.run(today()).unwrap().is_empty());

    // Once the user selects it, the same pass fires it.
    let mut st_patricks = store.find_by_name("St. Patrick's Day").unwrap().unwrap();
    st_patricks.is_selected = true;
    store.upsert(&st_patricks).unwrap();

    let firings = engine.run(today()).unwrap();
    assert_eq!(firings.len(), 1);
    assert_eq!(firings[0].kind, EventKind::Holiday);
    assert_eq!(firings[0].body, "St. Patrick's Day is in 14 days!");
    assert_eq!(
        firings[0].notification_id,
        notification_id(EventKind::Holiday, "St. Patrick's Day")
    );
}

#[test]
fn test_dateless_and_unparsable_events_are_skipped() {
    let ctx = TestContext::new();
    let store = HolidayStore::new(&ctx).unwrap();
    // Variable-date holiday: retained in storage, never fires.
    store.upsert(&Holiday::new("Easter Sunday", "", true)).unwrap();

    let contacts = StaticContacts::new(vec![
        contact("1", "NoBirthday", None),
        contact("2", "BadDate", Some("sometime in spring")),
        contact("3", "Marie", Some("2001-03-17")),
    ]);
    let engine = ReminderEngine::new(Arc::new(contacts), store);

    let firings = engine.run(today()).unwrap();
    assert_eq!(firings.len(), 1);
    assert_eq!(firings[0].identity, "3");
}

#[test]
fn test_listed_contact_with_absent_detail_is_skipped() {
    let ctx = TestContext::new();
    let mut contacts = StaticContacts::new(vec![
        contact("1", "Ghost", Some("--03-17")),
        contact("2", "Marie", Some("--03-17")),
    ]);
    contacts.detail_absent.insert("1".to_string());

    let engine = ReminderEngine::new(Arc::new(contacts), HolidayStore::new(&ctx).unwrap());
    let firings = engine.run(today()).unwrap();
    assert_eq!(firings.len(), 1);
    assert_eq!(firings[0].identity, "2");
}

#[test]
fn test_repeated_runs_refire_with_the_same_id() {
    // No fired-reminder store exists: a second pass on the same day
    // produces the same firing again, with an identical notification id.
    let ctx = TestContext::new();
    let contacts = StaticContacts::new(vec![contact("7", "Marie", Some("03-17"))]);
    let engine = ReminderEngine::new(Arc::new(contacts), HolidayStore::new(&ctx).unwrap());

    let first = engine.run(today()).unwrap();
    let second = engine.run(today()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_source_fault_aborts_the_whole_run() {
    let ctx = TestContext::new();
    let engine = ReminderEngine::new(Arc::new(BrokenContacts), seeded_store(&ctx));
    assert!(engine.run(today()).is_err());
}

#[test]
fn test_dispatch_hands_every_firing_to_the_notifier() {
    let ctx = TestContext::new();
    let store = HolidayStore::new(&ctx).unwrap();
    store.upsert(&Holiday::new("Name Day", "03-17", true)).unwrap();

    let contacts = StaticContacts::new(vec![contact("7", "Marie", Some("--03-17"))]);
    let engine = ReminderEngine::new(Arc::new(contacts), store);

    let firings = engine.run(today()).unwrap();
    assert_eq!(firings.len(), 2);

    let notifier = RecordingNotifier::default();
    ReminderEngine::dispatch(&firings, &notifier);

    let seen = notifier.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().any(|(_, title, _)| title == "Birthday Reminder!"));
    assert!(seen.iter().any(|(_, title, _)| title == "Holiday Reminder!"));
}
