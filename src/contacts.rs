// File: ./src/contacts.rs
use crate::context::AppContext;
use crate::model::{Contact, ContactSummary};
use crate::storage::LocalStorage;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Anything that can yield contacts in two phases: a cheap listing (id and
/// name only), then a per-id detail fetch carrying birthday and notes.
///
/// Callers must tolerate `Ok(None)` from `contact_details` for an id they
/// just listed — the entry may have vanished between the two calls, and on
/// some backends the listing is served from a different, wider query than
/// the detail lookup. Absence is a value here, not an error.
pub trait ContactSource: Send + Sync {
    fn list_contacts(&self) -> Result<Vec<ContactSummary>>;
    fn contact_details(&self, id: &str) -> Result<Option<Contact>>;
}

// Version history:
// - v1: Initial format
const ADDRESS_BOOK_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct AddressBookData {
    #[serde(default)]
    version: u32,
    contacts: Vec<Contact>,
}

/// File-backed address book at `<data_dir>/contacts.json`, keyed by contact
/// id. Same locking and atomic-write discipline as the holiday store.
#[derive(Debug, Clone)]
pub struct AddressBook {
    path: PathBuf,
}

impl AddressBook {
    pub fn new(ctx: &dyn AppContext) -> Result<Self> {
        Ok(Self {
            path: ctx.get_address_book_path()?,
        })
    }

    fn read_unlocked(&self) -> Result<Vec<Contact>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let json = fs::read_to_string(&self.path)?;
        let data: AddressBookData = serde_json::from_str(&json)
            .map_err(|e| anyhow::anyhow!("Unreadable address book '{:?}': {}", self.path, e))?;
        Ok(data.contacts)
    }

    fn write_unlocked(&self, contacts: &[Contact]) -> Result<()> {
        let data = AddressBookData {
            version: ADDRESS_BOOK_VERSION,
            contacts: contacts.to_vec(),
        };
        let json = serde_json::to_string_pretty(&data)?;
        LocalStorage::atomic_write(&self.path, json)
    }

    pub fn upsert(&self, contact: &Contact) -> Result<()> {
        LocalStorage::with_lock(&self.path, || {
            let mut contacts = self.read_unlocked()?;
            match contacts.iter_mut().find(|c| c.id == contact.id) {
                Some(existing) => *existing = contact.clone(),
                None => contacts.push(contact.clone()),
            }
            self.write_unlocked(&contacts)
        })
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        LocalStorage::with_lock(&self.path, || {
            let mut contacts = self.read_unlocked()?;
            contacts.retain(|c| c.id != id);
            self.write_unlocked(&contacts)
        })
    }
}

impl ContactSource for AddressBook {
    /// Listing is sorted by display name ascending, like the provider query
    /// the original app issued.
    fn list_contacts(&self) -> Result<Vec<ContactSummary>> {
        let mut summaries: Vec<ContactSummary> =
            LocalStorage::with_lock(&self.path, || self.read_unlocked())?
                .iter()
                .map(Contact::summary)
                .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    fn contact_details(&self, id: &str) -> Result<Option<Contact>> {
        Ok(LocalStorage::with_lock(&self.path, || self.read_unlocked())?
            .into_iter()
            .find(|c| c.id == id))
    }
}
